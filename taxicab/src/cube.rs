//! Cube arithmetic shared by every strategy
//!
//! All sums are computed exactly in [`Sum`]. The supported range is capped
//! at [`MAX_BOUND`] so that the largest cube the pair generator ever
//! evaluates, one step past the cube root of the bound, plus the leading
//! cube still fits comfortably in an `i64`.

use crate::err::{Error, OverflowError};

/// A sum of two cubes, also used for bounds
pub type Sum = i64;

/// A cube root: one side of a cube pair
pub type Root = i64;

/// Largest bound accepted by the counters.
///
/// At this bound roots stay at or below `10^6 + 1`, so any cube plus any
/// cube we evaluate stays below `2.1 * 10^18`.
pub const MAX_BOUND: Sum = 1_000_000_000_000_000_000;

/// Compute `n³`.
///
/// Exact for every root reachable from a bound up to [`MAX_BOUND`].
#[inline(always)]
pub(crate) fn cube(n: Root) -> Sum {
    n * n * n
}

/// Largest `r` with `r³ <= x`, or 0 for non-positive `x`.
///
/// Starts from the floating point estimate and corrects it, since `f64`
/// can't represent every `i64` near the top of our range.
pub(crate) fn floor_cbrt(x: Sum) -> Root {
    if x <= 0 {
        return 0;
    }
    let mut r = (x as f64).cbrt() as Root;
    while r > 0 && cube(r) > x {
        r -= 1;
    }
    while cube(r + 1) <= x {
        r += 1;
    }
    r
}

/// Smallest `r >= 0` with `r³ >= x`.
pub(crate) fn ceil_cbrt(x: Sum) -> Root {
    if x <= 0 {
        return 0;
    }
    let r = floor_cbrt(x);
    if cube(r) == x {
        r
    } else {
        r + 1
    }
}

/// Reject bounds outside the supported range.
///
/// Negative bounds are fine: they simply admit no pairs.
pub(crate) fn check_bound(bound: Sum) -> Result<(), Error> {
    if bound > MAX_BOUND {
        Err(OverflowError::Bound {
            bound,
            max: MAX_BOUND,
        }
        .into())
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cube_roots() {
        assert_eq!(floor_cbrt(0), 0);
        assert_eq!(floor_cbrt(-8), 0);
        assert_eq!(floor_cbrt(1), 1);
        assert_eq!(floor_cbrt(7), 1);
        assert_eq!(floor_cbrt(8), 2);
        assert_eq!(floor_cbrt(1728), 12);
        assert_eq!(floor_cbrt(1729), 12);
        assert_eq!(ceil_cbrt(1728), 12);
        assert_eq!(ceil_cbrt(1729), 13);
        assert_eq!(ceil_cbrt(-5), 0);
        assert_eq!(floor_cbrt(MAX_BOUND), 1_000_000);
        assert_eq!(floor_cbrt(MAX_BOUND - 1), 999_999);
        assert_eq!(ceil_cbrt(MAX_BOUND - 1), 1_000_000);
    }

    #[test]
    fn cube_roots_agree_with_cubes() {
        for r in 1..2_000 {
            let c = cube(r);
            assert_eq!(floor_cbrt(c), r);
            assert_eq!(floor_cbrt(c - 1), r - 1);
            assert_eq!(ceil_cbrt(c), r);
            assert_eq!(ceil_cbrt(c + 1), r + 1);
        }
    }

    #[test]
    fn bound_limits() {
        assert!(check_bound(-1).is_ok());
        assert!(check_bound(MAX_BOUND).is_ok());
        assert!(matches!(
            check_bound(MAX_BOUND + 1),
            Err(Error::Overflow(OverflowError::Bound { .. }))
        ));
    }
}
