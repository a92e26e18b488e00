//! Enumeration of cube pairs and their sums
//!
//! Pairs `(i, j)` with `0 <= i < j` are produced row by row: a [`Row`] holds
//! every pair for one leading root `i`, and rows are visited with increasing
//! `i`. Within a row `j` increases, so sums strictly increase. That's the
//! property the sort-merge strategy relies on to treat each row as a
//! presorted run.
//!
//! A generator covers a closed range of sums. Rows skip straight to the
//! first `j` whose sum reaches the lower end of the range, which keeps the
//! cost of one window proportional to the pairs inside it plus one step
//! per row, instead of the whole pair space below it.

use crate::cube::{ceil_cbrt, cube, Root, Sum};

/// One cube pair together with its sum
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub struct CubePair {
    /// Smaller root
    pub i: Root,
    /// Larger root
    pub j: Root,
    /// `i³ + j³`
    pub sum: Sum,
}

/// Iterator over the rows of pairs whose sums fall in `lower..=upper`
///
/// Yields one [`Row`] for every `i` with `i³ <= upper`, including rows that
/// turn out to be empty.
#[derive(Debug, Clone)]
pub struct PairGenerator {
    /// Smallest sum of interest
    lower: Sum,
    /// Largest sum of interest
    upper: Sum,
    /// Leading root of the next row
    next_i: Root,
}

impl PairGenerator {
    /// Build a generator for sums in the closed range `lower..=upper`.
    ///
    /// Bounds are expected to have passed the crate's range check, i.e.
    /// `upper <= MAX_BOUND`.
    pub fn new(lower: Sum, upper: Sum) -> Self {
        Self {
            lower,
            upper,
            next_i: 0,
        }
    }

    /// Flatten all rows into one sequence of pairs.
    pub fn pairs(self) -> impl Iterator<Item = CubePair> {
        self.flatten()
    }
}

impl Iterator for PairGenerator {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        let i = self.next_i;
        let i_cube = cube(i);
        if i_cube > self.upper {
            return None;
        }
        self.next_i += 1;
        let first_j = ceil_cbrt(self.lower - i_cube).max(i + 1);
        Some(Row {
            i,
            i_cube,
            next_j: first_j,
            upper: self.upper,
        })
    }
}

/// All pairs with one fixed leading root, in increasing order of sum
#[derive(Debug, Clone)]
pub struct Row {
    /// Leading root shared by every pair in this row
    i: Root,
    /// Cached `i³`
    i_cube: Sum,
    /// Second root of the next pair to yield
    next_j: Root,
    /// Largest sum of interest
    upper: Sum,
}

impl Row {
    /// The leading root `i` of this row.
    pub fn leading(&self) -> Root {
        self.i
    }
}

impl Iterator for Row {
    type Item = CubePair;

    #[inline(always)]
    fn next(&mut self) -> Option<CubePair> {
        let j = self.next_j;
        let sum = self.i_cube + cube(j);
        if sum > self.upper {
            return None;
        }
        self.next_j += 1;
        Some(CubePair { i: self.i, j, sum })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Straightforward enumeration without the lower bound skip
    fn naive(lower: Sum, upper: Sum) -> Vec<CubePair> {
        let mut out = vec![];
        let mut i = 0;
        while cube(i) <= upper {
            let mut j = i + 1;
            while cube(i) + cube(j) <= upper {
                let sum = cube(i) + cube(j);
                if sum >= lower {
                    out.push(CubePair { i, j, sum });
                }
                j += 1;
            }
            i += 1;
        }
        out
    }

    #[test]
    fn matches_naive_enumeration() {
        let ranges = [
            (0, 0),
            (0, 1),
            (0, 1729),
            (1000, 5000),
            (1729, 1729),
            (4104, 20000),
        ];
        for (lower, upper) in ranges {
            let pairs: Vec<_> = PairGenerator::new(lower, upper).pairs().collect();
            assert_eq!(pairs, naive(lower, upper), "range {}..={}", lower, upper);
        }
    }

    #[test]
    fn rows_are_sorted_and_complete() {
        let rows: Vec<Vec<Sum>> = PairGenerator::new(0, 1729)
            .map(|row| row.map(|p| p.sum).collect())
            .collect();
        // i runs from 0 to 12 since 12³ <= 1729 < 13³
        assert_eq!(rows.len(), 13);
        for row in &rows {
            assert!(row.windows(2).all(|w| w[0] < w[1]));
        }
        // Rows for i >= 10 are empty, but still present
        assert!(rows[10..].iter().all(|row| row.is_empty()));
        assert_eq!(rows.iter().map(Vec::len).sum::<usize>(), 65);
    }

    #[test]
    fn both_representations_of_1729() {
        let pairs: Vec<_> = PairGenerator::new(1729, 1729)
            .pairs()
            .map(|p| (p.i, p.j))
            .collect();
        assert_eq!(pairs, vec![(1, 12), (9, 10)]);
    }

    #[test]
    fn empty_ranges() {
        assert_eq!(PairGenerator::new(0, -1).count(), 0);
        assert_eq!(PairGenerator::new(0, 0).pairs().count(), 0);
        assert_eq!(PairGenerator::new(10, 9).pairs().count(), 0);
        assert_eq!(PairGenerator::new(1730, 1730).pairs().count(), 0);
    }
}
