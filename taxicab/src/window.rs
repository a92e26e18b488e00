//! Window sizing for the hashed strategy
//!
//! The hashed strategy never holds the whole pair space at once. It walks
//! the range of sums in closed windows `[u0, u1], [u1, u2], ...` and empties
//! its candidate table between them. The [`BoundEstimator`] chooses each
//! window's upper end so the candidate table stays inside a target density
//! band regardless of the overall bound.
//!
//! The number of pairs `i < j` with `i³ + j³ <= x` grows like
//! `PAIR_DENSITY * x^(2/3)`, so pairs per unit of sum thin out as sums grow
//! and windows can get steadily wider for the same occupancy. That smooth
//! count misses how sums bunch up right above each cube: `j³ + i³` for every
//! small `i` lands within `i³` of `j³`, so a window of width `w` sitting on a
//! cube holds up to `cbrt(w) + 1` sums more than the smooth model says. The
//! estimator reserves room for one such cluster in every window, picks the
//! widest window whose prediction still fits the target, limits how fast
//! widths may grow from one window to the next, and optionally corrects
//! itself from the occupancy it actually observed.

use crate::cube::Sum;
use crate::err::Error;
use log::trace;

/// Default candidate table size, as a power of two
pub const DEFAULT_CAPACITY_BITS: u32 = 20;

/// Largest fraction of slots a table may fill before reporting overflow
pub(crate) const MAX_LOAD: f64 = 0.875;

/// Asymptotic pair count coefficient: `Γ(4/3)² / Γ(5/3) / 2`
///
/// The area of `x³ + y³ <= 1` in the positive quadrant, halved for `i < j`.
const PAIR_DENSITY: f64 = 0.441_66;

/// Below this fraction of the target, an adaptive estimator widens windows
const UNDERSHOOT: f64 = 0.5;

/// Most an adaptive estimator widens a window in one step
const MAX_WIDEN: f64 = 1.5;

/// Most an adaptive estimator narrows a window in one step
const MIN_CORRECTION: f64 = 0.25;

/// Largest fraction of candidate slots an adaptive estimator plans to fill
/// when widening, unless the configured density is already higher
///
/// Keeps windows that land on a cube cluster right after a widening step
/// below [`MAX_LOAD`].
const MAX_PLANNED_LOAD: f64 = 0.625;

/// Range of table sizes we accept, as powers of two
const CAPACITY_BITS: std::ops::RangeInclusive<u32> = 4..=32;

/// Tuning knobs for the hashed strategy's tables and windows
///
/// Every field has a working default; see the setters for what each one
/// controls.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct WindowConfig {
    /// Candidate table size, as a power of two
    capacity_bits: u32,
    /// Result table size, as a power of two, if set explicitly
    result_capacity_bits: Option<u32>,
    /// Target fraction of candidate slots filled per window
    density: f64,
    /// Width of the first window, if set explicitly
    initial_width: Option<Sum>,
    /// Largest ratio between consecutive window widths
    growth_limit: f64,
    /// Whether observed occupancy feeds back into window sizing
    adaptive: bool,
}

impl WindowConfig {
    /// Create a [`WindowConfig`] with default settings.
    pub fn new() -> Self {
        Self {
            capacity_bits: DEFAULT_CAPACITY_BITS,
            result_capacity_bits: None,
            density: 0.5,
            initial_width: None,
            growth_limit: 4.0,
            adaptive: true,
        }
    }

    /// Size the candidate table at `2^bits` slots (4 to 32).
    ///
    /// The table is allocated once per run and reused by every window, so
    /// this sets the memory footprint independently of the bound.
    pub fn capacity_bits(&mut self, bits: u32) -> &mut Self {
        self.capacity_bits = bits;
        self
    }

    /// Size the result table at `2^bits` slots (4 to 32).
    ///
    /// The result table only holds taxicab numbers that could still show up
    /// again in a later window. Defaults to a quarter of the candidate table.
    pub fn result_capacity_bits(&mut self, bits: u32) -> &mut Self {
        self.result_capacity_bits = Some(bits);
        self
    }

    /// Target fraction of candidate slots each window should fill.
    ///
    /// Must be in `(0, 0.875]`. Lower values mean shorter probe sequences
    /// and more windows; higher values leave less headroom before a window
    /// that holds more sums than predicted overflows the table.
    pub fn density(&mut self, density: f64) -> &mut Self {
        self.density = density;
        self
    }

    /// Fix the width of the first window, overriding the model.
    ///
    /// Later windows are still sized by the model, growing from this width
    /// no faster than [`Self::growth_limit`] allows.
    pub fn initial_width(&mut self, width: Sum) -> &mut Self {
        self.initial_width = Some(width);
        self
    }

    /// Limit each window to at most `limit` times the previous width.
    ///
    /// Must be at least 1.
    pub fn growth_limit(&mut self, limit: f64) -> &mut Self {
        self.growth_limit = limit;
        self
    }

    /// Turn occupancy feedback on or off.
    pub fn adaptive(&mut self, adaptive: bool) -> &mut Self {
        self.adaptive = adaptive;
        self
    }

    /// Candidate table size, as a power of two
    pub fn candidate_bits(&self) -> u32 {
        self.capacity_bits
    }

    /// Result table size, as a power of two
    pub fn result_bits(&self) -> u32 {
        self.result_capacity_bits
            .unwrap_or_else(|| self.capacity_bits.saturating_sub(2).max(*CAPACITY_BITS.start()))
    }

    /// Number of candidate slots
    fn slots(&self) -> f64 {
        (1_u64 << self.capacity_bits) as f64
    }

    /// Number of distinct sums each window aims to hold
    pub(crate) fn target(&self) -> f64 {
        self.slots() * self.density
    }

    /// Most distinct sums a widened window may aim for
    fn widened_target(&self) -> f64 {
        self.target().max(self.slots() * MAX_PLANNED_LOAD)
    }

    /// Check every setting against its valid range.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if !CAPACITY_BITS.contains(&self.capacity_bits) {
            return Err(Error::Config("capacity bits must be between 4 and 32"));
        }
        if !CAPACITY_BITS.contains(&self.result_bits()) {
            return Err(Error::Config(
                "result capacity bits must be between 4 and 32",
            ));
        }
        if !(self.density > 0.0 && self.density <= MAX_LOAD) {
            return Err(Error::Config("density must be in (0, 0.875]"));
        }
        if !(self.growth_limit >= 1.0) {
            return Err(Error::Config("growth limit must be at least 1"));
        }
        if matches!(self.initial_width, Some(width) if width < 1) {
            return Err(Error::Config("initial width must be positive"));
        }
        Ok(())
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A closed range of sums processed with one candidate table
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct Window {
    /// Smallest sum in the window
    pub(crate) lower: Sum,
    /// Largest sum in the window
    pub(crate) upper: Sum,
}

impl Window {
    /// Distance between the window's ends
    fn width(&self) -> Sum {
        self.upper - self.lower
    }
}

/// Modelled number of pairs with sums up to `x`
fn pairs_below(x: Sum) -> f64 {
    PAIR_DENSITY * (x.max(0) as f64).powf(2.0 / 3.0)
}

/// Most sums a window of `width` collects from the cluster above one cube
fn cube_cluster(width: Sum) -> f64 {
    (width.max(0) as f64).cbrt() + 1.0
}

/// Distinct sums expected in `lower..=lower + width`, cluster included
fn predicted(lower: Sum, width: Sum) -> f64 {
    pairs_below(lower.saturating_add(width)) - pairs_below(lower) + cube_cluster(width)
}

/// Chooses successive windows covering `0..=bound`
///
/// Consecutive windows share their boundary value, so a sum sitting exactly
/// on a boundary is generated in both. The hashed strategy's result table
/// keeps such a sum from being counted twice.
#[derive(Debug, Clone)]
pub(crate) struct BoundEstimator {
    /// Sizing knobs
    config: WindowConfig,
    /// Upper end of the whole run
    bound: Sum,
    /// Most recently issued window
    last: Option<Window>,
    /// Multiplier on the target, from occupancy feedback
    correction: f64,
}

impl BoundEstimator {
    /// Start planning windows for sums up to `bound`.
    pub(crate) fn new(config: &WindowConfig, bound: Sum) -> Self {
        Self {
            config: config.clone(),
            bound,
            last: None,
            correction: 1.0,
        }
    }

    /// Number of distinct sums the next window should hold
    fn corrected_target(&self) -> f64 {
        (self.config.target() * self.correction).min(self.config.widened_target())
    }

    /// Widest window above `lower` predicted to hold the corrected target,
    /// or 0 if not even a single step fits.
    fn model_width(&self, lower: Sum) -> Sum {
        let target = self.corrected_target();
        // The smooth model alone overestimates the width, which bounds the
        // search from above.
        let base = lower as f64;
        let reach = (base.powf(2.0 / 3.0) + target / PAIR_DENSITY).powf(1.5);
        let (mut low, mut high) = (0, ((reach - base) as Sum).max(1));
        while low < high {
            let mid = low + (high - low + 1) / 2;
            if predicted(lower, mid) <= target {
                low = mid;
            } else {
                high = mid - 1;
            }
        }
        low
    }

    /// Choose the next window, or `None` once the bound has been covered.
    pub(crate) fn next_window(&mut self) -> Option<Window> {
        let lower = match self.last {
            None => 0,
            Some(last) if last.upper >= self.bound => return None,
            Some(last) => last.upper,
        };
        if self.bound < lower {
            return None;
        }

        let mut width = match (self.last, self.config.initial_width) {
            (None, Some(initial)) => initial,
            _ => self.model_width(lower),
        };
        if let Some(last) = self.last {
            let ceiling = (last.width() as f64 * self.config.growth_limit) as Sum;
            width = width.min(ceiling);
        }
        let width = width.max(1);

        let window = Window {
            lower,
            upper: lower.saturating_add(width).min(self.bound),
        };
        trace!(
            "next window {}..={} (width {}, correction {:.3})",
            window.lower,
            window.upper,
            width,
            self.correction
        );
        self.last = Some(window);
        Some(window)
    }

    /// Report how many distinct sums the last window actually held.
    ///
    /// Does nothing unless the configuration is adaptive. A window that held
    /// more sums than modelled shrinks the next one in proportion; a window
    /// that stayed well under target widens the next one a little.
    pub(crate) fn observe_occupancy(&mut self, window: &Window, distinct: usize) {
        if !self.config.adaptive {
            return;
        }
        let expected = predicted(window.lower, window.width()).max(1.0);
        let ratio = distinct as f64 / expected;
        self.correction = if ratio > 1.0 {
            (1.0 / ratio).max(MIN_CORRECTION)
        } else if (distinct as f64) < self.config.target() * UNDERSHOOT && ratio > 0.0 {
            (1.0 / ratio).min(MAX_WIDEN)
        } else {
            1.0
        };
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Collect every window for a bound
    fn plan(config: &WindowConfig, bound: Sum) -> Vec<Window> {
        let mut estimator = BoundEstimator::new(config, bound);
        std::iter::from_fn(|| estimator.next_window()).collect()
    }

    #[test]
    fn defaults_are_valid() {
        let config = WindowConfig::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.candidate_bits(), 20);
        assert_eq!(config.result_bits(), 18);
        assert_eq!(config.target(), 524_288.0);
    }

    #[test]
    fn rejects_bad_settings() {
        assert!(WindowConfig::new().capacity_bits(3).validate().is_err());
        assert!(WindowConfig::new().capacity_bits(33).validate().is_err());
        assert!(WindowConfig::new().result_capacity_bits(2).validate().is_err());
        assert!(WindowConfig::new().density(0.0).validate().is_err());
        assert!(WindowConfig::new().density(0.9).validate().is_err());
        assert!(WindowConfig::new().density(f64::NAN).validate().is_err());
        assert!(WindowConfig::new().growth_limit(0.5).validate().is_err());
        assert!(WindowConfig::new().initial_width(0).validate().is_err());
        assert!(WindowConfig::new().capacity_bits(4).validate().is_ok());
        assert_eq!(WindowConfig::new().capacity_bits(4).result_bits(), 4);
    }

    #[test]
    fn windows_tile_the_range() {
        let mut config = WindowConfig::new();
        config.capacity_bits(8);
        let windows = plan(&config, 1_000_000);
        assert!(windows.len() > 2);
        assert_eq!(windows[0].lower, 0);
        assert_eq!(windows.last().map(|w| w.upper), Some(1_000_000));
        for pair in windows.windows(2) {
            assert_eq!(pair[0].upper, pair[1].lower);
            assert!(pair[0].lower < pair[0].upper);
        }
    }

    #[test]
    fn widths_grow_with_the_sums() {
        let mut config = WindowConfig::new();
        config.capacity_bits(8).adaptive(false);
        let windows = plan(&config, 100_000_000);
        let widths: Vec<Sum> = windows[..windows.len() - 1]
            .iter()
            .map(Window::width)
            .collect();
        assert!(widths.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn growth_saturates() {
        let mut config = WindowConfig::new();
        config.initial_width(10).growth_limit(2.0);
        let windows = plan(&config, 1_000);
        let widths: Vec<Sum> = windows.iter().map(Window::width).collect();
        assert_eq!(&widths[..4], &[10, 20, 40, 80]);
    }

    #[test]
    fn single_window_when_the_table_is_large() {
        let windows = plan(&WindowConfig::new(), 1729);
        assert_eq!(windows, vec![Window { lower: 0, upper: 1729 }]);
    }

    #[test]
    fn degenerate_bounds() {
        let config = WindowConfig::new();
        assert_eq!(plan(&config, 0), vec![Window { lower: 0, upper: 0 }]);
        assert!(plan(&config, -5).is_empty());
    }

    #[test]
    fn windows_on_a_cube_leave_room_for_its_cluster() {
        use crate::pairs::PairGenerator;
        use std::collections::BTreeSet;

        let mut config = WindowConfig::new();
        config.capacity_bits(6);
        let estimator = BoundEstimator::new(&config, Sum::MAX);
        for root in [1000, 2000] {
            let lower = root * root * root;
            let width = estimator.model_width(lower);
            let distinct: BTreeSet<Sum> = PairGenerator::new(lower, lower + width)
                .pairs()
                .map(|pair| pair.sum)
                .collect();
            assert!(
                distinct.len() as f64 <= config.target(),
                "{} sums from {}",
                distinct.len(),
                lower
            );
            assert!(predicted(lower, width) <= config.target());
            assert!(predicted(lower, width + 1) > config.target());
        }
    }

    #[test]
    fn widening_is_capped() {
        let mut config = WindowConfig::new();
        config.capacity_bits(8);
        let mut estimator = BoundEstimator::new(&config, Sum::MAX);
        let first = estimator.next_window().unwrap_or(Window { lower: 0, upper: 0 });
        estimator.observe_occupancy(&first, 1);
        assert_eq!(estimator.correction, MAX_WIDEN);
        assert_eq!(estimator.corrected_target(), 160.0);

        // A density above the cap is still honoured as is
        config.density(0.75);
        let estimator = BoundEstimator::new(&config, Sum::MAX);
        assert_eq!(estimator.corrected_target(), 192.0);
    }

    #[test]
    fn tiny_tables_still_advance() {
        let mut config = WindowConfig::new();
        config.capacity_bits(4).density(0.1);
        let windows = plan(&config, 10_000);
        assert!(windows.iter().all(|w| w.width() >= 1));
        assert_eq!(windows.last().map(|w| w.upper), Some(10_000));
    }

    #[test]
    fn feedback_shrinks_after_an_overshoot() {
        let mut config = WindowConfig::new();
        config.capacity_bits(8);
        let mut estimator = BoundEstimator::new(&config, Sum::MAX);
        let first = estimator.next_window().unwrap_or(Window { lower: 0, upper: 0 });
        let modelled = estimator.model_width(first.upper);
        estimator.observe_occupancy(&first, 1_000);
        assert!(estimator.correction < 1.0);
        assert!(estimator.model_width(first.upper) < modelled);
    }
}
