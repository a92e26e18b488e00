//! Windowed hash table duplicate detection
//!
//! Each window gets an empty candidate table. Every sum is looked up there:
//! the first sighting inserts it, the second marks it as a taxicab number,
//! later sightings are ignored. Windows are closed ranges that share their
//! boundary values, so a sum equal to a boundary is generated and
//! detected again in the next window. A separate result table remembers
//! which sums were already counted, so they're counted once.
//!
//! The result table would grow with the number of taxicab numbers if we
//! kept everything. Only sums at or above the current window's lower end
//! can come back, so older entries are pruned at each window start.

use crate::accum::Accumulator;
use crate::cube::Sum;
use crate::dedup::Dedup;
use crate::err::{Error, TableKind};
use crate::report::TableStats;
use crate::table::hash::{Sighting, SumTable};
use crate::window::{BoundEstimator, Window, WindowConfig, MAX_LOAD};
use log::debug;

/// Hashed duplicate detection over estimator-chosen windows
#[derive(Debug)]
pub(crate) struct HashDedup {
    /// Plans the windows
    estimator: BoundEstimator,
    /// Sums seen in the current window, with sighting counts
    candidates: SumTable<Sum>,
    /// Taxicab numbers already counted that may reappear
    results: SumTable<Sum>,
    /// Window currently being filled
    current: Option<Window>,
    /// Largest candidate occupancy seen in any window
    peak: usize,
    /// Number of windows finished
    windows: usize,
}

impl HashDedup {
    /// Allocate both tables for a run up to `bound`.
    ///
    /// The configuration must already be validated.
    pub(crate) fn new(config: &WindowConfig, bound: Sum) -> Result<Self, Error> {
        Ok(Self {
            estimator: BoundEstimator::new(config, bound),
            candidates: SumTable::new(TableKind::Candidate, config.candidate_bits(), MAX_LOAD)?,
            results: SumTable::new(TableKind::Result, config.result_bits(), MAX_LOAD)?,
            current: None,
            peak: 0,
            windows: 0,
        })
    }

    /// Look up one sum and classify it within the current window.
    ///
    /// On the second sighting, also consults the result table and reports
    /// the sum to `tally` unless an earlier window already counted it.
    #[inline(always)]
    pub(crate) fn observe_sum(
        &mut self,
        sum: Sum,
        tally: &mut Accumulator,
    ) -> Result<Sighting, Error> {
        let sighting = self.candidates.observe(sum)?;
        if sighting == Sighting::Second && self.results.insert(sum)? {
            tally.record_duplicate(sum)?;
        }
        Ok(sighting)
    }
}

impl Dedup for HashDedup {
    fn next_window(&mut self) -> Option<Window> {
        let window = self.estimator.next_window()?;
        self.results.retain(|sum| sum >= window.lower);
        self.current = Some(window);
        Some(window)
    }

    #[inline(always)]
    fn observe(&mut self, sum: Sum, tally: &mut Accumulator) -> Result<(), Error> {
        self.observe_sum(sum, tally).map(|_| ())
    }

    fn finish_window(&mut self, tally: &mut Accumulator) -> Result<(), Error> {
        let occupied = self.candidates.len();
        if let Some(window) = self.current.take() {
            self.estimator.observe_occupancy(&window, occupied);
            debug!(
                "window {} covered {}..={}: {} distinct sums, {} taxicab numbers so far",
                self.windows,
                window.lower,
                window.upper,
                occupied,
                tally.count()
            );
        }
        self.peak = self.peak.max(occupied);
        self.windows += 1;
        self.candidates.clear();
        Ok(())
    }

    fn stats(&self) -> TableStats {
        TableStats {
            occupation: self.peak,
            size: self.candidates.capacity(),
            memory_bytes: self.candidates.size_bytes() + self.results.size_bytes(),
            windows: self.windows,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pairs::PairGenerator;

    /// Single window configuration with a small table
    fn small_config() -> WindowConfig {
        let mut config = WindowConfig::new();
        config.capacity_bits(10);
        config
    }

    #[test]
    fn classifies_sightings() {
        let mut engine = HashDedup::new(&small_config(), 100_000).expect("tables");
        let mut tally = Accumulator::default();
        assert!(engine.next_window().is_some());
        let sightings: Vec<_> = [1729, 1729, 1729, 4104, 4104]
            .iter()
            .filter_map(|&sum| engine.observe_sum(sum, &mut tally).ok())
            .collect();
        assert_eq!(
            sightings,
            vec![
                Sighting::First,
                Sighting::Second,
                Sighting::Repeat,
                Sighting::First,
                Sighting::Second
            ]
        );
        assert_eq!((tally.count(), tally.checksum()), (2, 5833));
    }

    #[test]
    fn boundary_sum_counted_once() {
        // Window edges at 1729: both pairs of 1729 are generated in the
        // first and the second window.
        let mut config = small_config();
        config.initial_width(1729);
        let mut engine = HashDedup::new(&config, 4104).expect("tables");
        let mut tally = Accumulator::default();
        let mut windows = vec![];
        while let Some(window) = engine.next_window() {
            windows.push(window);
            for pair in PairGenerator::new(window.lower, window.upper).pairs() {
                assert!(engine.observe(pair.sum, &mut tally).is_ok());
            }
            assert!(engine.finish_window(&mut tally).is_ok());
        }
        assert_eq!(windows[0], Window { lower: 0, upper: 1729 });
        assert_eq!(windows[1].lower, 1729);
        assert_eq!((tally.count(), tally.checksum()), (2, 5833));
        assert_eq!(engine.stats().windows, windows.len());
    }

    #[test]
    fn order_of_sums_does_not_matter() {
        // Sums from 1729 and 4104 with two unrelated ones mixed in. Every
        // ordering must still report both taxicab numbers exactly once.
        let mut sums = [1729, 1729, 4104, 4104, 9, 35];
        for permutation in permutohedron::Heap::new(&mut sums) {
            let mut engine = HashDedup::new(&small_config(), 100_000).expect("tables");
            let mut tally = Accumulator::default();
            assert!(engine.next_window().is_some());
            for sum in permutation {
                assert!(engine.observe(sum, &mut tally).is_ok());
            }
            assert!(engine.finish_window(&mut tally).is_ok());
            assert_eq!((tally.count(), tally.checksum()), (2, 5833));
        }
    }

    #[test]
    fn candidate_overflow() {
        let mut config = WindowConfig::new();
        config.capacity_bits(4);
        let mut engine = HashDedup::new(&config, 100_000).expect("tables");
        let mut tally = Accumulator::default();
        assert!(engine.next_window().is_some());
        let result = (1..=20).try_for_each(|sum| engine.observe(sum, &mut tally));
        assert!(matches!(
            result,
            Err(Error::Capacity {
                table: TableKind::Candidate,
                capacity: 14
            })
        ));
    }
}
