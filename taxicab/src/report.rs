//! Results handed back to the caller

use crate::cube::Sum;
use crate::dedup::Strategy;
use std::fmt;

/// Outcome of one taxicab count
#[derive(Debug, Clone, Eq, PartialEq, serde::Serialize)]
#[non_exhaustive]
pub struct Report {
    /// Upper bound on the sums considered
    pub bound: Sum,
    /// Strategy that produced this report
    pub strategy: Strategy,
    /// Number of distinct sums reached by two or more cube pairs
    pub count: u64,
    /// Sum of those taxicab numbers
    pub checksum: Sum,
    /// Table usage of the run
    pub stats: TableStats,
}

/// Table usage figures, for sizing diagnostics
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, serde::Serialize)]
#[non_exhaustive]
pub struct TableStats {
    /// Sums held when duplicates were counted.
    ///
    /// For the hashed strategy, the peak number of distinct sums in the
    /// candidate table over all windows. For the sort-merge strategy, the
    /// number of generated sums.
    pub occupation: usize,
    /// Allocated slots of the main table
    pub size: usize,
    /// Lower bound on the memory held by the tables, in bytes
    pub memory_bytes: usize,
    /// Number of windows processed
    pub windows: usize,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} Ramanujan numbers up to {}, checksum={}",
            self.count, self.bound, self.checksum
        )?;
        writeln!(
            f,
            "occupation={}, size={}",
            self.stats.occupation, self.stats.size
        )?;
        write!(f, "Memory usage: >={}", self.stats.memory_bytes)
    }
}
