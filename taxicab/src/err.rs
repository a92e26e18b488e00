//! Error types for the `taxicab` crate

use crate::cube::Sum;

/// Errors that can end a taxicab count
///
/// None of these are recoverable inside the engine. The computation is
/// deterministic, so retrying with the same bound and configuration would
/// fail the same way.
#[derive(Clone, Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A fixed-capacity table ran out of room.
    ///
    /// For the hashed strategy this means a window held more distinct sums
    /// than the candidate table's load limit allows, or the result table
    /// overflowed. For the sort-merge strategy the sort buffer's size
    /// estimate was smaller than the number of generated pairs.
    #[error("{table} table overflow: {capacity} slots can't hold the generated sums")]
    Capacity {
        /// Which table overflowed
        table: TableKind,
        /// Number of usable slots in that table
        capacity: usize,
    },

    /// Memory for a table could not be allocated.
    ///
    /// Tables are allocated up front, sized from the configuration or the
    /// bound, so this happens before any sums are generated.
    #[error("could not allocate {slots} slots for the {table} table")]
    Allocation {
        /// Which table failed to allocate
        table: TableKind,
        /// Number of slots requested
        slots: usize,
    },

    /// A bound or intermediate value left the supported integer range.
    #[error("arithmetic overflow: {0}")]
    Overflow(#[from] OverflowError),

    /// A [`crate::WindowConfig`] setting is out of its valid range.
    #[error("invalid window configuration: {0}")]
    Config(&'static str),
}

/// Details about an arithmetic overflow
#[derive(Clone, Debug, thiserror::Error)]
#[non_exhaustive]
pub enum OverflowError {
    /// The requested bound is larger than [`crate::MAX_BOUND`].
    #[error("bound {bound} exceeds the supported maximum {max}")]
    Bound {
        /// The bound that was requested
        bound: Sum,
        /// Largest supported bound
        max: Sum,
    },

    /// The running checksum no longer fits in a [`Sum`].
    #[error("checksum overflowed after {count} taxicab numbers")]
    Checksum {
        /// Number of taxicab numbers counted before the overflow
        count: u64,
    },
}

/// Names the table that overflowed in an [`Error::Capacity`]
#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
#[non_exhaustive]
pub enum TableKind {
    /// Per-window candidate table of the hashed strategy
    Candidate,
    /// Cross-window membership table of counted sums
    Result,
    /// Flat sum buffer of the sort-merge strategy
    SortBuffer,
}
