//! Duplicate detection strategies
//!
//! Both strategies consume the same stream of cube sums from
//! [`crate::pairs::PairGenerator`] and report each distinct duplicated sum
//! to the [`Accumulator`] exactly once. They differ in how they trade
//! memory for work:
//!
//! - [`hashed::HashDedup`] keeps a fixed-size open-addressed table and walks
//!   the sum range in windows, so memory does not depend on the bound.
//! - [`sorted::SortMergeDedup`] stores every sum in one buffer, merges the
//!   presorted per-row runs, and scans for equal neighbours.
//!
//! The [`Dedup`] trait is the seam the solver drives them through.

pub(crate) mod hashed;
pub(crate) mod sorted;

use crate::accum::Accumulator;
use crate::cube::{Root, Sum};
use crate::err::Error;
use crate::report::TableStats;
use crate::window::Window;

/// Selects the duplicate detection strategy
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
#[non_exhaustive]
pub enum Strategy {
    /// Windowed open-addressed hash table with constant memory.
    /// (This is the default)
    #[default]
    Hashed,
    /// One flat buffer of every sum, sorted by a bottom-up merge of the
    /// presorted rows.
    SortMerge,
}

/// Capability shared by the duplicate detection strategies
///
/// The solver asks for windows until there are none left. For each window
/// it announces every row of pairs, feeds every sum in that row, then closes
/// the window.
pub(crate) trait Dedup {
    /// Plan the next range of sums to generate, or `None` when done.
    fn next_window(&mut self) -> Option<Window>;

    /// A new row of pairs with leading root `leading` begins.
    ///
    /// Called for every row, including rows that produce no sums.
    fn start_row(&mut self, _leading: Root) {}

    /// Take one generated sum.
    ///
    /// Strategies that detect duplicates as they go report them to `tally`
    /// right away.
    fn observe(&mut self, sum: Sum, tally: &mut Accumulator) -> Result<(), Error>;

    /// All sums of the current window have been observed.
    fn finish_window(&mut self, tally: &mut Accumulator) -> Result<(), Error>;

    /// Table usage figures for the finished run.
    fn stats(&self) -> TableStats;
}
