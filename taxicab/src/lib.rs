#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg))]
#![doc = include_str!("../README.md")]
// @@ begin lint list maintained by maint/add_warning @@
#![allow(renamed_and_removed_lints)]
#![allow(unknown_lints)]
#![warn(missing_docs)]
#![warn(noop_method_call)]
#![warn(unreachable_pub)]
#![warn(clippy::all)]
#![deny(clippy::await_holding_lock)]
#![deny(clippy::cargo_common_metadata)]
#![deny(clippy::cast_lossless)]
#![deny(clippy::checked_conversions)]
#![warn(clippy::cognitive_complexity)]
#![deny(clippy::debug_assert_with_mut_call)]
#![deny(clippy::exhaustive_enums)]
#![deny(clippy::exhaustive_structs)]
#![deny(clippy::expl_impl_clone_on_copy)]
#![deny(clippy::fallible_impl_from)]
#![deny(clippy::implicit_clone)]
#![deny(clippy::large_stack_arrays)]
#![warn(clippy::manual_ok_or)]
#![deny(clippy::missing_docs_in_private_items)]
#![warn(clippy::needless_borrow)]
#![warn(clippy::needless_pass_by_value)]
#![warn(clippy::option_option)]
#![deny(clippy::print_stderr)]
#![deny(clippy::print_stdout)]
#![warn(clippy::rc_buffer)]
#![deny(clippy::ref_option_ref)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(clippy::trait_duplication_in_bounds)]
#![deny(clippy::unchecked_duration_subtraction)]
#![deny(clippy::unnecessary_wraps)]
#![warn(clippy::unseparated_literal_suffix)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::mod_module_files)]
#![allow(clippy::let_unit_value)] // This can reasonably be done for explicitness
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::needless_raw_string_hashes)] // complained-about code is fine, often best
#![allow(clippy::needless_lifetimes)]
//! <!-- @@ end lint list maintained by maint/add_warning @@ -->

mod accum;
mod cube;
mod dedup;
mod err;
mod pairs;
mod report;
mod solver;
mod table;
mod window;

use crate::dedup::{hashed::HashDedup, sorted::SortMergeDedup, Dedup};

pub use cube::{Root, Sum, MAX_BOUND};
pub use dedup::Strategy;
pub use err::{Error, OverflowError, TableKind};
pub use pairs::{CubePair, PairGenerator, Row};
pub use report::{Report, TableStats};
pub use window::{WindowConfig, DEFAULT_CAPACITY_BITS};

/// Builder for taxicab counts with custom settings
#[derive(Debug, Clone, PartialEq)]
pub struct TaxicabBuilder {
    /// Duplicate detection strategy
    strategy: Strategy,
    /// Table and window settings for [`Strategy::Hashed`]
    window: WindowConfig,
    /// Sort buffer size override for [`Strategy::SortMerge`]
    sort_capacity: Option<usize>,
}

impl TaxicabBuilder {
    /// Create a new [`TaxicabBuilder`] with default settings.
    ///
    /// Immediately calling [`Self::count()`] would be equivalent to using
    /// [`count()`].
    pub fn new() -> Self {
        Self {
            strategy: Strategy::default(),
            window: WindowConfig::default(),
            sort_capacity: None,
        }
    }

    /// Select a duplicate detection [`Strategy`].
    pub fn strategy(&mut self, strategy: Strategy) -> &mut Self {
        self.strategy = strategy;
        self
    }

    /// Replace the [`WindowConfig`] used by [`Strategy::Hashed`].
    pub fn window(&mut self, window: WindowConfig) -> &mut Self {
        self.window = window;
        self
    }

    /// Size the [`Strategy::SortMerge`] buffer explicitly, in sums.
    ///
    /// By default the size is estimated from the bound. A buffer smaller
    /// than the number of pairs makes the count fail with
    /// [`Error::Capacity`], and one too large to allocate with
    /// [`Error::Allocation`].
    pub fn sort_capacity(&mut self, capacity: usize) -> &mut Self {
        self.sort_capacity = Some(capacity);
        self
    }

    /// Count the taxicab numbers up to `bound` with the selected options.
    ///
    /// Fails if the bound is above [`MAX_BOUND`], if the configuration is
    /// invalid, if the tables can't be allocated or turn out too small, or
    /// if the checksum overflows.
    pub fn count(&self, bound: Sum) -> Result<Report, Error> {
        cube::check_bound(bound)?;
        match self.strategy {
            Strategy::Hashed => {
                self.window.validate()?;
                self.run(bound, HashDedup::new(&self.window, bound)?)
            }
            Strategy::SortMerge => self.run(bound, SortMergeDedup::new(bound, self.sort_capacity)?),
        }
    }

    /// Run one engine to completion and build its [`Report`].
    fn run<D: Dedup>(&self, bound: Sum, mut engine: D) -> Result<Report, Error> {
        let tally = solver::find_taxicab_numbers(&mut engine)?;
        Ok(Report {
            bound,
            strategy: self.strategy,
            count: tally.count(),
            checksum: tally.checksum(),
            stats: engine.stats(),
        })
    }
}

impl Default for TaxicabBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Count the taxicab numbers up to `bound`, using default
/// [`TaxicabBuilder`] options.
///
/// Memory for the tables is allocated for this call and released when it
/// returns.
pub fn count(bound: Sum) -> Result<Report, Error> {
    TaxicabBuilder::new().count(bound)
}
