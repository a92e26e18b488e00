//! Sort-merge duplicate detection
//!
//! All sums up to the bound go into one flat buffer, row after row. Each
//! row is already sorted, so rather than running a general comparison sort
//! we merge rows bottom-up: pass `p` merges neighbouring groups of
//! `2^(p-1)` rows into groups of `2^p`. The row index table is padded up to
//! a power of two with empty rows at the end of the buffer, which keeps the
//! merge schedule uniform. Empty rows in the middle keep their zero-length
//! slot for the same reason.
//!
//! Once sorted, equal sums sit next to each other and every group of two or
//! more equal neighbours is one taxicab number.

use crate::accum::Accumulator;
use crate::cube::{Root, Sum};
use crate::dedup::Dedup;
use crate::err::{Error, TableKind};
use crate::report::TableStats;
use crate::table::mem::try_alloc;
use crate::window::Window;
use log::debug;

/// Estimated buffer size for all pairs with sums up to `bound`
///
/// `bound^(2/3) / 2 + 100` stays above the true pair count
/// (about `0.4417 * bound^(2/3)` plus a lower order term) for every bound.
pub(crate) fn buffer_capacity(bound: Sum) -> usize {
    if bound <= 0 {
        return 0;
    }
    ((bound as f64).powf(2.0 / 3.0) / 2.0) as usize + 100
}

/// Single-pass duplicate detection by sorting every sum
#[derive(Debug)]
pub(crate) struct SortMergeDedup {
    /// Upper end of the run
    bound: Sum,
    /// Most sums the buffer may hold
    capacity: usize,
    /// Every generated sum, row after row
    sums: Vec<Sum>,
    /// Offset in `sums` where each row starts
    row_starts: Vec<usize>,
    /// Whether the single window was already handed out
    planned: bool,
    /// Number of sums generated, kept after the buffer is released
    generated: usize,
    /// Number of rows generated
    rows: usize,
}

impl SortMergeDedup {
    /// Allocate the sum buffer for a run up to `bound`.
    ///
    /// `capacity` overrides the size estimate from [`buffer_capacity`].
    /// Fails if the buffer can't be allocated.
    pub(crate) fn new(bound: Sum, capacity: Option<usize>) -> Result<Self, Error> {
        let capacity = capacity.unwrap_or_else(|| buffer_capacity(bound));
        Ok(Self {
            bound,
            capacity,
            sums: try_alloc(TableKind::SortBuffer, capacity)?,
            row_starts: Vec::new(),
            planned: false,
            generated: 0,
            rows: 0,
        })
    }
}

impl Dedup for SortMergeDedup {
    fn next_window(&mut self) -> Option<Window> {
        if self.planned || self.bound < 0 {
            return None;
        }
        self.planned = true;
        Some(Window {
            lower: 0,
            upper: self.bound,
        })
    }

    fn start_row(&mut self, _leading: Root) {
        self.row_starts.push(self.sums.len());
    }

    #[inline(always)]
    fn observe(&mut self, sum: Sum, _tally: &mut Accumulator) -> Result<(), Error> {
        if self.sums.len() >= self.capacity {
            return Err(Error::Capacity {
                table: TableKind::SortBuffer,
                capacity: self.capacity,
            });
        }
        self.sums.push(sum);
        Ok(())
    }

    fn finish_window(&mut self, tally: &mut Accumulator) -> Result<(), Error> {
        let mut sums = std::mem::take(&mut self.sums);
        let row_starts = std::mem::take(&mut self.row_starts);
        self.generated = sums.len();
        self.rows = row_starts.len();

        merge_runs(&mut sums, &row_starts)?;
        scan_duplicates(&sums, tally)?;
        debug!(
            "sorted {} sums from {} rows, {} taxicab numbers",
            self.generated,
            self.rows,
            tally.count()
        );
        Ok(())
    }

    fn stats(&self) -> TableStats {
        let sum_size = std::mem::size_of::<Sum>();
        TableStats {
            occupation: self.generated,
            size: self.capacity,
            // Buffer plus merge scratch, and the padded row index
            memory_bytes: 2 * self.capacity * sum_size
                + (self.rows.next_power_of_two() + 1) * std::mem::size_of::<usize>(),
            windows: usize::from(self.planned),
        }
    }
}

/// Sort `sums`, given the start offsets of its presorted runs.
///
/// The first run must start at 0. Runs may be empty. Fails only if the
/// merge scratch buffer can't be allocated.
pub(crate) fn merge_runs(sums: &mut Vec<Sum>, run_starts: &[usize]) -> Result<(), Error> {
    let runs = run_starts.len();
    if runs <= 1 {
        return Ok(());
    }
    debug_assert_eq!(run_starts[0], 0);

    // Boundaries of every run, padded with empty runs at the end so the
    // run count becomes a power of two.
    let padded = runs.next_power_of_two();
    let mut bounds = Vec::with_capacity(padded + 1);
    bounds.extend_from_slice(run_starts);
    bounds.resize(padded + 1, sums.len());

    let mut scratch = try_alloc(TableKind::SortBuffer, sums.len())?;
    scratch.resize(sums.len(), 0);
    let mut group = 1;
    while group < padded {
        for first in (0..padded).step_by(2 * group) {
            let lo = bounds[first];
            let mid = bounds[first + group];
            let hi = bounds[first + 2 * group];
            merge_into(&sums[lo..mid], &sums[mid..hi], &mut scratch[lo..hi]);
        }
        std::mem::swap(sums, &mut scratch);
        debug!("merge pass done, runs of {} rows", 2 * group);
        group *= 2;
    }
    Ok(())
}

/// Stable two-pointer merge of two sorted slices into `out`.
///
/// `out` must be exactly as long as both inputs together.
#[inline(always)]
fn merge_into(left: &[Sum], right: &[Sum], out: &mut [Sum]) {
    debug_assert_eq!(left.len() + right.len(), out.len());
    let (mut l, mut r) = (0, 0);
    for slot in out.iter_mut() {
        if r >= right.len() || (l < left.len() && left[l] <= right[r]) {
            *slot = left[l];
            l += 1;
        } else {
            *slot = right[r];
            r += 1;
        }
    }
}

/// Report each group of two or more equal neighbours once.
pub(crate) fn scan_duplicates(sorted: &[Sum], tally: &mut Accumulator) -> Result<(), Error> {
    sorted
        .chunk_by(|a, b| a == b)
        .filter(|group| group.len() >= 2)
        .try_for_each(|group| tally.record_duplicate(group[0]))
}
