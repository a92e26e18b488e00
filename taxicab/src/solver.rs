//! Drive a duplicate detection strategy over the pair space.

use crate::accum::Accumulator;
use crate::dedup::Dedup;
use crate::err::Error;
use crate::pairs::PairGenerator;

/// Generate every pair window by window, feeding the sums into `engine`.
///
/// Returns the accumulated count and checksum. Any error aborts the run;
/// there is nothing partial worth returning.
pub(crate) fn find_taxicab_numbers<D: Dedup>(engine: &mut D) -> Result<Accumulator, Error> {
    let mut tally = Accumulator::default();
    while let Some(window) = engine.next_window() {
        for row in PairGenerator::new(window.lower, window.upper) {
            engine.start_row(row.leading());
            for pair in row {
                engine.observe(pair.sum, &mut tally)?;
            }
        }
        engine.finish_window(&mut tally)?;
    }
    Ok(tally)
}
