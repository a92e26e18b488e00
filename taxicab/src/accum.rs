//! Running tally of taxicab numbers

use crate::cube::Sum;
use crate::err::{Error, OverflowError};

/// Count and checksum of the distinct taxicab numbers found so far
///
/// Engines report each distinct duplicated sum exactly once through
/// [`Accumulator::record_duplicate`]; nothing else touches the fields.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub(crate) struct Accumulator {
    /// Number of distinct taxicab numbers recorded
    count: u64,
    /// Sum of every recorded taxicab number
    checksum: Sum,
}

impl Accumulator {
    /// Record one newly found taxicab number.
    ///
    /// Fails without changing the tally if the checksum would overflow.
    #[inline(always)]
    pub(crate) fn record_duplicate(&mut self, sum: Sum) -> Result<(), Error> {
        self.checksum = self
            .checksum
            .checked_add(sum)
            .ok_or(OverflowError::Checksum { count: self.count })?;
        self.count += 1;
        Ok(())
    }

    /// Number of taxicab numbers recorded
    pub(crate) fn count(&self) -> u64 {
        self.count
    }

    /// Sum of the taxicab numbers recorded
    pub(crate) fn checksum(&self) -> Sum {
        self.checksum
    }
}
