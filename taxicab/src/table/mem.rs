//! Backing memory for the hash tables
//!
//! A [`SlotMemory`] owns two vectors of equal, power-of-two length: keys
//! and sighting counters. Both are allocated once, zeroed, never resized,
//! and reused across windows by [`SlotMemory::clear`]. A zero key marks an
//! empty slot, so zero itself can never be stored; cube sums with `i < j`
//! start at 1.
//!
//! Every table allocation in the crate goes through [`try_alloc`], so a
//! size the system can't provide ends the count with an error instead of
//! aborting the process.

use crate::err::{Error, TableKind};
use num_traits::Zero;

/// Allocate an empty vector with room for exactly `len` elements.
///
/// Fails with [`Error::Allocation`] if the allocator refuses, or if the
/// size in bytes doesn't fit in an `isize`.
pub(crate) fn try_alloc<T>(table: TableKind, len: usize) -> Result<Vec<T>, Error> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| Error::Allocation { table, slots: len })?;
    Ok(buf)
}

/// Allocate a vector of `len` copies of `value`.
fn try_filled<T: Copy>(table: TableKind, len: usize, value: T) -> Result<Vec<T>, Error> {
    let mut buf = try_alloc(table, len)?;
    buf.resize(len, value);
    Ok(buf)
}

/// Counter type for the number of sightings of one key
///
/// Saturates instead of wrapping. Callers only ever need to tell one, two
/// and "more than two" sightings apart.
pub(crate) type Count = u8;

/// Parallel key and counter arrays for one table
#[derive(Debug, Clone)]
pub(crate) struct SlotMemory<K: Copy + Zero> {
    /// Stored keys, with `K::zero()` meaning the slot is vacant
    keys: Vec<K>,
    /// Sighting counters, meaningful only for occupied slots
    counts: Vec<Count>,
}

impl<K: Copy + Zero> SlotMemory<K> {
    /// Allocate zeroed memory for `2^bits` slots of the given table.
    pub(crate) fn new(table: TableKind, bits: u32) -> Result<Self, Error> {
        let len = 1_usize
            .checked_shl(bits)
            .ok_or(Error::Allocation {
                table,
                slots: usize::MAX,
            })?;
        Ok(Self {
            keys: try_filled(table, len, K::zero())?,
            counts: try_filled(table, len, 0)?,
        })
    }

    /// Number of slots
    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    /// Size of one slot, in bytes
    pub(crate) const SLOT_SIZE: usize = std::mem::size_of::<K>() + std::mem::size_of::<Count>();

    /// Size of the whole allocation, in bytes
    pub(crate) fn size_bytes(&self) -> usize {
        self.len() * Self::SLOT_SIZE
    }

    /// Key stored in a slot, or zero if vacant.
    ///
    /// Panics if the slot index is out of range.
    #[inline(always)]
    pub(crate) fn key(&self, slot: usize) -> K {
        self.keys[slot]
    }

    /// Sighting count of a slot.
    #[cfg(test)]
    pub(crate) fn count(&self, slot: usize) -> Count {
        self.counts[slot]
    }

    /// Occupy a slot with a key and an initial count.
    #[inline(always)]
    pub(crate) fn write(&mut self, slot: usize, key: K, count: Count) {
        self.keys[slot] = key;
        self.counts[slot] = count;
    }

    /// Add one sighting to a slot and return the new count.
    #[inline(always)]
    pub(crate) fn bump(&mut self, slot: usize) -> Count {
        let count = self.counts[slot].saturating_add(1);
        self.counts[slot] = count;
        count
    }

    /// Mark every slot vacant.
    pub(crate) fn clear(&mut self) {
        self.keys.fill(K::zero());
        self.counts.fill(0);
    }

    /// Iterate over the occupied slots as `(key, count)`.
    pub(crate) fn occupied(&self) -> impl Iterator<Item = (K, Count)> + '_ {
        self.keys
            .iter()
            .zip(self.counts.iter())
            .filter(|(key, _)| !key.is_zero())
            .map(|(&key, &count)| (key, count))
    }
}
