//! Open-addressed hash table layer
//!
//! Builds a set-with-counters on top of [`crate::table::mem::SlotMemory`].
//! Keys are mapped to a home slot with Fibonacci hashing: multiply by a
//! 64-bit odd constant and keep the top `bits` bits. Cube sums have strong
//! patterns in their low bits (cubes modulo 8 or 9 take few values), so the
//! high product bits spread them far better than a plain mask would.
//! Collisions are resolved by linear probing, stepping one slot at a time
//! with wraparound through the power-of-two mask.
//!
//! There is no deletion. A table is emptied as a whole with
//! [`SumTable::clear`] or rebuilt with [`SumTable::retain`].

use crate::err::{Error, TableKind};
use crate::table::mem::{Count, SlotMemory};
use num_traits::{AsPrimitive, Zero};

/// Multiplier for Fibonacci hashing, `2^64 / φ` rounded to odd
const GOLDEN: u64 = 0x9E37_79B9_7F4A_7C15;

/// Types we can use as table keys
///
/// Zero is reserved to mark vacant slots.
pub(crate) trait Key: Copy + Eq + Zero + AsPrimitive<u64> {}

impl<T: Copy + Eq + Zero + AsPrimitive<u64>> Key for T {}

/// How many times a key has been seen, as reported by [`SumTable::observe`]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum Sighting {
    /// The key was not in the table and has just been inserted.
    First,
    /// The key had been seen exactly once before.
    Second,
    /// The key had already been seen two or more times.
    Repeat,
}

/// Result of walking a probe sequence
enum Probe {
    /// The key lives in this slot
    Occupied(usize),
    /// The key is absent, and this is the vacant slot that ended the probe
    Vacant(usize),
}

/// Fixed-capacity open-addressed table of keys with sighting counters
#[derive(Debug, Clone)]
pub(crate) struct SumTable<K: Key> {
    /// Key and counter storage
    mem: SlotMemory<K>,
    /// Slot count minus one
    mask: usize,
    /// Right shift that leaves `bits` bits of a hashed key
    shift: u32,
    /// Number of occupied slots
    occupied: usize,
    /// Largest number of occupied slots we allow
    limit: usize,
    /// Which table this is, for error reports
    kind: TableKind,
}

impl<K: Key> SumTable<K> {
    /// Allocate an empty table with `2^bits` slots.
    ///
    /// Inserts start failing once `capacity * max_load` slots are occupied.
    /// The limit is always kept below the slot count, so a probe sequence
    /// is guaranteed to reach a vacant slot. Fails if the memory can't be
    /// allocated.
    pub(crate) fn new(kind: TableKind, bits: u32, max_load: f64) -> Result<Self, Error> {
        assert!((1..64).contains(&bits));
        let mem = SlotMemory::new(kind, bits)?;
        let capacity = mem.len();
        let limit = ((capacity as f64 * max_load) as usize).clamp(1, capacity - 1);
        Ok(Self {
            mem,
            mask: capacity - 1,
            shift: 64 - bits,
            occupied: 0,
            limit,
            kind,
        })
    }

    /// Total number of slots
    pub(crate) fn capacity(&self) -> usize {
        self.mem.len()
    }

    /// Number of distinct keys currently stored
    pub(crate) fn len(&self) -> usize {
        self.occupied
    }

    /// Allocated size in bytes
    pub(crate) fn size_bytes(&self) -> usize {
        self.mem.size_bytes()
    }

    /// Home slot of a key
    #[inline(always)]
    fn home(&self, key: K) -> usize {
        (key.as_().wrapping_mul(GOLDEN) >> self.shift) as usize
    }

    /// Walk the probe sequence for `key`.
    #[inline(always)]
    fn probe(&self, key: K) -> Probe {
        let mut slot = self.home(key);
        loop {
            let stored = self.mem.key(slot);
            if stored == key {
                return Probe::Occupied(slot);
            }
            if stored.is_zero() {
                return Probe::Vacant(slot);
            }
            slot = (slot + 1) & self.mask;
        }
    }

    /// Occupy a vacant slot, checking the load limit first.
    #[inline(always)]
    fn occupy(&mut self, slot: usize, key: K, count: Count) -> Result<(), Error> {
        if self.occupied >= self.limit {
            return Err(Error::Capacity {
                table: self.kind,
                capacity: self.limit,
            });
        }
        self.mem.write(slot, key, count);
        self.occupied += 1;
        Ok(())
    }

    /// Record one sighting of `key` and report how often it was seen.
    ///
    /// Inserts the key on its first sighting. Fails only when a new key
    /// would push the table past its load limit.
    #[inline(always)]
    pub(crate) fn observe(&mut self, key: K) -> Result<Sighting, Error> {
        debug_assert!(!key.is_zero());
        match self.probe(key) {
            Probe::Occupied(slot) => match self.mem.bump(slot) {
                2 => Ok(Sighting::Second),
                _ => Ok(Sighting::Repeat),
            },
            Probe::Vacant(slot) => {
                self.occupy(slot, key, 1)?;
                Ok(Sighting::First)
            }
        }
    }

    /// Insert `key` if absent. Returns `true` if it was newly inserted.
    pub(crate) fn insert(&mut self, key: K) -> Result<bool, Error> {
        Ok(self.observe(key)? == Sighting::First)
    }

    /// Check whether `key` is stored.
    #[cfg(test)]
    pub(crate) fn contains(&self, key: K) -> bool {
        !key.is_zero() && matches!(self.probe(key), Probe::Occupied(_))
    }

    /// Empty the table, keeping its allocation.
    pub(crate) fn clear(&mut self) {
        self.mem.clear();
        self.occupied = 0;
    }

    /// Keep only the keys matching a predicate.
    ///
    /// Without deletion support this rebuilds the table from the survivors,
    /// which keeps every probe sequence intact.
    pub(crate) fn retain<F: FnMut(K) -> bool>(&mut self, mut keep: F) {
        let survivors: Vec<(K, Count)> =
            self.mem.occupied().filter(|&(key, _)| keep(key)).collect();
        self.clear();
        for (key, count) in survivors {
            if let Probe::Vacant(slot) = self.probe(key) {
                self.mem.write(slot, key, count);
                self.occupied += 1;
            }
        }
    }
}
