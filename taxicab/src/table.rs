//! Fixed-capacity hash tables keyed by cube sums
//!
//! This module implements [`hash::SumTable`], the open-addressed table
//! behind both the per-window candidate table and the cross-window result
//! table of the hashed strategy. Capacity is a power of two chosen up front
//! and never changes. Instead of growing, a table refuses new keys once it
//! reaches its load limit and reports [`crate::Error::Capacity`], so linear
//! probe sequences always find an empty slot.
//!
//! Storage lives in [`mem::SlotMemory`], kept struct-of-arrays style: one
//! array of keys and a parallel array of small sighting counters.

pub(crate) mod hash;
pub(crate) mod mem;
