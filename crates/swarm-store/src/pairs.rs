//! The per-frame collision pair buffer.
//!
//! Workers append overlapping pairs concurrently during the spatial query
//! phase: reserve a slot with a fetch-add on the tail, then store the packed
//! pair.  The buffer is fixed capacity; overruns are counted, never resized —
//! there is no heap traffic on this path.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::column::Column;

/// Pack a pair canonically: smaller index in the high half.
#[inline(always)]
pub fn pack_pair(a: u32, b: u32) -> u64 {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    ((lo as u64) << 32) | hi as u64
}

/// Inverse of [`pack_pair`]: returns `(min, max)`.
#[inline(always)]
pub fn unpack_pair(key: u64) -> (u32, u32) {
    ((key >> 32) as u32, key as u32)
}

/// Fixed-capacity append-only pair set, reset every frame.
pub struct PairBuffer {
    packed: Column<u64>,
    tail: AtomicU32,
    capacity: u32,
    dropped: AtomicU32,
}

impl PairBuffer {
    pub fn new(capacity: u32) -> Self {
        Self {
            packed: Column::new(capacity as usize),
            tail: AtomicU32::new(0),
            capacity,
            dropped: AtomicU32::new(0),
        }
    }

    /// Empty the buffer.  Orchestrator-only, at frame start.
    pub fn reset(&self) {
        self.tail.store(0, Ordering::Relaxed);
        self.dropped.store(0, Ordering::Relaxed);
    }

    /// Append pair `(a, b)`.  Thread-safe; order of appends is unspecified.
    pub fn push(&self, a: u32, b: u32) {
        let slot = self.tail.fetch_add(1, Ordering::Relaxed);
        if slot < self.capacity {
            self.packed.set(slot as usize, pack_pair(a, b));
        } else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Pairs recorded this frame (appends past capacity were dropped).
    pub fn len(&self) -> usize {
        self.tail.load(Ordering::Acquire).min(self.capacity) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pairs that did not fit this frame.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Iterate the recorded `(min, max)` pairs.  Call only between the
    /// spatial phase's barrier and the next reset.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.len()).map(|slot| unpack_pair(self.packed.get(slot)))
    }

    /// Iterate the raw packed keys (for set diffing).
    pub fn keys(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.len()).map(|slot| self.packed.get(slot))
    }

    pub(crate) fn bytes(&self) -> usize {
        self.capacity as usize * 8
    }
}
