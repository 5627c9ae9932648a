//! Collision event production: pair-set diffing and per-entity delivery
//! buckets.
//!
//! The spatial phase leaves the frame's overlap set in the store's pair
//! buffer.  Between the behavior and collision phases the orchestrator diffs
//! it against the previous frame's set:
//!
//! - in current, not in previous → `Enter`
//! - in both                     → `Stay`
//! - in previous, not in current → `Exit`
//!
//! Each event is bucketed under *both* endpoints' rows in the
//! [`EventTable`]; the collision phase then walks each entity's bucket inside
//! its owning job, so callbacks for one entity are always single-threaded.

use std::sync::atomic::{AtomicU32, Ordering};

use rustc_hash::FxHashSet;

use swarm_core::EntityId;
use swarm_store::{unpack_pair, Column, PairBuffer};

/// Lifecycle stage of a contact, as delivered to behaviors.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum ContactPhase {
    Enter = 0,
    Stay = 1,
    Exit = 2,
}

// ── EventTable ────────────────────────────────────────────────────────────────

/// Per-entity collision event buckets, stride `1 + capacity` like the
/// neighbor table.
///
/// Written single-threaded by the diff (between phases), read by the
/// collision phase.  Overflowing a bucket drops the event and counts it.
pub struct EventTable {
    count: Column<u8>,
    other: Column<u32>,
    kind: Column<u8>,
    capacity: usize,
    dropped: AtomicU32,
}

impl EventTable {
    pub fn new(rows: usize, capacity: usize) -> Self {
        Self {
            count: Column::new(rows),
            other: Column::new(rows * capacity),
            kind: Column::new(rows * capacity),
            capacity,
            dropped: AtomicU32::new(0),
        }
    }

    /// Events one row's bucket can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear_row(&self, row: usize) {
        self.count.set(row, 0);
    }

    /// Append an event to `row`'s bucket.
    pub fn push(&self, row: usize, other: u32, phase: ContactPhase) {
        let n = self.count.get(row) as usize;
        if n >= self.capacity {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.other.set(row * self.capacity + n, other);
        self.kind.set(row * self.capacity + n, phase as u8);
        self.count.set(row, (n + 1) as u8);
    }

    pub fn event_count(&self, row: usize) -> usize {
        self.count.get(row) as usize
    }

    /// Iterate `row`'s events in insertion order.
    pub fn events(&self, row: usize) -> impl Iterator<Item = (EntityId, ContactPhase)> + '_ {
        let n = self.event_count(row).min(self.capacity);
        (0..n).map(move |slot| {
            let other = EntityId(self.other.get(row * self.capacity + slot));
            let phase = match self.kind.get(row * self.capacity + slot) {
                0 => ContactPhase::Enter,
                1 => ContactPhase::Stay,
                _ => ContactPhase::Exit,
            };
            (other, phase)
        })
    }

    /// Events dropped to bucket overflow since the last call.
    pub fn take_dropped(&self) -> u32 {
        self.dropped.swap(0, Ordering::Relaxed)
    }
}

// ── PairDiff ──────────────────────────────────────────────────────────────────

/// Frame-to-frame overlap set comparison.
///
/// Owns the previous frame's set and the scratch set for the current frame;
/// both allocations are reused so steady state is allocation-free once the
/// sets have grown to their working size.
#[derive(Default)]
pub struct PairDiff {
    previous: FxHashSet<u64>,
    current: FxHashSet<u64>,
    /// Rows whose buckets were written last update, for cheap clearing.
    touched: Vec<u32>,
}

impl PairDiff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff this frame's `pairs` against the previous frame's set and fill
    /// `events`.  Orchestrator-only, between the behavior and collision
    /// phases.
    pub fn update(&mut self, pairs: &PairBuffer, events: &EventTable) {
        for &row in &self.touched {
            events.clear_row(row as usize);
        }
        self.touched.clear();

        self.current.clear();
        self.current.extend(pairs.keys());

        let touched = &mut self.touched;
        for &key in &self.current {
            let (a, b) = unpack_pair(key);
            let phase = if self.previous.contains(&key) {
                ContactPhase::Stay
            } else {
                ContactPhase::Enter
            };
            deliver(events, touched, a, b, phase);
        }
        for &key in &self.previous {
            if !self.current.contains(&key) {
                let (a, b) = unpack_pair(key);
                deliver(events, touched, a, b, ContactPhase::Exit);
            }
        }

        std::mem::swap(&mut self.previous, &mut self.current);
    }

    /// Number of pairs overlapping as of the last update.
    pub fn overlap_count(&self) -> usize {
        self.previous.len()
    }
}

/// Bucket one event under both endpoints and remember the rows for clearing.
fn deliver(events: &EventTable, touched: &mut Vec<u32>, a: u32, b: u32, phase: ContactPhase) {
    events.push(a as usize, b, phase);
    events.push(b as usize, a, phase);
    touched.push(a);
    touched.push(b);
}
