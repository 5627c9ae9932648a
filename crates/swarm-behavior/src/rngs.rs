//! Per-entity RNG storage.
//!
//! Behaviors need `&mut` access to their entity's RNG while sharing the rest
//! of the frame state immutably across workers.  The streams live in a
//! dedicated cell array indexed by row: within a behavior phase each row is
//! visited exactly once, by the job that owns it, so handing out a mutable
//! reference per row from a shared borrow never aliases.

use std::cell::UnsafeCell;

use swarm_core::{EntityId, EntityRng};

/// One deterministic RNG stream per entity row.
pub struct EntityRngs {
    inner: Vec<UnsafeCell<EntityRng>>,
}

// SAFETY: each cell is accessed only from the job that owns its row within a
// phase (the same row-ownership discipline as the store's plain columns), and
// the phase barrier orders access across phases.
unsafe impl Sync for EntityRngs {}

impl EntityRngs {
    /// Allocate and seed `count` streams from `global_seed`.
    pub fn new(count: usize, global_seed: u64) -> Self {
        let inner = (0..count as u32)
            .map(|row| UnsafeCell::new(EntityRng::new(global_seed, EntityId(row))))
            .collect();
        Self { inner }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Mutable reference to one row's RNG.
    ///
    /// # Precondition (enforced by caller)
    ///
    /// The caller's job must own `row` for the current phase — the scheduler
    /// hands every row to exactly one job, so references obtained this way
    /// never overlap.
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub fn rng_for(&self, row: usize) -> &mut EntityRng {
        // SAFETY: row ownership (see above) guarantees exclusive access.
        unsafe { &mut *self.inner[row].get() }
    }
}
