//! Read-only frame state passed to every behavior callback.

use swarm_core::{EntityId, InputSnapshot};
use swarm_store::ComponentStore;

/// A read-only view of the frame passed to every [`Behavior`] callback.
///
/// Built once per claimed job range and shared by every entity in it.  No
/// heap allocation happens per entity; the context is a bundle of borrows.
///
/// # What a behavior may touch
///
/// Reading any entity's columns is safe: physics runs in a later phase, so
/// nothing a behavior reads is concurrently mutated.  Writing is restricted
/// to the ticked entity's own row (its acceleration, its user components,
/// its sprite fields) — the neighbor and distance stripes are the spatial
/// phase's output and must not be written here.
///
/// [`Behavior`]: crate::Behavior
pub struct TickContext<'a> {
    /// Current frame number.
    pub frame: u64,

    /// Normalized frame delta (60 Hz ≡ 1.0).
    pub dt_ratio: f32,

    /// Every entity's columns, including this frame's neighbor lists.
    pub store: &'a ComponentStore,

    /// The frame's input snapshot (stable for the whole frame).
    pub input: &'a InputSnapshot,
}

impl<'a> TickContext<'a> {
    #[inline]
    pub fn new(
        frame: u64,
        dt_ratio: f32,
        store: &'a ComponentStore,
        input: &'a InputSnapshot,
    ) -> Self {
        Self { frame, dt_ratio, store, input }
    }

    /// This frame's neighbors of `entity`, ascending by row.
    #[inline]
    pub fn neighbors(&self, entity: EntityId) -> impl Iterator<Item = (EntityId, f32)> + 'a {
        self.store.neighbors.neighbors(entity.index())
    }
}
