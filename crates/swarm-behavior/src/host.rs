//! The behavior host: class → behavior table plus the two parallel dispatch
//! passes (tick and collision events).
//!
//! A panicking behavior never crosses the phase barrier.  The host catches
//! the unwind at the entity granularity, deactivates the offending row, and
//! keeps going — one broken script costs its own entity, not the frame.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU32, Ordering};

use swarm_core::{ClassId, EntityId};
use swarm_store::SpawnConfig;

use crate::events::{ContactPhase, EventTable};
use crate::rngs::EntityRngs;
use crate::{Behavior, TickContext};

/// Per-entity event bucket size.  Contacts beyond this per frame are dropped
/// (and counted) rather than reallocating mid-frame.
const EVENTS_PER_ENTITY: usize = 16;

/// Owns the behavior table, per-entity RNG streams, and event buckets.
pub struct BehaviorHost {
    /// `ClassId → behavior`, indexed by the class's numeric id.
    table: Vec<Option<Box<dyn Behavior>>>,
    rngs: EntityRngs,
    events: EventTable,
    faults: AtomicU32,
}

impl BehaviorHost {
    pub fn new(class_count: usize, entity_count: usize, seed: u64) -> Self {
        Self {
            table: (0..class_count).map(|_| None).collect(),
            rngs: EntityRngs::new(entity_count, seed),
            events: EventTable::new(entity_count, EVENTS_PER_ENTITY),
            faults: AtomicU32::new(0),
        }
    }

    /// Install `behavior` for `class`.  Construction-time only.
    pub fn set_behavior(&mut self, class: ClassId, behavior: Box<dyn Behavior>) {
        if let Some(slot) = self.table.get_mut(class.index()) {
            *slot = Some(behavior);
        }
    }

    #[inline]
    pub fn behavior_for(&self, class: u16) -> Option<&dyn Behavior> {
        self.table.get(class as usize).and_then(|slot| slot.as_deref())
    }

    pub fn events(&self) -> &EventTable {
        &self.events
    }

    /// Behavior panics isolated since the last call.
    pub fn take_faults(&self) -> u32 {
        self.faults.swap(0, Ordering::Relaxed)
    }

    // ── Parallel dispatch passes ──────────────────────────────────────────

    /// Run `tick` for every active entity of `range`.
    pub fn run_tick_range(&self, ctx: &TickContext<'_>, range: std::ops::Range<u32>) {
        for row in range {
            let i = row as usize;
            if !ctx.store.is_active(i) {
                continue;
            }
            let Some(behavior) = self.behavior_for(ctx.store.entity_type.get(i)) else {
                continue;
            };
            let entity = EntityId(row);
            let rng = self.rngs.rng_for(i);
            let outcome = catch_unwind(AssertUnwindSafe(|| behavior.tick(entity, ctx, rng)));
            if outcome.is_err() {
                self.isolate_fault(ctx, entity, "tick");
            }
        }
    }

    /// Deliver queued collision events to every active entity of `range`.
    pub fn run_collision_range(&self, ctx: &TickContext<'_>, range: std::ops::Range<u32>) {
        for row in range {
            let i = row as usize;
            if !ctx.store.is_active(i) || self.events.event_count(i) == 0 {
                continue;
            }
            let Some(behavior) = self.behavior_for(ctx.store.entity_type.get(i)) else {
                continue;
            };
            let entity = EntityId(row);
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                for (other, phase) in self.events.events(i) {
                    match phase {
                        ContactPhase::Enter => behavior.on_collision_enter(entity, other, ctx),
                        ContactPhase::Stay => behavior.on_collision_stay(entity, other, ctx),
                        ContactPhase::Exit => behavior.on_collision_exit(entity, other, ctx),
                    }
                }
            }));
            if outcome.is_err() {
                self.isolate_fault(ctx, entity, "collision callback");
            }
        }
    }

    fn isolate_fault(&self, ctx: &TickContext<'_>, entity: EntityId, site: &str) {
        ctx.store.transform.active.set(entity.index(), 0);
        self.faults.fetch_add(1, Ordering::Relaxed);
        tracing::error!(entity = entity.0, site, "behavior panicked; entity deactivated");
    }

    // ── Lifecycle hooks (orchestrator thread) ─────────────────────────────

    pub fn dispatch_spawn(&self, ctx: &TickContext<'_>, entity: EntityId, config: &SpawnConfig) {
        if let Some(behavior) = self.behavior_for(ctx.store.entity_type.get(entity.index())) {
            behavior.on_spawn(entity, ctx, config);
        }
    }

    pub fn dispatch_despawn(&self, ctx: &TickContext<'_>, entity: EntityId) {
        if let Some(behavior) = self.behavior_for(ctx.store.entity_type.get(entity.index())) {
            behavior.on_despawn(entity, ctx);
        }
    }
}
