//! Unit tests for swarm-behavior.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use swarm_core::{ClassId, EntityId, EntityRng, InputSnapshot};
use swarm_store::{ComponentStore, PairBuffer};

use crate::events::{ContactPhase, EventTable, PairDiff};
use crate::host::BehaviorHost;
use crate::{Behavior, TickContext};

fn store_with(n: usize, class: u16) -> ComponentStore {
    let store = ComponentStore::new(n, 8, 64);
    for row in 0..n {
        store.transform.active.set(row, 1);
        store.entity_type.set(row, class);
    }
    store
}

/// Counts ticks and records the callback mix it saw.
struct Recorder {
    ticks: AtomicU32,
    enters: AtomicU32,
    stays: AtomicU32,
    exits: AtomicU32,
}

impl Recorder {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            ticks: AtomicU32::new(0),
            enters: AtomicU32::new(0),
            stays: AtomicU32::new(0),
            exits: AtomicU32::new(0),
        })
    }
}

impl Behavior for Arc<Recorder> {
    fn tick(&self, _entity: EntityId, _ctx: &TickContext<'_>, _rng: &mut EntityRng) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    fn on_collision_enter(&self, _e: EntityId, _o: EntityId, _ctx: &TickContext<'_>) {
        self.enters.fetch_add(1, Ordering::Relaxed);
    }

    fn on_collision_stay(&self, _e: EntityId, _o: EntityId, _ctx: &TickContext<'_>) {
        self.stays.fetch_add(1, Ordering::Relaxed);
    }

    fn on_collision_exit(&self, _e: EntityId, _o: EntityId, _ctx: &TickContext<'_>) {
        self.exits.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod dispatch {
    use super::*;

    #[test]
    fn ticks_only_active_rows_of_known_classes() {
        let store = store_with(4, 1);
        store.transform.active.set(2, 0);
        store.entity_type.set(3, 9); // class with no behavior

        let recorder = Recorder::new();
        let mut host = BehaviorHost::new(2, 4, 0);
        host.set_behavior(ClassId(1), Box::new(recorder.clone()));

        let input = InputSnapshot::default();
        let ctx = TickContext::new(0, 1.0, &store, &input);
        host.run_tick_range(&ctx, 0..4);

        assert_eq!(recorder.ticks.load(Ordering::Relaxed), 2); // rows 0 and 1
    }

    #[test]
    fn behavior_writes_own_acceleration() {
        struct Thruster;
        impl Behavior for Thruster {
            fn tick(&self, entity: EntityId, ctx: &TickContext<'_>, _rng: &mut EntityRng) {
                ctx.store.body.ax.set(entity.index(), 0.25);
            }
        }

        let store = store_with(2, 0);
        let mut host = BehaviorHost::new(1, 2, 0);
        host.set_behavior(ClassId(0), Box::new(Thruster));
        let input = InputSnapshot::default();
        let ctx = TickContext::new(0, 1.0, &store, &input);
        host.run_tick_range(&ctx, 0..2);
        assert_eq!(store.body.ax.get(0), 0.25);
        assert_eq!(store.body.ax.get(1), 0.25);
    }

    #[test]
    fn entity_rng_streams_are_deterministic() {
        struct Roller;
        impl Behavior for Roller {
            fn tick(&self, entity: EntityId, ctx: &TickContext<'_>, rng: &mut EntityRng) {
                ctx.store.body.ax.set(entity.index(), rng.gen_range(-1.0..1.0));
            }
        }

        let run = || {
            let store = store_with(3, 0);
            let mut host = BehaviorHost::new(1, 3, 42);
            host.set_behavior(ClassId(0), Box::new(Roller));
            let input = InputSnapshot::default();
            let ctx = TickContext::new(0, 1.0, &store, &input);
            host.run_tick_range(&ctx, 0..3);
            store.body.ax.snapshot()
        };
        assert_eq!(run(), run());
    }
}

#[cfg(test)]
mod fault_isolation {
    use super::*;

    struct Bomb;
    impl Behavior for Bomb {
        fn tick(&self, entity: EntityId, _ctx: &TickContext<'_>, _rng: &mut EntityRng) {
            if entity.index() == 1 {
                panic!("scripted failure");
            }
        }
    }

    #[test]
    fn panicking_tick_deactivates_only_its_entity() {
        let store = store_with(3, 0);
        let mut host = BehaviorHost::new(1, 3, 0);
        host.set_behavior(ClassId(0), Box::new(Bomb));
        let input = InputSnapshot::default();
        let ctx = TickContext::new(0, 1.0, &store, &input);

        host.run_tick_range(&ctx, 0..3);

        assert!(store.is_active(0));
        assert!(!store.is_active(1), "faulting entity must be deactivated");
        assert!(store.is_active(2), "later rows still tick");
        assert_eq!(host.take_faults(), 1);
        assert_eq!(host.take_faults(), 0, "take drains the counter");
    }
}

#[cfg(test)]
mod pair_diff {
    use super::*;

    fn diff_frame(diff: &mut PairDiff, events: &EventTable, pairs: &[(u32, u32)]) {
        let buffer = PairBuffer::new(64);
        for &(a, b) in pairs {
            buffer.push(a, b);
        }
        diff.update(&buffer, events);
    }

    #[test]
    fn enter_stay_exit_lifecycle() {
        let events = EventTable::new(8, 4);
        let mut diff = PairDiff::new();

        // Frame 1: pair appears.
        diff_frame(&mut diff, &events, &[(1, 2)]);
        assert_eq!(collect(&events, 1), vec![(2, ContactPhase::Enter)]);
        assert_eq!(collect(&events, 2), vec![(1, ContactPhase::Enter)]);

        // Frame 2: still overlapping.
        diff_frame(&mut diff, &events, &[(1, 2)]);
        assert_eq!(collect(&events, 1), vec![(2, ContactPhase::Stay)]);

        // Frame 3: separated.
        diff_frame(&mut diff, &events, &[]);
        assert_eq!(collect(&events, 1), vec![(2, ContactPhase::Exit)]);
        assert_eq!(collect(&events, 2), vec![(1, ContactPhase::Exit)]);

        // Frame 4: nothing left.
        diff_frame(&mut diff, &events, &[]);
        assert_eq!(events.event_count(1), 0);
        assert_eq!(events.event_count(2), 0);
    }

    fn collect(events: &EventTable, row: usize) -> Vec<(u32, ContactPhase)> {
        events.events(row).map(|(id, phase)| (id.0, phase)).collect()
    }

    #[test]
    fn bucket_overflow_drops_and_counts() {
        let events = EventTable::new(4, 2);
        let mut diff = PairDiff::new();
        // Row 0 contacts three others; bucket holds two.
        diff_frame(&mut diff, &events, &[(0, 1), (0, 2), (0, 3)]);
        assert_eq!(events.event_count(0), 2);
        assert_eq!(events.take_dropped(), 1);
    }

    #[test]
    fn overlap_count_tracks_current_set() {
        let events = EventTable::new(8, 4);
        let mut diff = PairDiff::new();
        diff_frame(&mut diff, &events, &[(1, 2), (3, 4)]);
        assert_eq!(diff.overlap_count(), 2);
        diff_frame(&mut diff, &events, &[(3, 4)]);
        assert_eq!(diff.overlap_count(), 1);
    }

    #[test]
    fn callbacks_reach_behaviors() {
        let store = store_with(4, 0);
        let recorder = Recorder::new();
        let mut host = BehaviorHost::new(1, 4, 0);
        host.set_behavior(ClassId(0), Box::new(recorder.clone()));
        let input = InputSnapshot::default();
        let ctx = TickContext::new(0, 1.0, &store, &input);

        let mut diff = PairDiff::new();
        diff_frame(&mut diff, host.events(), &[(1, 2)]);
        host.run_collision_range(&ctx, 0..4);
        assert_eq!(recorder.enters.load(Ordering::Relaxed), 2); // both endpoints

        diff_frame(&mut diff, host.events(), &[(1, 2)]);
        host.run_collision_range(&ctx, 0..4);
        assert_eq!(recorder.stays.load(Ordering::Relaxed), 2);

        diff_frame(&mut diff, host.events(), &[]);
        host.run_collision_range(&ctx, 0..4);
        assert_eq!(recorder.exits.load(Ordering::Relaxed), 2);
    }
}
