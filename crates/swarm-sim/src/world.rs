//! The shared world state and its phase dispatch.
//!
//! `WorldState` is the arena: every column, the grid, the behavior host,
//! solver parameters, input, and diagnostics, owned in one struct behind an
//! `Arc`.  The orchestrator holds the `Arc`; worker threads hold clones for
//! their lifetime and are handed work through the `PhaseRunner`
//! implementation below.

use std::cell::RefCell;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use swarm_behavior::{BehaviorHost, TickContext};
use swarm_core::{InputState, WorldConfig};
use swarm_exec::{Phase, PhaseRunner};
use swarm_physics::PhysicsParams;
use swarm_spatial::UniformGrid;
use swarm_store::{ComponentStore, EntityRegistry};

use crate::diag::Diagnostics;
use crate::view;

thread_local! {
    /// Per-thread neighbor accumulation buffer: grown once to K, reused by
    /// every query job this thread ever claims.
    static QUERY_SCRATCH: RefCell<Vec<(u32, f32)>> = const { RefCell::new(Vec::new()) };
}

/// Everything a phase touches, shared across the orchestrator and workers.
pub struct WorldState {
    pub config: WorldConfig,
    pub store: ComponentStore,
    pub registry: EntityRegistry,
    pub grid: UniformGrid,
    pub physics: PhysicsParams,
    pub host: BehaviorHost,
    pub input: InputState,
    pub diag: Diagnostics,

    /// Current frame number, readable from any phase.
    frame: AtomicU64,
    /// Current frame's `dt_ratio`, as bits.
    dt_bits: AtomicU32,
}

impl WorldState {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        config: WorldConfig,
        store: ComponentStore,
        registry: EntityRegistry,
        grid: UniformGrid,
        physics: PhysicsParams,
        host: BehaviorHost,
    ) -> Self {
        Self {
            config,
            store,
            registry,
            grid,
            physics,
            host,
            input: InputState::new(),
            diag: Diagnostics::new(),
            frame: AtomicU64::new(0),
            dt_bits: AtomicU32::new(1.0_f32.to_bits()),
        }
    }

    /// Publish the frame number and delta before the first phase runs.
    pub(crate) fn set_frame(&self, frame: u64, dt_ratio: f32) {
        self.frame.store(frame, Ordering::Relaxed);
        self.dt_bits.store(dt_ratio.to_bits(), Ordering::Relaxed);
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dt_ratio(&self) -> f32 {
        f32::from_bits(self.dt_bits.load(Ordering::Relaxed))
    }
}

impl PhaseRunner for WorldState {
    fn run_range(&self, phase: Phase, range: std::ops::Range<u32>, _worker: usize) {
        match phase {
            Phase::GridInsert => {
                swarm_spatial::insert_range(&self.grid, &self.store, range);
            }

            Phase::NeighborQuery => QUERY_SCRATCH.with(|scratch| {
                let mut scratch = scratch.borrow_mut();
                swarm_spatial::query_range(&self.grid, &self.store, range, &mut scratch);
            }),

            Phase::Behavior => {
                let input = self.input.snapshot();
                let ctx = TickContext::new(self.frame(), self.dt_ratio(), &self.store, &input);
                self.host.run_tick_range(&ctx, range);
            }

            Phase::Collision => {
                let input = self.input.snapshot();
                let ctx = TickContext::new(self.frame(), self.dt_ratio(), &self.store, &input);
                self.host.run_collision_range(&ctx, range);
            }

            Phase::Integrate => {
                let params = self.physics.snapshot();
                let skipped =
                    swarm_physics::integrate_range(&self.store, &params, self.dt_ratio(), range);
                if skipped > 0 {
                    self.diag.nan_skips.fetch_add(skipped, Ordering::Relaxed);
                }
            }

            Phase::Constrain => {
                let params = self.physics.snapshot();
                swarm_physics::constrain_range(
                    &self.store,
                    &params,
                    self.config.world_width as f32,
                    self.config.world_height as f32,
                    range,
                );
            }

            Phase::Publish => {
                let params = self.physics.snapshot();
                swarm_physics::derive_range(&self.store, &params, self.dt_ratio(), range.clone());
                view::publish_range(
                    &self.store,
                    self.config.canvas_width as f32,
                    self.config.canvas_height as f32,
                    range,
                );
            }
        }
    }
}
