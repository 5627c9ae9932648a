//! The frame orchestrator.
//!
//! `Engine` owns the shared world (through its `Arc`), the worker pool, and
//! the frame clock, and drives the per-frame phase sequence:
//!
//! ```text
//! drain commands → publish input + pointer row → clear grid/pairs
//!   → GridInsert ⊣ NeighborQuery ⊣ Behavior ⊣ (pair diff) Collision
//!   → Integrate ⊣ Constrain × sub_steps ⊣ Publish
//! → harvest diagnostics, advance clock
//! ```
//!
//! (`⊣` marks a barrier.)  Control commands are observed between phases;
//! pause stops the phase sequence at the next boundary and quit tears the
//! pool down after the current phase completes.

use std::time::Instant;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

use swarm_behavior::{PairDiff, TickContext};
use swarm_core::{EntityId, InputSnapshot, FrameClock, PhysicsConfig};
use swarm_exec::{Phase, WorkerPool};
use swarm_store::{SpawnConfig, StoreError};

use crate::commands::{Command, ControlHandle};
use crate::diag::{Diagnostic, FrameStats};
use crate::error::SimResult;
use crate::observer::FrameObserver;
use crate::view::RenderView;
use crate::world::WorldState;

use std::sync::Arc;

/// Capacity of the out-of-band diagnostic channel; overflow is dropped.
const DIAG_CHANNEL_CAPACITY: usize = 64;

/// The simulation engine: shared world + worker pool + frame loop.
pub struct Engine {
    world: Arc<WorldState>,
    pool: WorkerPool,
    clock: FrameClock,
    diff: PairDiff,
    cmd_tx: Sender<Command>,
    cmd_rx: Receiver<Command>,
    diag_tx: Sender<Diagnostic>,
    diag_rx: Receiver<Diagnostic>,
    pending_input: InputSnapshot,
    paused: bool,
    quitting: bool,
}

impl Engine {
    pub(crate) fn new(world: Arc<WorldState>, pool: WorkerPool) -> Self {
        let (cmd_tx, cmd_rx) = unbounded();
        let (diag_tx, diag_rx) = bounded(DIAG_CHANNEL_CAPACITY);
        Self {
            world,
            pool,
            clock: FrameClock::new(),
            diff: PairDiff::new(),
            cmd_tx,
            cmd_rx,
            diag_tx,
            diag_rx,
            pending_input: InputSnapshot::default(),
            paused: false,
            quitting: false,
        }
    }

    // ── Host-facing accessors ─────────────────────────────────────────────

    /// A cloneable control handle for other threads.
    pub fn handle(&self) -> ControlHandle {
        ControlHandle::new(self.cmd_tx.clone())
    }

    /// A receiver for out-of-band diagnostics (recoverable faults).
    pub fn diagnostics(&self) -> Receiver<Diagnostic> {
        self.diag_rx.clone()
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn store(&self) -> &swarm_store::ComponentStore {
        &self.world.store
    }

    pub fn frame(&self) -> u64 {
        self.clock.frame
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// The read-only renderer view.  Stable between a frame's publish phase
    /// and the next frame's first phase.
    pub fn render_view(&self) -> RenderView<'_> {
        RenderView::new(&self.world.store)
    }

    // ── Direct control (same thread as the run loop) ──────────────────────

    /// Spawn one entity of `class` now.  Pool exhaustion is surfaced on the
    /// diagnostic channel as well as returned.
    pub fn spawn(&mut self, class: &str, config: SpawnConfig) -> SimResult<EntityId> {
        let class_id = self.world.registry.class_by_name(class)?.class_id;
        match self.world.registry.spawn(&self.world.store, class_id, &config) {
            Ok(entity) => {
                let input = self.world.input.snapshot();
                let ctx = TickContext::new(
                    self.clock.frame,
                    self.clock.dt_ratio,
                    &self.world.store,
                    &input,
                );
                self.world.host.dispatch_spawn(&ctx, entity, &config);
                Ok(entity)
            }
            Err(err) => {
                if matches!(err, StoreError::PoolExhausted { .. }) {
                    self.world
                        .diag
                        .pool_exhausted
                        .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                    let _ = self
                        .diag_tx
                        .try_send(Diagnostic::PoolExhausted { class: class.to_owned() });
                    tracing::warn!(class, "spawn pool exhausted");
                }
                Err(err.into())
            }
        }
    }

    /// Despawn one entity, running its `on_despawn` first.
    pub fn despawn(&mut self, entity: EntityId) -> SimResult<()> {
        let input = self.world.input.snapshot();
        let ctx = TickContext::new(
            self.clock.frame,
            self.clock.dt_ratio,
            &self.world.store,
            &input,
        );
        self.world.host.dispatch_despawn(&ctx, entity);
        self.world.registry.despawn(&self.world.store, entity)?;
        Ok(())
    }

    /// Despawn every active row of `class`.
    pub fn despawn_all(&mut self, class: &str) -> SimResult<()> {
        let class_id = self.world.registry.class_by_name(class)?.class_id;
        let rows: Vec<EntityId> = self
            .world
            .registry
            .active_rows(&self.world.store, class_id)
            .collect();
        for entity in rows {
            self.despawn(entity)?;
        }
        Ok(())
    }

    /// Replace the input snapshot published at the next frame start.
    pub fn set_input(&mut self, snapshot: InputSnapshot) {
        self.pending_input = snapshot;
    }

    /// Update the solver parameters (validated; applied at the next
    /// integrate step).
    pub fn update_physics(&mut self, config: PhysicsConfig) -> SimResult<()> {
        config.validate()?;
        self.world.physics.apply(&config);
        Ok(())
    }

    pub fn set_main_thread_active(&self, active: bool) {
        self.pool.set_main_thread_active(active);
    }

    // ── Run loops ─────────────────────────────────────────────────────────

    /// Drive frames with wall-clock deltas until a quit command arrives.
    pub fn run<O: FrameObserver>(&mut self, observer: &mut O) {
        loop {
            if self.quitting {
                break;
            }
            if self.paused {
                // Nothing to do until the host says otherwise; block on the
                // command channel rather than spinning.
                match self.cmd_rx.recv() {
                    Ok(command) => {
                        self.apply_command(command);
                        continue;
                    }
                    Err(_) => break, // every handle dropped while paused
                }
            }
            let dt_ratio = self.clock.begin_frame();
            if !self.step(dt_ratio, observer) {
                break;
            }
        }
        observer.on_sim_end(self.clock.frame);
        tracing::info!(frames = self.clock.frame, "run loop ended");
    }

    /// Step exactly `frames` fixed-delta frames (tests, offline replays).
    pub fn run_frames<O: FrameObserver>(&mut self, frames: u64, dt_ratio: f32, observer: &mut O) {
        for _ in 0..frames {
            if self.quitting {
                break;
            }
            let dt_ratio = self.clock.fixed_step(dt_ratio);
            if !self.step(dt_ratio, observer) {
                break;
            }
        }
    }

    /// One wall-clock frame.  Returns `false` once quitting.
    pub fn run_frame<O: FrameObserver>(&mut self, observer: &mut O) -> bool {
        let dt_ratio = self.clock.begin_frame();
        self.step(dt_ratio, observer)
    }

    // ── Frame internals ───────────────────────────────────────────────────

    fn step<O: FrameObserver>(&mut self, dt_ratio: f32, observer: &mut O) -> bool {
        self.drain_commands();
        if self.quitting {
            return false;
        }
        if self.paused {
            return true;
        }

        let frame_start = Instant::now();
        let frame = self.clock.frame;
        observer.on_frame_start(frame);

        self.world.set_frame(frame, dt_ratio);
        self.world.diag.begin_frame();
        self.world.input.publish(&self.pending_input);
        self.update_pointer_row();
        self.world.grid.clear();
        self.world.store.pairs.reset();

        // ── Spatial ───────────────────────────────────────────────────────
        self.phase(Phase::GridInsert);
        self.phase(Phase::NeighborQuery);
        if !self.phase_boundary() {
            return !self.quitting;
        }

        // ── Behavior + collision events ───────────────────────────────────
        self.phase(Phase::Behavior);
        self.diff
            .update(&self.world.store.pairs, self.world.host.events());
        self.phase(Phase::Collision);
        if !self.phase_boundary() {
            return !self.quitting;
        }

        // ── Physics ───────────────────────────────────────────────────────
        self.phase(Phase::Integrate);
        for _ in 0..self.world.physics.sub_steps() {
            self.phase(Phase::Constrain);
        }

        // ── Render-view publish ───────────────────────────────────────────
        self.phase(Phase::Publish);
        observer.on_publish(frame, &RenderView::new(&self.world.store));

        self.harvest_diagnostics();
        self.world.diag.record_frame(frame_start.elapsed());
        let stats = FrameStats::capture(
            &self.world.diag,
            frame,
            dt_ratio,
            self.world.store.active_count(),
        );
        observer.on_frame_end(frame, &stats);

        self.clock.advance();
        true
    }

    fn phase(&mut self, phase: Phase) {
        let start = Instant::now();
        self.pool.run_phase(phase);
        self.world.diag.record_phase(phase, start.elapsed());
    }

    /// Latch pause/quit between phases.  Returns `false` when the rest of
    /// the frame must be skipped.
    fn phase_boundary(&mut self) -> bool {
        while let Ok(command) = self.cmd_rx.try_recv() {
            match command {
                Command::Pause => self.paused = true,
                Command::Resume => self.paused = false,
                Command::Quit => self.quitting = true,
                // Anything else waits for the next frame start.
                other => self.apply_deferred(other),
            }
        }
        !(self.paused || self.quitting)
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.cmd_rx.try_recv() {
            self.apply_command(command);
        }
    }

    fn apply_command(&mut self, command: Command) {
        match command {
            Command::Pause => self.paused = true,
            Command::Resume => self.paused = false,
            Command::Quit => self.quitting = true,
            other => self.apply_deferred(other),
        }
    }

    /// Commands that act on world state (never pause/resume/quit).
    fn apply_deferred(&mut self, command: Command) {
        match command {
            Command::Spawn { class, config } => {
                // Failure already surfaced via diagnostics inside spawn.
                let _ = self.spawn(&class, config);
            }
            Command::DespawnAll { class } => {
                if let Err(err) = self.despawn_all(&class) {
                    tracing::warn!(class, %err, "despawn_all failed");
                }
            }
            Command::UpdatePhysics(config) => {
                if let Err(err) = self.update_physics(config) {
                    tracing::warn!(%err, "rejected physics update");
                }
            }
            Command::SetInput(snapshot) => self.pending_input = *snapshot,
            Command::SetMainThreadActive(active) => self.pool.set_main_thread_active(active),
            Command::Pause | Command::Resume | Command::Quit => unreachable!(),
        }
    }

    /// Mirror the mouse into row 0 so behaviors can treat the pointer as a
    /// spatial entity (it is static for physics and filtered out of pairs).
    fn update_pointer_row(&self) {
        let store = &self.world.store;
        if self.pending_input.mouse_present {
            let old_x = store.transform.x.get(0);
            let old_y = store.transform.y.get(0);
            store.transform.x.set(0, self.pending_input.mouse_x);
            store.transform.y.set(0, self.pending_input.mouse_y);
            store.transform.prev_x.set(0, old_x);
            store.transform.prev_y.set(0, old_y);
            store.transform.active.set(0, 1);
        } else {
            store.transform.active.set(0, 0);
        }
    }

    fn harvest_diagnostics(&mut self) {
        use std::sync::atomic::Ordering;

        let dropped = self.world.grid.take_overflow();
        if dropped > 0 {
            self.world.diag.grid_overflow.fetch_add(dropped, Ordering::Relaxed);
            let _ = self.diag_tx.try_send(Diagnostic::GridOverflow { dropped });
            tracing::debug!(dropped, "grid cells overflowed this frame");
        }

        let faults = self.world.host.take_faults();
        if faults > 0 {
            self.world.diag.worker_faults.fetch_add(faults, Ordering::Relaxed);
            let _ = self.diag_tx.try_send(Diagnostic::WorkerFault { count: faults });
        }

        let event_drops = self.world.host.events().take_dropped();
        if event_drops > 0 {
            self.world.diag.event_drops.fetch_add(event_drops, Ordering::Relaxed);
        }

        let pair_drops = self.world.store.pairs.dropped();
        if pair_drops > 0 {
            self.world.diag.pair_drops.fetch_add(pair_drops, Ordering::Relaxed);
            let _ = self
                .diag_tx
                .try_send(Diagnostic::PairBufferFull { dropped: pair_drops });
        }
    }
}
