//! Diagnostics: per-phase timings, recoverable-fault counters, and the
//! out-of-band diagnostic channel.
//!
//! Nothing here unwinds across the barrier — recoverable faults are counted
//! where they happen and harvested by the orchestrator once per frame, which
//! also forwards notable ones over a bounded channel for the host to consume
//! (or drop, if it isn't listening).

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use swarm_exec::{Phase, PHASE_COUNT};

// ── Counters ──────────────────────────────────────────────────────────────────

/// Cumulative recoverable-fault counters and last-frame phase timings.
#[derive(Default)]
pub struct Diagnostics {
    /// Entities dropped from the grid because their cell was full.
    pub grid_overflow: AtomicU32,
    /// Spawn attempts that found no free row.
    pub pool_exhausted: AtomicU32,
    /// Behavior panics isolated by the host.
    pub worker_faults: AtomicU32,
    /// Integrate steps skipped because they produced a non-finite position.
    pub nan_skips: AtomicU32,
    /// Collision events dropped to bucket overflow.
    pub event_drops: AtomicU32,
    /// Pairs dropped because the pair buffer was full.
    pub pair_drops: AtomicU32,

    /// Wall nanoseconds each phase took last frame (Constrain accumulates
    /// its sub-steps).
    phase_nanos: [AtomicU64; PHASE_COUNT],
    frame_nanos: AtomicU64,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn begin_frame(&self) {
        for cell in &self.phase_nanos {
            cell.store(0, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_phase(&self, phase: Phase, elapsed: Duration) {
        self.phase_nanos[phase.index()].fetch_add(elapsed.as_nanos() as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_frame(&self, elapsed: Duration) {
        self.frame_nanos.store(elapsed.as_nanos() as u64, Ordering::Relaxed);
    }

    pub fn phase_nanos(&self, phase: Phase) -> u64 {
        self.phase_nanos[phase.index()].load(Ordering::Relaxed)
    }

    pub fn frame_nanos(&self) -> u64 {
        self.frame_nanos.load(Ordering::Relaxed)
    }
}

// ── Per-frame snapshot ────────────────────────────────────────────────────────

/// Plain-data timing/census snapshot handed to `on_frame_end`.
#[derive(Clone, Debug)]
pub struct FrameStats {
    pub frame: u64,
    pub dt_ratio: f32,
    /// Active rows at frame end.
    pub active: usize,
    /// Wall nanoseconds per phase this frame.
    pub phase_nanos: [u64; PHASE_COUNT],
    pub frame_nanos: u64,
    /// Instantaneous frames-per-second implied by `frame_nanos`.
    pub fps: f32,
}

impl FrameStats {
    pub(crate) fn capture(diag: &Diagnostics, frame: u64, dt_ratio: f32, active: usize) -> Self {
        let phase_nanos = std::array::from_fn(|i| diag.phase_nanos(Phase::ALL[i]));
        let frame_nanos = diag.frame_nanos();
        Self {
            frame,
            dt_ratio,
            active,
            phase_nanos,
            frame_nanos,
            fps: if frame_nanos > 0 { 1.0e9 / frame_nanos as f32 } else { 0.0 },
        }
    }

    pub fn phase_millis(&self, phase: Phase) -> f64 {
        self.phase_nanos[phase.index()] as f64 / 1.0e6
    }
}

// ── Out-of-band diagnostics ───────────────────────────────────────────────────

/// Recoverable faults surfaced to the host over the diagnostic channel.
#[derive(Clone, Debug)]
pub enum Diagnostic {
    /// A spawn found no free row; the caller may retry after despawns.
    PoolExhausted { class: String },
    /// Entities were dropped from this frame's grid.
    GridOverflow { dropped: u32 },
    /// Behavior panics were isolated this frame.
    WorkerFault { count: u32 },
    /// The collision pair buffer overflowed this frame.
    PairBufferFull { dropped: u32 },
}
