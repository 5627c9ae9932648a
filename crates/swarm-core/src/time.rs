//! Frame timing model.
//!
//! # Design
//!
//! The simulation is tuned for 60 Hz: every per-frame formula takes a
//! `dt_ratio` where 1.0 means "exactly one 60 Hz frame elapsed".  Running at
//! 120 Hz yields `dt_ratio ≈ 0.5`; a 30 Hz stutter yields `≈ 2.0`.  Keeping
//! the ratio instead of raw milliseconds means gameplay constants (max
//! velocity, gravity) are expressed in per-frame units and stay meaningful
//! when the host machine cannot hold 60 Hz.
//!
//! The ratio is clamped to [`MIN_DT_RATIO`, `MAX_DT_RATIO`] so a debugger
//! pause or a long GC hitch in the host cannot inject a single giant step
//! that launches every entity through the world boundary.

use std::time::Instant;

/// Milliseconds per frame at the reference rate (60 Hz).
pub const BASE_FRAME_MS: f32 = 1000.0 / 60.0;

/// Lower clamp for `dt_ratio`.
pub const MIN_DT_RATIO: f32 = 0.05;

/// Upper clamp for `dt_ratio` — at worst one step simulates 3 frames.
pub const MAX_DT_RATIO: f32 = 3.0;

/// Tracks the frame counter and the normalized frame delta.
#[derive(Debug)]
pub struct FrameClock {
    /// Monotonically increasing frame number, starting at 0.
    pub frame: u64,
    /// Normalized delta of the frame currently being simulated.
    pub dt_ratio: f32,
    last: Option<Instant>,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self { frame: 0, dt_ratio: 1.0, last: None }
    }

    /// Measure the wall-clock delta since the previous call and update
    /// `dt_ratio` from it.  The first call yields exactly 1.0.
    pub fn begin_frame(&mut self) -> f32 {
        let now = Instant::now();
        self.dt_ratio = match self.last {
            None => 1.0,
            Some(prev) => {
                let ms = now.duration_since(prev).as_secs_f32() * 1000.0;
                (ms / BASE_FRAME_MS).clamp(MIN_DT_RATIO, MAX_DT_RATIO)
            }
        };
        self.last = Some(now);
        self.dt_ratio
    }

    /// Use a fixed ratio instead of wall time.  Tests and deterministic
    /// replays step with `fixed_step(1.0)`.
    pub fn fixed_step(&mut self, dt_ratio: f32) -> f32 {
        self.dt_ratio = dt_ratio.clamp(MIN_DT_RATIO, MAX_DT_RATIO);
        self.last = None;
        self.dt_ratio
    }

    /// Advance the frame counter.  Called once per completed frame.
    #[inline]
    pub fn advance(&mut self) {
        self.frame += 1;
    }
}
