//! World configuration.
//!
//! All knobs are strongly typed and validated once at engine construction;
//! there is no name-based property lookup at runtime.  Only the `physics`
//! section may be updated after init (applied at the next integrate step);
//! every other section is frozen once the first frame starts.
//!
//! Typically built in code by the application, or deserialized from a config
//! file when the `serde` feature is enabled.

use crate::error::{CoreError, CoreResult};
use crate::math::Vec2;

/// Top-level configuration for one simulated world.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorldConfig {
    /// Simulation-space width in world units.
    pub world_width: u32,
    /// Simulation-space height in world units.
    pub world_height: u32,
    /// Width of the host viewport, in world units, used for on-screen culling.
    pub canvas_width: u32,
    /// Height of the host viewport.
    pub canvas_height: u32,
    /// Master RNG seed.  The same seed always produces identical behavior
    /// streams for every entity.
    pub seed: u64,

    pub spatial: SpatialConfig,
    pub physics: PhysicsConfig,
    pub logic: LogicConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            world_width: 800,
            world_height: 600,
            canvas_width: 800,
            canvas_height: 600,
            seed: 0,
            spatial: SpatialConfig::default(),
            physics: PhysicsConfig::default(),
            logic: LogicConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Check every value against its documented range.
    ///
    /// Violations are fatal at init; the engine refuses to build rather than
    /// clamping silently.
    pub fn validate(&self) -> CoreResult<()> {
        fn bad(msg: String) -> CoreResult<()> {
            Err(CoreError::Config(msg))
        }

        if self.world_width == 0 || self.world_height == 0 {
            return bad(format!(
                "world dimensions must be positive, got {}x{}",
                self.world_width, self.world_height
            ));
        }
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return bad(format!(
                "canvas dimensions must be positive, got {}x{}",
                self.canvas_width, self.canvas_height
            ));
        }
        if self.spatial.cell_size == 0 {
            return bad("spatial.cell_size must be positive".into());
        }
        if self.spatial.max_neighbors == 0 {
            return bad("spatial.max_neighbors must be positive".into());
        }
        self.physics.validate()?;
        if self.logic.entities_per_job == 0 {
            return bad("logic.entities_per_job must be positive".into());
        }
        Ok(())
    }
}

// ── Spatial ───────────────────────────────────────────────────────────────────

/// Uniform-grid parameters.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpatialConfig {
    /// Grid cell edge length in world units.  Typical: 32–128.
    pub cell_size: u32,
    /// Maximum neighbors recorded per entity per frame (K).  Typical: 16–128.
    pub max_neighbors: usize,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self { cell_size: 64, max_neighbors: 32 }
    }
}

// ── Physics ───────────────────────────────────────────────────────────────────

/// Verlet solver parameters.  The only section that may be updated while the
/// simulation runs; updates take effect at the next integrate step.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PhysicsConfig {
    /// Constraint-resolution iterations per frame.  Must be ≥ 1.
    pub sub_step_count: u32,
    /// Velocity retained when bouncing off the world boundary, in [0, 1].
    pub boundary_elasticity: f32,
    /// Fraction of pair penetration corrected per sub-step, in [0, 1].
    pub collision_response_strength: f32,
    /// Verlet velocity damping per frame, in [0, 1].
    pub verlet_damping: f32,
    /// Below this speed, `rotation` is held to suppress jitter.
    pub min_speed_for_rotation: f32,
    /// Constant acceleration applied to every non-static body.
    pub gravity: Vec2,
    /// Capacity of the per-frame collision pair buffer.
    pub max_collision_pairs: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            sub_step_count: 4,
            boundary_elasticity: 0.8,
            collision_response_strength: 0.5,
            verlet_damping: 0.995,
            min_speed_for_rotation: 0.1,
            gravity: Vec2::ZERO,
            max_collision_pairs: 10_000,
        }
    }
}

impl PhysicsConfig {
    pub fn validate(&self) -> CoreResult<()> {
        fn unit_range(name: &str, v: f32) -> CoreResult<()> {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(CoreError::Config(format!("physics.{name} must be in [0, 1], got {v}")))
            }
        }

        if self.sub_step_count == 0 {
            return Err(CoreError::Config("physics.sub_step_count must be >= 1".into()));
        }
        unit_range("boundary_elasticity", self.boundary_elasticity)?;
        unit_range("collision_response_strength", self.collision_response_strength)?;
        unit_range("verlet_damping", self.verlet_damping)?;
        if self.min_speed_for_rotation < 0.0 {
            return Err(CoreError::Config("physics.min_speed_for_rotation must be >= 0".into()));
        }
        if !self.gravity.is_finite() {
            return Err(CoreError::Config("physics.gravity must be finite".into()));
        }
        if self.max_collision_pairs == 0 {
            return Err(CoreError::Config("physics.max_collision_pairs must be positive".into()));
        }
        Ok(())
    }
}

// ── Logic / scheduling ────────────────────────────────────────────────────────

/// Worker-pool and job-slicing parameters.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LogicConfig {
    /// Number of dedicated worker threads.  0 means every phase runs on the
    /// orchestrator thread.
    pub workers: usize,
    /// Entity rows per job — the work-stealing granule.
    pub entities_per_job: usize,
    /// Whether (and how much) the orchestrator thread claims jobs itself.
    pub main_thread_job_stealing: StealConfig,
}

impl Default for LogicConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            entities_per_job: 250,
            main_thread_job_stealing: StealConfig::default(),
        }
    }
}

/// Main-thread participation in the job queue.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StealConfig {
    pub enabled: bool,
    /// Upper bound on jobs the main thread claims per phase.
    pub max_jobs_per_frame: usize,
}

impl Default for StealConfig {
    fn default() -> Self {
        Self { enabled: false, max_jobs_per_frame: 4 }
    }
}
