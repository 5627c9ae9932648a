//! Runtime-updatable solver parameters.
//!
//! The physics section is the one part of the configuration that may change
//! while the simulation runs.  Updates land in these atomic cells from the
//! command path and are snapshotted into a plain [`StepParams`] once per
//! range call — so a mid-frame update is observed no later than the next
//! integrate step, and a single range always sees one coherent set.

use std::sync::atomic::{AtomicU32, Ordering};

use swarm_core::{PhysicsConfig, Vec2};

/// A single `f32` cell stored as atomic bits.
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline(always)]
    fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline(always)]
    fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Shared, atomically updatable solver parameters.
pub struct PhysicsParams {
    sub_steps: AtomicU32,
    boundary_elasticity: AtomicF32,
    collision_response_strength: AtomicF32,
    verlet_damping: AtomicF32,
    min_speed_for_rotation: AtomicF32,
    gravity_x: AtomicF32,
    gravity_y: AtomicF32,
}

impl PhysicsParams {
    pub fn new(config: &PhysicsConfig) -> Self {
        Self {
            sub_steps: AtomicU32::new(config.sub_step_count),
            boundary_elasticity: AtomicF32::new(config.boundary_elasticity),
            collision_response_strength: AtomicF32::new(config.collision_response_strength),
            verlet_damping: AtomicF32::new(config.verlet_damping),
            min_speed_for_rotation: AtomicF32::new(config.min_speed_for_rotation),
            gravity_x: AtomicF32::new(config.gravity.x),
            gravity_y: AtomicF32::new(config.gravity.y),
        }
    }

    /// Overwrite every parameter from `config`.
    pub fn apply(&self, config: &PhysicsConfig) {
        self.sub_steps.store(config.sub_step_count.max(1), Ordering::Relaxed);
        self.boundary_elasticity.set(config.boundary_elasticity);
        self.collision_response_strength.set(config.collision_response_strength);
        self.verlet_damping.set(config.verlet_damping);
        self.min_speed_for_rotation.set(config.min_speed_for_rotation);
        self.gravity_x.set(config.gravity.x);
        self.gravity_y.set(config.gravity.y);
    }

    /// Constraint iterations for the current frame.
    pub fn sub_steps(&self) -> u32 {
        self.sub_steps.load(Ordering::Relaxed).max(1)
    }

    /// A coherent plain-data copy for one range's worth of work.
    pub fn snapshot(&self) -> StepParams {
        StepParams {
            sub_steps: self.sub_steps(),
            boundary_elasticity: self.boundary_elasticity.get(),
            collision_response_strength: self.collision_response_strength.get(),
            verlet_damping: self.verlet_damping.get(),
            min_speed_for_rotation: self.min_speed_for_rotation.get(),
            gravity: Vec2::new(self.gravity_x.get(), self.gravity_y.get()),
        }
    }
}

/// Plain-data view of [`PhysicsParams`] used by the solver inner loops.
#[derive(Clone, Copy, Debug)]
pub struct StepParams {
    pub sub_steps: u32,
    pub boundary_elasticity: f32,
    pub collision_response_strength: f32,
    pub verlet_damping: f32,
    pub min_speed_for_rotation: f32,
    pub gravity: Vec2,
}

impl From<&PhysicsConfig> for StepParams {
    fn from(config: &PhysicsConfig) -> Self {
        PhysicsParams::new(config).snapshot()
    }
}
