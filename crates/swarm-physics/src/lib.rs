//! `swarm-physics` — Verlet integration and sub-stepped constraints.
//!
//! # Frame shape
//!
//! ```text
//! integrate_range   once      — damped history step + gravity + accel,
//!                               per-axis displacement cap, NaN containment
//! constrain_range   N times   — boundary bounce (history rewrite), then
//!                               pairwise penetration relaxation over the
//!                               neighbor lists (positional, no velocity)
//! derive_range      once      — implied velocity, speed-gated rotation, AABB
//! ```
//!
//! All three are range functions called from worker jobs; the orchestrator
//! gates each sub-step with a barrier so every pass sees the previous pass's
//! writes.  Solver parameters live in [`PhysicsParams`] and may be updated at
//! runtime; ranges snapshot them into [`StepParams`] on entry.

pub mod constrain;
pub mod integrate;
pub mod params;

#[cfg(test)]
mod tests;

pub use constrain::{constrain_range, derive_range};
pub use integrate::{integrate_range, DEFAULT_MAX_VEL};
pub use params::{PhysicsParams, StepParams};
