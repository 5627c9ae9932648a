//! Deterministic per-entity and world-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each entity gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (entity_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive entity IDs uniformly across the seed space.
//! This means:
//!
//! - Entities never share RNG state (no contention, no ordering dependency).
//! - A behavior stream depends only on the seed and the entity's row, not on
//!   which worker thread happened to claim the row's job.
//! - All RNG calls are local to the owning job; no synchronisation needed.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::EntityId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── EntityRng ─────────────────────────────────────────────────────────────────

/// Per-entity deterministic RNG.
///
/// Create one per row at engine init; store in a parallel array alongside the
/// other SoA columns.  Each job owns its rows' RNGs exclusively for the
/// duration of a behavior phase.
pub struct EntityRng(SmallRng);

impl EntityRng {
    /// Seed deterministically from the run's global seed and an entity row.
    pub fn new(global_seed: u64, entity: EntityId) -> Self {
        let seed = global_seed ^ (entity.0 as u64).wrapping_mul(MIXING_CONSTANT);
        EntityRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}

// ── WorldRng ──────────────────────────────────────────────────────────────────

/// World-level RNG for global operations (initial placement, exogenous
/// events).  Used only on the orchestrator thread.
pub struct WorldRng(SmallRng);

impl WorldRng {
    pub fn new(seed: u64) -> Self {
        WorldRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}
