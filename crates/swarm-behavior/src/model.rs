//! The `Behavior` trait — the main extension point for user code.

use swarm_core::{EntityId, EntityRng};
use swarm_store::SpawnConfig;

use crate::TickContext;

/// Pluggable per-class entity logic.
///
/// One implementation is registered per entity class and invoked for every
/// active row of that class each frame.  Only [`tick`][Self::tick] is
/// required; the lifecycle and collision hooks default to no-ops.
///
/// # Thread safety
///
/// `tick` runs on whichever worker claimed the entity's job, many entities in
/// parallel, so implementations must be `Send + Sync`.  Per-entity state
/// belongs in the store's columns (or a registered user component), never in
/// the behavior struct itself; the `rng` argument is the entity's own
/// deterministic stream.
///
/// # Example
///
/// ```rust,ignore
/// struct Drifter;
///
/// impl Behavior for Drifter {
///     fn tick(&self, entity: EntityId, ctx: &TickContext<'_>, rng: &mut EntityRng) {
///         let i = entity.index();
///         ctx.store.body.ax.set(i, rng.gen_range(-0.1..0.1));
///         ctx.store.body.ay.set(i, rng.gen_range(-0.1..0.1));
///     }
/// }
/// ```
pub trait Behavior: Send + Sync + 'static {
    /// Called once per active entity per frame, before physics.
    ///
    /// May write the entity's own acceleration, sprite fields, and user
    /// components; must treat the neighbor stripes as read-only.
    fn tick(&self, entity: EntityId, ctx: &TickContext<'_>, rng: &mut EntityRng);

    /// Called when `entity`'s row is claimed from the spawn pool, after the
    /// transform has been initialized from `config`.  Set class defaults
    /// (radius, visual range, tint) here.
    fn on_spawn(
        &self,
        _entity: EntityId,
        _ctx: &TickContext<'_>,
        _config: &SpawnConfig,
    ) {
    }

    /// Called just before `entity`'s row is released back to the pool.
    fn on_despawn(&self, _entity: EntityId, _ctx: &TickContext<'_>) {}

    /// First frame a pair overlaps.
    fn on_collision_enter(&self, _entity: EntityId, _other: EntityId, _ctx: &TickContext<'_>) {}

    /// Every subsequent frame the pair still overlaps.
    fn on_collision_stay(&self, _entity: EntityId, _other: EntityId, _ctx: &TickContext<'_>) {}

    /// First frame after the pair separates.
    fn on_collision_exit(&self, _entity: EntityId, _other: EntityId, _ctx: &TickContext<'_>) {}
}
