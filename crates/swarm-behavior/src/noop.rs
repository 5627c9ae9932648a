//! A do-nothing behavior.

use swarm_core::{EntityId, EntityRng};

use crate::{Behavior, TickContext};

/// A [`Behavior`] whose `tick` does nothing.
///
/// Useful for passive populations (obstacles, scenery colliders) and as the
/// default for classes registered without logic — the pointer probe uses it.
pub struct NoopBehavior;

impl Behavior for NoopBehavior {
    fn tick(&self, _entity: EntityId, _ctx: &TickContext<'_>, _rng: &mut EntityRng) {}
}
