//! The Verlet integrate step — once per frame, own-row writes only.

use std::ops::Range;

use swarm_store::ComponentStore;

use crate::params::StepParams;

/// Per-axis displacement cap applied when a body's `max_vel` is unset.
pub const DEFAULT_MAX_VEL: f32 = 100.0;

/// Integrate every active, non-static entity of `range`.
///
/// Velocity is implicit in the position history: the step moves `x` by the
/// damped previous displacement plus this frame's gravity and acceleration,
/// then rewrites `prev` to the old position.  Acceleration is consumed
/// (zeroed) every frame; behaviors re-apply forces each tick.
///
/// A row whose new position would be non-finite is left untouched (its
/// acceleration is still cleared so the poison does not persist).  Returns
/// the number of rows skipped that way.
pub fn integrate_range(
    store: &ComponentStore,
    params: &StepParams,
    dt_ratio: f32,
    range: Range<u32>,
) -> u32 {
    let mut skipped = 0;

    for row in range {
        let i = row as usize;
        if !store.is_active(i) || store.body.is_static.get(i) != 0 {
            continue;
        }

        let x = store.transform.x.get(i);
        let y = store.transform.y.get(i);
        let px = store.transform.prev_x.get(i);
        let py = store.transform.prev_y.get(i);

        let mut ax = store.body.ax.get(i);
        let mut ay = store.body.ay.get(i);
        let max_acc = store.body.max_acc.get(i);
        if max_acc > 0.0 {
            ax = ax.clamp(-max_acc, max_acc);
            ay = ay.clamp(-max_acc, max_acc);
        }

        // Per-entity friction stacks onto the global damping.
        let damping = params.verlet_damping * (1.0 - store.body.friction.get(i)).clamp(0.0, 1.0);

        let mut dx = (x - px) * damping + params.gravity.x * dt_ratio * dt_ratio + ax * dt_ratio;
        let mut dy = (y - py) * damping + params.gravity.y * dt_ratio * dt_ratio + ay * dt_ratio;

        let max_vel = store.body.max_vel.get(i);
        let cap = if max_vel > 0.0 { max_vel } else { DEFAULT_MAX_VEL };
        dx = dx.clamp(-cap, cap);
        dy = dy.clamp(-cap, cap);

        let nx = x + dx;
        let ny = y + dy;

        // Acceleration is consumed whether or not the step lands.
        store.body.ax.set(i, 0.0);
        store.body.ay.set(i, 0.0);

        if !nx.is_finite() || !ny.is_finite() {
            skipped += 1;
            continue;
        }

        store.transform.x.set(i, nx);
        store.transform.y.set(i, ny);
        store.transform.prev_x.set(i, x);
        store.transform.prev_y.set(i, y);
        store.body.vx.set(i, dx / dt_ratio);
        store.body.vy.set(i, dy / dt_ratio);
    }

    skipped
}
