//! Sub-stepped constraint resolution: world boundary, then pairwise
//! penetration relaxation over the neighbor lists.
//!
//! Each sub-step is one barrier-gated parallel pass.  Boundary handling
//! writes only the row's own cells; pair corrections nudge *both* endpoints
//! through the atomic position columns, which is why those columns are CAS
//! cells rather than plain ones.
//!
//! Corrections are positional: `x` and `prev` move together, so resolving an
//! overlap injects no velocity.  Bounce at the world edge is the opposite —
//! it deliberately rewrites `prev` against the pre-clamp motion so the next
//! integrate step carries the reflected velocity.

use std::ops::Range;

use swarm_store::ComponentStore;

use crate::params::StepParams;

/// Separation applied to exactly coincident pairs.
const COINCIDENT_PUSH: f32 = 0.001;

/// Run one constraint sub-step over `range`.
pub fn constrain_range(
    store: &ComponentStore,
    params: &StepParams,
    world_width: f32,
    world_height: f32,
    range: Range<u32>,
) {
    for row in range {
        let i = row as usize;
        if !store.is_active(i) {
            continue;
        }
        if store.body.is_static.get(i) == 0 {
            resolve_boundary(store, params, world_width, world_height, i);
        }
        resolve_pairs(store, params, i);
    }
}

/// Reflect `i` back inside `[extent, world - extent]` on each axis.
///
/// The history rewrite `prev ← x + v·elasticity` (with `v` captured before
/// the clamp) is what turns the clamp into a bounce: the next integrate step
/// sees a reversed, scaled displacement.
fn resolve_boundary(
    store: &ComponentStore,
    params: &StepParams,
    world_width: f32,
    world_height: f32,
    i: usize,
) {
    let elasticity = params.boundary_elasticity;
    let (hx, hy) = store.collider.half_extents(i);

    let x = store.transform.x.get(i);
    let lo = hx;
    let hi = world_width - hx;
    if x < lo {
        let v = x - store.transform.prev_x.get(i);
        store.transform.x.set(i, lo);
        store.transform.prev_x.set(i, lo + v * elasticity);
    } else if x > hi {
        let v = x - store.transform.prev_x.get(i);
        store.transform.x.set(i, hi);
        store.transform.prev_x.set(i, hi + v * elasticity);
    }

    let y = store.transform.y.get(i);
    let lo = hy;
    let hi = world_height - hy;
    if y < lo {
        let v = y - store.transform.prev_y.get(i);
        store.transform.y.set(i, lo);
        store.transform.prev_y.set(i, lo + v * elasticity);
    } else if y > hi {
        let v = y - store.transform.prev_y.get(i);
        store.transform.y.set(i, hi);
        store.transform.prev_y.set(i, hi + v * elasticity);
    }
}

/// Relax penetration against every higher-indexed neighbor of `i`.
///
/// Each pair is processed once per sub-step (by its lower endpoint's job).
/// Triggers detect but never push; static bodies absorb their share of the
/// correction.
fn resolve_pairs(store: &ComponentStore, params: &StepParams, i: usize) {
    let strength = params.collision_response_strength;
    let ri = store.collider.radius.get(i);
    let layer_i = store.collider.layer.get(i);
    let mask_i = store.collider.mask.get(i);
    let trigger_i = store.collider.is_trigger.get(i) != 0;
    let static_i = store.body.is_static.get(i) != 0;

    for (other, _) in store.neighbors.neighbors(i) {
        let j = other.index();
        if j <= i || !store.is_active(j) {
            continue;
        }
        if (layer_i & store.collider.mask.get(j)) == 0
            || (store.collider.layer.get(j) & mask_i) == 0
        {
            continue;
        }

        let min_dist = ri + store.collider.radius.get(j);
        if min_dist <= 0.0 {
            continue;
        }
        // Positions re-read per pair: an earlier pair in this list may have
        // nudged `i` already.
        let dx = store.transform.x.get(i) - store.transform.x.get(j);
        let dy = store.transform.y.get(i) - store.transform.y.get(j);
        let d2 = dx * dx + dy * dy;
        if d2 >= min_dist * min_dist {
            continue;
        }
        if trigger_i || store.collider.is_trigger.get(j) != 0 {
            continue; // triggers report contacts but never push
        }

        let static_j = store.body.is_static.get(j) != 0;
        if static_i && static_j {
            continue;
        }

        let (nx, ny, correction) = if d2 == 0.0 {
            // Exactly coincident: separate along a direction derived from the
            // pair's indices so repeated frames agree.
            let (jx, jy) = coincident_direction(i, j);
            (jx, jy, COINCIDENT_PUSH)
        } else {
            let d = d2.sqrt();
            (dx / d, dy / d, (min_dist - d) * strength * 0.5)
        };

        if !static_i {
            nudge(store, i, nx * correction, ny * correction);
        }
        if !static_j {
            nudge(store, j, -nx * correction, -ny * correction);
        }
        store.collider.collision_count.incr(i);
        store.collider.collision_count.incr(j);
    }
}

/// Move a row positionally: `x` and `prev` shift together.
#[inline]
fn nudge(store: &ComponentStore, row: usize, dx: f32, dy: f32) {
    store.transform.x.add(row, dx);
    store.transform.y.add(row, dy);
    store.transform.prev_x.add(row, dx);
    store.transform.prev_y.add(row, dy);
}

/// Deterministic pseudo-random unit direction for a coincident pair.
fn coincident_direction(i: usize, j: usize) -> (f32, f32) {
    let hash = (i as u64)
        .wrapping_mul(0x9e37_79b9_7f4a_7c15)
        .wrapping_add((j as u64).wrapping_mul(0xd1b5_4a32_d192_ed03));
    let angle = (hash >> 40) as f32 / (1u64 << 24) as f32 * std::f32::consts::TAU;
    (angle.cos(), angle.sin())
}

// ── Derive pass ───────────────────────────────────────────────────────────────

/// Final per-frame derivation: implied velocity, speed-gated rotation, AABB.
///
/// Runs after the last sub-step (in the publish phase), own-row writes only.
pub fn derive_range(store: &ComponentStore, params: &StepParams, dt_ratio: f32, range: Range<u32>) {
    for row in range {
        let i = row as usize;
        if !store.is_active(i) {
            continue;
        }

        // Re-derive velocity from the final position history so boundary and
        // pair corrections are reflected in what behaviors read next frame.
        let x = store.transform.x.get(i);
        let y = store.transform.y.get(i);
        let vx = (x - store.transform.prev_x.get(i)) / dt_ratio;
        let vy = (y - store.transform.prev_y.get(i)) / dt_ratio;
        store.body.vx.set(i, vx);
        store.body.vy.set(i, vy);

        // Rotation follows the velocity only above the anti-jitter threshold;
        // below it the previous heading is held.
        let speed = (vx * vx + vy * vy).sqrt();
        if speed > params.min_speed_for_rotation {
            store
                .transform
                .rotation
                .set(i, vy.atan2(vx) + std::f32::consts::FRAC_PI_2);
        }

        let cx = x + store.collider.offset_x.get(i);
        let cy = y + store.collider.offset_y.get(i);
        let (hx, hy) = store.collider.half_extents(i);
        store.collider.aabb_min_x.set(i, cx - hx);
        store.collider.aabb_min_y.set(i, cy - hy);
        store.collider.aabb_max_x.set(i, cx + hx);
        store.collider.aabb_max_y.set(i, cy + hy);
    }
}
