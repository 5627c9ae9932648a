//! Unit tests for swarm-physics.  These drive the range functions directly
//! over a store, single-threaded; the engine-level scenarios live in
//! swarm-sim.

use swarm_core::{PhysicsConfig, Vec2};
use swarm_store::ComponentStore;

use crate::constrain::{constrain_range, derive_range};
use crate::integrate::{integrate_range, DEFAULT_MAX_VEL};
use crate::params::StepParams;

const WORLD_W: f32 = 800.0;
const WORLD_H: f32 = 600.0;

fn store_with(n: usize) -> ComponentStore {
    let store = ComponentStore::new(n, 8, 64);
    for row in 0..n {
        store.transform.active.set(row, 1);
        store.collider.layer.set(row, 1);
        store.collider.mask.set(row, u16::MAX);
    }
    store
}

fn params_with(config: &PhysicsConfig) -> StepParams {
    StepParams::from(config)
}

/// One full physics frame: integrate, sub-steps, derive.
fn step_frame(store: &ComponentStore, params: &StepParams, dt: f32) -> u32 {
    let n = store.count() as u32;
    let skipped = integrate_range(store, params, dt, 0..n);
    for _ in 0..params.sub_steps {
        constrain_range(store, params, WORLD_W, WORLD_H, 0..n);
    }
    derive_range(store, params, dt, 0..n);
    skipped
}

#[cfg(test)]
mod integrate {
    use super::*;

    #[test]
    fn gravity_accumulates_velocity() {
        let store = store_with(1);
        store.place(0, Vec2::new(400.0, 100.0));
        let config = PhysicsConfig {
            gravity: Vec2::new(0.0, 0.5),
            verlet_damping: 1.0,
            ..PhysicsConfig::default()
        };
        let params = params_with(&config);
        step_frame(&store, &params, 1.0);
        step_frame(&store, &params, 1.0);
        // dy grows by 0.5 each frame: 0.5 then 1.0.
        assert_eq!(store.transform.y.get(0), 101.5);
        assert_eq!(store.body.vy.get(0), 1.0);
    }

    #[test]
    fn acceleration_is_consumed() {
        let store = store_with(1);
        store.place(0, Vec2::new(100.0, 100.0));
        store.body.ax.set(0, 2.0);
        let params = params_with(&PhysicsConfig::default());
        step_frame(&store, &params, 1.0);
        assert_eq!(store.body.ax.get(0), 0.0);
        assert!(store.transform.x.get(0) > 100.0);
    }

    #[test]
    fn displacement_clamped_to_default_cap() {
        let store = store_with(1);
        store.place(0, Vec2::new(400.0, 300.0));
        store.body.ax.set(0, 10_000.0);
        let params = params_with(&PhysicsConfig {
            gravity: Vec2::ZERO,
            ..PhysicsConfig::default()
        });
        let n = store.count() as u32;
        integrate_range(&store, &params, 1.0, 0..n);
        assert_eq!(store.transform.x.get(0) - 400.0, DEFAULT_MAX_VEL);
    }

    #[test]
    fn per_body_max_vel_overrides_cap() {
        let store = store_with(1);
        store.place(0, Vec2::new(400.0, 300.0));
        store.body.ax.set(0, 10_000.0);
        store.body.max_vel.set(0, 5.0);
        store.body.max_acc.set(0, 0.0);
        let params = params_with(&PhysicsConfig::default());
        let n = store.count() as u32;
        integrate_range(&store, &params, 1.0, 0..n);
        assert_eq!(store.transform.x.get(0), 405.0);
    }

    #[test]
    fn nan_acceleration_is_contained() {
        let store = store_with(2);
        store.place(0, Vec2::new(100.0, 100.0));
        store.place(1, Vec2::new(200.0, 200.0));
        store.body.ax.set(0, f32::NAN);
        let params = params_with(&PhysicsConfig::default());
        let skipped = integrate_range(&store, &params, 1.0, 0..2);
        assert_eq!(skipped, 1);
        // Poisoned row keeps its old position; the clean row is unaffected.
        assert_eq!(store.transform.x.get(0), 100.0);
        assert!(store.transform.x.get(0).is_finite());
        assert_eq!(store.body.ax.get(0), 0.0, "accel consumed even when skipped");
        assert!(store.transform.x.get(1).is_finite());
    }

    #[test]
    fn static_bodies_do_not_move() {
        let store = store_with(1);
        store.place(0, Vec2::new(100.0, 100.0));
        store.body.is_static.set(0, 1);
        store.body.ax.set(0, 5.0);
        let config = PhysicsConfig { gravity: Vec2::new(0.0, 1.0), ..PhysicsConfig::default() };
        let params = params_with(&config);
        step_frame(&store, &params, 1.0);
        assert_eq!(store.position(0), Vec2::new(100.0, 100.0));
    }

    /// With no gravity, unit damping, and no contacts, stepping preserves
    /// position to bit equality.
    #[test]
    fn quiescent_round_trip_is_bit_exact() {
        let store = store_with(3);
        let positions = [Vec2::new(123.456, 78.9), Vec2::new(10.0, 590.0), Vec2::new(700.25, 5.5)];
        for (row, &p) in positions.iter().enumerate() {
            store.place(row, p);
            store.collider.radius.set(row, 1.0);
        }
        let config = PhysicsConfig {
            gravity: Vec2::ZERO,
            verlet_damping: 1.0,
            sub_step_count: 4,
            ..PhysicsConfig::default()
        };
        let params = params_with(&config);
        for _ in 0..32 {
            step_frame(&store, &params, 1.0);
        }
        for (row, &p) in positions.iter().enumerate() {
            assert_eq!(store.transform.x.get(row).to_bits(), p.x.to_bits());
            assert_eq!(store.transform.y.get(row).to_bits(), p.y.to_bits());
        }
    }
}

#[cfg(test)]
mod boundary {
    use super::*;

    fn fall_config(elasticity: f32) -> PhysicsConfig {
        PhysicsConfig {
            gravity: Vec2::new(0.0, 0.5),
            verlet_damping: 1.0,
            boundary_elasticity: elasticity,
            sub_step_count: 4,
            ..PhysicsConfig::default()
        }
    }

    /// Free fall onto the floor with zero elasticity comes to an exact rest.
    #[test]
    fn free_fall_rests_on_floor() {
        let store = store_with(1);
        store.place(0, Vec2::new(400.0, 10.0));
        store.collider.radius.set(0, 5.0);
        let params = params_with(&fall_config(0.0));
        for _ in 0..60 {
            step_frame(&store, &params, 1.0);
        }
        assert_eq!(store.transform.y.get(0), 595.0);
        assert_eq!(store.body.vy.get(0), 0.0);
    }

    /// With elasticity 0.8 the ball bounces; the first-bounce apex falls in
    /// the band this solver's history-rewrite rule produces (~236 for this
    /// drop; asserted with margin).
    #[test]
    fn bounce_apex_in_expected_band() {
        let store = store_with(1);
        store.place(0, Vec2::new(400.0, 10.0));
        store.collider.radius.set(0, 5.0);
        let params = params_with(&fall_config(0.8));

        let mut hit_floor = false;
        let mut apex = f32::MAX;
        for _ in 0..200 {
            step_frame(&store, &params, 1.0);
            let y = store.transform.y.get(0);
            if !hit_floor {
                hit_floor = y >= 594.9;
            } else {
                apex = apex.min(y);
            }
        }
        assert!(hit_floor, "ball never reached the floor");
        assert!(
            (180.0..290.0).contains(&apex),
            "first-bounce apex {apex} outside expected band"
        );
    }

    #[test]
    fn left_wall_reflects() {
        let store = store_with(1);
        store.place(0, Vec2::new(10.0, 300.0));
        store.collider.radius.set(0, 5.0);
        store.body.vx.set(0, -8.0);
        store.transform.prev_x.set(0, 18.0); // moving left at 8/frame
        let config = PhysicsConfig {
            gravity: Vec2::ZERO,
            verlet_damping: 1.0,
            boundary_elasticity: 1.0,
            sub_step_count: 1,
            ..PhysicsConfig::default()
        };
        let params = params_with(&config);
        step_frame(&store, &params, 1.0);
        assert_eq!(store.transform.x.get(0), 5.0);
        assert!(store.body.vx.get(0) > 0.0, "velocity must reverse");
    }
}

#[cfg(test)]
mod pairs {
    use super::*;

    fn contact_config() -> PhysicsConfig {
        PhysicsConfig {
            gravity: Vec2::ZERO,
            sub_step_count: 4,
            collision_response_strength: 0.5,
            ..PhysicsConfig::default()
        }
    }

    fn publish_neighbors(store: &ComponentStore, i: usize, js: &[usize]) {
        let entries: Vec<(u32, f32)> = js
            .iter()
            .map(|&j| {
                let d = store.position(j) - store.position(i);
                (j as u32, d.length_sq())
            })
            .collect();
        store.neighbors.publish_row(i, &entries);
    }

    /// Two overlapping bodies separate to their contact distance and stay
    /// there (the head-on scenario).
    #[test]
    fn overlap_relaxes_to_contact_distance() {
        let store = store_with(2);
        store.place(0, Vec2::new(100.0, 100.0));
        store.place(1, Vec2::new(110.0, 100.0));
        store.collider.radius.set(0, 6.0);
        store.collider.radius.set(1, 6.0);
        let params = params_with(&contact_config());

        let distance = |store: &ComponentStore| {
            (store.position(1) - store.position(0)).length()
        };

        publish_neighbors(&store, 0, &[1]);
        publish_neighbors(&store, 1, &[0]);

        step_frame(&store, &params, 1.0);
        assert!((distance(&store) - 12.0).abs() < 0.2, "one frame: {}", distance(&store));

        for _ in 0..3 {
            step_frame(&store, &params, 1.0);
        }
        assert!((distance(&store) - 12.0).abs() < 0.01, "four frames: {}", distance(&store));
    }

    /// Positional correction injects no velocity: after full separation the
    /// implied velocities stay (near) zero.
    #[test]
    fn correction_is_velocity_free() {
        let store = store_with(2);
        store.place(0, Vec2::new(100.0, 100.0));
        store.place(1, Vec2::new(110.0, 100.0));
        store.collider.radius.set(0, 6.0);
        store.collider.radius.set(1, 6.0);
        publish_neighbors(&store, 0, &[1]);
        publish_neighbors(&store, 1, &[0]);
        let params = params_with(&contact_config());
        for _ in 0..8 {
            step_frame(&store, &params, 1.0);
        }
        assert!(store.body.vx.get(0).abs() < 1e-3);
        assert!(store.body.vx.get(1).abs() < 1e-3);
    }

    #[test]
    fn coincident_pair_separates_deterministically() {
        let run = || {
            let store = store_with(2);
            store.place(0, Vec2::new(50.0, 50.0));
            store.place(1, Vec2::new(50.0, 50.0));
            store.collider.radius.set(0, 2.0);
            store.collider.radius.set(1, 2.0);
            publish_neighbors(&store, 0, &[1]);
            publish_neighbors(&store, 1, &[0]);
            let params = params_with(&contact_config());
            constrain_range(&store, &params, WORLD_W, WORLD_H, 0..2);
            store.position(0) - store.position(1)
        };
        let first = run();
        let second = run();
        assert!(first.length_sq() > 0.0, "coincident pair must separate");
        assert_eq!(first, second, "separation direction must be deterministic");
    }

    #[test]
    fn trigger_detects_but_does_not_push() {
        let store = store_with(2);
        store.place(0, Vec2::new(100.0, 100.0));
        store.place(1, Vec2::new(105.0, 100.0));
        store.collider.radius.set(0, 6.0);
        store.collider.radius.set(1, 6.0);
        store.collider.is_trigger.set(0, 1);
        publish_neighbors(&store, 0, &[1]);
        publish_neighbors(&store, 1, &[0]);
        let params = params_with(&contact_config());
        constrain_range(&store, &params, WORLD_W, WORLD_H, 0..2);
        assert_eq!(store.position(0), Vec2::new(100.0, 100.0));
        assert_eq!(store.position(1), Vec2::new(105.0, 100.0));
    }

    #[test]
    fn static_body_absorbs_its_share() {
        let store = store_with(2);
        store.place(0, Vec2::new(100.0, 100.0));
        store.place(1, Vec2::new(110.0, 100.0));
        store.collider.radius.set(0, 6.0);
        store.collider.radius.set(1, 6.0);
        store.body.is_static.set(0, 1);
        publish_neighbors(&store, 0, &[1]);
        publish_neighbors(&store, 1, &[0]);
        let params = params_with(&contact_config());
        constrain_range(&store, &params, WORLD_W, WORLD_H, 0..2);
        assert_eq!(store.position(0), Vec2::new(100.0, 100.0), "static stays put");
        assert!(store.position(1).x > 110.0, "dynamic body pushed away");
    }

    #[test]
    fn collision_count_increments_both_sides() {
        let store = store_with(2);
        store.place(0, Vec2::new(100.0, 100.0));
        store.place(1, Vec2::new(110.0, 100.0));
        store.collider.radius.set(0, 6.0);
        store.collider.radius.set(1, 6.0);
        publish_neighbors(&store, 0, &[1]);
        publish_neighbors(&store, 1, &[0]);
        let params = params_with(&contact_config());
        constrain_range(&store, &params, WORLD_W, WORLD_H, 0..2);
        assert_eq!(store.collider.collision_count.get(0), 1);
        assert_eq!(store.collider.collision_count.get(1), 1);
    }
}

#[cfg(test)]
mod derive {
    use super::*;

    #[test]
    fn rotation_follows_velocity_above_threshold() {
        let store = store_with(1);
        store.place(0, Vec2::new(100.0, 100.0));
        store.transform.prev_x.set(0, 95.0); // moving +x at 5/frame
        let params = params_with(&PhysicsConfig::default());
        derive_range(&store, &params, 1.0, 0..1);
        let expect = 0.0_f32.atan2(5.0) + std::f32::consts::FRAC_PI_2;
        assert!((store.transform.rotation.get(0) - expect).abs() < 1e-6);
    }

    #[test]
    fn rotation_held_below_threshold() {
        let store = store_with(1);
        store.place(0, Vec2::new(100.0, 100.0));
        store.transform.rotation.set(0, 1.25);
        store.transform.prev_x.set(0, 100.0 - 0.05); // speed 0.05 < 0.1
        let params = params_with(&PhysicsConfig::default());
        derive_range(&store, &params, 1.0, 0..1);
        assert_eq!(store.transform.rotation.get(0), 1.25);
    }

    #[test]
    fn aabb_tracks_position_and_offset() {
        let store = store_with(1);
        store.place(0, Vec2::new(50.0, 60.0));
        store.collider.radius.set(0, 4.0);
        store.collider.offset_x.set(0, 1.0);
        let params = params_with(&PhysicsConfig::default());
        derive_range(&store, &params, 1.0, 0..1);
        assert_eq!(store.collider.aabb_min_x.get(0), 47.0);
        assert_eq!(store.collider.aabb_max_x.get(0), 55.0);
        assert_eq!(store.collider.aabb_min_y.get(0), 56.0);
        assert_eq!(store.collider.aabb_max_y.get(0), 64.0);
    }

    #[test]
    fn box_half_extents_used_per_axis() {
        let store = store_with(1);
        store.place(0, Vec2::new(50.0, 50.0));
        store.collider.shape.set(0, swarm_store::shape::BOX);
        store.collider.width.set(0, 10.0);
        store.collider.height.set(0, 4.0);
        let params = params_with(&PhysicsConfig::default());
        derive_range(&store, &params, 1.0, 0..1);
        assert_eq!(store.collider.aabb_min_x.get(0), 45.0);
        assert_eq!(store.collider.aabb_max_y.get(0), 52.0);
    }
}
