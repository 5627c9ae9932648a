//! flock — boids on the rust_swarm core.
//!
//! 2,000 agents steer by separation/alignment/cohesion over the per-frame
//! neighbor lists, bounce off the world walls, and report per-phase timings
//! every couple of seconds.  Scale note: the same loop holds at tens of
//! thousands of boids; raise `BOID_COUNT` and `workers` to taste.
//!
//! Run with `RUST_LOG=info cargo run --release -p flock`.

use std::time::Instant;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use swarm_behavior::{Behavior, TickContext};
use swarm_core::{
    EntityId, EntityRng, LogicConfig, PhysicsConfig, SpatialConfig, StealConfig, Vec2, WorldConfig,
    WorldRng,
};
use swarm_exec::Phase;
use swarm_sim::{EngineBuilder, FrameObserver, FrameStats};
use swarm_store::SpawnConfig;

// ── Constants ─────────────────────────────────────────────────────────────────

const BOID_COUNT: usize = 2_000;
const SEED: u64 = 42;
const WORLD_W: u32 = 800;
const WORLD_H: u32 = 600;
const FRAMES: u64 = 600;

const VISUAL_RANGE: f32 = 25.0;
const SEPARATION_RANGE_SQ: f32 = 8.0 * 8.0;

// ── Behavior ──────────────────────────────────────────────────────────────────

struct Boid {
    separation: f32,
    alignment: f32,
    cohesion: f32,
    wander: f32,
}

impl Default for Boid {
    fn default() -> Self {
        Self { separation: 0.08, alignment: 0.04, cohesion: 0.002, wander: 0.03 }
    }
}

impl Behavior for Boid {
    fn on_spawn(&self, entity: EntityId, ctx: &TickContext<'_>, _config: &SpawnConfig) {
        let i = entity.index();
        let store = ctx.store;
        store.collider.radius.set(i, 2.0);
        store.collider.visual_range.set(i, VISUAL_RANGE);
        store.body.max_vel.set(i, 4.0);
        store.body.max_acc.set(i, 0.5);
        // Tint drifts with the row so flock-mates are distinguishable.
        let hue = (entity.0.wrapping_mul(2_654_435_761)) | 0xFF;
        store.sprite.tint.set(i, hue);
    }

    fn tick(&self, entity: EntityId, ctx: &TickContext<'_>, rng: &mut EntityRng) {
        let i = entity.index();
        let store = ctx.store;
        let pos = store.position(i);
        let vel = store.velocity(i);

        let mut push = Vec2::ZERO; // separation
        let mut heading = Vec2::ZERO; // alignment
        let mut center = Vec2::ZERO; // cohesion
        let mut flockmates = 0.0_f32;

        for (other, d2) in ctx.neighbors(entity) {
            let j = other.index();
            let at = store.position(j);
            if d2 < SEPARATION_RANGE_SQ {
                push += pos - at;
            }
            heading += store.velocity(j);
            center += at;
            flockmates += 1.0;
        }

        let mut accel = Vec2::new(
            rng.gen_range(-self.wander..self.wander),
            rng.gen_range(-self.wander..self.wander),
        );
        if flockmates > 0.0 {
            let inv = 1.0 / flockmates;
            accel += push * self.separation;
            accel += (heading * inv - vel) * self.alignment;
            accel += (center * inv - pos) * self.cohesion;
        }

        store.body.ax.set(i, accel.x);
        store.body.ay.set(i, accel.y);
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

struct Reporter {
    handle: swarm_sim::ControlHandle,
    fps_sum: f32,
    samples: u32,
}

impl FrameObserver for Reporter {
    fn on_frame_end(&mut self, frame: u64, stats: &FrameStats) {
        self.fps_sum += stats.fps;
        self.samples += 1;
        if frame % 120 == 0 {
            let spatial_ms =
                stats.phase_millis(Phase::GridInsert) + stats.phase_millis(Phase::NeighborQuery);
            let physics_ms =
                stats.phase_millis(Phase::Integrate) + stats.phase_millis(Phase::Constrain);
            tracing::info!(
                frame,
                fps = stats.fps,
                active = stats.active,
                spatial_ms,
                behavior_ms = stats.phase_millis(Phase::Behavior),
                physics_ms,
                "frame"
            );
        }
        if frame + 1 >= FRAMES {
            self.handle.quit();
        }
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let workers = std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1))
        .unwrap_or(3)
        .clamp(1, 8);

    let config = WorldConfig {
        world_width: WORLD_W,
        world_height: WORLD_H,
        canvas_width: WORLD_W,
        canvas_height: WORLD_H,
        seed: SEED,
        spatial: SpatialConfig { cell_size: 32, max_neighbors: 32 },
        physics: PhysicsConfig {
            gravity: Vec2::ZERO,
            sub_step_count: 2,
            ..PhysicsConfig::default()
        },
        logic: LogicConfig {
            workers,
            entities_per_job: 250,
            main_thread_job_stealing: StealConfig { enabled: true, max_jobs_per_frame: 2 },
        },
    };

    let mut builder = EngineBuilder::new(config);
    builder.register_class("boid", BOID_COUNT, Box::new(Boid::default()))?;
    let mut engine = builder.build()?;

    tracing::info!(
        boids = BOID_COUNT,
        workers,
        arena_kib = engine.store().buffer_bytes() / 1024,
        "spawning flock"
    );

    let mut rng = WorldRng::new(SEED);
    for _ in 0..BOID_COUNT {
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        engine.spawn(
            "boid",
            SpawnConfig {
                x: rng.gen_range(50.0..(WORLD_W as f32 - 50.0)),
                y: rng.gen_range(50.0..(WORLD_H as f32 - 50.0)),
                vx: angle.cos() * 2.0,
                vy: angle.sin() * 2.0,
            },
        )?;
    }

    let mut reporter = Reporter { handle: engine.handle(), fps_sum: 0.0, samples: 0 };
    let t0 = Instant::now();
    engine.run(&mut reporter);
    let elapsed = t0.elapsed();

    let contacts: u32 = (0..engine.store().count())
        .map(|row| engine.store().collider.collision_count.get(row))
        .sum();
    tracing::info!(
        frames = FRAMES,
        secs = elapsed.as_secs_f64(),
        avg_fps = reporter.fps_sum / reporter.samples.max(1) as f32,
        contacts,
        "flock finished"
    );

    Ok(())
}
