//! `swarm-sim` — the frame orchestrator for `rust_swarm`.
//!
//! # Frame pipeline
//!
//! ```text
//! for each frame:
//!   ① Commands   — drain the control channel (spawn, config, pause, quit).
//!   ② Input      — publish the input snapshot; mirror the mouse into the
//!                  pointer probe row.
//!   ③ Spatial    — clear grid; GridInsert ⊣ NeighborQuery (neighbor lists
//!                  + overlap pairs).
//!   ④ Behavior   — user tick per entity; then the pair diff turns the
//!                  overlap set into enter/stay/exit events, delivered in
//!                  the Collision phase.
//!   ⑤ Physics    — Integrate ⊣ Constrain × sub_steps.
//!   ⑥ Publish    — derive velocity/rotation/AABB, refresh the render view,
//!                  hand it to the observer.
//! ```
//!
//! Every `⊣` is a barrier run by the `swarm-exec` pool; all phases fan out
//! over the same fetch-add job queue.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! let mut builder = EngineBuilder::new(WorldConfig::default());
//! builder.register_class("boid", 10_000, Box::new(FlockBehavior))?;
//! let mut engine = builder.build()?;
//! engine.run(&mut NoopObserver);
//! ```

pub mod builder;
pub mod commands;
pub mod diag;
pub mod engine;
pub mod error;
pub mod observer;
pub mod view;
pub mod world;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use builder::EngineBuilder;
pub use commands::{Command, ControlHandle};
pub use diag::{Diagnostic, Diagnostics, FrameStats};
pub use engine::Engine;
pub use error::{SimError, SimResult};
pub use observer::{FrameObserver, NoopObserver};
pub use view::RenderView;
pub use world::WorldState;
