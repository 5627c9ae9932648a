//! `swarm-core` — foundational types for the `rust_swarm` simulation core.
//!
//! This crate is a dependency of every other `swarm-*` crate.  It
//! intentionally has no `swarm-*` dependencies and minimal external ones
//! (only `rand` and `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module       | Contents                                               |
//! |--------------|--------------------------------------------------------|
//! | [`ids`]      | `EntityId`, `ClassId`                                  |
//! | [`math`]     | `Vec2` and the handful of ops the solver needs         |
//! | [`time`]     | `FrameClock`, `dt_ratio` normalization (60 Hz ≡ 1.0)   |
//! | [`config`]   | `WorldConfig` and its section structs, validation      |
//! | [`input`]    | `InputSnapshot`, `InputState` (per-frame input view)   |
//! | [`rng`]      | `EntityRng` (per-entity), `WorldRng` (global)          |
//! | [`error`]    | `CoreError`, `CoreResult`                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                      |
//! |---------|-------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to config and input types.   |

pub mod config;
pub mod error;
pub mod ids;
pub mod input;
pub mod math;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{LogicConfig, PhysicsConfig, SpatialConfig, StealConfig, WorldConfig};
pub use error::{CoreError, CoreResult};
pub use ids::{ClassId, EntityId};
pub use input::{InputSnapshot, InputState, MAX_KEYS, MOUSE_BUTTONS};
pub use math::Vec2;
pub use rng::{EntityRng, WorldRng};
pub use time::{FrameClock, BASE_FRAME_MS};
