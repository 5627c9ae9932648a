//! `swarm-store` — Structure-of-Arrays component storage for `rust_swarm`.
//!
//! # Layout
//!
//! All persistent state lives in typed columns sized to the total entity
//! count, allocated once before worker threads spawn.  The entity's row index
//! is its identity; every column — built-in or user-registered — is indexed
//! by the same row (dense allocation, no sparse mapping).
//!
//! | Module         | Contents                                              |
//! |----------------|-------------------------------------------------------|
//! | [`column`]     | `Column<T>`, atomic f32/u32 columns, `FlagColumn`     |
//! | [`components`] | `Transform`, `RigidBody`, `Collider`, `SpriteRenderer`|
//! | [`user`]       | `UserComponents` — type-erased user columns           |
//! | [`store`]      | `ComponentStore` — the arena owning every column      |
//! | [`registry`]   | `EntityRegistry`, class ranges, spawn/despawn pool    |
//! | [`neighbors`]  | `NeighborTable` — per-frame neighbor/distance stripes |
//! | [`pairs`]      | `PairBuffer` — atomic-append overlap pair set         |
//!
//! # Concurrency contract
//!
//! Columns are shared by `&` across worker threads.  Plain cells follow the
//! row-ownership rule (a row is written only by the job that owns it within
//! a phase); the atomic flavors cover the three cross-row cases: position
//! nudges from pair resolution, collision counters, and the `active` flag's
//! spawn CAS.  Cross-phase visibility comes from the scheduler's barrier.

pub mod column;
pub mod components;
pub mod error;
pub mod neighbors;
pub mod pairs;
pub mod registry;
pub mod store;
pub mod user;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use column::{AtomicF32Column, AtomicU32Column, Column, FlagColumn};
pub use components::{shape, Collider, RigidBody, SpriteRenderer, Transform};
pub use error::{StoreError, StoreResult};
pub use neighbors::NeighborTable;
pub use pairs::{pack_pair, unpack_pair, PairBuffer};
pub use registry::{ClassInfo, EntityRegistry, SpawnConfig};
pub use store::ComponentStore;
pub use user::{TypedUserColumn, UserColumn, UserComponents};
