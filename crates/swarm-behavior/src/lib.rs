//! `swarm-behavior` — user logic dispatch for `rust_swarm`.
//!
//! Entity "classes" have no inheritance at runtime: a class is a numeric tag
//! plus an entry in a behavior table.  Each frame the host runs two parallel
//! passes over the entity rows:
//!
//! 1. **tick** — the class's [`Behavior::tick`] for every active row, with
//!    read access to the whole store and write access to the row's own
//!    fields.
//! 2. **collision events** — `enter`/`stay`/`exit` callbacks computed by
//!    diffing this frame's overlap set against the previous frame's
//!    ([`PairDiff`]), delivered from each entity's own job.
//!
//! A panic inside user code deactivates the entity and is counted; the frame
//! always completes.

pub mod context;
pub mod events;
pub mod host;
pub mod model;
pub mod noop;
pub mod rngs;

#[cfg(test)]
mod tests;

pub use context::TickContext;
pub use events::{ContactPhase, EventTable, PairDiff};
pub use host::BehaviorHost;
pub use model::Behavior;
pub use noop::NoopBehavior;
pub use rngs::EntityRngs;
