//! `swarm-exec` — the job scheduler that turns a frame into barrier-gated
//! parallel phases.
//!
//! # Model
//!
//! One shared [`JobQueue`] slices the entity row space into fixed ranges.
//! Per phase, every participant (worker threads, plus the orchestrator when
//! it steals) claims ranges via a single fetch-add until the queue is empty,
//! then signals the done-gate.  The orchestrator blocks on the gate before
//! starting the next phase, which gives the whole pipeline its ordering
//! guarantee: phase-`p` writes happen-before phase-`p+1` reads.
//!
//! There is no cancellation inside a phase.  Pause and shutdown are observed
//! between phases by whoever drives [`WorkerPool::run_phase`].

pub mod phase;
pub mod pool;
pub mod queue;

#[cfg(test)]
mod tests;

pub use phase::{Phase, PHASE_COUNT};
pub use pool::{PhaseRunner, WorkerPool, MAIN_THREAD};
pub use queue::JobQueue;
