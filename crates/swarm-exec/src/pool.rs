//! The worker pool and phase barrier.
//!
//! # Per-phase protocol
//!
//! 1. The orchestrator resets the job queue and done counter, publishes the
//!    participant count, and bumps the gate generation (one mutex write +
//!    `notify_all`).
//! 2. Workers wake, claim jobs by fetch-add until the queue is exhausted,
//!    then increment `done` once.
//! 3. Whoever brings `done` up to the participant count records the
//!    generation as completed and wakes the orchestrator.
//! 4. The orchestrator returns from `run_phase` only when the generation is
//!    recorded — that release/acquire edge is what makes every phase-`p`
//!    write visible to every phase-`p+1` read.
//!
//! The orchestrator thread itself participates when configured to steal (or
//! always, with zero workers).  While the host reports the main thread
//! inactive, it is excluded from the participant count so workers never wait
//! on it.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::JoinHandle;

use swarm_core::{CoreError, CoreResult, LogicConfig, StealConfig};

use crate::phase::Phase;
use crate::queue::JobQueue;

/// The work a phase performs on one claimed row range.
///
/// `worker` is the claiming thread's index, or [`MAIN_THREAD`] when the
/// orchestrator claimed the job itself.
pub trait PhaseRunner: Send + Sync + 'static {
    fn run_range(&self, phase: Phase, range: Range<u32>, worker: usize);
}

/// Sentinel worker index for jobs the orchestrator ran itself.
pub const MAIN_THREAD: usize = usize::MAX;

/// Lock, tolerating poisoning: a panicking worker is already isolated at the
/// behavior layer, and the gate state it may have held is a pair of plain
/// integers that are always valid.
fn lock_gate<'a, T>(mutex: &'a Mutex<T>) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

struct GateState {
    generation: u64,
    phase: Phase,
}

struct PoolShared {
    queue: JobQueue,
    gate: Mutex<GateState>,
    gate_cvar: Condvar,
    /// Workers that finished claiming for the current generation.
    done: AtomicU32,
    /// Workers (plus optionally the main thread) expected this generation.
    participants: AtomicU32,
    /// Highest generation whose phase has fully completed.
    completed: Mutex<u64>,
    done_cvar: Condvar,
    stop: AtomicBool,
    runner: Arc<dyn PhaseRunner>,
}

impl PoolShared {
    /// Count one participant as finished; the last one records completion.
    fn participant_done(&self, generation: u64) {
        let finished = self.done.fetch_add(1, Ordering::AcqRel) + 1;
        if finished >= self.participants.load(Ordering::Acquire) {
            let mut completed = lock_gate(&self.completed);
            if *completed < generation {
                *completed = generation;
            }
            self.done_cvar.notify_all();
        }
    }
}

/// Fixed set of worker threads driving the per-frame phases.
pub struct WorkerPool {
    shared: Arc<PoolShared>,
    handles: Vec<JoinHandle<()>>,
    steal: StealConfig,
    main_active: AtomicBool,
    /// Orchestrator-local phase generation counter.
    generation: u64,
}

impl WorkerPool {
    /// Spawn `logic.workers` threads over `rows` entity rows.
    pub fn spawn(
        runner: Arc<dyn PhaseRunner>,
        rows: usize,
        logic: &LogicConfig,
    ) -> CoreResult<Self> {
        let shared = Arc::new(PoolShared {
            queue: JobQueue::new(rows, logic.entities_per_job),
            gate: Mutex::new(GateState { generation: 0, phase: Phase::GridInsert }),
            gate_cvar: Condvar::new(),
            done: AtomicU32::new(0),
            participants: AtomicU32::new(0),
            completed: Mutex::new(0),
            done_cvar: Condvar::new(),
            stop: AtomicBool::new(false),
            runner,
        });

        let mut handles = Vec::with_capacity(logic.workers);
        for idx in 0..logic.workers {
            let shared = Arc::clone(&shared);
            let handle = std::thread::Builder::new()
                .name(format!("swarm-wkr-{idx}"))
                .spawn(move || worker_loop(shared, idx))
                .map_err(CoreError::Io)?;
            handles.push(handle);
        }
        tracing::debug!(workers = handles.len(), jobs = shared.queue.total_jobs(), "worker pool up");

        Ok(Self {
            shared,
            handles,
            steal: logic.main_thread_job_stealing,
            main_active: AtomicBool::new(true),
            generation: 0,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    pub fn total_jobs(&self) -> u32 {
        self.shared.queue.total_jobs()
    }

    /// Host visibility hook: while `false`, the main thread is excluded from
    /// the participant count and claims no jobs.
    pub fn set_main_thread_active(&self, active: bool) {
        self.main_active.store(active, Ordering::Relaxed);
    }

    pub fn main_thread_active(&self) -> bool {
        self.main_active.load(Ordering::Relaxed)
    }

    /// Run one phase to completion across the pool (and possibly the calling
    /// thread).  Returns when every job has been processed exactly once and
    /// every participant has signalled — the frame's barrier.
    pub fn run_phase(&mut self, phase: Phase) {
        let threads = self.handles.len() as u32;
        let main_participates =
            threads == 0 || (self.steal.enabled && self.main_active.load(Ordering::Relaxed));
        let participants = threads + u32::from(main_participates);

        self.shared.done.store(0, Ordering::Release);
        self.shared.participants.store(participants, Ordering::Release);
        self.shared.queue.reset();

        self.generation += 1;
        let generation = self.generation;
        {
            let mut gate = lock_gate(&self.shared.gate);
            gate.generation = generation;
            gate.phase = phase;
        }
        self.shared.gate_cvar.notify_all();

        if main_participates {
            // With no workers the main thread must drain everything; when
            // stealing it stops at the configured cap and lets workers finish.
            let cap = if threads == 0 {
                u32::MAX as usize
            } else {
                self.steal.max_jobs_per_frame
            };
            let mut claimed = 0;
            while claimed < cap {
                match self.shared.queue.claim() {
                    Some(range) => {
                        self.shared.runner.run_range(phase, range, MAIN_THREAD);
                        claimed += 1;
                    }
                    None => break,
                }
            }
            self.shared.participant_done(generation);
        }

        let mut completed = lock_gate(&self.shared.completed);
        while *completed < generation {
            completed = match self.shared.done_cvar.wait(completed) {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shared.stop.store(true, Ordering::Release);
        {
            let mut gate = lock_gate(&self.shared.gate);
            gate.generation += 1;
        }
        self.shared.gate_cvar.notify_all();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
        tracing::debug!("worker pool down");
    }
}

fn worker_loop(shared: Arc<PoolShared>, idx: usize) {
    tracing::trace!(worker = idx, "worker thread started");
    let mut seen = 0u64;
    loop {
        let (generation, phase) = {
            let mut gate = lock_gate(&shared.gate);
            while gate.generation == seen && !shared.stop.load(Ordering::Acquire) {
                gate = match shared.gate_cvar.wait(gate) {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
            }
            if shared.stop.load(Ordering::Acquire) {
                break;
            }
            (gate.generation, gate.phase)
        };
        seen = generation;

        while let Some(range) = shared.queue.claim() {
            shared.runner.run_range(phase, range, idx);
        }
        shared.participant_done(generation);
    }
    tracing::trace!(worker = idx, "worker thread exiting");
}
