//! Unit tests for swarm-exec.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use swarm_core::{LogicConfig, StealConfig};

use crate::phase::Phase;
use crate::pool::{PhaseRunner, WorkerPool, MAIN_THREAD};
use crate::queue::JobQueue;

/// Counts, per row, how many times each phase touched it; also records how
/// many jobs the main thread claimed.
struct CountingRunner {
    touches: Vec<AtomicU32>,
    main_jobs: AtomicUsize,
    /// Set during `NeighborQuery` if some row had not been touched by
    /// `GridInsert` first — a barrier violation.
    order_violations: AtomicUsize,
}

impl CountingRunner {
    fn new(rows: usize) -> Self {
        Self {
            touches: (0..rows).map(|_| AtomicU32::new(0)).collect(),
            main_jobs: AtomicUsize::new(0),
            order_violations: AtomicUsize::new(0),
        }
    }
}

impl PhaseRunner for CountingRunner {
    fn run_range(&self, phase: Phase, range: std::ops::Range<u32>, worker: usize) {
        if worker == MAIN_THREAD {
            self.main_jobs.fetch_add(1, Ordering::Relaxed);
        }
        for row in range {
            match phase {
                Phase::GridInsert => {
                    self.touches[row as usize].fetch_add(1, Ordering::Relaxed);
                }
                Phase::NeighborQuery => {
                    // Every row must already carry the insert phase's write.
                    if self.touches[row as usize].load(Ordering::Relaxed) == 0 {
                        self.order_violations.fetch_add(1, Ordering::Relaxed);
                    }
                }
                _ => {}
            }
        }
    }
}

fn logic(workers: usize, steal: StealConfig) -> LogicConfig {
    LogicConfig { workers, entities_per_job: 16, main_thread_job_stealing: steal }
}

#[cfg(test)]
mod queue {
    use super::*;

    #[test]
    fn job_count_rounds_up() {
        assert_eq!(JobQueue::new(100, 16).total_jobs(), 7);
        assert_eq!(JobQueue::new(96, 16).total_jobs(), 6);
        assert_eq!(JobQueue::new(0, 16).total_jobs(), 0);
    }

    #[test]
    fn claims_cover_rows_exactly_once() {
        let queue = JobQueue::new(100, 16);
        let mut seen = vec![0u32; 100];
        while let Some(range) = queue.claim() {
            for row in range {
                seen[row as usize] += 1;
            }
        }
        assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn reset_rearms() {
        let queue = JobQueue::new(32, 16);
        assert!(queue.claim().is_some());
        while queue.claim().is_some() {}
        assert!(queue.claim().is_none());
        queue.reset();
        assert!(queue.claim().is_some());
    }

    #[test]
    fn concurrent_claims_are_disjoint_and_complete() {
        let queue = Arc::new(JobQueue::new(10_000, 7));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let queue = Arc::clone(&queue);
                std::thread::spawn(move || {
                    let mut rows = Vec::new();
                    while let Some(range) = queue.claim() {
                        rows.extend(range);
                    }
                    rows
                })
            })
            .collect();
        let mut all: Vec<u32> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        all.sort_unstable();
        assert_eq!(all.len(), 10_000, "every row claimed");
        all.dedup();
        assert_eq!(all.len(), 10_000, "no row claimed twice");
    }
}

#[cfg(test)]
mod pool {
    use super::*;

    fn run_two_phases(workers: usize, steal: StealConfig, rows: usize) -> Arc<CountingRunner> {
        let runner = Arc::new(CountingRunner::new(rows));
        let mut pool =
            WorkerPool::spawn(runner.clone(), rows, &logic(workers, steal)).unwrap();
        pool.run_phase(Phase::GridInsert);
        pool.run_phase(Phase::NeighborQuery);
        runner
    }

    #[test]
    fn every_row_processed_exactly_once_per_phase() {
        for workers in [0, 1, 2, 4] {
            for steal in [
                StealConfig { enabled: false, max_jobs_per_frame: 0 },
                StealConfig { enabled: true, max_jobs_per_frame: 8 },
            ] {
                let runner = run_two_phases(workers, steal, 1000);
                for (row, cell) in runner.touches.iter().enumerate() {
                    assert_eq!(
                        cell.load(Ordering::Relaxed),
                        1,
                        "row {row} touched wrong count (workers={workers})"
                    );
                }
            }
        }
    }

    #[test]
    fn phase_barrier_orders_writes() {
        for workers in [1, 2, 4] {
            let runner = run_two_phases(workers, StealConfig::default(), 2000);
            assert_eq!(
                runner.order_violations.load(Ordering::Relaxed),
                0,
                "phase p+1 observed missing phase p writes (workers={workers})"
            );
        }
    }

    #[test]
    fn zero_workers_runs_on_main_thread() {
        let runner = run_two_phases(0, StealConfig { enabled: false, max_jobs_per_frame: 0 }, 100);
        assert!(runner.main_jobs.load(Ordering::Relaxed) > 0);
        assert!(runner.touches.iter().all(|c| c.load(Ordering::Relaxed) == 1));
    }

    #[test]
    fn steal_cap_limits_main_thread_jobs() {
        let rows = 1600; // 100 jobs of 16
        let runner = Arc::new(CountingRunner::new(rows));
        let steal = StealConfig { enabled: true, max_jobs_per_frame: 3 };
        let mut pool = WorkerPool::spawn(runner.clone(), rows, &logic(2, steal)).unwrap();
        pool.run_phase(Phase::GridInsert);
        assert!(runner.main_jobs.load(Ordering::Relaxed) <= 3);
        assert!(runner.touches.iter().all(|c| c.load(Ordering::Relaxed) == 1));
    }

    #[test]
    fn inactive_main_thread_claims_nothing() {
        let rows = 320;
        let runner = Arc::new(CountingRunner::new(rows));
        let steal = StealConfig { enabled: true, max_jobs_per_frame: 100 };
        let mut pool = WorkerPool::spawn(runner.clone(), rows, &logic(2, steal)).unwrap();
        pool.set_main_thread_active(false);
        pool.run_phase(Phase::GridInsert);
        assert_eq!(runner.main_jobs.load(Ordering::Relaxed), 0);
        assert!(runner.touches.iter().all(|c| c.load(Ordering::Relaxed) == 1));
    }

    #[test]
    fn many_phases_many_frames() {
        let rows = 512;
        let runner = Arc::new(CountingRunner::new(rows));
        let mut pool = WorkerPool::spawn(
            runner.clone(),
            rows,
            &logic(3, StealConfig { enabled: true, max_jobs_per_frame: 2 }),
        )
        .unwrap();
        // 20 frames of the full 7-phase pipeline; only the two counted phases
        // touch the counters.
        for _ in 0..20 {
            for phase in Phase::ALL {
                pool.run_phase(phase);
            }
        }
        for cell in runner.touches.iter() {
            assert_eq!(cell.load(Ordering::Relaxed), 20);
        }
    }

    #[test]
    fn drop_joins_workers() {
        let runner = Arc::new(CountingRunner::new(64));
        let pool = WorkerPool::spawn(runner, 64, &logic(4, StealConfig::default())).unwrap();
        drop(pool); // must not hang
    }
}
