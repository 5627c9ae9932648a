//! The shared job queue.
//!
//! The entity row space `[0, N)` is cut into fixed `[start, end)` ranges of
//! `entities_per_job` rows.  Claiming is one fetch-add on `next`: the
//! returned job index maps straight to a range, every index is handed out
//! exactly once per reset, and there is nothing else to contend on.

use std::ops::Range;
use std::sync::atomic::{AtomicU32, Ordering};

/// Fetch-add job dispenser over a fixed row range.
pub struct JobQueue {
    /// Total entity rows (N).
    rows: u32,
    /// Rows per job.
    per_job: u32,
    /// Number of jobs: `⌈rows / per_job⌉`.
    jobs: u32,
    /// Next unclaimed job index.
    next: AtomicU32,
}

impl JobQueue {
    pub fn new(rows: usize, entities_per_job: usize) -> Self {
        let rows = rows as u32;
        let per_job = (entities_per_job as u32).max(1);
        Self {
            rows,
            per_job,
            jobs: rows.div_ceil(per_job),
            next: AtomicU32::new(0),
        }
    }

    /// Total jobs per phase.
    #[inline(always)]
    pub fn total_jobs(&self) -> u32 {
        self.jobs
    }

    /// Rearm the dispenser for the next phase.  Orchestrator-only.
    pub fn reset(&self) {
        self.next.store(0, Ordering::Release);
    }

    /// Claim the next job.  Returns its row range, or `None` when the phase's
    /// jobs are exhausted.
    #[inline]
    pub fn claim(&self) -> Option<Range<u32>> {
        let job = self.next.fetch_add(1, Ordering::AcqRel);
        if job >= self.jobs {
            return None;
        }
        let start = job * self.per_job;
        let end = (start + self.per_job).min(self.rows);
        Some(start..end)
    }
}
