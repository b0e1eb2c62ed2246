//! Run counters shared by all fetch workers.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Failure messages kept for the final report; the counter still counts all.
pub const MAX_RECORDED_FAILURES: usize = 20;

/// Concurrently updated totals for one run. Read once via [`RunSummary::snapshot`].
#[derive(Debug)]
pub struct RunSummary {
    started: Instant,
    dry_run: bool,
    planned: AtomicUsize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
    skipped: AtomicUsize,
    interrupted: AtomicBool,
    failures: Mutex<Vec<String>>,
}

impl RunSummary {
    pub fn new(dry_run: bool) -> Self {
        Self {
            started: Instant::now(),
            dry_run,
            planned: AtomicUsize::new(0),
            succeeded: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
            interrupted: AtomicBool::new(false),
            failures: Mutex::new(Vec::new()),
        }
    }

    pub fn add_planned(&self, n: usize) {
        self.planned.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_skipped(&self, n: usize) {
        self.skipped.fetch_add(n, Ordering::Relaxed);
    }

    pub fn record_success(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self, name: &str, message: &str) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        let mut failures = match self.failures.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        if failures.len() < MAX_RECORDED_FAILURES {
            failures.push(format!("{}: {}", name, message));
        }
    }

    pub fn mark_interrupted(&self) {
        self.interrupted.store(true, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SummarySnapshot {
        let failures = match self.failures.lock() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        let succeeded = self.succeeded.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        SummarySnapshot {
            planned: self.planned.load(Ordering::Relaxed),
            attempted: succeeded + failed,
            succeeded,
            failed,
            skipped: self.skipped.load(Ordering::Relaxed),
            elapsed: self.started.elapsed(),
            dry_run: self.dry_run,
            interrupted: self.interrupted.load(Ordering::Relaxed),
            failures,
        }
    }
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, PartialEq)]
pub struct SummarySnapshot {
    /// Tasks queued for fetching (would-be fetches on a dry run).
    pub planned: usize,
    /// Always `succeeded + failed`.
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Targets that already existed or were claimed by another icon.
    pub skipped: usize,
    pub elapsed: Duration,
    pub dry_run: bool,
    pub interrupted: bool,
    /// First [`MAX_RECORDED_FAILURES`] failures as `name: reason`.
    pub failures: Vec<String>,
}

impl SummarySnapshot {
    /// Planned tasks that were never attempted (interrupt or early stop).
    pub fn not_attempted(&self) -> usize {
        if self.dry_run {
            return 0;
        }
        self.planned.saturating_sub(self.attempted)
    }
}
