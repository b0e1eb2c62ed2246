//! Fetch pipeline: a fixed pool of worker threads draining a shared task queue.
//!
//! Each worker owns one curl handle reused across its tasks. Per task: GET with
//! retry, atomic write, counter update, optional event to an observer.
//! A failed icon never stops the run; a streak of filesystem errors or an
//! abort request stops handing out new tasks.

mod summary;

pub use summary::{RunSummary, SummarySnapshot, MAX_RECORDED_FAILURES};

use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{mpsc, Mutex};

use crate::control::RunControl;
use crate::http::{HttpClient, HttpOptions};
use crate::plan::{DownloadTask, Plan};
use crate::retry::{run_with_retry, FetchError, RetryPolicy};
use crate::storage;

/// Default worker count.
pub const DEFAULT_JOBS: usize = 12;

#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Upper bound on worker threads (clamped to at least 1).
    pub jobs: usize,
    pub retry: RetryPolicy,
    pub http: HttpOptions,
    /// Plan only: no GET, no write, no directory creation.
    pub dry_run: bool,
    /// Stop after this many filesystem errors in a row (None = never).
    pub max_consecutive_fs_errors: Option<u32>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            jobs: DEFAULT_JOBS,
            retry: RetryPolicy::default(),
            http: HttpOptions::default(),
            dry_run: false,
            max_consecutive_fs_errors: Some(10),
        }
    }
}

/// Result of one task as reported to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Written,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEvent {
    pub name: String,
    pub outcome: TaskOutcome,
}

/// Shared state for one pool run.
struct Pool<'a> {
    queue: Mutex<VecDeque<DownloadTask>>,
    opts: &'a FetchOptions,
    summary: &'a RunSummary,
    control: &'a RunControl,
    fs_streak: AtomicU32,
    fs_stop: AtomicBool,
}

impl Pool<'_> {
    fn next_task(&self) -> Option<DownloadTask> {
        if self.control.is_aborted() || self.fs_stop.load(Ordering::Relaxed) {
            return None;
        }
        let mut queue = match self.queue.lock() {
            Ok(q) => q,
            Err(poisoned) => poisoned.into_inner(),
        };
        queue.pop_front()
    }

    fn remaining(&self) -> usize {
        match self.queue.lock() {
            Ok(q) => q.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    fn note_fs_result(&self, failed: bool) {
        if !failed {
            self.fs_streak.store(0, Ordering::Relaxed);
            return;
        }
        let streak = self.fs_streak.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(limit) = self.opts.max_consecutive_fs_errors {
            if streak >= limit && !self.fs_stop.swap(true, Ordering::Relaxed) {
                tracing::error!(streak, "too many consecutive filesystem errors; stopping");
            }
        }
    }

    fn work(&self, mut client: HttpClient, events: Option<mpsc::Sender<TaskEvent>>) {
        while let Some(task) = self.next_task() {
            let outcome = match fetch_one(&mut client, &task, &self.opts.retry) {
                Ok(bytes) => {
                    tracing::debug!(name = %task.name, bytes, "wrote {}", task.target.display());
                    self.note_fs_result(false);
                    self.summary.record_success();
                    TaskOutcome::Written
                }
                Err(e) => {
                    let message = e.to_string();
                    tracing::warn!(name = %task.name, url = %task.url, "fetch failed: {}", message);
                    self.note_fs_result(e.is_storage());
                    self.summary.record_failure(&task.name, &message);
                    TaskOutcome::Failed(message)
                }
            };
            if let Some(tx) = &events {
                let _ = tx.send(TaskEvent {
                    name: task.name,
                    outcome,
                });
            }
        }
    }
}

/// GET (with retry) then atomic write. Returns the number of bytes written.
fn fetch_one(
    client: &mut HttpClient,
    task: &DownloadTask,
    retry: &RetryPolicy,
) -> Result<usize, FetchError> {
    let body = run_with_retry(retry, |_| client.get_ok(&task.url))?;
    storage::write_atomic(&task.target, &body)?;
    Ok(body.len())
}

/// Runs every task in `plan` and records results in `summary`.
///
/// Skipped tasks are only counted. On a dry run nothing is fetched or written.
/// Returns an error only when the HTTP handles cannot be created.
pub fn run_fetch(
    plan: Plan,
    opts: &FetchOptions,
    summary: &RunSummary,
    control: &RunControl,
    events: Option<mpsc::Sender<TaskEvent>>,
) -> Result<()> {
    summary.add_skipped(plan.skipped.len());
    summary.add_planned(plan.tasks.len());

    if opts.dry_run {
        for task in &plan.tasks {
            tracing::debug!(name = %task.name, "dry run: would fetch {} -> {}", task.url, task.target.display());
        }
        return Ok(());
    }
    if plan.tasks.is_empty() {
        return Ok(());
    }

    let workers = opts.jobs.max(1).min(plan.tasks.len());
    let clients = (0..workers)
        .map(|_| HttpClient::new(&opts.http))
        .collect::<Result<Vec<_>, _>>()
        .context("failed to create HTTP client")?;
    tracing::info!(tasks = plan.tasks.len(), workers, "fetching icons");

    let pool = Pool {
        queue: Mutex::new(plan.tasks.into_iter().collect()),
        opts,
        summary,
        control,
        fs_streak: AtomicU32::new(0),
        fs_stop: AtomicBool::new(false),
    };
    std::thread::scope(|scope| {
        for client in clients {
            let pool = &pool;
            let events = events.clone();
            scope.spawn(move || pool.work(client, events));
        }
    });
    drop(events);

    let left = pool.remaining();
    if left > 0 {
        if control.is_aborted() {
            summary.mark_interrupted();
            tracing::warn!(left, "interrupted; remaining icons not fetched");
        } else {
            tracing::warn!(left, "stopped early; remaining icons not fetched");
        }
    }
    Ok(())
}
