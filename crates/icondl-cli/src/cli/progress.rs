//! Progress bar fed by fetch-pipeline events.

use icondl_core::pipeline::{TaskEvent, TaskOutcome};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::mpsc::Receiver;
use std::thread::JoinHandle;

/// Consumes events until every sender is dropped, then clears the bar.
/// The bar draws to stderr and hides itself when stderr is not a terminal.
pub fn spawn_progress(total: usize, events: Receiver<TaskEvent>) -> JoinHandle<()> {
    let bar = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr());
    let style = ProgressStyle::with_template("[{elapsed_precise}] {wide_bar} {pos}/{len} ({eta}) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    bar.set_style(style);

    std::thread::spawn(move || {
        let mut failed = 0usize;
        for event in events {
            if let TaskOutcome::Failed(_) = event.outcome {
                failed += 1;
                bar.set_message(format!("{} failed", failed));
            }
            bar.inc(1);
        }
        bar.finish_and_clear();
    })
}
