//! The download run: resolve, list, filter, plan, fetch, finalize.

use anyhow::{Context, Result};
use icondl_core::config::IcondlConfig;
use icondl_core::control::RunControl;
use icondl_core::endpoints::Endpoints;
use icondl_core::finalize::{self, FinalizeOptions, EXIT_OK};
use icondl_core::listing::{resolve_listing, ListingRequest};
use icondl_core::pipeline::{run_fetch, FetchOptions, RunSummary};
use icondl_core::plan::{plan_downloads, OutputLayout, PlanOptions};
use icondl_core::resolver::resolve_prefix;
use std::sync::{mpsc, Arc};

use super::progress::spawn_progress;
use super::Cli;

/// Exit code when a second interrupt ends the process without waiting (128 + SIGINT).
pub const EXIT_INTERRUPTED: i32 = 130;

/// What to do on the `count`-th Ctrl-C: the first asks workers to stop taking
/// tasks, any later one returns the code to exit with immediately.
pub(super) fn on_interrupt(count: u32, control: &RunControl) -> Option<i32> {
    if count <= 1 {
        control.request_abort();
        None
    } else {
        Some(EXIT_INTERRUPTED)
    }
}

pub async fn run_download(cli: Cli, cfg: IcondlConfig) -> Result<i32> {
    let prefix = resolve_prefix(&cli.prefix_or_url)?;
    let endpoints = Endpoints::from_config(&cfg)?;
    let http = cfg.http_options();
    let retry = cfg.retry_policy();
    tracing::info!(prefix = %prefix, input = %cli.prefix_or_url, "resolved set prefix");

    let listing = {
        let prefix = prefix.clone();
        let endpoints = endpoints.clone();
        let http = http.clone();
        let offline = cli.json.clone();
        tokio::task::spawn_blocking(move || {
            let req = ListingRequest {
                prefix: &prefix,
                offline_json: offline.as_deref(),
            };
            resolve_listing(&req, &endpoints, &http, &retry)
        })
        .await
        .context("listing task panicked")??
    };

    let filtered = cli.filter().apply(&listing);
    println!(
        "{}: {} icons listed, {} selected",
        prefix,
        listing.len(),
        filtered.len()
    );
    if filtered.is_empty() {
        tracing::warn!(prefix = %prefix, "no icons match the given filters");
        let empty = RunSummary::new(cli.dry_run).snapshot();
        println!("Nothing to download: {}", finalize::report_line(&empty));
        return Ok(EXIT_OK);
    }

    let layout = OutputLayout {
        out_dir: cli.out.clone(),
        no_prefix: cli.no_prefix,
        by_category: cli.by_category,
    };
    let plan = plan_downloads(
        &filtered,
        &layout,
        &endpoints,
        PlanOptions {
            size: cli.size,
            overwrite: cli.overwrite(),
        },
    );

    let opts = FetchOptions {
        jobs: cli.jobs(&cfg),
        retry,
        http,
        dry_run: cli.dry_run,
        max_consecutive_fs_errors: cfg.max_consecutive_fs_errors,
    };
    let summary = Arc::new(RunSummary::new(cli.dry_run));
    let control = RunControl::new();

    let signal_task = {
        let control = control.clone();
        tokio::spawn(async move {
            let mut count = 0u32;
            while tokio::signal::ctrl_c().await.is_ok() {
                count += 1;
                match on_interrupt(count, &control) {
                    None => eprintln!(
                        "Interrupted: finishing downloads in progress (Ctrl-C again to quit now)..."
                    ),
                    Some(code) => {
                        eprintln!("Interrupted again: exiting without waiting.");
                        std::process::exit(code);
                    }
                }
            }
        })
    };

    let (events, progress) = if cli.dry_run || plan.tasks.is_empty() {
        (None, None)
    } else {
        let (tx, rx) = mpsc::channel();
        (Some(tx), Some(spawn_progress(plan.tasks.len(), rx)))
    };

    let fetch_result = {
        let summary = Arc::clone(&summary);
        let control = control.clone();
        tokio::task::spawn_blocking(move || run_fetch(plan, &opts, &summary, &control, events))
            .await
            .context("fetch task panicked")?
    };
    if let Some(handle) = progress {
        let _ = handle.join();
    }
    signal_task.abort();
    fetch_result?;

    let snapshot = summary.snapshot();
    let fin_opts = FinalizeOptions {
        zip: cli.zip.clone(),
        license: cli.license,
    };
    let out_dir = cli.out.clone();
    let fin_snapshot = snapshot.clone();
    let report = tokio::task::spawn_blocking(move || {
        finalize::finalize(&out_dir, &filtered, &fin_snapshot, &fin_opts)
    })
    .await
    .context("finalize task panicked")??;

    println!("{}", finalize::report_line(&snapshot));
    for failure in &snapshot.failures {
        eprintln!("  failed: {}", failure);
    }
    if snapshot.failed > snapshot.failures.len() {
        eprintln!("  ... and {} more (see log)", snapshot.failed - snapshot.failures.len());
    }
    if let Some(path) = &report.license {
        println!("License notice: {}", path.display());
    }
    if let Some(path) = &report.archive {
        println!("Zipped to {}", path.display());
    }

    Ok(finalize::exit_code(&snapshot, cli.fail_on_partial(&cfg)))
}
