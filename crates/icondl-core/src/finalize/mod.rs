//! After the fetch: license notice, zip archive, summary report, exit code.

mod archive;
mod license;

pub use archive::{archive_path, zip_output_dir};
pub use license::{license_notice, write_license, LICENSE_FILE_NAME};

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::listing::IconListing;
use crate::pipeline::SummarySnapshot;

/// Run finished (failed icons are allowed unless `fail_on_partial`).
pub const EXIT_OK: i32 = 0;
/// Invalid identifier, listing unavailable or another fatal error.
pub const EXIT_FAILURE: i32 = 1;
/// Some icons failed and `fail_on_partial` is set.
pub const EXIT_PARTIAL: i32 = 3;

#[derive(Debug, Clone, Default)]
pub struct FinalizeOptions {
    pub zip: Option<PathBuf>,
    pub license: bool,
}

/// Files produced by [`finalize`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalizeReport {
    pub license: Option<PathBuf>,
    pub archive: Option<PathBuf>,
}

/// Writes the license notice (if requested) and then the archive (if requested
/// and at least one icon was written in this run). Dry runs only log.
pub fn finalize(
    out_dir: &Path,
    listing: &IconListing,
    snapshot: &SummarySnapshot,
    opts: &FinalizeOptions,
) -> Result<FinalizeReport> {
    let mut report = FinalizeReport::default();
    if snapshot.dry_run {
        if opts.license {
            tracing::info!("dry run: would write {}", out_dir.join(LICENSE_FILE_NAME).display());
        }
        if let Some(zip) = &opts.zip {
            tracing::info!("dry run: would zip {} to {}", out_dir.display(), archive_path(zip).display());
        }
        return Ok(report);
    }

    if opts.license {
        report.license = write_license(out_dir, listing.prefix().as_str(), listing.info())?;
    }
    if let Some(zip) = &opts.zip {
        if snapshot.succeeded > 0 {
            let (path, _) = zip_output_dir(out_dir, zip)?;
            report.archive = Some(path);
        } else {
            tracing::info!("no icons written in this run; skipping zip");
        }
    }
    Ok(report)
}

/// One-line summary for the end of a run.
pub fn report_line(snapshot: &SummarySnapshot) -> String {
    let elapsed = snapshot.elapsed.as_secs_f64();
    if snapshot.dry_run {
        return format!(
            "dry run: would fetch {}, skipped {} (already present), elapsed {:.2}s",
            snapshot.planned, snapshot.skipped, elapsed
        );
    }
    let mut line = format!(
        "attempted {}, succeeded {}, skipped {}, failed {}, elapsed {:.2}s",
        snapshot.attempted, snapshot.succeeded, snapshot.skipped, snapshot.failed, elapsed
    );
    let left = snapshot.not_attempted();
    if left > 0 {
        line.push_str(&format!(
            " ({} not attempted{})",
            left,
            if snapshot.interrupted { ", interrupted" } else { "" }
        ));
    }
    line
}

/// Process exit code for a completed run.
pub fn exit_code(snapshot: &SummarySnapshot, fail_on_partial: bool) -> i32 {
    if fail_on_partial && (snapshot.failed > 0 || snapshot.not_attempted() > 0) {
        EXIT_PARTIAL
    } else {
        EXIT_OK
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn snapshot(succeeded: usize, failed: usize) -> SummarySnapshot {
        SummarySnapshot {
            planned: succeeded + failed,
            attempted: succeeded + failed,
            succeeded,
            failed,
            skipped: 0,
            elapsed: Duration::from_millis(1500),
            dry_run: false,
            interrupted: false,
            failures: Vec::new(),
        }
    }

    #[test]
    fn partial_failure_exit_code() {
        assert_eq!(exit_code(&snapshot(2, 1), false), EXIT_OK);
        assert_eq!(exit_code(&snapshot(2, 1), true), EXIT_PARTIAL);
        assert_eq!(exit_code(&snapshot(3, 0), true), EXIT_OK);
    }

    #[test]
    fn report_lists_all_counts() {
        let line = report_line(&snapshot(2, 1));
        assert_eq!(line, "attempted 3, succeeded 2, skipped 0, failed 1, elapsed 1.50s");
        let mut s = snapshot(1, 0);
        s.planned = 4;
        s.interrupted = true;
        assert!(report_line(&s).ends_with("(3 not attempted, interrupted)"));
    }

    #[test]
    fn dry_run_report_and_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let mut s = snapshot(0, 0);
        s.dry_run = true;
        s.planned = 5;
        assert!(report_line(&s).starts_with("dry run: would fetch 5"));

        let listing = IconListing::new(
            crate::resolver::SetPrefix::parse("tabler").unwrap(),
            ["a".to_string()],
            Default::default(),
            None,
        );
        let opts = FinalizeOptions {
            zip: Some(dir.path().join("out.zip")),
            license: true,
        };
        let report = finalize(&out, &listing, &s, &opts).unwrap();
        assert_eq!(report, FinalizeReport::default());
        assert!(!out.exists());
        assert!(!dir.path().join("out.zip").exists());
    }

    #[test]
    fn zip_skipped_when_nothing_written() {
        let dir = tempfile::tempdir().unwrap();
        let listing = IconListing::new(
            crate::resolver::SetPrefix::parse("tabler").unwrap(),
            ["a".to_string()],
            Default::default(),
            None,
        );
        let opts = FinalizeOptions {
            zip: Some(dir.path().join("icons.zip")),
            license: false,
        };
        let report = finalize(dir.path(), &listing, &snapshot(0, 1), &opts).unwrap();
        assert!(report.archive.is_none());
        assert!(!dir.path().join("icons.zip").exists());
    }
}
