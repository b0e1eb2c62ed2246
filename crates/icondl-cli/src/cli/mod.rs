//! CLI for icondl: download an Iconify icon set as individual SVG files.

mod fetch;
mod progress;

use anyhow::Result;
use clap::Parser;
use icondl_core::config::{self, IcondlConfig};
use icondl_core::filter::FilterConfig;
use std::path::PathBuf;

/// Download an Iconify icon set as individual SVGs.
#[derive(Debug, Parser)]
#[command(name = "icondl", version)]
#[command(about = "Bulk-download an Iconify icon set as SVG files", long_about = None)]
pub struct Cli {
    /// Set prefix (e.g. `tabler`) or a URL whose path names the set.
    #[arg(value_name = "PREFIX_OR_URL")]
    pub prefix_or_url: String,

    /// Output directory.
    #[arg(short = 'o', long = "out", value_name = "DIR", default_value = "./iconify_svgs")]
    pub out: PathBuf,

    /// Comma-separated exact icon names to keep.
    #[arg(long, value_name = "CSV")]
    pub include: Option<String>,

    /// Comma-separated exact icon names to drop.
    #[arg(long, value_name = "CSV")]
    pub exclude: Option<String>,

    /// Keep only names containing this substring (case-sensitive).
    #[arg(long, value_name = "SUBSTR")]
    pub contains: Option<String>,

    /// Concurrent downloads (default from config, 12).
    #[arg(short = 'j', long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub jobs: Option<u32>,

    /// Rendered icon height in pixels.
    #[arg(long, value_name = "PX", value_parser = clap::value_parser!(u32).range(1..))]
    pub size: Option<u32>,

    /// Re-download icons whose file already exists.
    #[arg(long, overrides_with = "no_overwrite")]
    pub overwrite: bool,

    /// Skip icons whose file already exists (default).
    #[arg(long = "no-overwrite", overrides_with = "overwrite")]
    pub no_overwrite: bool,

    /// Verbose logging to stderr.
    #[arg(long)]
    pub debug: bool,

    /// Read the icon list from a local icon-set JSON file instead of the network.
    #[arg(long = "json", value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Name files `name.svg` instead of `prefix-name.svg`.
    #[arg(long)]
    pub no_prefix: bool,

    /// Put icons in one folder per category when the set has categories.
    #[arg(long)]
    pub by_category: bool,

    /// Zip the output directory to this path when done (`.zip` appended if missing).
    #[arg(long, value_name = "PATH")]
    pub zip: Option<PathBuf>,

    /// Show what would be downloaded without fetching or writing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Write LICENSE.txt from the set's license info.
    #[arg(long)]
    pub license: bool,

    /// Exit non-zero if any icon failed to download.
    #[arg(long)]
    pub fail_on_partial: bool,
}

impl Cli {
    /// Overwrite existing files? `--no-overwrite` wins unless `--overwrite` came last.
    pub fn overwrite(&self) -> bool {
        self.overwrite && !self.no_overwrite
    }

    pub fn filter(&self) -> FilterConfig {
        FilterConfig::from_args(
            self.include.as_deref(),
            self.exclude.as_deref(),
            self.contains.as_deref(),
        )
    }

    pub fn jobs(&self, cfg: &IcondlConfig) -> usize {
        self.jobs.map(|j| j as usize).unwrap_or(cfg.jobs).max(1)
    }

    pub fn fail_on_partial(&self, cfg: &IcondlConfig) -> bool {
        self.fail_on_partial || cfg.fail_on_partial
    }

    /// Loads config and runs the download. Returns the process exit code.
    pub async fn run(self) -> Result<i32> {
        let cfg = match config::load_or_init() {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!("using default config: {:#}", e);
                IcondlConfig::default()
            }
        };
        tracing::debug!("loaded config: {:?}", cfg);
        fetch::run_download(self, cfg).await
    }
}

#[cfg(test)]
mod tests;
