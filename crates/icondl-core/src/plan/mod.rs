//! Download planning: one task per icon, target paths, skip-if-exists.
//!
//! Planning never touches the filesystem beyond `exists` checks, so dry runs
//! share it unchanged.

mod naming;

pub use naming::{category_components, icon_file_name, sanitize_component};

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::endpoints::Endpoints;
use crate::listing::IconListing;

/// Where and under which names icons are written.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub out_dir: PathBuf,
    /// `name.svg` instead of `prefix-name.svg`.
    pub no_prefix: bool,
    /// Nest files in one directory per category (when the listing has categories).
    pub by_category: bool,
}

impl OutputLayout {
    /// `{out_dir}/{category/ if grouping}/{filename}`.
    pub fn target_path(&self, listing: &IconListing, name: &str) -> PathBuf {
        let mut path = self.out_dir.clone();
        if self.by_category {
            if let Some(label) = listing.category_of(name) {
                for component in category_components(label) {
                    path.push(component);
                }
            }
        }
        path.push(icon_file_name(
            listing.prefix().as_str(),
            name,
            self.no_prefix,
        ));
        path
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlanOptions {
    /// Requested rendered height in pixels.
    pub size: Option<u32>,
    pub overwrite: bool,
}

/// One icon to fetch: name, source URL and destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub name: String,
    pub url: String,
    pub target: PathBuf,
}

/// Tasks to run plus tasks skipped because their target already exists or
/// was already claimed by an earlier icon. Every listed icon lands in exactly one.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub tasks: Vec<DownloadTask>,
    pub skipped: Vec<DownloadTask>,
}

/// Builds the download plan for every icon in `listing`.
pub fn plan_downloads(
    listing: &IconListing,
    layout: &OutputLayout,
    endpoints: &Endpoints,
    opts: PlanOptions,
) -> Plan {
    if layout.by_category && !listing.has_categories() {
        tracing::warn!(
            "set {} has no category data; writing files without category folders",
            listing.prefix()
        );
    }

    let mut plan = Plan::default();
    let mut seen = BTreeSet::new();
    for name in listing.names() {
        let target = layout.target_path(listing, name);
        let duplicate = !seen.insert(target.clone());
        let task = DownloadTask {
            name: name.clone(),
            url: endpoints
                .icon_svg(listing.prefix(), name, opts.size)
                .to_string(),
            target,
        };
        if duplicate {
            tracing::warn!(name = %name, "target {} already planned for another icon; skipping", task.target.display());
            plan.skipped.push(task);
        } else if !opts.overwrite && task.target.exists() {
            plan.skipped.push(task);
        } else {
            plan.tasks.push(task);
        }
    }

    tracing::debug!(
        to_fetch = plan.tasks.len(),
        already_present = plan.skipped.len(),
        "download plan built"
    );
    plan
}
