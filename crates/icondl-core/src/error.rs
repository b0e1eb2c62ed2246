//! Library error types for the listing phase.
//!
//! Fetch-phase failures never surface here: they are isolated per icon and
//! counted in the run summary.

use std::fmt;
use thiserror::Error;

use crate::retry::FetchError;

/// Fatal errors that stop a run before any icon is downloaded.
#[derive(Debug, Error)]
pub enum IcondlError {
    #[error(
        "cannot infer icon-set prefix from '{input}'; use a prefix like 'fluent' \
         or a set URL such as 'https://icon-sets.iconify.design/fluent/'"
    )]
    InvalidIdentifier { input: String },

    #[error("invalid icon-set JSON in {origin}: {reason}")]
    InvalidJson { origin: String, reason: String },

    #[error("no icon listing available for '{prefix}': {}", join_causes(.causes))]
    ListingUnavailable {
        prefix: String,
        causes: Vec<SourceFailure>,
    },
}

/// Which listing strategy produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingSource {
    OfflineJson,
    Api,
    GitHub,
}

impl fmt::Display for ListingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingSource::OfflineJson => write!(f, "offline JSON"),
            ListingSource::Api => write!(f, "Iconify API"),
            ListingSource::GitHub => write!(f, "GitHub JSON"),
        }
    }
}

/// Why a single listing strategy could not produce a listing.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("response is not JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected shape: {0}")]
    Shape(String),
    #[error("unknown prefix")]
    UnknownPrefix,
    #[error("listing is empty")]
    Empty,
}

/// One entry in the `ListingUnavailable` cause chain.
#[derive(Debug, Error)]
#[error("{origin}: {error}")]
pub struct SourceFailure {
    pub origin: ListingSource,
    #[source]
    pub error: SourceError,
}

fn join_causes(causes: &[SourceFailure]) -> String {
    if causes.is_empty() {
        return "no source tried".to_string();
    }
    causes
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
