//! Ordered listing strategies: offline file, else API then GitHub set JSON.

use serde_json::Value;
use std::fs;
use std::path::Path;

use super::parse::{parse_api_collection, parse_icon_set};
use super::IconListing;
use crate::endpoints::Endpoints;
use crate::error::{IcondlError, ListingSource, SourceError, SourceFailure};
use crate::http::{HttpClient, HttpOptions};
use crate::resolver::SetPrefix;
use crate::retry::{run_with_retry, FetchError, RetryPolicy};

/// What to list and where an offline definition lives, if any.
#[derive(Debug, Clone, Copy)]
pub struct ListingRequest<'a> {
    pub prefix: &'a SetPrefix,
    /// When set, this file is the only source and no network call is made.
    pub offline_json: Option<&'a Path>,
}

struct NetworkContext<'a> {
    client: HttpClient,
    endpoints: &'a Endpoints,
    retry: RetryPolicy,
}

impl NetworkContext<'_> {
    fn get(&mut self, url: &str) -> Result<Vec<u8>, FetchError> {
        let client = &mut self.client;
        run_with_retry(&self.retry, |_| client.get_ok(url))
    }
}

type Strategy = fn(&mut NetworkContext<'_>, &SetPrefix) -> Result<IconListing, SourceError>;

/// Network sources in the order they are tried.
fn network_strategies() -> [(ListingSource, Strategy); 2] {
    [
        (ListingSource::Api, list_from_api as Strategy),
        (ListingSource::GitHub, list_from_github as Strategy),
    ]
}

/// Resolves the icon listing for `req.prefix`.
///
/// With an offline file, parses only that file (`InvalidJson` on a bad shape).
/// Otherwise tries the API, then the GitHub set JSON; if both fail returns
/// `ListingUnavailable` with each failure in order.
pub fn resolve_listing(
    req: &ListingRequest<'_>,
    endpoints: &Endpoints,
    http: &HttpOptions,
    retry: &RetryPolicy,
) -> Result<IconListing, IcondlError> {
    let prefix = req.prefix;
    if let Some(path) = req.offline_json {
        let listing = list_from_file(path, prefix)?;
        tracing::info!(prefix = %prefix, count = listing.len(), "listing from offline JSON {}", path.display());
        return Ok(listing);
    }

    let client = HttpClient::new(http).map_err(|e| IcondlError::ListingUnavailable {
        prefix: prefix.to_string(),
        causes: vec![SourceFailure {
            origin: ListingSource::Api,
            error: SourceError::Fetch(FetchError::Curl(e)),
        }],
    })?;
    let mut ctx = NetworkContext {
        client,
        endpoints,
        retry: *retry,
    };

    let mut causes = Vec::new();
    for (origin, strategy) in network_strategies() {
        match strategy(&mut ctx, prefix) {
            Ok(listing) => {
                tracing::info!(prefix = %prefix, count = listing.len(), categories = listing.categories().len(), "listing from {}", origin);
                return Ok(listing);
            }
            Err(error) => {
                tracing::debug!(prefix = %prefix, "{} failed: {}; trying next source", origin, error);
                causes.push(SourceFailure { origin, error });
            }
        }
    }

    Err(IcondlError::ListingUnavailable {
        prefix: prefix.to_string(),
        causes,
    })
}

fn list_from_file(path: &Path, prefix: &SetPrefix) -> Result<IconListing, IcondlError> {
    let origin = path.display().to_string();
    let data = fs::read(path).map_err(|e| IcondlError::InvalidJson {
        origin: origin.clone(),
        reason: format!("cannot read file: {}", e),
    })?;
    let listing =
        parse_icon_set(&data, prefix).map_err(|reason| IcondlError::InvalidJson { origin, reason })?;
    if listing.is_empty() {
        return Err(IcondlError::ListingUnavailable {
            prefix: prefix.to_string(),
            causes: vec![SourceFailure {
                origin: ListingSource::OfflineJson,
                error: SourceError::Empty,
            }],
        });
    }
    Ok(listing)
}

fn list_from_api(ctx: &mut NetworkContext<'_>, prefix: &SetPrefix) -> Result<IconListing, SourceError> {
    let url = ctx.endpoints.collections(prefix);
    let body = ctx.get(url.as_str())?;
    let known: Value = serde_json::from_slice(&body)?;
    let exists = known
        .as_object()
        .map_or(false, |m| m.contains_key(prefix.as_str()));
    if !exists {
        return Err(SourceError::UnknownPrefix);
    }

    let url = ctx.endpoints.collection(prefix);
    let body = ctx.get(url.as_str())?;
    non_empty(parse_api_collection(&body, prefix)?)
}

fn list_from_github(ctx: &mut NetworkContext<'_>, prefix: &SetPrefix) -> Result<IconListing, SourceError> {
    let url = ctx.endpoints.set_json(prefix);
    let body = ctx.get(url.as_str())?;
    let listing = parse_icon_set(&body, prefix).map_err(SourceError::Shape)?;
    non_empty(listing)
}

fn non_empty(listing: IconListing) -> Result<IconListing, SourceError> {
    if listing.is_empty() {
        Err(SourceError::Empty)
    } else {
        Ok(listing)
    }
}
