//! Turns a user-supplied prefix or URL into a canonical icon-set prefix.
//!
//! No network access. Accepted inputs:
//! - bare prefix: `fluent`, ` MDI `
//! - Iconify site URLs: `https://icon-sets.iconify.design/fluent/`,
//!   `iconify.design/icon-sets/fluent/arrow-left` (scheme optional)
//! - any other URL: last non-empty path segment, `.json` stripped
//!   (`https://raw.githubusercontent.com/iconify/icon-sets/master/json/fluent.json`)

use std::fmt;

use crate::error::IcondlError;

/// Canonical icon-set prefix: lowercase, `[a-z0-9][a-z0-9-]*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SetPrefix(String);

impl SetPrefix {
    /// Validates and lowercases `s`. Returns None if it is not a usable prefix.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_ascii_lowercase();
        if is_valid_prefix(&lower) {
            Some(SetPrefix(lower))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SetPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SetPrefix {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_valid_prefix(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c.is_ascii_digit() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Resolves a raw argument into a `SetPrefix`.
pub fn resolve_prefix(raw: &str) -> Result<SetPrefix, IcondlError> {
    let input = raw.trim();
    let invalid = || IcondlError::InvalidIdentifier {
        input: input.to_string(),
    };
    if input.is_empty() {
        return Err(invalid());
    }

    if let Some(url) = parse_url(input) {
        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();
        let candidate = iconify_site_segment(&url, &segments)
            .or_else(|| segments.last().copied())
            .ok_or_else(invalid)?;
        let candidate = candidate.to_ascii_lowercase();
        let candidate = candidate.strip_suffix(".json").unwrap_or(&candidate);
        tracing::debug!(input, candidate, "prefix extracted from URL");
        return SetPrefix::parse(candidate).ok_or_else(invalid);
    }

    SetPrefix::parse(input).ok_or_else(invalid)
}

/// Parses `s` as an absolute http(s) URL. Inputs without a scheme are accepted
/// when they start with a dotted host followed by a path (`iconify.design/icon-sets/x`).
fn parse_url(s: &str) -> Option<url::Url> {
    if let Ok(u) = url::Url::parse(s) {
        if u.has_host() {
            return Some(u);
        }
        return None;
    }
    let (host, _) = s.split_once('/')?;
    if !host.contains('.') || host.chars().any(char::is_whitespace) {
        return None;
    }
    url::Url::parse(&format!("https://{}", s))
        .ok()
        .filter(|u| u.has_host())
}

/// For Iconify's own site the set is not the last segment (icon pages add
/// the icon name after it).
fn iconify_site_segment<'a>(url: &url::Url, segments: &[&'a str]) -> Option<&'a str> {
    let host = url.host_str()?.to_ascii_lowercase();
    if host == "icon-sets.iconify.design" {
        return segments.first().copied();
    }
    if host == "iconify.design" || host == "www.iconify.design" {
        if let [kind, set, ..] = segments {
            if *kind == "icon-sets" || *kind == "icons" {
                return Some(*set);
            }
        }
    }
    None
}
