//! Icon-set listing: the names (and optional categories) of every icon in a set.
//!
//! A listing is built once per run by [`resolve_listing`], which tries the
//! offline JSON file, the Iconify API and the GitHub set JSON in that order,
//! and is read-only afterwards.

mod parse;
mod source;

pub use parse::{parse_api_collection, parse_icon_set};
pub use source::{resolve_listing, ListingRequest};

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::resolver::SetPrefix;

/// Set metadata from the `info` block of the API or set JSON.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub license: Option<License>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct License {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub spdx: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Names of every icon in one set, sorted and unique, with category membership.
#[derive(Debug, Clone)]
pub struct IconListing {
    prefix: SetPrefix,
    names: Vec<String>,
    categories: BTreeMap<String, Vec<String>>,
    /// name -> first category label (sorted order) containing it.
    category_index: BTreeMap<String, String>,
    info: Option<SetInfo>,
}

impl IconListing {
    /// Builds a listing. Names are sorted and deduplicated; category members
    /// that are not listed names are ignored and empty categories are dropped.
    pub fn new<I>(
        prefix: SetPrefix,
        names: I,
        categories: BTreeMap<String, BTreeSet<String>>,
        info: Option<SetInfo>,
    ) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let names: BTreeSet<String> = names.into_iter().collect();
        let mut cats = BTreeMap::new();
        let mut category_index = BTreeMap::new();
        for (label, members) in categories {
            let kept: Vec<String> = members.into_iter().filter(|n| names.contains(n)).collect();
            if kept.is_empty() {
                continue;
            }
            for n in &kept {
                category_index
                    .entry(n.clone())
                    .or_insert_with(|| label.clone());
            }
            cats.insert(label, kept);
        }
        Self {
            prefix,
            names: names.into_iter().collect(),
            categories: cats,
            category_index,
            info,
        }
    }

    pub fn prefix(&self) -> &SetPrefix {
        &self.prefix
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn categories(&self) -> &BTreeMap<String, Vec<String>> {
        &self.categories
    }

    pub fn has_categories(&self) -> bool {
        !self.categories.is_empty()
    }

    /// Category used for by-category output (first label in sorted order).
    pub fn category_of(&self, name: &str) -> Option<&str> {
        self.category_index.get(name).map(String::as_str)
    }

    pub fn info(&self) -> Option<&SetInfo> {
        self.info.as_ref()
    }

    /// New listing with only the names for which `keep` returns true.
    /// Category associations are preserved; emptied categories are dropped.
    pub fn retain<F>(&self, mut keep: F) -> IconListing
    where
        F: FnMut(&str) -> bool,
    {
        let names: Vec<String> = self.names.iter().filter(|n| keep(n.as_str())).cloned().collect();
        let categories = self
            .categories
            .iter()
            .map(|(label, members)| (label.clone(), members.iter().cloned().collect()))
            .collect();
        IconListing::new(self.prefix.clone(), names, categories, self.info.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> IconListing {
        let mut cats = BTreeMap::new();
        cats.insert(
            "Alerts".to_string(),
            ["alarm", "bell"].iter().map(|s| s.to_string()).collect(),
        );
        cats.insert(
            "Time".to_string(),
            ["alarm", "clock", "ghost"].iter().map(|s| s.to_string()).collect(),
        );
        cats.insert("Empty".to_string(), BTreeSet::new());
        IconListing::new(
            SetPrefix::parse("tabler").unwrap(),
            ["clock", "alarm", "bell", "home", "alarm"]
                .iter()
                .map(|s| s.to_string()),
            cats,
            None,
        )
    }

    #[test]
    fn names_sorted_and_unique() {
        let l = listing();
        assert_eq!(l.names(), &["alarm", "bell", "clock", "home"]);
        assert_eq!(l.len(), 4);
    }

    #[test]
    fn unknown_members_and_empty_categories_dropped() {
        let l = listing();
        assert_eq!(l.categories().len(), 2);
        assert_eq!(l.categories()["Time"], vec!["alarm", "clock"]);
    }

    #[test]
    fn first_category_wins() {
        let l = listing();
        assert_eq!(l.category_of("alarm"), Some("Alerts"));
        assert_eq!(l.category_of("clock"), Some("Time"));
        assert_eq!(l.category_of("home"), None);
    }

    #[test]
    fn retain_keeps_categories_and_drops_emptied() {
        let l = listing().retain(|n| n == "clock" || n == "home");
        assert_eq!(l.names(), &["clock", "home"]);
        assert_eq!(l.categories().keys().collect::<Vec<_>>(), vec!["Time"]);
        assert_eq!(l.category_of("clock"), Some("Time"));
    }
}
