//! Include / contains / exclude filtering of an icon listing.
//!
//! Order: `include` narrows first, then `contains`, then `exclude` removes
//! from what remains. All matching is case-sensitive and literal.

use std::collections::BTreeSet;

use crate::listing::IconListing;

#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    /// Keep only these exact names (None = no include filter).
    pub include: Option<BTreeSet<String>>,
    /// Drop these exact names.
    pub exclude: Option<BTreeSet<String>>,
    /// Keep only names containing this substring.
    pub contains: Option<String>,
}

impl FilterConfig {
    /// Builds a filter from raw CLI strings. Empty or whitespace-only values
    /// mean "no filter".
    pub fn from_args(include: Option<&str>, exclude: Option<&str>, contains: Option<&str>) -> Self {
        Self {
            include: include.and_then(parse_name_list),
            exclude: exclude.and_then(parse_name_list),
            contains: contains
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_none() && self.exclude.is_none() && self.contains.is_none()
    }

    /// True if `name` survives all three predicates.
    pub fn matches(&self, name: &str) -> bool {
        if let Some(include) = &self.include {
            if !include.contains(name) {
                return false;
            }
        }
        if let Some(needle) = &self.contains {
            if !name.contains(needle.as_str()) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude {
            if exclude.contains(name) {
                return false;
            }
        }
        true
    }

    /// Filtered copy of `listing`, keeping category associations.
    pub fn apply(&self, listing: &IconListing) -> IconListing {
        if self.is_empty() {
            return listing.clone();
        }
        let filtered = listing.retain(|n| self.matches(n));
        tracing::debug!(
            before = listing.len(),
            after = filtered.len(),
            "applied filters {:?}",
            self
        );
        if let Some(include) = &self.include {
            let missing: Vec<&str> = include
                .iter()
                .filter(|n| listing.names().binary_search(*n).is_err())
                .map(String::as_str)
                .collect();
            if !missing.is_empty() {
                tracing::warn!("--include names not in set {}: {}", listing.prefix(), missing.join(", "));
            }
        }
        filtered
    }
}

/// Splits a comma-separated list, trimming items and dropping empty ones.
/// Returns None when nothing remains.
pub fn parse_name_list(csv: &str) -> Option<BTreeSet<String>> {
    let set: BTreeSet<String> = csv
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if set.is_empty() {
        None
    } else {
        Some(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::SetPrefix;
    use std::collections::BTreeMap;

    fn listing(names: &[&str]) -> IconListing {
        IconListing::new(
            SetPrefix::parse("test").unwrap(),
            names.iter().map(|s| s.to_string()),
            BTreeMap::new(),
            None,
        )
    }

    fn names(l: &IconListing) -> Vec<&str> {
        l.names().iter().map(String::as_str).collect()
    }

    #[test]
    fn csv_parsing() {
        let set = parse_name_list(" a, b ,,c ,").unwrap();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert!(parse_name_list(" , ,").is_none());
        assert!(parse_name_list("").is_none());
    }

    #[test]
    fn include_then_exclude() {
        let l = listing(&["a", "b", "c", "d"]);
        let f = FilterConfig::from_args(Some("a,b"), Some("b"), None);
        assert_eq!(names(&f.apply(&l)), vec!["a"]);
    }

    #[test]
    fn contains_is_literal_and_case_sensitive() {
        let l = listing(&["arrow-left", "Arrow-up", "narrow", "home", "arr.ow"]);
        let f = FilterConfig::from_args(None, None, Some("arrow"));
        assert_eq!(names(&f.apply(&l)), vec!["arrow-left", "narrow"]);
        let f = FilterConfig::from_args(None, None, Some("r.o"));
        assert_eq!(names(&f.apply(&l)), vec!["arr.ow"]);
    }

    #[test]
    fn combined_filters() {
        let l = listing(&["arrow-left", "arrow-right", "home", "user"]);
        let f = FilterConfig::from_args(Some("arrow-left,home"), None, None);
        assert_eq!(names(&f.apply(&l)), vec!["arrow-left", "home"]);
        let f = FilterConfig::from_args(None, Some("arrow-right,user"), None);
        assert_eq!(names(&f.apply(&l)), vec!["arrow-left", "home"]);
        let f = FilterConfig::from_args(None, Some("arrow-right"), Some("arrow"));
        assert_eq!(names(&f.apply(&l)), vec!["arrow-left"]);
        let f = FilterConfig::from_args(Some("arrow-left,home"), Some("home"), Some("arrow"));
        assert_eq!(names(&f.apply(&l)), vec!["arrow-left"]);
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let l = listing(&["a", "b"]);
        let f = FilterConfig::from_args(Some(""), Some(" "), Some(""));
        assert!(f.is_empty());
        assert_eq!(f.apply(&l).len(), 2);
    }

    #[test]
    fn filtering_drops_emptied_categories() {
        let mut cats = BTreeMap::new();
        cats.insert(
            "Alarms".to_string(),
            ["alarm", "alarm-off"].iter().map(|s| s.to_string()).collect(),
        );
        cats.insert(
            "Places".to_string(),
            ["home"].iter().map(|s| s.to_string()).collect(),
        );
        let l = IconListing::new(
            SetPrefix::parse("tabler").unwrap(),
            ["alarm", "alarm-off", "home"].iter().map(|s| s.to_string()),
            cats,
            None,
        );
        let f = FilterConfig::from_args(None, None, Some("alarm"));
        let out = f.apply(&l);
        assert_eq!(out.categories().keys().collect::<Vec<_>>(), vec!["Alarms"]);
        assert_eq!(out.category_of("alarm-off"), Some("Alarms"));
    }
}
