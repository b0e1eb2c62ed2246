//! Shapes accepted from the Iconify API and from icon-set JSON files.
//!
//! Every shape either flattens completely into an `IconListing` or is rejected;
//! a list with a non-string entry is an error, never a shorter listing.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use super::{IconListing, SetInfo};
use crate::error::SourceError;
use crate::resolver::SetPrefix;

/// Full set definition (GitHub `json/<prefix>.json` or an offline file).
#[derive(Debug, Deserialize)]
struct IconSetJson {
    #[serde(default)]
    prefix: Option<String>,
    /// name -> icon body (Iconify format) or name -> category label.
    icons: Map<String, Value>,
    #[serde(default)]
    categories: Option<Value>,
    #[serde(default)]
    info: Option<Value>,
}

/// `/collection` response: a flat name list or a categorized collection.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiCollection {
    List(Vec<String>),
    Flat {
        icons: Vec<String>,
        #[serde(default)]
        info: Option<Value>,
    },
    Structured {
        /// Present only when `icons` failed to parse as a name list.
        #[serde(default)]
        icons: Option<Value>,
        #[serde(default)]
        categories: Option<Value>,
        #[serde(default)]
        uncategorized: Option<Vec<String>>,
        #[serde(default)]
        hidden: Option<Vec<String>>,
        #[serde(default)]
        info: Option<Value>,
    },
}

/// Parses a full icon-set JSON document. The error string describes the shape problem.
pub fn parse_icon_set(data: &[u8], prefix: &SetPrefix) -> Result<IconListing, String> {
    let set: IconSetJson = serde_json::from_slice(data).map_err(|e| e.to_string())?;
    if let Some(p) = set.prefix.as_deref() {
        if p != prefix.as_str() {
            tracing::warn!(json_prefix = p, prefix = %prefix, "set JSON prefix differs from requested prefix");
        }
    }

    let mut categories: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (name, meta) in &set.icons {
        if let Value::String(label) = meta {
            let label = label.trim();
            if !label.is_empty() {
                categories
                    .entry(label.to_string())
                    .or_default()
                    .insert(name.clone());
            }
        }
    }
    if let Some(value) = &set.categories {
        flatten_categories(value, None, &mut categories).map_err(|e| format!("categories: {}", e))?;
    }

    Ok(IconListing::new(
        prefix.clone(),
        set.icons.into_iter().map(|(name, _)| name),
        categories,
        parse_info(set.info),
    ))
}

/// Parses a `/collection` API response (flat list or structured collection).
pub fn parse_api_collection(data: &[u8], prefix: &SetPrefix) -> Result<IconListing, SourceError> {
    let value: Value = serde_json::from_slice(data)?;
    let collection: ApiCollection = serde_json::from_value(value).map_err(|_| {
        SourceError::Shape("neither a name list nor a categorized collection".to_string())
    })?;

    match collection {
        ApiCollection::List(names) => Ok(IconListing::new(
            prefix.clone(),
            names,
            BTreeMap::new(),
            None,
        )),
        ApiCollection::Flat { icons, info } => Ok(IconListing::new(
            prefix.clone(),
            icons,
            BTreeMap::new(),
            parse_info(info),
        )),
        ApiCollection::Structured {
            icons,
            categories,
            uncategorized,
            hidden,
            info,
        } => {
            if icons.is_some() {
                return Err(SourceError::Shape(
                    "icons is present but not a list of names".to_string(),
                ));
            }
            if categories.is_none() && uncategorized.is_none() && hidden.is_none() {
                return Err(SourceError::Shape(
                    "no icons, categories or uncategorized field".to_string(),
                ));
            }
            let mut cats: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
            if let Some(value) = &categories {
                flatten_categories(value, None, &mut cats)
                    .map_err(|e| SourceError::Shape(format!("categories: {}", e)))?;
            }
            let names: BTreeSet<String> = cats
                .values()
                .flatten()
                .cloned()
                .chain(uncategorized.unwrap_or_default())
                .chain(hidden.unwrap_or_default())
                .collect();
            Ok(IconListing::new(prefix.clone(), names, cats, parse_info(info)))
        }
    }
}

/// Walks `label -> [names]` or nested `label -> { sub -> [names] }`.
/// Nested labels are joined with `/`.
fn flatten_categories(
    value: &Value,
    parent: Option<&str>,
    out: &mut BTreeMap<String, BTreeSet<String>>,
) -> Result<(), String> {
    let map = value
        .as_object()
        .ok_or_else(|| "expected a mapping of category -> names".to_string())?;
    for (label, members) in map {
        let label = match parent {
            Some(p) => format!("{}/{}", p, label),
            None => label.clone(),
        };
        match members {
            Value::Array(items) => {
                let entry = out.entry(label.clone()).or_default();
                for item in items {
                    let name = item
                        .as_str()
                        .ok_or_else(|| format!("non-string entry in category '{}'", label))?;
                    entry.insert(name.to_string());
                }
            }
            Value::Object(_) => flatten_categories(members, Some(&label), out)?,
            _ => return Err(format!("category '{}' is neither a list nor a mapping", label)),
        }
    }
    Ok(())
}

/// Info blocks are advisory; a malformed one is dropped rather than failing the listing.
fn parse_info(value: Option<Value>) -> Option<SetInfo> {
    let value = value?;
    match serde_json::from_value::<SetInfo>(value) {
        Ok(info) => Some(info),
        Err(e) => {
            tracing::debug!("ignoring malformed set info: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix() -> SetPrefix {
        SetPrefix::parse("tabler").unwrap()
    }

    #[test]
    fn icon_set_with_categories_and_info() {
        let json = br#"{
            "prefix": "tabler",
            "info": { "name": "Tabler Icons", "total": 3, "license": { "title": "MIT", "spdx": "MIT" } },
            "icons": {
                "alarm": { "body": "<path/>" },
                "alarm-off": { "body": "<path/>" },
                "home": { "body": "<path/>" }
            },
            "aliases": { "alarm-clock": { "parent": "alarm" } },
            "categories": { "System": ["alarm", "alarm-off", "alarm-clock"] }
        }"#;
        let l = parse_icon_set(json, &prefix()).unwrap();
        assert_eq!(l.names(), &["alarm", "alarm-off", "home"]);
        assert_eq!(l.category_of("alarm-off"), Some("System"));
        assert_eq!(l.category_of("home"), None);
        assert_eq!(l.categories()["System"].len(), 2);
        let info = l.info().unwrap();
        assert_eq!(info.name.as_deref(), Some("Tabler Icons"));
        assert_eq!(info.license.as_ref().unwrap().spdx.as_deref(), Some("MIT"));
    }

    #[test]
    fn icon_set_name_to_category_form() {
        let json = br#"{ "icons": { "a": "Arrows", "b": "Arrows", "c": {} } }"#;
        let l = parse_icon_set(json, &prefix()).unwrap();
        assert_eq!(l.names(), &["a", "b", "c"]);
        assert_eq!(l.category_of("b"), Some("Arrows"));
        assert_eq!(l.category_of("c"), None);
    }

    #[test]
    fn icon_set_rejects_missing_or_list_icons() {
        assert!(parse_icon_set(br#"{ "info": {} }"#, &prefix()).is_err());
        assert!(parse_icon_set(br#"{ "icons": ["a", "b"] }"#, &prefix()).is_err());
        assert!(parse_icon_set(br#"["a"]"#, &prefix()).is_err());
        assert!(parse_icon_set(b"not json", &prefix()).is_err());
    }

    #[test]
    fn icon_set_rejects_bad_category_entries() {
        let json = br#"{ "icons": { "a": {} }, "categories": { "X": ["a", 3] } }"#;
        assert!(parse_icon_set(json, &prefix()).is_err());
    }

    #[test]
    fn malformed_info_is_ignored() {
        let json = br#"{ "icons": { "a": {} }, "info": { "name": 5 } }"#;
        let l = parse_icon_set(json, &prefix()).unwrap();
        assert_eq!(l.len(), 1);
        assert!(l.info().is_none());
    }

    #[test]
    fn api_flat_list_forms() {
        let l = parse_api_collection(br#"{ "icons": ["b", "a"] }"#, &prefix()).unwrap();
        assert_eq!(l.names(), &["a", "b"]);
        assert!(!l.has_categories());
        let l = parse_api_collection(br#"["x", "y"]"#, &prefix()).unwrap();
        assert_eq!(l.len(), 2);
    }

    #[test]
    fn api_structured_collection_flattens_fully() {
        let json = br#"{
            "prefix": "tabler",
            "total": 5,
            "categories": {
                "System": ["alarm", "alarm-off"],
                "Shapes": { "Round": ["circle"], "Square": ["square"] }
            },
            "uncategorized": ["home"],
            "hidden": ["old-alarm"]
        }"#;
        let l = parse_api_collection(json, &prefix()).unwrap();
        assert_eq!(
            l.names(),
            &["alarm", "alarm-off", "circle", "home", "old-alarm", "square"]
        );
        assert_eq!(l.category_of("circle"), Some("Shapes/Round"));
        assert_eq!(l.category_of("home"), None);
    }

    #[test]
    fn api_partial_shapes_are_rejected() {
        assert!(matches!(
            parse_api_collection(br#"{ "icons": ["a", 1] }"#, &prefix()),
            Err(SourceError::Shape(_))
        ));
        assert!(matches!(
            parse_api_collection(
                br#"{ "icons": ["a", "b", 1], "uncategorized": ["c"] }"#,
                &prefix()
            ),
            Err(SourceError::Shape(_))
        ));
        assert!(matches!(
            parse_api_collection(
                br#"{ "icons": "all", "categories": { "X": ["a"] }, "hidden": ["h"] }"#,
                &prefix()
            ),
            Err(SourceError::Shape(_))
        ));
        assert!(matches!(
            parse_api_collection(br#"{ "categories": { "X": ["a", null] } }"#, &prefix()),
            Err(SourceError::Shape(_))
        ));
        assert!(matches!(
            parse_api_collection(br#"{ "error": "not found" }"#, &prefix()),
            Err(SourceError::Shape(_))
        ));
        assert!(matches!(
            parse_api_collection(b"404", &prefix()),
            Err(SourceError::Shape(_))
        ));
        assert!(matches!(
            parse_api_collection(b"<html>", &prefix()),
            Err(SourceError::Json(_))
        ));
    }
}
