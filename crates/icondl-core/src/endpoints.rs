//! URL templates for the three network boundaries: listing API, set JSON
//! fallback and per-icon SVG.

use anyhow::{Context, Result};
use url::Url;

use crate::config::IcondlConfig;
use crate::resolver::SetPrefix;

#[derive(Debug, Clone)]
pub struct Endpoints {
    api: Url,
    github_raw: Url,
}

impl Endpoints {
    pub fn new(api_base: &str, github_raw_base: &str) -> Result<Self> {
        Ok(Self {
            api: parse_base(api_base)?,
            github_raw: parse_base(github_raw_base)?,
        })
    }

    pub fn from_config(cfg: &IcondlConfig) -> Result<Self> {
        Self::new(&cfg.api_base, &cfg.github_raw_base)
    }

    /// `{api}/collections?prefix=<p>`: set existence check.
    pub fn collections(&self, prefix: &SetPrefix) -> Url {
        let mut u = join(&self.api, "collections");
        u.query_pairs_mut().append_pair("prefix", prefix.as_str());
        u
    }

    /// `{api}/collection?prefix=<p>&info=true`: icon listing.
    pub fn collection(&self, prefix: &SetPrefix) -> Url {
        let mut u = join(&self.api, "collection");
        u.query_pairs_mut()
            .append_pair("prefix", prefix.as_str())
            .append_pair("info", "true");
        u
    }

    /// `{github_raw}/<p>.json`: full set definition.
    pub fn set_json(&self, prefix: &SetPrefix) -> Url {
        join(&self.github_raw, &format!("{}.json", prefix))
    }

    /// `{api}/<p>:<name>.svg[?height=N]`: one icon body.
    pub fn icon_svg(&self, prefix: &SetPrefix, name: &str, size: Option<u32>) -> Url {
        let mut u = join(&self.api, &format!("{}:{}.svg", prefix, name));
        if let Some(h) = size {
            u.query_pairs_mut().append_pair("height", &h.to_string());
        }
        u
    }
}

fn parse_base(s: &str) -> Result<Url> {
    let u = Url::parse(s).with_context(|| format!("invalid base URL: {}", s))?;
    if u.cannot_be_a_base() {
        anyhow::bail!("base URL cannot have path segments: {}", s);
    }
    Ok(u)
}

fn join(base: &Url, segment: &str) -> Url {
    let mut u = base.clone();
    u.set_query(None);
    if let Ok(mut segs) = u.path_segments_mut() {
        segs.pop_if_empty().push(segment);
    }
    u
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> Endpoints {
        Endpoints::new(
            "https://api.iconify.design",
            "https://raw.githubusercontent.com/iconify/icon-sets/master/json/",
        )
        .unwrap()
    }

    fn prefix(s: &str) -> SetPrefix {
        SetPrefix::parse(s).unwrap()
    }

    #[test]
    fn listing_urls() {
        let e = endpoints();
        assert_eq!(
            e.collections(&prefix("mdi")).as_str(),
            "https://api.iconify.design/collections?prefix=mdi"
        );
        assert_eq!(
            e.collection(&prefix("mdi")).as_str(),
            "https://api.iconify.design/collection?prefix=mdi&info=true"
        );
        assert_eq!(
            e.set_json(&prefix("mdi")).as_str(),
            "https://raw.githubusercontent.com/iconify/icon-sets/master/json/mdi.json"
        );
    }

    #[test]
    fn icon_url_with_and_without_size() {
        let e = endpoints();
        assert_eq!(
            e.icon_svg(&prefix("tabler"), "alarm", None).as_str(),
            "https://api.iconify.design/tabler:alarm.svg"
        );
        assert_eq!(
            e.icon_svg(&prefix("tabler"), "alarm-off", Some(48)).as_str(),
            "https://api.iconify.design/tabler:alarm-off.svg?height=48"
        );
    }

    #[test]
    fn base_with_path_keeps_path() {
        let e = Endpoints::new("http://127.0.0.1:8080/api/", "http://127.0.0.1:8080/json").unwrap();
        assert_eq!(
            e.icon_svg(&prefix("mdi"), "home", None).as_str(),
            "http://127.0.0.1:8080/api/mdi:home.svg"
        );
        assert_eq!(
            e.set_json(&prefix("mdi")).as_str(),
            "http://127.0.0.1:8080/json/mdi.json"
        );
    }

    #[test]
    fn rejects_bad_base() {
        assert!(Endpoints::new("not a url", "https://example.com").is_err());
        assert!(Endpoints::new("mailto:x@example.com", "https://example.com").is_err());
    }
}
