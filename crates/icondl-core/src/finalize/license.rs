//! `LICENSE.txt` notice from set info.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::listing::SetInfo;
use crate::storage::write_atomic_with_context;

pub const LICENSE_FILE_NAME: &str = "LICENSE.txt";

/// Notice text, or None when the info carries neither a license title nor a reference.
pub fn license_notice(prefix: &str, info: &SetInfo) -> Option<String> {
    let license = info.license.as_ref()?;
    let title = license.title.as_deref().filter(|s| !s.is_empty());
    let reference = license
        .spdx
        .as_deref()
        .filter(|s| !s.is_empty())
        .or(license.url.as_deref().filter(|s| !s.is_empty()));
    if title.is_none() && reference.is_none() {
        return None;
    }

    let mut text = format!("Iconify set: {}\n", prefix);
    if let Some(name) = info.name.as_deref() {
        text.push_str(&format!("Name: {}\n", name));
    }
    if let Some(author) = info.author.as_ref().and_then(|a| a.name.as_deref()) {
        text.push_str(&format!("Author: {}\n", author));
    }
    text.push_str(&format!("License: {}\n", title.unwrap_or("N/A")));
    text.push_str(&format!("Reference: {}\n", reference.unwrap_or("N/A")));
    text.push_str("Note: Some sets need attribution. Check upstream license before redistribution.\n");
    Some(text)
}

/// Writes the notice into `out_dir`. Ok(None) when there is nothing to write.
pub fn write_license(out_dir: &Path, prefix: &str, info: Option<&SetInfo>) -> Result<Option<PathBuf>> {
    let Some(text) = info.and_then(|i| license_notice(prefix, i)) else {
        tracing::warn!(prefix, "set has no license info; LICENSE.txt not written");
        return Ok(None);
    };
    let path = out_dir.join(LICENSE_FILE_NAME);
    write_atomic_with_context(&path, text.as_bytes())?;
    tracing::info!("wrote {}", path.display());
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{Author, License};

    fn info() -> SetInfo {
        SetInfo {
            name: Some("Tabler Icons".into()),
            author: Some(Author {
                name: Some("Paweł Kuna".into()),
                url: None,
            }),
            license: Some(License {
                title: Some("MIT".into()),
                spdx: Some("MIT".into()),
                url: Some("https://example.com/license".into()),
            }),
        }
    }

    #[test]
    fn notice_prefers_spdx_reference() {
        let text = license_notice("tabler", &info()).unwrap();
        assert!(text.starts_with("Iconify set: tabler\n"));
        assert!(text.contains("License: MIT\n"));
        assert!(text.contains("Reference: MIT\n"));
        assert!(text.contains("Author: Paweł Kuna\n"));
    }

    #[test]
    fn no_license_no_notice() {
        let mut i = info();
        i.license = None;
        assert!(license_notice("tabler", &i).is_none());
        i.license = Some(License::default());
        assert!(license_notice("tabler", &i).is_none());
    }

    #[test]
    fn writes_file_into_out_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_license(dir.path(), "tabler", Some(&info())).unwrap().unwrap();
        assert_eq!(path, dir.path().join(LICENSE_FILE_NAME));
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("Name: Tabler Icons"));
        assert!(write_license(dir.path(), "tabler", None).unwrap().is_none());
    }
}
