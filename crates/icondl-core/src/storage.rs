//! Atomic file writes: write to `<target>.part`, fsync, rename.
//!
//! A crash or interrupt leaves at most a `.part` file next to the target,
//! never a truncated file at the target path itself.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `a.svg` → `a.svg.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// True for in-progress temp files (excluded from archives).
pub fn is_temp_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map_or(false, |n| n.ends_with(TEMP_SUFFIX))
}

/// Writes `data` to `final_path` atomically, creating parent directories.
/// On failure the temp file is removed and the target is left untouched.
pub fn write_atomic(final_path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = final_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = temp_path(final_path);
    let res = write_and_rename(&tmp, final_path, data);
    if res.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    res
}

fn write_and_rename(tmp: &Path, final_path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = File::options()
        .write(true)
        .create(true)
        .truncate(true)
        .open(tmp)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);
    fs::rename(tmp, final_path)
}

/// Like [`write_atomic`] with anyhow context, for application-level writes
/// (license notice, archive).
pub fn write_atomic_with_context(final_path: &Path, data: &[u8]) -> Result<()> {
    write_atomic(final_path, data)
        .with_context(|| format!("failed to write {}", final_path.display()))
}
