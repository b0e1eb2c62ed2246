//! Zip the output directory.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::storage::{is_temp_file, temp_path};

/// `icons` -> `icons.zip`; a path already ending in `.zip` (any case) is kept.
pub fn archive_path(requested: &Path) -> PathBuf {
    let has_zip_ext = requested
        .extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("zip"));
    if has_zip_ext {
        return requested.to_path_buf();
    }
    let mut o = requested.as_os_str().to_owned();
    o.push(".zip");
    PathBuf::from(o)
}

/// Archives every regular file under `out_dir` into `requested` (see [`archive_path`]).
///
/// Entry names are relative to `out_dir` with `/` separators, in sorted order.
/// The archive itself and `.part` files are never included. The zip is built
/// under a temp name and renamed into place. Returns the final path and entry count.
pub fn zip_output_dir(out_dir: &Path, requested: &Path) -> Result<(PathBuf, usize)> {
    let zip_path = archive_path(requested);
    if let Some(parent) = zip_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let base = out_dir
        .canonicalize()
        .with_context(|| format!("output directory {}", out_dir.display()))?;
    let exclude = absolute(&zip_path)?;

    let tmp = temp_path(&zip_path);
    let res = write_zip(&base, &exclude, &tmp);
    match res {
        Ok(count) => {
            fs::rename(&tmp, &zip_path)
                .with_context(|| format!("failed to move archive to {}", zip_path.display()))?;
            tracing::info!(entries = count, "zipped {} to {}", out_dir.display(), zip_path.display());
            Ok((zip_path, count))
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            Err(e)
        }
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let parent = parent
        .canonicalize()
        .with_context(|| format!("archive directory {}", parent.display()))?;
    Ok(match path.file_name() {
        Some(name) => parent.join(name),
        None => parent,
    })
}

fn write_zip(base: &Path, exclude: &Path, tmp: &Path) -> Result<usize> {
    let file = File::create(tmp).with_context(|| format!("failed to create {}", tmp.display()))?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut buf = vec![0u8; 8192];
    let count = add_dir_to_zip(&mut zip, base, base, exclude, options, &mut buf)
        .context("failed to add files to archive")?;
    let file = zip.finish().context("failed to finish archive")?;
    file.sync_all()?;
    Ok(count)
}

fn add_dir_to_zip<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    base: &Path,
    dir: &Path,
    exclude: &Path,
    options: FileOptions,
    buf: &mut [u8],
) -> Result<usize> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    let mut count = 0;
    for path in entries {
        let meta = match fs::symlink_metadata(&path) {
            Ok(m) => m,
            Err(_) => continue,
        };
        if meta.is_dir() {
            count += add_dir_to_zip(zip, base, &path, exclude, options, buf)?;
            continue;
        }
        if !meta.is_file() || is_temp_file(&path) || path == exclude {
            continue;
        }

        let rel = path.strip_prefix(base).unwrap_or(&path);
        let name = rel.to_string_lossy().replace('\\', "/");
        zip.start_file(name, options)?;
        let mut f = File::open(&path)?;
        loop {
            let n = f.read(buf)?;
            if n == 0 {
                break;
            }
            zip.write_all(&buf[..n])?;
        }
        count += 1;
    }
    Ok(count)
}
