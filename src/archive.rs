//! Packs the output namespace into one zip archive.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use walkdir::WalkDir;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::foundation::error::{BannerError, BannerResult};

/// What ended up in the archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    pub files: usize,
    pub directories: usize,
    /// Size of the finished archive on disk.
    pub bytes: u64,
}

/// Name of `path` inside the archive: relative to `root`, `/`-separated.
fn entry_name(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = rel
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// Zip everything under `root` into `archive_path` (deflate, level 9).
///
/// Entries are visited in name order; directories are stored as entries of their own so empty
/// group folders survive. The archive never contains itself, even when written inside `root`.
#[tracing::instrument(skip_all, fields(root = %root.display(), archive = %archive_path.display()))]
pub fn build_archive(root: &Path, archive_path: &Path) -> BannerResult<ArchiveSummary> {
    if !root.is_dir() {
        return Err(BannerError::archive(format!(
            "'{}' is not a directory",
            root.display()
        )));
    }
    if let Some(parent) = archive_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            BannerError::archive(format!("create '{}': {e}", parent.display()))
        })?;
    }

    let file = File::create(archive_path).map_err(|e| {
        BannerError::archive(format!("create '{}': {e}", archive_path.display()))
    })?;
    let own_path = std::fs::canonicalize(archive_path)
        .map_err(|e| BannerError::archive(format!("resolve '{}': {e}", archive_path.display())))?;

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9));
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let mut files = 0usize;
    let mut directories = 0usize;

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| BannerError::archive(format!("walk: {e}")))?;
        let path = entry.path();
        let Some(name) = entry_name(root, path) else {
            tracing::warn!(path = %path.display(), "skipping entry with non UTF-8 name");
            continue;
        };

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{name}/"), options)
                .map_err(|e| BannerError::archive(format!("add directory '{name}': {e}")))?;
            directories += 1;
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }
        if std::fs::canonicalize(path).is_ok_and(|p| p == own_path) {
            continue;
        }

        zip.start_file(name.as_str(), options)
            .map_err(|e| BannerError::archive(format!("start '{name}': {e}")))?;
        let mut src = File::open(path)
            .map_err(|e| BannerError::archive(format!("open '{}': {e}", path.display())))?;
        std::io::copy(&mut src, &mut zip)
            .map_err(|e| BannerError::archive(format!("write '{name}': {e}")))?;
        files += 1;
    }

    let mut out = zip
        .finish()
        .map_err(|e| BannerError::archive(format!("finish: {e}")))?;
    out.flush()
        .map_err(|e| BannerError::archive(format!("flush: {e}")))?;
    drop(out);

    let bytes = std::fs::metadata(archive_path)
        .map(|m| m.len())
        .map_err(|e| BannerError::archive(format!("stat '{}': {e}", archive_path.display())))?;
    tracing::info!(files, directories, bytes, "archive written");

    Ok(ArchiveSummary {
        path: archive_path.to_path_buf(),
        files,
        directories,
        bytes,
    })
}

#[cfg(test)]
#[path = "../tests/unit/archive/build.rs"]
mod tests;
