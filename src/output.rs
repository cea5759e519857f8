//! Output namespace: where each artifact lands.
//!
//! Ungrouped records are written flat into the output root. Grouped records go under
//! `<root>/<group>/<Feed|Story>/`.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::{
    core::{Variant, collapse_whitespace},
    error::BannerResult,
};
use crate::ingest::Record;

/// The initialized output root directory.
#[derive(Clone, Debug)]
pub struct OutputRoot {
    path: PathBuf,
}

impl OutputRoot {
    /// Create the root directory if needed. Call once before resolving any artifact path.
    pub fn init(path: impl Into<PathBuf>) -> BannerResult<Self> {
        let path = path.into();
        std::fs::create_dir_all(&path)
            .with_context(|| format!("create output root '{}'", path.display()))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn path_segment(s: &str, join: &str) -> String {
    let segment = collapse_whitespace(s, join).replace(['/', '\\'], join);
    // `.` and `..` would resolve to the parent namespace.
    if segment.chars().all(|c| c == '.') {
        segment.replace('.', join)
    } else {
        segment
    }
}

/// Maps (record, variant) to an artifact path under an [`OutputRoot`].
#[derive(Clone, Debug)]
pub struct OutputNamer {
    root: PathBuf,
}

impl OutputNamer {
    pub fn new(root: &OutputRoot) -> Self {
        Self {
            root: root.path.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<name with whitespace runs as "_">-<variant>.png`.
    pub fn file_name(record: &Record, variant: Variant) -> String {
        format!("{}-{}.png", path_segment(record.name(), "_"), variant.as_str())
    }

    /// Directory the artifact belongs in, without touching the file system.
    pub fn namespace_dir(&self, record: &Record, variant: Variant) -> PathBuf {
        match record.group() {
            None => self.root.clone(),
            Some(group) => self
                .root
                .join(path_segment(group, "-"))
                .join(variant.dir_name()),
        }
    }

    /// Resolve the artifact path, creating the namespace directories on demand.
    ///
    /// A grouped record gets both variant subdirectories created together.
    pub fn resolve(&self, record: &Record, variant: Variant) -> BannerResult<PathBuf> {
        let dir = self.namespace_dir(record, variant);
        if record.group().is_some() {
            for v in Variant::ALL {
                let sibling = self.namespace_dir(record, v);
                std::fs::create_dir_all(&sibling)
                    .with_context(|| format!("create namespace '{}'", sibling.display()))?;
            }
        } else {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("create namespace '{}'", dir.display()))?;
        }
        Ok(dir.join(Self::file_name(record, variant)))
    }
}

#[cfg(test)]
#[path = "../tests/unit/output/namer.rs"]
mod tests;
