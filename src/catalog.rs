//! Output catalog: one JSON file per course, consumed by the downloader.
//!
//! Field names follow the downloader's existing on-disk contract
//! (`item-count`, `dynamic-part`), so serde renames rather than idiomatic
//! Rust names decide the wire shape.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One captured lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaEntry {
    /// 0-based position of the lesson in the course manifest. Indices keep
    /// gaps where lessons were skipped.
    pub index: usize,
    /// The extracted player media id.
    #[serde(rename = "dynamic-part")]
    pub media_id: String,
    /// Always written `false`; the downloader flips it after fetching.
    pub downloaded: bool,
    /// `{index}_{lesson display name}`, using the manifest position.
    #[serde(rename = "name")]
    pub label: String,
}

impl MediaEntry {
    pub fn new(index: usize, media_id: String, lesson_name: &str) -> Self {
        Self {
            index,
            media_id,
            downloaded: false,
            label: format!("{index}_{lesson_name}"),
        }
    }
}

/// The per-course catalog written at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaCatalog {
    /// Course display name; also names the output file.
    pub name: String,
    /// Always equals `items.len()`.
    #[serde(rename = "item-count")]
    pub item_count: usize,
    pub items: Vec<MediaEntry>,
}

impl MediaCatalog {
    /// Build a catalog; `item_count` is derived, never supplied.
    pub fn new(name: impl Into<String>, items: Vec<MediaEntry>) -> Self {
        Self {
            name: name.into(),
            item_count: items.len(),
            items,
        }
    }

    /// The output path for this catalog under `out_dir`.
    pub fn path_in(&self, out_dir: &Path) -> PathBuf {
        out_dir.join(format!("{}.json", self.name))
    }

    /// Write the catalog as pretty-printed JSON, overwriting any previous
    /// run's file. The output directory is an operator-provided location and
    /// is never created here; a missing directory fails the write.
    pub fn write_to(&self, out_dir: &Path) -> Result<PathBuf> {
        let path = self.path_in(out_dir);
        let json = serde_json::to_string_pretty(self).context("failed to serialize catalog")?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write catalog: {}", path.display()))?;
        Ok(path)
    }
}
