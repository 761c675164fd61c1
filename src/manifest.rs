//! Course manifest loading.
//!
//! The manifest is the platform's course JSON (saved by the operator from the
//! course API response). Only the slug/name pairs are read; everything else
//! the platform includes is ignored.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

/// A course manifest: the course itself plus its ordered lesson list.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseManifest {
    pub course: Course,
    pub contents: Vec<Lesson>,
}

/// Course identity within the manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct Course {
    pub slug: String,
    pub name: String,
}

/// One lesson: URL slug and display name.
///
/// Position in `contents` is the lesson's index for the whole run: it drives
/// processing order and the `{index}_{name}` labels in the output catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct Lesson {
    pub slug: String,
    pub name: String,
}

impl CourseManifest {
    /// Load and validate a manifest from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;
        let manifest: CourseManifest = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse manifest: {}", path.display()))?;

        if manifest.course.slug.is_empty() {
            bail!("manifest has an empty course slug: {}", path.display());
        }
        if manifest.contents.is_empty() {
            bail!("manifest has no lessons: {}", path.display());
        }

        Ok(manifest)
    }
}
