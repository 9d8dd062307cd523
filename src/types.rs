//! Page data handed over by the host build.
//!
//! The static-site build owns content parsing. It serializes what ogcard
//! needs into two JSON documents:
//!
//! - a **page manifest** (`pages.json`): an array of [`PageData`], used for
//!   full builds and for `meta` output;
//! - a **change list** (`changes.json`): an array of [`ChangeEvent`], used for
//!   incremental builds.
//!
//! ```json
//! {
//!   "slug": "notes/rust",
//!   "file_path": "content/notes/rust.md",
//!   "frontmatter": { "title": "Rust notes", "tags": ["rust", "lang"] },
//!   "dates": { "created": "2024-01-05", "modified": "2024-02-11" },
//!   "description": "Things I learned &amp; keep forgetting",
//!   "text": "Plain text body used for reading time"
//! }
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Which date of a page to show on its card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateKind {
    Created,
    Modified,
    Published,
}

/// Frontmatter fields that influence the social card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Frontmatter {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Card-specific description, wins over `description`.
    #[serde(alias = "socialDescription")]
    pub social_description: Option<String>,
    /// User-supplied image. Pages with one never get a generated card.
    #[serde(alias = "socialImage")]
    pub social_image: Option<String>,
    pub tags: Vec<String>,
}

/// Everything ogcard reads about one page. Owned by the host build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageData {
    /// Canonical path-like identifier, e.g. `notes/rust` or `index`.
    pub slug: String,
    /// Source file the page was built from. Virtual pages (tag listings,
    /// folder indexes) have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    #[serde(default)]
    pub frontmatter: Frontmatter,
    #[serde(default)]
    pub dates: BTreeMap<DateKind, NaiveDate>,
    /// Rendered excerpt, possibly HTML-escaped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Plain-text body.
    #[serde(default)]
    pub text: String,
}

impl PageData {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            ..Self::default()
        }
    }

    /// True when the page declares its own social image.
    pub fn has_custom_image(&self) -> bool {
        self.frontmatter
            .social_image
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }

    /// True when the page corresponds to a source file on disk.
    pub fn is_real_file(&self) -> bool {
        self.file_path.is_some()
    }
}

/// Kind of change reported by the host for an incremental build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Add,
    Change,
    Delete,
}

/// A single entry of the change list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub file: PageData,
}

impl ChangeEvent {
    /// Added and changed pages need a fresh card; deletions do not.
    pub fn needs_render(&self) -> bool {
        matches!(self.kind, ChangeKind::Add | ChangeKind::Change)
    }
}

/// Read a page manifest from disk.
pub fn read_pages(path: &Path) -> std::io::Result<Vec<PageData>> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(std::io::Error::other)
}

/// Read a change list from disk.
pub fn read_changes(path: &Path) -> std::io::Result<Vec<ChangeEvent>> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(std::io::Error::other)
}
