//! Shared test utilities for the ogcard test suite.
//!
//! Page fixtures built in code. Host builds hand ogcard fully parsed pages,
//! so there is no content directory to copy around.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut p = real_page("notes/rust");
//! p.frontmatter.title = Some("Rust notes".into());
//! let pages = write_pages_json(&[p]);
//! ```

use std::path::PathBuf;
use tempfile::TempDir;

use crate::types::PageData;

// =========================================================================
// Page fixtures
// =========================================================================

/// A virtual page (no source file), like a tag listing.
pub fn page(slug: &str) -> PageData {
    PageData::new(slug)
}

/// A page backed by `content/<slug>.md`.
pub fn real_page(slug: &str) -> PageData {
    PageData {
        file_path: Some(PathBuf::from(format!("content/{slug}.md"))),
        ..PageData::new(slug)
    }
}

/// Write `pages` as a page manifest in a fresh temp directory.
///
/// Returns the directory (keep it alive) and the manifest path.
pub fn write_pages_json(pages: &[PageData]) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("pages.json");
    std::fs::write(&path, serde_json::to_string_pretty(pages).unwrap()).unwrap();
    (tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::read_pages;

    #[test]
    fn real_page_has_source() {
        assert!(real_page("a").is_real_file());
        assert!(!page("a").is_real_file());
    }

    #[test]
    fn pages_json_reads_back() {
        let (_tmp, path) = write_pages_json(&[real_page("a"), page("b")]);
        let pages = read_pages(&path).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].file_path, Some(PathBuf::from("content/a.md")));
    }
}
