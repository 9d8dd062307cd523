//! CLI output formatting for all commands.
//!
//! # Page-First Display
//!
//! Output is **page-centric, not file-centric**. Every line leads with the
//! page slug, the identity authors know from their content tree. Generated
//! paths follow as secondary context, relative to the output directory.
//!
//! # Output Format
//!
//! ## Fonts
//!
//! ```text
//! Fonts: 1 cached, 1 fetched (2 total)
//!     Schibsted Grotesk 700
//!     Source Sans Pro 400
//! ```
//!
//! ## Build / Update
//!
//! ```text
//! index → index-og-image.webp
//! notes/rust → notes/rust-og-image.webp
//! about: custom image, skipped
//! drafts/x: FAILED render failed: SVG parse failed: ...
//!
//! Generated 2 cards, 1 skipped, 1 failed
//! ```
//!
//! ## Meta
//!
//! ```text
//! notes/rust
//!     <meta property="og:image:width" content="1200">
//!     ...
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use std::path::Path;

use crate::emit::{EmitEvent, EmitReport};
use crate::fonts::{FontSet, FontStats};
use crate::meta::{MetaTag, render_meta_tags};

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Show `path` relative to `root` when it lives under it.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Fonts
// ============================================================================

pub fn format_font_summary(stats: &FontStats, fonts: &FontSet) -> Vec<String> {
    let mut lines = vec![format!("Fonts: {}", stats)];
    for font in fonts.fonts() {
        lines.push(format!("{}{} {}", indent(1), font.family, font.weight));
    }
    lines
}

pub fn print_font_summary(stats: &FontStats, fonts: &FontSet) {
    for line in format_font_summary(stats, fonts) {
        println!("{}", line);
    }
}

// ============================================================================
// Build / Update
// ============================================================================

/// One line per emission event, paths relative to `output_root`.
pub fn format_emit_event(event: &EmitEvent, output_root: &Path) -> Vec<String> {
    match event {
        EmitEvent::Written { slug, path } => {
            vec![format!("{} → {}", slug, display_path(path, output_root))]
        }
        EmitEvent::Skipped { slug } => vec![format!("{}: custom image, skipped", slug)],
        EmitEvent::Failed { slug, error } => vec![format!("{}: FAILED {}", slug, error)],
    }
}

pub fn format_emit_summary(report: &EmitReport) -> Vec<String> {
    let mut parts = vec![format!("Generated {}", plural(report.written.len(), "card"))];
    if !report.skipped.is_empty() {
        parts.push(format!("{} skipped", report.skipped.len()));
    }
    if !report.failed.is_empty() {
        parts.push(format!("{} failed", report.failed.len()));
    }
    vec![String::new(), parts.join(", ")]
}

pub fn print_emit_summary(report: &EmitReport) {
    for line in format_emit_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Meta
// ============================================================================

/// Slug header followed by the page's tags, one per line.
pub fn format_meta_tags(slug: &str, tags: &[MetaTag]) -> Vec<String> {
    let mut lines = vec![slug.to_string()];
    if tags.is_empty() {
        lines.push(format!("{}(no tags: base_url not set)", indent(1)));
        return lines;
    }
    for tag in tags {
        let html = render_meta_tags(std::slice::from_ref(tag)).into_string();
        lines.push(format!("{}{}", indent(1), html));
    }
    lines
}

pub fn print_meta_tags(slug: &str, tags: &[MetaTag]) {
    for line in format_meta_tags(slug, tags) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::{FontStyle, ResolvedFont};
    use std::path::PathBuf;

    #[test]
    fn written_event_is_relative() {
        let event = EmitEvent::Written {
            slug: "notes/rust".into(),
            path: PathBuf::from("/site/public/notes/rust-og-image.webp"),
        };
        assert_eq!(
            format_emit_event(&event, Path::new("/site/public")),
            vec!["notes/rust → notes/rust-og-image.webp"]
        );
    }

    #[test]
    fn skipped_and_failed_events() {
        let root = Path::new("out");
        assert_eq!(
            format_emit_event(&EmitEvent::Skipped { slug: "a".into() }, root),
            vec!["a: custom image, skipped"]
        );
        let failed = EmitEvent::Failed {
            slug: "b".into(),
            error: "boom".into(),
        };
        assert_eq!(format_emit_event(&failed, root), vec!["b: FAILED boom"]);
    }

    #[test]
    fn summary_counts() {
        let report = EmitReport {
            written: vec![PathBuf::from("a"), PathBuf::from("b")],
            skipped: vec!["c".into()],
            failed: vec![("d".into(), "boom".into())],
            ..EmitReport::default()
        };
        assert_eq!(
            format_emit_summary(&report),
            vec!["", "Generated 2 cards, 1 skipped, 1 failed"]
        );
    }

    #[test]
    fn summary_singular() {
        let report = EmitReport {
            written: vec![PathBuf::from("a")],
            ..EmitReport::default()
        };
        assert_eq!(format_emit_summary(&report)[1], "Generated 1 card");
    }

    #[test]
    fn font_summary_lists_faces() {
        let stats = FontStats {
            cached: 1,
            fetched: 1,
            failed: 0,
        };
        let fonts = FontSet::new(vec![ResolvedFont {
            family: "Inter".into(),
            weight: 700,
            style: FontStyle::Normal,
            data: Vec::new(),
        }]);
        assert_eq!(
            format_font_summary(&stats, &fonts),
            vec!["Fonts: 1 cached, 1 fetched (2 total)", "    Inter 700"]
        );
    }

    #[test]
    fn meta_without_tags_explains() {
        let lines = format_meta_tags("a", &[]);
        assert_eq!(lines[0], "a");
        assert!(lines[1].contains("base_url"));
    }
}
