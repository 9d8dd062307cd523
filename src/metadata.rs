//! Card text resolution: fallbacks, entity decoding, reading time.
//!
//! ## Resolution priority
//!
//! Each field is resolved independently. The first non-empty value wins:
//!
//! - **Title**: frontmatter title → configured default, then the site-wide
//!   title suffix is appended
//! - **Description**: `socialDescription` → `description` → rendered excerpt
//!   (entities decoded) → configured default
//!
//! The excerpt comes out of the host's HTML pipeline, so it may still carry
//! `&amp;`-style entities that would otherwise show up verbatim on the card.

use std::borrow::Cow;

use crate::config::ImageOptions;
use crate::types::PageData;

/// Words per minute used for the reading-time estimate.
pub const WORDS_PER_MINUTE: usize = 200;

/// Resolve a metadata field from multiple sources.
///
/// Takes a list of optional values in priority order and returns the first
/// non-None, non-empty value (trimmed).
///
/// ```text
/// description: resolve(&[social_description, description, excerpt, default])
/// ```
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// Title shown on the card: frontmatter title or default, plus suffix.
pub fn effective_title(page: &PageData, options: &ImageOptions, suffix: &str) -> String {
    let base = resolve(&[
        page.frontmatter.title.as_deref(),
        Some(options.default_title.as_str()),
    ])
    .unwrap_or_default();
    format!("{base}{suffix}")
}

/// Description shown on the card.
pub fn effective_description(page: &PageData, options: &ImageOptions) -> String {
    let excerpt = page.description.as_deref().map(unescape_html);
    resolve(&[
        page.frontmatter.social_description.as_deref(),
        page.frontmatter.description.as_deref(),
        excerpt.as_deref(),
        Some(options.default_description.as_str()),
    ])
    .unwrap_or_default()
}

/// Reading time in whole minutes, rounded up.
pub fn reading_time_minutes(text: &str) -> u32 {
    let words = text.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE) as u32
}

/// Decode the HTML entities an excerpt can carry.
///
/// Covers the full HTML5 named entity set and numeric references.
/// Unknown entities are kept as written.
pub fn unescape_html(s: &str) -> Cow<'_, str> {
    html_escape::decode_html_entities(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // resolve() tests
    // =========================================================================

    #[test]
    fn resolve_first_non_empty_wins() {
        assert_eq!(
            resolve(&[None, Some("  "), Some("b"), Some("c")]),
            Some("b".to_string())
        );
    }

    #[test]
    fn resolve_trims() {
        assert_eq!(resolve(&[Some("  x \n")]), Some("x".to_string()));
    }

    #[test]
    fn resolve_all_empty_is_none() {
        assert_eq!(resolve(&[None, Some("")]), None);
    }

    // =========================================================================
    // Effective title / description
    // =========================================================================

    #[test]
    fn untitled_page_uses_default_and_suffix() {
        let page = PageData::new("a/b");
        let title = effective_title(&page, &ImageOptions::default(), " | Garden");
        assert_eq!(title, "Untitled | Garden");
    }

    #[test]
    fn frontmatter_title_wins() {
        let mut page = PageData::new("a");
        page.frontmatter.title = Some("Hello".into());
        assert_eq!(effective_title(&page, &ImageOptions::default(), ""), "Hello");
    }

    #[test]
    fn social_description_beats_description() {
        let mut page = PageData::new("a");
        page.frontmatter.description = Some("generic".into());
        page.frontmatter.social_description = Some("social".into());
        page.description = Some("excerpt".into());
        assert_eq!(
            effective_description(&page, &ImageOptions::default()),
            "social"
        );
    }

    #[test]
    fn excerpt_is_unescaped_and_trimmed() {
        let mut page = PageData::new("a");
        page.description = Some("  Tom &amp; Jerry &#8212; again \n".into());
        assert_eq!(
            effective_description(&page, &ImageOptions::default()),
            "Tom & Jerry \u{2014} again"
        );
    }

    #[test]
    fn typographic_entities_are_decoded() {
        let mut page = PageData::new("a");
        page.description = Some("It&rsquo;s here &mdash; finally&hellip;".into());
        assert_eq!(
            effective_description(&page, &ImageOptions::default()),
            "It\u{2019}s here \u{2014} finally\u{2026}"
        );
    }

    #[test]
    fn missing_description_uses_default() {
        let page = PageData::new("a");
        assert_eq!(
            effective_description(&page, &ImageOptions::default()),
            "No description provided"
        );
    }

    // =========================================================================
    // Reading time
    // =========================================================================

    #[test]
    fn reading_time_rounds_up() {
        assert_eq!(reading_time_minutes(""), 0);
        assert_eq!(reading_time_minutes("word"), 1);
        let text = "w ".repeat(201);
        assert_eq!(reading_time_minutes(&text), 2);
        let text = "w ".repeat(400);
        assert_eq!(reading_time_minutes(&text), 2);
    }

    // =========================================================================
    // unescape_html
    // =========================================================================

    #[test]
    fn unescape_plain_is_borrowed() {
        assert!(matches!(unescape_html("hello"), Cow::Borrowed("hello")));
    }

    #[test]
    fn unescape_named_and_numeric() {
        assert_eq!(unescape_html("&lt;b&gt;"), "<b>");
        assert_eq!(unescape_html("&quot;hi&quot;"), "\"hi\"");
        assert_eq!(unescape_html("&#39;"), "'");
        assert_eq!(unescape_html("&#x27;"), "'");
        assert_eq!(unescape_html("&#65;"), "A");
        assert_eq!(unescape_html("&ldquo;x&rdquo; &copy;"), "\u{201c}x\u{201d} \u{a9}");
    }

    #[test]
    fn unescape_keeps_unknown_and_bare_ampersand() {
        assert_eq!(unescape_html("a & b"), "a & b");
        assert_eq!(unescape_html("&bogus;"), "&bogus;");
        assert_eq!(unescape_html("AT&T"), "AT&T");
    }
}
