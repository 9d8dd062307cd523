//! Open Graph image meta tags.
//!
//! Decides which image a page advertises to link previews and renders the
//! `<meta>` tags for the page head. Independent of emission: a page's tags
//! point at its generated card whether or not this build wrote it.
//!
//! ## Image URL priority
//!
//! 1. `socialImage` from frontmatter. Absolute URLs are kept as written,
//!    anything else is a path under `static/`.
//! 2. The generated card `https://<base>/<slug>-og-image.webp`, for pages
//!    backed by a real source file.
//! 3. The site-wide fallback `https://<base>/static/og-image.png`.
//!
//! Nothing is emitted without a `base_url`: relative image URLs are not
//! usable by link unfurlers.

use maud::{Markup, html};

use crate::config::{ImageOptions, SiteConfig};
use crate::naming::{self, DEFAULT_OG_IMAGE, STATIC_DIR};
use crate::types::PageData;

/// HTML attribute the tag key goes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaAttr {
    /// `<meta property=...>`, Open Graph.
    Property,
    /// `<meta name=...>`, Twitter cards.
    Name,
}

/// One `<meta>` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaTag {
    pub attr: MetaAttr,
    pub key: &'static str,
    pub content: String,
}

impl MetaTag {
    fn property(key: &'static str, content: impl Into<String>) -> Self {
        Self {
            attr: MetaAttr::Property,
            key,
            content: content.into(),
        }
    }

    fn name(key: &'static str, content: impl Into<String>) -> Self {
        Self {
            attr: MetaAttr::Name,
            key,
            content: content.into(),
        }
    }
}

/// MIME type for an image URL, by extension. Defaults to `image/png`.
pub fn mime_for_url(url: &str) -> String {
    match naming::url_extension(url).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg".to_string(),
        Some("svg") => "image/svg+xml".to_string(),
        Some(ext) => format!("image/{ext}"),
        None => "image/png".to_string(),
    }
}

/// Public URL of the image a page advertises.
pub fn og_image_url(page: &PageData, base_url: &str) -> String {
    if let Some(image) = page
        .frontmatter
        .social_image
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        if naming::is_absolute_url(image) {
            return image.to_string();
        }
        let path = format!("{STATIC_DIR}/{}", image.trim_start_matches('/'));
        return naming::site_url(base_url, &path);
    }
    if page.is_real_file() {
        return naming::site_url(base_url, &naming::og_image_file(&page.slug));
    }
    naming::site_url(base_url, DEFAULT_OG_IMAGE)
}

/// Image meta tags for a page, in head order. Empty without a `base_url`.
pub fn og_image_tags(
    page: &PageData,
    config: &SiteConfig,
    options: &ImageOptions,
) -> Vec<MetaTag> {
    let Some(base_url) = config.base_url.as_deref() else {
        tracing::debug!(slug = %page.slug, "no base_url, skipping image meta tags");
        return Vec::new();
    };

    let url = og_image_url(page, base_url);
    let mut tags = Vec::with_capacity(6);
    // Card dimensions are only known for images we generate.
    if !page.has_custom_image() {
        tags.push(MetaTag::property("og:image:width", options.width.to_string()));
        tags.push(MetaTag::property("og:image:height", options.height.to_string()));
    }
    tags.push(MetaTag::property("og:image", url.clone()));
    tags.push(MetaTag::property("og:image:url", url.clone()));
    tags.push(MetaTag::name("twitter:image", url.clone()));
    tags.push(MetaTag::property("og:image:type", mime_for_url(&url)));
    tags
}

/// Render tags as HTML for injection into `<head>`.
pub fn render_meta_tags(tags: &[MetaTag]) -> Markup {
    html! {
        @for tag in tags {
            @match tag.attr {
                MetaAttr::Property => {
                    meta property=(tag.key) content=(tag.content);
                }
                MetaAttr::Name => {
                    meta name=(tag.key) content=(tag.content);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{page, real_page};

    fn config(base: Option<&str>) -> SiteConfig {
        SiteConfig {
            base_url: base.map(String::from),
            ..SiteConfig::default()
        }
    }

    fn content<'a>(tags: &'a [MetaTag], key: &str) -> Option<&'a str> {
        tags.iter()
            .find(|t| t.key == key)
            .map(|t| t.content.as_str())
    }

    #[test]
    fn no_base_url_no_tags() {
        let cfg = config(None);
        assert!(og_image_tags(&real_page("a"), &cfg, &cfg.og_image).is_empty());
    }

    #[test]
    fn generated_card_for_real_file() {
        let cfg = config(Some("example.com/blog/"));
        let tags = og_image_tags(&real_page("notes/rust"), &cfg, &cfg.og_image);
        let keys: Vec<&str> = tags.iter().map(|t| t.key).collect();
        assert_eq!(
            keys,
            vec![
                "og:image:width",
                "og:image:height",
                "og:image",
                "og:image:url",
                "twitter:image",
                "og:image:type",
            ]
        );
        assert_eq!(
            content(&tags, "og:image"),
            Some("https://example.com/blog/notes/rust-og-image.webp")
        );
        assert_eq!(content(&tags, "og:image:width"), Some("1200"));
        assert_eq!(content(&tags, "og:image:type"), Some("image/webp"));
    }

    #[test]
    fn virtual_page_uses_site_fallback() {
        let cfg = config(Some("example.com"));
        let tags = og_image_tags(&page("tags/rust"), &cfg, &cfg.og_image);
        assert_eq!(
            content(&tags, "og:image"),
            Some("https://example.com/static/og-image.png")
        );
        assert_eq!(content(&tags, "og:image:type"), Some("image/png"));
    }

    #[test]
    fn user_image_wins_and_drops_dimensions() {
        let cfg = config(Some("example.com"));
        let mut p = real_page("a");
        p.frontmatter.social_image = Some("cards/a.jpg".into());
        let tags = og_image_tags(&p, &cfg, &cfg.og_image);
        assert_eq!(
            content(&tags, "og:image"),
            Some("https://example.com/static/cards/a.jpg")
        );
        assert_eq!(content(&tags, "og:image:width"), None);
        assert_eq!(content(&tags, "og:image:type"), Some("image/jpeg"));
    }

    #[test]
    fn absolute_user_image_kept() {
        let cfg = config(Some("example.com"));
        let mut p = real_page("a");
        p.frontmatter.social_image = Some("https://cdn.test/x.svg?v=2".into());
        let tags = og_image_tags(&p, &cfg, &cfg.og_image);
        assert_eq!(content(&tags, "twitter:image"), Some("https://cdn.test/x.svg?v=2"));
        assert_eq!(content(&tags, "og:image:type"), Some("image/svg+xml"));
    }

    #[test]
    fn mime_defaults_to_png() {
        assert_eq!(mime_for_url("https://a.test/image"), "image/png");
        assert_eq!(mime_for_url("https://a.test/i.JPEG"), "image/jpeg");
        assert_eq!(mime_for_url("https://a.test/i.gif"), "image/gif");
    }

    #[test]
    fn renders_html() {
        let tags = vec![
            MetaTag::property("og:image", "https://a.test/x.png?a=1&b=2"),
            MetaTag::name("twitter:image", "https://a.test/x.png"),
        ];
        let html = render_meta_tags(&tags).into_string();
        assert_eq!(
            html,
            "<meta property=\"og:image\" content=\"https://a.test/x.png?a=1&amp;b=2\">\
             <meta name=\"twitter:image\" content=\"https://a.test/x.png\">"
        );
    }
}
