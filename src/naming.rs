//! Slug-derived paths and public URLs.
//!
//! Every generated card lives at a path computed from the page slug alone:
//!
//! ```text
//! slug "notes/rust"  →  <output>/notes/rust-og-image.webp
//!                   →  https://<base_url>/notes/rust-og-image.webp
//! ```
//!
//! Repeated builds therefore overwrite the same file instead of accumulating
//! new ones.

use std::path::{Path, PathBuf};

/// Suffix appended to the slug of a generated card.
pub const OG_IMAGE_SUFFIX: &str = "-og-image";

/// Extension of generated cards.
pub const OG_IMAGE_EXT: &str = "webp";

/// Slug of the site's home page.
pub const ROOT_SLUG: &str = "index";

/// Site-wide fallback image, relative to the site root.
pub const DEFAULT_OG_IMAGE: &str = "static/og-image.png";

/// Directory user-supplied images are resolved against.
pub const STATIC_DIR: &str = "static";

/// Strip leading and trailing slashes so slugs join cleanly.
fn trim_slug(slug: &str) -> &str {
    slug.trim_matches('/')
}

/// Relative file name of a page's card, e.g. `notes/rust-og-image.webp`.
pub fn og_image_file(slug: &str) -> String {
    format!("{}{}.{}", trim_slug(slug), OG_IMAGE_SUFFIX, OG_IMAGE_EXT)
}

/// Absolute output path of a page's card inside the build output.
pub fn og_image_path(output_root: &Path, slug: &str) -> PathBuf {
    output_root.join(og_image_file(slug))
}

/// True for the site's home page.
pub fn is_root_slug(slug: &str) -> bool {
    let slug = trim_slug(slug);
    slug.is_empty() || slug == ROOT_SLUG
}

/// True when `reference` already carries a scheme.
pub fn is_absolute_url(reference: &str) -> bool {
    reference.starts_with("https://") || reference.starts_with("http://")
}

/// Public URL of a path under the site root.
///
/// `base_url` is host plus optional prefix without scheme, the way it is
/// written in `config.toml` (`example.com/blog`).
pub fn site_url(base_url: &str, path: &str) -> String {
    let base = base_url
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    format!("https://{}/{}", base, path.trim_start_matches('/'))
}

/// File extension of a URL's last path segment, ignoring query and fragment.
pub fn url_extension(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let last = path.rsplit('/').next().unwrap_or(path);
    let (stem, ext) = last.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_slug_file() {
        assert_eq!(og_image_file("a/b"), "a/b-og-image.webp");
    }

    #[test]
    fn slug_slashes_are_trimmed() {
        assert_eq!(og_image_file("/notes/rust/"), "notes/rust-og-image.webp");
    }

    #[test]
    fn output_path_joins_root() {
        let path = og_image_path(Path::new("public"), "index");
        assert_eq!(path, Path::new("public/index-og-image.webp"));
    }

    #[test]
    fn root_slug_detection() {
        assert!(is_root_slug("index"));
        assert!(is_root_slug("/"));
        assert!(!is_root_slug("notes/index"));
    }

    #[test]
    fn site_url_normalizes_base() {
        assert_eq!(
            site_url("example.com/blog/", "/a-og-image.webp"),
            "https://example.com/blog/a-og-image.webp"
        );
        assert_eq!(
            site_url("https://example.com", "static/x.png"),
            "https://example.com/static/x.png"
        );
    }

    #[test]
    fn absolute_url_detection() {
        assert!(is_absolute_url("https://cdn.example.com/a.png"));
        assert!(is_absolute_url("http://cdn.example.com/a.png"));
        assert!(!is_absolute_url("images/a.png"));
    }

    #[test]
    fn extension_from_url() {
        assert_eq!(url_extension("https://x.io/a/b.WebP"), Some("webp".into()));
        assert_eq!(url_extension("https://x.io/a.jpg?v=2"), Some("jpg".into()));
        assert_eq!(url_extension("https://x.io/image"), None);
        assert_eq!(url_extension("https://x.io/.hidden"), None);
    }
}
