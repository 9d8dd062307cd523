//! # ogcard
//!
//! Open Graph card generator for static sites. For every page of a build it
//! renders a 1200×630 social preview image (title, description, date,
//! reading time, tags, site icon) and produces the `<meta>` tags that point
//! link unfurlers at it.
//!
//! # Architecture: Fonts Once, Pages in Parallel
//!
//! ```text
//! 1. Fonts     theme typography  →  FontSet          (cache → Google Fonts)
//! 2. Layout    page + FontSet    →  Node tree        (pure template)
//! 3. Render    Node tree         →  SVG → WebP bytes (resvg + libwebp)
//! 4. Write     bytes             →  <output>/<slug>-og-image.webp
//! ```
//!
//! Step 1 runs once per build. Steps 2–4 run per page on the rayon pool,
//! and one page failing never stops the others. Meta tags are computed
//! independently of rendering.
//!
//! The host site build owns content parsing. It hands ogcard a JSON page
//! manifest (full builds) or a change list (incremental builds); see
//! [`types`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`fonts`] | Font specifications, on-disk font cache, Google Fonts resolver |
//! | [`fetch`] | HTTP seam (`ureq`) shared by fonts and emoji |
//! | [`template`] | Layout strategy and the abstract visual tree |
//! | [`render`] | Layout → SVG, emoji lookup, rasterization and WebP encoding |
//! | [`emit`] | Full and incremental emission, per-page skip/write decisions |
//! | [`meta`] | Image URL priority and `<meta>` tag rendering |
//! | [`config`] | `config.toml` loading, merging over defaults, validation |
//! | [`types`] | Page data and change events handed over by the host |
//! | [`metadata`] | Title/description fallbacks, entity decoding, reading time |
//! | [`naming`] | Slug → output path and public URL conventions |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## SVG as the Intermediate Format
//!
//! Templates build an abstract tree, which is laid out and written as SVG
//! with [Maud](https://maud.lambda.xyz/), then rasterized by `resvg`. SVG
//! keeps the renderer pure Rust with no headless browser, and the markup of
//! any card can be dumped and opened in a browser when a layout looks off.
//!
//! ## Lossy WebP
//!
//! Cards are encoded as lossy WebP at quality 40. Flat colors and text
//! compress well, and the result stays far below the size limits of the
//! common unfurlers.
//!
//! ## Custom Images Win
//!
//! A page that declares `socialImage` in its frontmatter is never rendered
//! and its declared image is what the meta tags advertise. Authors always
//! have the last word over the generated card.

pub mod config;
pub mod emit;
pub mod fetch;
pub mod fonts;
pub mod meta;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod render;
pub mod template;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
