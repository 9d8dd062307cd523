//! Production backend: SVG → resvg pixmap → lossy WebP.
//!
//! ## Crate mapping
//!
//! | Step | Crate / function |
//! |---|---|
//! | Parse SVG, shape text | `usvg::Tree::from_str` with the build's `fontdb` |
//! | Rasterize | `resvg::render` into a `tiny_skia::Pixmap` |
//! | Unpremultiply | `tiny_skia::PremultipliedColorU8::demultiply` → `image::RgbaImage` |
//! | Encode → WebP | `webp::Encoder` (lossy; the `image` crate only writes lossless) |

use image::{DynamicImage, RgbaImage};
use resvg::{tiny_skia, usvg};

use super::emoji::EmojiProvider;
use super::{Quality, RenderBackend, RenderError, Size, svg};
use crate::fonts::FontSet;
use crate::template::Node;

/// Rasterizes cards with resvg and encodes them as lossy WebP.
pub struct ResvgBackend {
    quality: Quality,
    emoji: Box<dyn EmojiProvider>,
}

impl ResvgBackend {
    pub fn new(quality: Quality, emoji: Box<dyn EmojiProvider>) -> Self {
        Self { quality, emoji }
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }
}

impl RenderBackend for ResvgBackend {
    fn render(&self, tree: &Node, size: Size, fonts: &FontSet) -> Result<Vec<u8>, RenderError> {
        let markup = svg::to_svg(tree, size, fonts, self.emoji.as_ref());
        let pixels = rasterize(&markup, size, fonts)?;
        encode_webp(pixels, self.quality)
    }
}

/// Rasterize SVG markup onto a `size` canvas.
pub fn rasterize(markup: &str, size: Size, fonts: &FontSet) -> Result<RgbaImage, RenderError> {
    let options = usvg::Options {
        fontdb: fonts.database(),
        ..usvg::Options::default()
    };
    let tree =
        usvg::Tree::from_str(markup, &options).map_err(|e| RenderError::Svg(e.to_string()))?;

    let canvas_error = || RenderError::Canvas {
        width: size.width,
        height: size.height,
    };
    let mut pixmap = tiny_skia::Pixmap::new(size.width, size.height).ok_or_else(canvas_error)?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RgbaImage::from_raw(size.width, size.height, rgba).ok_or_else(canvas_error)
}

/// Encode pixels as lossy WebP.
pub fn encode_webp(pixels: RgbaImage, quality: Quality) -> Result<Vec<u8>, RenderError> {
    let image = DynamicImage::ImageRgba8(pixels);
    let encoder =
        webp::Encoder::from_image(&image).map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(encoder.encode(quality.value() as f32).to_vec())
}
