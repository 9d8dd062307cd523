//! Rasterization: visual tree in, encoded image bytes out.
//!
//! The [`RenderBackend`] trait is the seam between the emission driver and
//! the pixel work. The driver decides *which* cards to draw; a backend
//! decides *how*.
//!
//! | Stage | Module / crate |
//! |---|---|
//! | Layout + SVG markup | [`svg`] (`maud`) |
//! | Emoji lookup | [`emoji`] (Twemoji SVGs via [`Fetcher`](crate::fetch::Fetcher)) |
//! | SVG → pixels | `resvg` / `usvg` / `tiny-skia` |
//! | Pixels → WebP | `webp` (lossy, libwebp) |
//!
//! The production implementation is [`ResvgBackend`]. Tests use a recording
//! mock so no pixels are produced.

pub mod emoji;
mod raster;
pub mod svg;

pub use raster::{ResvgBackend, encode_webp, rasterize};

use crate::fonts::FontSet;
use crate::template::Node;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("SVG parse failed: {0}")]
    Svg(String),
    #[error("cannot allocate a {width}x{height} canvas")]
    Canvas { width: u32, height: u32 },
    #[error("WebP encoding failed: {0}")]
    Encode(String),
}

/// Output dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Quality setting for lossy WebP encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(40)
    }
}

/// Turns a laid-out card into encoded image bytes.
pub trait RenderBackend: Sync {
    fn render(&self, tree: &Node, size: Size, fonts: &FontSet) -> Result<Vec<u8>, RenderError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock backend that records renders without producing pixels.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockBackend {
        pub renders: Mutex<Vec<RecordedRender>>,
        /// Renders whose texts contain this string fail.
        pub fail_on: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedRender {
        pub texts: Vec<String>,
        pub size: Size,
        pub fonts: usize,
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_on(text: &str) -> Self {
            Self {
                fail_on: Some(text.to_string()),
                ..Self::default()
            }
        }

        pub fn get_renders(&self) -> Vec<RecordedRender> {
            self.renders.lock().unwrap().clone()
        }
    }

    impl RenderBackend for MockBackend {
        fn render(
            &self,
            tree: &Node,
            size: Size,
            fonts: &FontSet,
        ) -> Result<Vec<u8>, RenderError> {
            let texts: Vec<String> = tree.texts().into_iter().map(String::from).collect();
            if let Some(needle) = &self.fail_on {
                if texts.iter().any(|t| t.contains(needle.as_str())) {
                    return Err(RenderError::Svg(format!("mock failure on {needle}")));
                }
            }
            let joined = texts.join("\n");
            self.renders.lock().unwrap().push(RecordedRender {
                texts,
                size,
                fonts: fonts.len(),
            });
            Ok(joined.into_bytes())
        }
    }

    #[test]
    fn quality_clamped() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(250).value(), 100);
        assert_eq!(Quality::default().value(), 40);
    }
}
