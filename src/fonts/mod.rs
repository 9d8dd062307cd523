//! Font acquisition for card rendering.
//!
//! | Piece | Type |
//! |---|---|
//! | **Spec** | [`FontSpecification`]: family name or `{ name, weights }` record |
//! | **Cache** | [`FontCache`] trait, [`DiskFontCache`], [`MemoryFontCache`] |
//! | **Resolve** | [`FontResolver`]: cache first, then Google Fonts |
//! | **Result** | [`FontSet`]: ordered resolved fonts + shared `fontdb` database |
//! | **Measure** | [`TextMetrics`]: glyph advances from the faces in that database |
//!
//! A build resolves its fonts exactly once, before any page is rendered, so
//! every card of the run is drawn with the same faces.

mod cache;
mod metrics;
mod resolver;

pub use cache::{DiskFontCache, FontCache, MemoryFontCache, cache_key};
pub use metrics::TextMetrics;
pub use resolver::{FontResolver, FontStats, extract_font_url, stylesheet_url};

use resvg::usvg::fontdb;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};

/// Weight used for header fonts given by bare name.
pub const DEFAULT_HEADER_WEIGHT: u16 = 700;

/// Weight used for body fonts given by bare name.
pub const DEFAULT_BODY_WEIGHT: u16 = 400;

/// A typeface as written in the theme config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FontSpecification {
    /// Bare family name, e.g. `"Inter"`.
    Name(String),
    /// Family with explicit weights.
    Detailed {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        weights: Vec<u16>,
        /// Kept for theme compatibility; cards only use upright faces.
        #[serde(default, alias = "includeItalic")]
        include_italic: bool,
    },
}

impl FontSpecification {
    pub fn family(&self) -> &str {
        match self {
            Self::Name(name) | Self::Detailed { name, .. } => name,
        }
    }

    /// Weights to resolve, falling back to `default` when none are listed.
    pub fn weights_or(&self, default: u16) -> Vec<u16> {
        match self {
            Self::Detailed { weights, .. } if !weights.is_empty() => weights.clone(),
            _ => vec![default],
        }
    }
}

impl From<&str> for FontSpecification {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// Font style of a resolved face. Cards only use upright faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStyle {
    #[default]
    Normal,
}

/// A family/weight pair with its glyph data, ready for rendering.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedFont {
    pub family: String,
    pub weight: u16,
    pub style: FontStyle,
    pub data: Vec<u8>,
}

impl std::fmt::Debug for ResolvedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFont")
            .field("family", &self.family)
            .field("weight", &self.weight)
            .field("style", &self.style)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Fonts resolved for one build: header weights first, then body weights.
///
/// Fonts that failed to resolve are simply absent. The `fontdb` database
/// used by the renderer, and the metrics layout measures with, are built on
/// first use and shared by all pages.
#[derive(Default)]
pub struct FontSet {
    fonts: Vec<ResolvedFont>,
    database: OnceLock<Arc<fontdb::Database>>,
    metrics: OnceLock<TextMetrics>,
}

impl FontSet {
    pub fn new(fonts: Vec<ResolvedFont>) -> Self {
        Self {
            fonts,
            database: OnceLock::new(),
            metrics: OnceLock::new(),
        }
    }

    pub fn fonts(&self) -> &[ResolvedFont] {
        &self.fonts
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn contains(&self, family: &str, weight: u16) -> bool {
        self.fonts
            .iter()
            .any(|f| f.family == family && f.weight == weight)
    }

    /// Font database for the renderer.
    ///
    /// Holds the resolved fonts plus the system fonts, so text still renders
    /// when a download failed. The last resolved family (a body face) becomes
    /// the `sans-serif` fallback.
    pub fn database(&self) -> Arc<fontdb::Database> {
        Arc::clone(self.database.get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            for font in &self.fonts {
                db.load_font_data(font.data.clone());
            }
            if let Some(font) = self.fonts.last() {
                db.set_sans_serif_family(font.family.clone());
            }
            tracing::debug!(faces = db.len(), "font database ready");
            Arc::new(db)
        }))
    }

    /// Text metrics over [`database`](Self::database).
    pub fn metrics(&self) -> &TextMetrics {
        self.metrics.get_or_init(|| TextMetrics::new(self.database()))
    }
}

impl std::fmt::Debug for FontSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(&self.fonts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name_uses_default_weight() {
        let spec = FontSpecification::from("Inter");
        assert_eq!(spec.family(), "Inter");
        assert_eq!(spec.weights_or(DEFAULT_HEADER_WEIGHT), vec![700]);
    }

    #[test]
    fn detailed_without_weights_uses_default() {
        let spec: FontSpecification = serde_json::from_str(r#"{"name": "Inter"}"#).unwrap();
        assert_eq!(spec.weights_or(DEFAULT_BODY_WEIGHT), vec![400]);
    }

    #[test]
    fn detailed_weights_keep_order() {
        let json = r#"{"name": "Inter", "weights": [700, 400], "includeItalic": true}"#;
        let spec: FontSpecification = serde_json::from_str(json).unwrap();
        assert_eq!(spec.family(), "Inter");
        assert_eq!(spec.weights_or(DEFAULT_BODY_WEIGHT), vec![700, 400]);
    }

    #[test]
    fn font_set_lookup() {
        let set = FontSet::new(vec![ResolvedFont {
            family: "Inter".into(),
            weight: 700,
            style: FontStyle::Normal,
            data: vec![0, 1, 2],
        }]);
        assert_eq!(set.len(), 1);
        assert!(set.contains("Inter", 700));
        assert!(!set.contains("Inter", 400));
    }

    #[test]
    fn database_is_built_once() {
        let set = FontSet::default();
        assert!(set.is_empty());
        assert!(Arc::ptr_eq(&set.database(), &set.database()));
    }
}
