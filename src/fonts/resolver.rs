//! Font resolution: cache first, Google Fonts second.
//!
//! For each `(family, weight)` the resolver checks the [`FontCache`]. On a
//! miss it fetches the Google Fonts CSS2 stylesheet, pulls the first
//! `fonts.gstatic.com` TTF URL out of it, downloads that file and stores it.
//!
//! Every failure (network error, non-OK status, a stylesheet without a TTF
//! URL) is logged and the font is left out of the set. Rendering then falls
//! back to whatever faces did resolve; a missing font never aborts a build.

use rayon::prelude::*;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use super::cache::{FontCache, cache_key};
use super::{
    DEFAULT_BODY_WEIGHT, DEFAULT_HEADER_WEIGHT, FontSet, FontSpecification, FontStyle,
    ResolvedFont,
};
use crate::fetch::Fetcher;

const STYLESHEET_BASE: &str = "https://fonts.googleapis.com/css2";

static FONT_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"url\((https://fonts\.gstatic\.com/s/[^)]*?\.ttf)\)").expect("valid regex")
});

/// Google Fonts CSS2 URL for a family and weight.
pub fn stylesheet_url(family: &str, weight: u16) -> String {
    format!(
        "{STYLESHEET_BASE}?family={}:wght@{weight}",
        family.replace(' ', "+")
    )
}

/// First TTF URL in a Google Fonts stylesheet.
pub fn extract_font_url(css: &str) -> Option<&str> {
    FONT_URL
        .captures(css)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Per-build counts of how each font was obtained.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FontStats {
    pub cached: u32,
    pub fetched: u32,
    pub failed: u32,
}

impl FontStats {
    fn record(&mut self, resolution: &Resolution) {
        match resolution {
            Resolution::Cached(_) => self.cached += 1,
            Resolution::Fetched(_) => self.fetched += 1,
            Resolution::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.cached + self.fetched + self.failed
    }
}

impl fmt::Display for FontStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} cached, {} fetched", self.cached, self.fetched)?;
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        write!(f, " ({} total)", self.total())
    }
}

enum Resolution {
    Cached(Vec<u8>),
    Fetched(Vec<u8>),
    Failed,
}

impl Resolution {
    fn into_data(self) -> Option<Vec<u8>> {
        match self {
            Resolution::Cached(data) | Resolution::Fetched(data) => Some(data),
            Resolution::Failed => None,
        }
    }
}

/// Resolves font files through a cache and a fetcher.
pub struct FontResolver {
    cache: Box<dyn FontCache>,
    fetcher: Box<dyn Fetcher>,
}

impl FontResolver {
    pub fn new(cache: Box<dyn FontCache>, fetcher: Box<dyn Fetcher>) -> Self {
        Self { cache, fetcher }
    }

    /// Bytes of the TTF for `family` at `weight`, or `None` if unavailable.
    pub fn resolve(&self, family: &str, weight: u16) -> Option<Vec<u8>> {
        self.resolve_inner(family, weight).into_data()
    }

    fn resolve_inner(&self, family: &str, weight: u16) -> Resolution {
        let key = cache_key(family, weight);
        if let Some(data) = self.cache.get(&key) {
            tracing::debug!(font = %key, "font cache hit");
            return Resolution::Cached(data);
        }

        match self.download(family, weight) {
            Ok(data) => {
                if let Err(e) = self.cache.put(&key, &data) {
                    tracing::warn!(font = %key, error = %e, "could not cache font");
                }
                tracing::debug!(font = %key, bytes = data.len(), "font fetched");
                Resolution::Fetched(data)
            }
            Err(reason) => {
                tracing::warn!(family, weight, "font unavailable: {reason}");
                Resolution::Failed
            }
        }
    }

    fn download(&self, family: &str, weight: u16) -> Result<Vec<u8>, String> {
        let css = self
            .fetcher
            .fetch_text(&stylesheet_url(family, weight))
            .map_err(|e| e.to_string())?;
        let url = extract_font_url(&css).ok_or("no TTF URL in stylesheet")?;
        self.fetcher.fetch_bytes(url).map_err(|e| e.to_string())
    }

    /// Resolve every header and body weight concurrently.
    ///
    /// Header weights come first in the resulting set, then body weights.
    /// A pair listed twice (same family used for both roles) is resolved once.
    pub fn load(
        &self,
        header: &FontSpecification,
        body: &FontSpecification,
    ) -> (FontSet, FontStats) {
        let mut wanted: Vec<(String, u16)> = Vec::new();
        let header_pairs = header
            .weights_or(DEFAULT_HEADER_WEIGHT)
            .into_iter()
            .map(|w| (header.family().to_string(), w));
        let body_pairs = body
            .weights_or(DEFAULT_BODY_WEIGHT)
            .into_iter()
            .map(|w| (body.family().to_string(), w));
        for pair in header_pairs.chain(body_pairs) {
            if !wanted.contains(&pair) {
                wanted.push(pair);
            }
        }

        let resolutions: Vec<Resolution> = wanted
            .par_iter()
            .map(|(family, weight)| self.resolve_inner(family, *weight))
            .collect();

        let mut stats = FontStats::default();
        let fonts = wanted
            .into_iter()
            .zip(resolutions)
            .filter_map(|((family, weight), resolution)| {
                stats.record(&resolution);
                resolution.into_data().map(|data| ResolvedFont {
                    family,
                    weight,
                    style: FontStyle::Normal,
                    data,
                })
            })
            .collect();

        (FontSet::new(fonts), stats)
    }
}
