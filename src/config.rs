//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. User values are
//! merged over the stock defaults, so a config file only needs the keys it
//! wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! # base_url = "example.com/blog"   # Host (+ prefix) without scheme; no meta tags when unset
//! locale = "en-US"
//! default_date_type = "modified"     # created | modified | published
//! page_title_suffix = ""
//!
//! [theme.typography]
//! header = "Schibsted Grotesk"       # or { name = "Inter", weights = [600, 700] }
//! body = "Source Sans Pro"
//!
//! [theme.colors.light_mode]
//! light = "#faf8f8"
//! # ... lightgray, gray, darkgray, dark, secondary, tertiary, highlight, text_highlight
//!
//! [og_image]
//! color_scheme = "light_mode"        # light_mode | dark_mode
//! width = 1200
//! height = 630
//! exclude_root = false
//! default_title = "Untitled"
//! default_description = "No description provided"
//! quality = 40
//! icon = "static/icon.png"
//! fetch_timeout_secs = 30
//!
//! [processing]
//! # max_threads = 4
//! ```
//!
//! Unknown keys are rejected to catch typos early.
//!
//! Two [`ImageOptions`] fields are code, not data: the reading-time
//! formatter and the layout template. They default to the built-in
//! behavior and are replaced programmatically by embedders.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::fonts::FontSpecification;
use crate::template::Template;
use crate::types::DateKind;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Public host and path prefix, without scheme. Meta tags need it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub locale: String,
    /// Which page date the card shows.
    pub default_date_type: DateKind,
    /// Appended to every card title.
    pub page_title_suffix: String,
    pub theme: ThemeConfig,
    /// Open Graph image generation options.
    pub og_image: ImageOptions,
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            locale: "en-US".to_string(),
            default_date_type: DateKind::Modified,
            page_title_suffix: String::new(),
            theme: ThemeConfig::default(),
            og_image: ImageOptions::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.og_image.width == 0 || self.og_image.height == 0 {
            return Err(ConfigError::Validation(
                "og_image.width and og_image.height must be positive".into(),
            ));
        }
        if !(1..=100).contains(&self.og_image.quality) {
            return Err(ConfigError::Validation(
                "og_image.quality must be 1-100".into(),
            ));
        }
        if self
            .base_url
            .as_deref()
            .is_some_and(|url| url.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "base_url must not be empty when set".into(),
            ));
        }
        Ok(())
    }
}

/// Fonts and colors shared with the site theme.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    pub typography: Typography,
    pub colors: ColorConfig,
}

/// Header and body typefaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Typography {
    pub header: FontSpecification,
    pub body: FontSpecification,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            header: FontSpecification::from("Schibsted Grotesk"),
            body: FontSpecification::from("Source Sans Pro"),
        }
    }
}

/// Color palettes for both schemes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light_mode: ColorScheme,
    pub dark_mode: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light_mode: ColorScheme::default_light(),
            dark_mode: ColorScheme::default_dark(),
        }
    }
}

impl ColorConfig {
    pub fn scheme(&self, name: ColorSchemeName) -> &ColorScheme {
        match name {
            ColorSchemeName::LightMode => &self.light_mode,
            ColorSchemeName::DarkMode => &self.dark_mode,
        }
    }
}

/// Individual palette. Values are any color syntax SVG accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    /// Page background.
    pub light: String,
    pub lightgray: String,
    /// Muted text (date, reading time).
    pub gray: String,
    /// Body text.
    pub darkgray: String,
    /// Headings.
    pub dark: String,
    /// Accent (tags).
    pub secondary: String,
    pub tertiary: String,
    /// Tag pill background.
    pub highlight: String,
    pub text_highlight: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            light: "#faf8f8".to_string(),
            lightgray: "#e5e5e5".to_string(),
            gray: "#b8b8b8".to_string(),
            darkgray: "#4e4e4e".to_string(),
            dark: "#2b2b2b".to_string(),
            secondary: "#284b63".to_string(),
            tertiary: "#84a59d".to_string(),
            highlight: "rgba(143, 159, 169, 0.15)".to_string(),
            text_highlight: "#fff23688".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            light: "#161618".to_string(),
            lightgray: "#393639".to_string(),
            gray: "#646464".to_string(),
            darkgray: "#d4d4d4".to_string(),
            dark: "#ebebec".to_string(),
            secondary: "#7b97aa".to_string(),
            tertiary: "#84a59d".to_string(),
            highlight: "rgba(143, 159, 169, 0.15)".to_string(),
            text_highlight: "#b3aa0288".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

/// Palette used for the cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSchemeName {
    #[default]
    #[serde(alias = "lightMode")]
    LightMode,
    #[serde(alias = "darkMode")]
    DarkMode,
}

/// Formats a reading time in minutes for display.
#[derive(Clone)]
pub struct ReadingTimeFormatter(Arc<dyn Fn(u32) -> String + Send + Sync>);

impl ReadingTimeFormatter {
    pub fn new(f: impl Fn(u32) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn format(&self, minutes: u32) -> String {
        (self.0)(minutes)
    }
}

impl Default for ReadingTimeFormatter {
    fn default() -> Self {
        Self::new(|minutes| format!("{minutes} min read"))
    }
}

impl fmt::Debug for ReadingTimeFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ReadingTimeFormatter(..)")
    }
}

/// Open Graph image generation options (`[og_image]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageOptions {
    pub color_scheme: ColorSchemeName,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Skip the home page. Applied by the caller, see
    /// [`eligible_pages`](crate::emit::eligible_pages).
    pub exclude_root: bool,
    pub default_title: String,
    pub default_description: String,
    /// Lossy WebP quality (1-100).
    pub quality: u32,
    /// Site icon shown on the card. Relative paths resolve against the
    /// working directory.
    pub icon: PathBuf,
    /// Global timeout for font and emoji requests. `0` disables it.
    pub fetch_timeout_secs: u64,
    #[serde(skip)]
    pub reading_time_text: ReadingTimeFormatter,
    #[serde(skip)]
    pub image_structure: Template,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            color_scheme: ColorSchemeName::LightMode,
            width: 1200,
            height: 630,
            exclude_root: false,
            default_title: "Untitled".to_string(),
            default_description: "No description provided".to_string(),
            quality: 40,
            icon: PathBuf::from("static/icon.png"),
            fetch_timeout_secs: 30,
            reading_time_text: ReadingTimeFormatter::default(),
            image_structure: Template::default(),
        }
    }
}

impl ImageOptions {
    /// Timeout for outgoing requests, `None` when disabled.
    pub fn fetch_timeout(&self) -> Option<std::time::Duration> {
        (self.fetch_timeout_secs > 0)
            .then(|| std::time::Duration::from_secs(self.fetch_timeout_secs))
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel render workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_threads: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_threads
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a `config.toml` path.
///
/// A missing file yields the stock defaults. A present file is merged over
/// them, unknown keys are rejected, and the result is validated.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    if !path.exists() {
        return resolve_config(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(value))
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# ogcard configuration
# ====================
# Every key is optional; values below are the defaults.

# Public host and path prefix, without scheme. Meta tags are only
# emitted when this is set.
# base_url = "example.com/blog"

locale = "en-US"

# Which page date the card shows: created | modified | published
default_date_type = "modified"

# Appended to every card title, e.g. " | My Garden"
page_title_suffix = ""

# ---------------------------------------------------------------------------
# Fonts are fetched from Google Fonts once and cached on disk.
# Use a bare family name, or a table to pick weights:
#   header = { name = "Inter", weights = [600, 700] }
# ---------------------------------------------------------------------------
[theme.typography]
header = "Schibsted Grotesk"
body = "Source Sans Pro"

[theme.colors.light_mode]
light = "#faf8f8"
lightgray = "#e5e5e5"
gray = "#b8b8b8"
darkgray = "#4e4e4e"
dark = "#2b2b2b"
secondary = "#284b63"
tertiary = "#84a59d"
highlight = "rgba(143, 159, 169, 0.15)"
text_highlight = "#fff23688"

[theme.colors.dark_mode]
light = "#161618"
lightgray = "#393639"
gray = "#646464"
darkgray = "#d4d4d4"
dark = "#ebebec"
secondary = "#7b97aa"
tertiary = "#84a59d"
highlight = "rgba(143, 159, 169, 0.15)"
text_highlight = "#b3aa0288"

[og_image]
# Palette used for the cards: light_mode | dark_mode
color_scheme = "light_mode"
width = 1200
height = 630
# Skip the home page (slug "index")
exclude_root = false
default_title = "Untitled"
default_description = "No description provided"
# Lossy WebP quality, 1-100
quality = 40
# Site icon shown next to the title; the card renders without it if missing
icon = "static/icon.png"
# Timeout for font/emoji downloads in seconds, 0 disables it
fetch_timeout_secs = 30

[processing]
# Maximum parallel render workers.
# Omit to auto-detect (= number of CPU cores).
# max_threads = 4
"##
}
