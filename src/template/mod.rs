//! Card layout strategy.
//!
//! A [`Template`] turns one page's resolved text into an abstract [`Node`]
//! tree. It is pure: no I/O, no fonts loaded, no rasterization. The
//! renderer lays the tree out and paints it.
//!
//! The built-in layout lives in [`default`]; sites can swap in their own
//! through `ImageOptions::image_structure`.

pub mod default;
pub mod tree;

pub use tree::{
    Align, BoxNode, BoxStyle, Direction, Edges, ImageNode, Justify, Node, TextNode, TextStyle,
};

use chrono::NaiveDate;
use std::fmt;
use std::sync::Arc;

use crate::config::{ImageOptions, SiteConfig};
use crate::fonts::FontSet;
use crate::types::PageData;

/// Everything a template may read for one card.
#[derive(Debug, Clone, Copy)]
pub struct TemplateInput<'a> {
    pub page: &'a PageData,
    /// Effective title, suffix included.
    pub title: &'a str,
    /// Effective description.
    pub description: &'a str,
    pub fonts: &'a FontSet,
    pub config: &'a SiteConfig,
    pub options: &'a ImageOptions,
    /// Site icon as a `data:` URI, when one was found.
    pub icon: Option<&'a str>,
}

/// Layout strategy: `TemplateInput -> Node`.
#[derive(Clone)]
pub struct Template(Arc<dyn Fn(&TemplateInput<'_>) -> Node + Send + Sync>);

impl Template {
    pub fn new(f: impl Fn(&TemplateInput<'_>) -> Node + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn build(&self, input: &TemplateInput<'_>) -> Node {
        (self.0)(input)
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::new(default::card)
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Template(..)")
    }
}

/// Titles longer than this many characters get the smaller size.
pub const TITLE_BREAKPOINT: usize = 32;
pub const TITLE_SIZE: f32 = 72.0;
pub const TITLE_SIZE_LONG: f32 = 64.0;

/// Title font size by character count.
pub fn title_font_size(title: &str) -> f32 {
    if title.chars().count() > TITLE_BREAKPOINT {
        TITLE_SIZE_LONG
    } else {
        TITLE_SIZE
    }
}

/// Card date format, e.g. `Jan 05, 2024`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_size_breakpoint() {
        assert_eq!(title_font_size("Short title"), 72.0);
        assert_eq!(title_font_size(&"x".repeat(32)), 72.0);
        assert_eq!(title_font_size(&"x".repeat(33)), 64.0);
        // Counted in characters, not bytes
        assert_eq!(title_font_size(&"é".repeat(20)), 72.0);
    }

    #[test]
    fn date_format() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(format_date(date), "Jan 05, 2024");
    }

    #[test]
    fn custom_template_is_used() {
        let template = Template::new(|input| {
            TextNode::new(input.title, TextStyle::new("x", 400, 10.0, "#000")).into()
        });
        let page = PageData::new("a");
        let config = SiteConfig::default();
        let fonts = FontSet::default();
        let input = TemplateInput {
            page: &page,
            title: "Custom",
            description: "",
            fonts: &fonts,
            config: &config,
            options: &config.og_image,
            icon: None,
        };
        assert_eq!(template.build(&input).texts(), vec!["Custom"]);
    }
}
