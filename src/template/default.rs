//! Built-in card layout.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │ [icon]  Title, up to two lines                         │
//! │                                                        │
//! │ Description, up to five lines                          │
//! │                                                        │
//! │ Jan 05, 2024  3 min read              #tag #tag #tag   │
//! ├────────────────────────────────────────────────────────┤  accent bar
//! └────────────────────────────────────────────────────────┘
//! ```

use super::tree::{Align, BoxNode, Edges, ImageNode, Justify, Node, TextNode, TextStyle};
use super::{TemplateInput, format_date, title_font_size};
use crate::fonts::{DEFAULT_BODY_WEIGHT, DEFAULT_HEADER_WEIGHT, FontSpecification};
use crate::metadata::reading_time_minutes;

pub const MAX_TAGS: usize = 3;
pub const TITLE_LINES: usize = 2;
pub const DESCRIPTION_LINES: usize = 5;

const PADDING_X: f32 = 80.0;
const PADDING_Y: f32 = 64.0;
const ICON_SIZE: f32 = 72.0;
const ACCENT_HEIGHT: f32 = 12.0;
const DESCRIPTION_SIZE: f32 = 36.0;
const FOOTER_SIZE: f32 = 28.0;
const TAG_SIZE: f32 = 24.0;

/// Tags shown on the card: the first three, in order.
pub fn card_tags(tags: &[String]) -> impl Iterator<Item = &str> {
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .take(MAX_TAGS)
}

fn heaviest(spec: &FontSpecification, default: u16) -> u16 {
    spec.weights_or(default).into_iter().max().unwrap_or(default)
}

fn lightest(spec: &FontSpecification, default: u16) -> u16 {
    spec.weights_or(default).into_iter().min().unwrap_or(default)
}

/// The default card.
pub fn card(input: &TemplateInput<'_>) -> Node {
    let typography = &input.config.theme.typography;
    let colors = input.config.theme.colors.scheme(input.options.color_scheme);
    let width = input.options.width as f32;
    let height = input.options.height as f32;

    let header_family = typography.header.family();
    let header_weight = heaviest(&typography.header, DEFAULT_HEADER_WEIGHT);
    let body_family = typography.body.family();
    let body_weight = lightest(&typography.body, DEFAULT_BODY_WEIGHT);

    let title = TextNode::new(
        input.title,
        TextStyle::new(
            header_family,
            header_weight,
            title_font_size(input.title),
            &colors.dark,
        )
        .line_height(1.1),
    )
    .max_lines(TITLE_LINES);

    let icon = input
        .icon
        .map(|href| ImageNode::new(href, ICON_SIZE, ICON_SIZE).radius(12.0));

    let header = BoxNode::row()
        .gap(28.0)
        .align(Align::Center)
        .child_opt(icon)
        .child(BoxNode::column().grow(1.0).child(title));

    let description = BoxNode::column().grow(1.0).child(
        TextNode::new(
            input.description,
            TextStyle::new(body_family, body_weight, DESCRIPTION_SIZE, &colors.darkgray)
                .line_height(1.4),
        )
        .max_lines(DESCRIPTION_LINES),
    );

    let muted = |text: String| {
        TextNode::new(
            text,
            TextStyle::new(body_family, body_weight, FOOTER_SIZE, &colors.gray),
        )
    };

    let date = input
        .page
        .dates
        .get(&input.config.default_date_type)
        .map(|d| muted(format_date(*d)));
    if date.is_none() {
        tracing::debug!(
            slug = %input.page.slug,
            kind = ?input.config.default_date_type,
            "no date for card"
        );
    }
    let minutes = reading_time_minutes(&input.page.text);
    let reading_time = muted(input.options.reading_time_text.format(minutes));

    let tags = card_tags(&input.page.frontmatter.tags).map(|tag| {
        BoxNode::row()
            .padding(Edges::xy(16.0, 6.0))
            .radius(10.0)
            .background(&colors.highlight)
            .child(TextNode::new(
                format!("#{tag}"),
                TextStyle::new(body_family, body_weight, TAG_SIZE, &colors.secondary),
            ))
    });

    let footer = BoxNode::row()
        .justify(Justify::SpaceBetween)
        .align(Align::Center)
        .child(
            BoxNode::row()
                .gap(32.0)
                .align(Align::Center)
                .child_opt(date)
                .child(reading_time),
        )
        .child(BoxNode::row().gap(12.0).children(tags));

    let content = BoxNode::column()
        .grow(1.0)
        .gap(36.0)
        .padding(Edges::xy(PADDING_X, PADDING_Y))
        .child(header)
        .child(description)
        .child(footer);

    BoxNode::column()
        .size(width, height)
        .background(&colors.light)
        .child(content)
        .child(
            BoxNode::row()
                .size(width, ACCENT_HEIGHT)
                .background(&colors.secondary),
        )
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::fonts::FontSet;
    use crate::template::{TITLE_SIZE, TITLE_SIZE_LONG, TemplateInput};
    use crate::test_helpers::page;
    use crate::types::{DateKind, PageData};
    use chrono::NaiveDate;

    fn render(page: &PageData, config: &SiteConfig, title: &str) -> Node {
        let fonts = FontSet::default();
        card(&TemplateInput {
            page,
            title,
            description: "A description",
            fonts: &fonts,
            config,
            options: &config.og_image,
            icon: None,
        })
    }

    #[test]
    fn at_most_three_tags_in_order() {
        let mut p = page("a");
        p.frontmatter.tags = ["rust", "svg", "web", "og", "extra"]
            .map(String::from)
            .to_vec();
        let tree = render(&p, &SiteConfig::default(), "T");
        let tags: Vec<&str> = tree
            .texts()
            .into_iter()
            .filter(|t| t.starts_with('#'))
            .collect();
        assert_eq!(tags, vec!["#rust", "#svg", "#web"]);
    }

    #[test]
    fn long_title_gets_smaller_size() {
        let config = SiteConfig::default();
        let short = render(&page("a"), &config, "Short");
        assert_eq!(short.find_text("Short").unwrap().style.size, TITLE_SIZE);

        let long_title = "A considerably longer title that wraps";
        let long = render(&page("a"), &config, long_title);
        let node = long.find_text(long_title).unwrap();
        assert_eq!(node.style.size, TITLE_SIZE_LONG);
        assert_eq!(node.max_lines, Some(TITLE_LINES));
    }

    #[test]
    fn date_omitted_when_missing() {
        let config = SiteConfig::default();
        let tree = render(&page("a"), &config, "T");
        assert!(!tree.texts().iter().any(|t| t.contains(", 20")));
    }

    #[test]
    fn date_uses_configured_kind() {
        let mut p = page("a");
        p.dates.insert(
            DateKind::Created,
            NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
        );
        p.dates.insert(
            DateKind::Modified,
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        );
        let mut config = SiteConfig::default();
        assert!(render(&p, &config, "T").find_text("Jan 05, 2024").is_some());

        config.default_date_type = DateKind::Created;
        assert!(render(&p, &config, "T").find_text("Mar 01, 2023").is_some());
    }

    #[test]
    fn reading_time_uses_formatter() {
        let mut p = page("a");
        p.text = "word ".repeat(450);
        let mut config = SiteConfig::default();
        assert!(render(&p, &config, "T").find_text("3 min read").is_some());

        config.og_image.reading_time_text =
            crate::config::ReadingTimeFormatter::new(|m| format!("{m} Minuten"));
        assert!(render(&p, &config, "T").find_text("3 Minuten").is_some());
    }

    #[test]
    fn icon_only_when_present() {
        let config = SiteConfig::default();
        let p = page("a");
        assert!(render(&p, &config, "T").images().is_empty());

        let fonts = FontSet::default();
        let tree = card(&TemplateInput {
            page: &p,
            title: "T",
            description: "",
            fonts: &fonts,
            config: &config,
            options: &config.og_image,
            icon: Some("data:image/png;base64,AAAA"),
        });
        assert_eq!(tree.images().len(), 1);
    }

    #[test]
    fn dark_scheme_changes_background() {
        let mut config = SiteConfig::default();
        config.og_image.color_scheme = crate::config::ColorSchemeName::DarkMode;
        let Node::Box(root) = render(&page("a"), &config, "T") else {
            panic!("root must be a box");
        };
        assert_eq!(root.style.background.as_deref(), Some("#161618"));
    }
}
