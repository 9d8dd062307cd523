//! Layout and SVG generation.
//!
//! Lays a [`Node`] tree out on a fixed canvas and writes it as SVG markup
//! that `usvg` can parse. Layout is a small flexbox subset:
//!
//! - boxes stack children along their main axis with `gap` between them;
//! - free main-axis space goes to children with `grow > 0`, otherwise it is
//!   distributed by `justify`;
//! - in a column, box children stretch to the full width; text and images
//!   keep their measured width and are placed by `align`;
//! - in a row, children keep their measured height and are placed by `align`.
//!
//! Text is wrapped before layout, because the real shaping happens later
//! inside `usvg`. Widths come from [`TextMetrics`], which reads advances
//! from the same faces `usvg` will select.
//!
//! Emoji clusters become `<image>` elements with the provider's SVG as a
//! `data:` URI. Clusters the provider cannot supply stay in the text.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use maud::{Markup, html};

use super::Size;
use super::emoji::{EmojiProvider, Segment, emoji_code, segments};
use crate::fonts::{FontSet, TextMetrics};
use crate::template::{Align, BoxNode, Direction, Justify, Node, TextNode, TextStyle};

/// Advance of an emoji cluster, in em.
const EMOJI_ADVANCE: f32 = 1.1;
/// Ascent used to turn a line box into a baseline, in em.
const ASCENT: f32 = 0.8;
const ELLIPSIS: char = '…';

// =============================================================================
// Text metrics
// =============================================================================

/// Width of `text` in pixels.
pub fn text_width(text: &str, style: &TextStyle, metrics: &TextMetrics) -> f32 {
    segments(text)
        .into_iter()
        .map(|s| match s {
            Segment::Text(t) => metrics.width(t, &style.family, style.weight, style.size),
            Segment::Emoji(_) => EMOJI_ADVANCE * style.size,
        })
        .sum()
}

fn line_height(style: &TextStyle) -> f32 {
    style.size * style.line_height
}

/// Smallest units a word may be broken into: chars and emoji clusters.
fn units(word: &str) -> Vec<&str> {
    segments(word)
        .into_iter()
        .flat_map(|s| match s {
            Segment::Emoji(e) => vec![e],
            Segment::Text(t) => t
                .char_indices()
                .map(|(i, c)| &t[i..i + c.len_utf8()])
                .collect(),
        })
        .collect()
}

/// Greedy word wrap to `max_width`, clamped to `max_lines` with an ellipsis.
pub fn wrap(
    text: &str,
    style: &TextStyle,
    max_width: f32,
    max_lines: Option<usize>,
    metrics: &TextMetrics,
) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width(&candidate, style, metrics) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if text_width(word, style, metrics) <= max_width {
            current = word.to_string();
            continue;
        }
        // Word longer than a line: break between characters.
        for unit in units(word) {
            let next = format!("{current}{unit}");
            if !current.is_empty() && text_width(&next, style, metrics) > max_width {
                lines.push(std::mem::replace(&mut current, unit.to_string()));
            } else {
                current = next;
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if let Some(max) = max_lines {
        if lines.len() > max {
            lines.truncate(max);
            if let Some(last) = lines.last_mut() {
                *last = ellipsize(last, style, max_width, metrics);
            }
        }
    }
    lines
}

fn ellipsize(line: &str, style: &TextStyle, max_width: f32, metrics: &TextMetrics) -> String {
    let mut kept = units(line);
    loop {
        let text = format!("{}{ELLIPSIS}", kept.concat().trim_end());
        if kept.is_empty() || text_width(&text, style, metrics) <= max_width {
            return text;
        }
        kept.pop();
    }
}

// =============================================================================
// Layout
// =============================================================================

/// A positioned drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Draw<'a> {
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        fill: &'a str,
        radius: f32,
    },
    Line {
        x: f32,
        baseline: f32,
        text: String,
        style: &'a TextStyle,
    },
    Image {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        href: &'a str,
        radius: f32,
    },
}

/// Size a node takes when given `avail` width.
fn measure(node: &Node, avail: f32, m: &TextMetrics) -> (f32, f32) {
    match node {
        Node::Text(t) => {
            let lines = wrap(&t.text, &t.style, avail, t.max_lines, m);
            let w = lines
                .iter()
                .map(|l| text_width(l, &t.style, m))
                .fold(0.0, f32::max);
            (w.min(avail), lines.len() as f32 * line_height(&t.style))
        }
        Node::Image(i) => (i.width, i.height),
        Node::Box(b) => measure_box(b, avail, m),
    }
}

fn measure_box(b: &BoxNode, avail: f32, m: &TextMetrics) -> (f32, f32) {
    let s = &b.style;
    let inner = s.width.unwrap_or(avail) - s.padding.horizontal();
    let gaps = s.gap * b.children.len().saturating_sub(1) as f32;

    let (content_w, content_h) = match s.direction {
        Direction::Column => b
            .children
            .iter()
            .map(|c| measure(c, inner, m))
            .fold((0.0_f32, 0.0_f32), |(w, h), (cw, ch)| (w.max(cw), h + ch)),
        Direction::Row => {
            let widths = row_widths(b, inner, m);
            b.children
                .iter()
                .zip(&widths)
                .map(|(c, &w)| (w, measure(c, w, m).1))
                .fold((0.0_f32, 0.0_f32), |(w, h), (cw, ch)| (w + cw, h.max(ch)))
        }
    };
    let (gap_w, gap_h) = match s.direction {
        Direction::Row => (gaps, 0.0),
        Direction::Column => (0.0, gaps),
    };
    (
        s.width.unwrap_or(content_w + gap_w + s.padding.horizontal()),
        s.height.unwrap_or(content_h + gap_h + s.padding.vertical()),
    )
}

fn grow_of(node: &Node) -> f32 {
    match node {
        Node::Box(b) => b.style.grow,
        _ => 0.0,
    }
}

/// Main-axis widths of a row's children: fixed children first, growing
/// children share what is left.
fn row_widths(b: &BoxNode, inner: f32, m: &TextMetrics) -> Vec<f32> {
    let gaps = b.style.gap * b.children.len().saturating_sub(1) as f32;
    let fixed: f32 = b
        .children
        .iter()
        .filter(|c| grow_of(c) <= 0.0)
        .map(|c| measure(c, inner, m).0)
        .sum();
    let total_grow: f32 = b.children.iter().map(grow_of).sum();
    let free = (inner - fixed - gaps).max(0.0);
    b.children
        .iter()
        .map(|c| {
            let g = grow_of(c);
            if g > 0.0 {
                free * g / total_grow
            } else {
                measure(c, inner, m).0
            }
        })
        .collect()
}

fn cross_offset(align: Align, free: f32) -> f32 {
    match align {
        Align::Start => 0.0,
        Align::Center => free / 2.0,
        Align::End => free,
    }
}

/// Lay `node` out into the rectangle `(x, y, w, h)`.
fn place<'a>(
    node: &'a Node,
    (x, y, w, h): (f32, f32, f32, f32),
    m: &TextMetrics,
    out: &mut Vec<Draw<'a>>,
) {
    match node {
        Node::Text(t) => place_text(t, x, y, w, m, out),
        Node::Image(i) => out.push(Draw::Image {
            x,
            y,
            w: i.width,
            h: i.height,
            href: &i.href,
            radius: i.radius,
        }),
        Node::Box(b) => place_box(b, (x, y, w, h), m, out),
    }
}

fn place_text<'a>(
    t: &'a TextNode,
    x: f32,
    y: f32,
    w: f32,
    m: &TextMetrics,
    out: &mut Vec<Draw<'a>>,
) {
    let lh = line_height(&t.style);
    let lead = (lh - t.style.size) / 2.0 + t.style.size * ASCENT;
    let lines = wrap(&t.text, &t.style, w, t.max_lines, m);
    for (i, text) in lines.into_iter().enumerate() {
        out.push(Draw::Line {
            x,
            baseline: y + i as f32 * lh + lead,
            text,
            style: &t.style,
        });
    }
}

fn place_box<'a>(
    b: &'a BoxNode,
    (x, y, w, h): (f32, f32, f32, f32),
    m: &TextMetrics,
    out: &mut Vec<Draw<'a>>,
) {
    let s = &b.style;
    if let Some(fill) = &s.background {
        out.push(Draw::Rect {
            x,
            y,
            w,
            h,
            fill,
            radius: s.radius,
        });
    }
    if b.children.is_empty() {
        return;
    }

    let ix = x + s.padding.left;
    let iy = y + s.padding.top;
    let iw = (w - s.padding.horizontal()).max(0.0);
    let ih = (h - s.padding.vertical()).max(0.0);
    let n = b.children.len();

    // (main, cross) size of every child before free-space distribution
    let sizes: Vec<(f32, f32)> = match s.direction {
        Direction::Column => b
            .children
            .iter()
            .map(|c| {
                let (cw, ch) = measure(c, iw, m);
                let cross = match c {
                    Node::Box(cb) => cb.style.width.unwrap_or(iw),
                    _ => cw,
                };
                (ch, cross)
            })
            .collect(),
        Direction::Row => {
            let widths = row_widths(b, iw, m);
            b.children
                .iter()
                .zip(widths)
                .map(|(c, cw)| (cw, measure(c, cw, m).1))
                .collect()
        }
    };

    let (main_avail, cross_avail) = match s.direction {
        Direction::Column => (ih, iw),
        Direction::Row => (iw, ih),
    };
    let used: f32 = sizes.iter().map(|(m, _)| m).sum::<f32>() + s.gap * (n - 1) as f32;
    let free = (main_avail - used).max(0.0);
    let total_grow: f32 = b.children.iter().map(grow_of).sum();

    let mut mains: Vec<f32> = sizes.iter().map(|(m, _)| *m).collect();
    let (mut cursor, mut gap) = (0.0, s.gap);
    if total_grow > 0.0 && s.direction == Direction::Column {
        for (main, child) in mains.iter_mut().zip(&b.children) {
            *main += free * grow_of(child) / total_grow;
        }
    } else if total_grow <= 0.0 {
        match s.justify {
            Justify::Start => {}
            Justify::Center => cursor = free / 2.0,
            Justify::End => cursor = free,
            Justify::SpaceBetween if n > 1 => gap += free / (n - 1) as f32,
            Justify::SpaceBetween => {}
        }
    }

    for ((child, main), (_, cross)) in b.children.iter().zip(mains).zip(sizes) {
        let offset = cross_offset(s.align, (cross_avail - cross).max(0.0));
        match s.direction {
            Direction::Column => place(child, (ix + offset, iy + cursor, cross, main), m, out),
            Direction::Row => place(child, (ix + cursor, iy + offset, main, cross), m, out),
        }
        cursor += main + gap;
    }
}

/// Flatten a tree into positioned primitives on a `size` canvas.
pub fn layout<'a>(tree: &'a Node, size: Size, metrics: &TextMetrics) -> Vec<Draw<'a>> {
    let mut out = Vec::new();
    let canvas = (0.0, 0.0, size.width as f32, size.height as f32);
    place(tree, canvas, metrics, &mut out);
    out
}

// =============================================================================
// SVG output
// =============================================================================

fn px(v: f32) -> f32 {
    (v * 10.0).round() / 10.0
}

fn font_family(style: &TextStyle) -> String {
    format!("'{}', sans-serif", style.family)
}

fn svg_data_uri(svg: &[u8]) -> String {
    format!("data:image/svg+xml;base64,{}", BASE64.encode(svg))
}

fn text_run(x: f32, baseline: f32, text: &str, style: &TextStyle) -> Markup {
    html! {
        text x=(px(x)) y=(px(baseline))
            font-family=(font_family(style))
            font-weight=(style.weight)
            font-size=(px(style.size))
            fill=(style.color) { (text) }
    }
}

fn line_markup(
    x: f32,
    baseline: f32,
    text: &str,
    style: &TextStyle,
    metrics: &TextMetrics,
    emoji: &dyn EmojiProvider,
) -> Markup {
    let mut cursor = x;
    let mut parts: Vec<Markup> = Vec::new();
    for segment in segments(text) {
        match segment {
            Segment::Text(t) => {
                let trimmed = t.trim_start();
                let lead = text_width(&t[..t.len() - trimmed.len()], style, metrics);
                let trimmed = trimmed.trim_end();
                if !trimmed.is_empty() {
                    parts.push(text_run(cursor + lead, baseline, trimmed, style));
                }
                cursor += text_width(t, style, metrics);
            }
            Segment::Emoji(e) => {
                let advance = EMOJI_ADVANCE * style.size;
                match emoji.svg(&emoji_code(e)) {
                    Some(svg) => {
                        let side = style.size;
                        parts.push(html! {
                            image x=(px(cursor + (advance - side) / 2.0))
                                y=(px(baseline - side * ASCENT))
                                width=(px(side)) height=(px(side))
                                href=(svg_data_uri(&svg)) {}
                        });
                    }
                    None => parts.push(text_run(cursor, baseline, e, style)),
                }
                cursor += advance;
            }
        }
    }
    html! { @for part in parts { (part) } }
}

/// Render a tree as a standalone SVG document, measuring text with `fonts`.
pub fn to_svg(tree: &Node, size: Size, fonts: &FontSet, emoji: &dyn EmojiProvider) -> String {
    let metrics = fonts.metrics();
    let draws = layout(tree, size, metrics);
    let mut clip_id = 0usize;
    let markup = html! {
        svg xmlns="http://www.w3.org/2000/svg"
            width=(size.width) height=(size.height)
            viewBox=(format!("0 0 {} {}", size.width, size.height)) {
            @for draw in &draws {
                @match draw {
                    Draw::Rect { x, y, w, h, fill, radius } => {
                        rect x=(px(*x)) y=(px(*y)) width=(px(*w)) height=(px(*h))
                            rx=(px(*radius)) fill=(fill) {}
                    }
                    Draw::Line { x, baseline, text, style } => {
                        (line_markup(*x, *baseline, text, style, metrics, emoji))
                    }
                    Draw::Image { x, y, w, h, href, radius } => {
                        @if *radius > 0.0 {
                            @let id = { clip_id += 1; format!("clip-{clip_id}") };
                            clipPath id=(id) {
                                rect x=(px(*x)) y=(px(*y)) width=(px(*w)) height=(px(*h))
                                    rx=(px(*radius)) {}
                            }
                            image x=(px(*x)) y=(px(*y)) width=(px(*w)) height=(px(*h))
                                clip-path=(format!("url(#{id})"))
                                preserveAspectRatio="xMidYMid slice" href=(href) {}
                        } @else {
                            image x=(px(*x)) y=(px(*y)) width=(px(*w)) height=(px(*h))
                                preserveAspectRatio="xMidYMid slice" href=(href) {}
                        }
                    }
                }
            }
        }
    };
    markup.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::emoji::NoEmoji;
    use crate::template::{BoxNode, Edges, ImageNode, TextNode};

    fn font(size: f32) -> TextStyle {
        TextStyle::new("Inter", 400, size, "#111")
    }

    fn estimated() -> TextMetrics {
        TextMetrics::estimated()
    }

    struct FixedEmoji;

    impl EmojiProvider for FixedEmoji {
        fn svg(&self, code: &str) -> Option<Vec<u8>> {
            (code == "1f44b").then(|| b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>".to_vec())
        }
    }

    #[test]
    fn short_text_is_one_line() {
        let lines = wrap("hello world", &font(20.0), 500.0, None, &estimated());
        assert_eq!(lines, vec!["hello world"]);
    }

    #[test]
    fn wraps_at_word_boundaries() {
        let style = font(20.0);
        let m = estimated();
        let lines = wrap("alpha beta gamma delta epsilon", &style, 120.0, None, &m);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, &style, &m) <= 120.0, "{line} overflows");
        }
        assert_eq!(lines.join(" "), "alpha beta gamma delta epsilon");
    }

    #[test]
    fn clamps_with_ellipsis() {
        let style = font(20.0);
        let text = "one two three four five six seven eight nine ten";
        let m = estimated();
        let lines = wrap(text, &style, 100.0, Some(2), &m);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with(ELLIPSIS));
        assert!(text_width(&lines[1], &style, &m) <= 100.0);
    }

    #[test]
    fn no_ellipsis_when_text_fits() {
        let lines = wrap("fits", &font(20.0), 500.0, Some(2), &estimated());
        assert_eq!(lines, vec!["fits"]);
    }

    #[test]
    fn long_word_breaks_between_chars() {
        let style = font(20.0);
        let lines = wrap(&"x".repeat(40), &style, 100.0, None, &estimated());
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "x".repeat(40));
    }

    #[test]
    fn column_stacks_with_gap() {
        let tree: Node = BoxNode::column()
            .gap(10.0)
            .padding(Edges::all(5.0))
            .child(ImageNode::new("a", 20.0, 30.0))
            .child(ImageNode::new("b", 20.0, 40.0))
            .into();
        let draws = layout(&tree, Size::new(100, 200), &estimated());
        let ys: Vec<f32> = draws
            .iter()
            .filter_map(|d| match d {
                Draw::Image { y, .. } => Some(*y),
                _ => None,
            })
            .collect();
        assert_eq!(ys, vec![5.0, 45.0]);
    }

    #[test]
    fn space_between_pushes_to_edges() {
        let tree: Node = BoxNode::row()
            .size(100.0, 10.0)
            .justify(Justify::SpaceBetween)
            .child(ImageNode::new("a", 10.0, 10.0))
            .child(ImageNode::new("b", 10.0, 10.0))
            .into();
        let xs: Vec<f32> = layout(&tree, Size::new(100, 10), &estimated())
            .iter()
            .filter_map(|d| match d {
                Draw::Image { x, .. } => Some(*x),
                _ => None,
            })
            .collect();
        assert_eq!(xs, vec![0.0, 90.0]);
    }

    #[test]
    fn grow_takes_remaining_height() {
        let tree: Node = BoxNode::column()
            .size(100.0, 100.0)
            .child(BoxNode::column().grow(1.0).background("#f00"))
            .child(BoxNode::row().size(100.0, 20.0).background("#0f0"))
            .into();
        let rects: Vec<(f32, f32)> = layout(&tree, Size::new(100, 100), &estimated())
            .iter()
            .filter_map(|d| match d {
                Draw::Rect { y, h, .. } => Some((*y, *h)),
                _ => None,
            })
            .collect();
        assert_eq!(rects, vec![(0.0, 80.0), (80.0, 20.0)]);
    }

    #[test]
    fn svg_contains_escaped_text() {
        let tree: Node = BoxNode::column()
            .size(200.0, 100.0)
            .background("#fff")
            .child(TextNode::new("Tom & <Jerry>", font(16.0)))
            .into();
        let svg = to_svg(&tree, Size::new(200, 100), &FontSet::default(), &NoEmoji);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Tom &amp; &lt;Jerry&gt;"));
        assert!(svg.contains("font-family=\"'Inter', sans-serif\""));
    }

    #[test]
    fn emoji_become_images_when_available() {
        let tree: Node = TextNode::new("hi 👋 🦀", font(20.0)).into();
        let svg = to_svg(&tree, Size::new(400, 100), &FontSet::default(), &FixedEmoji);
        assert_eq!(svg.matches("data:image/svg+xml;base64,").count(), 1);
        // The crab has no artwork and stays as text
        assert!(svg.contains("🦀"));
        assert!(!svg.contains("👋"));
    }

    #[test]
    fn rounded_image_is_clipped() {
        let tree: Node = BoxNode::row()
            .child(ImageNode::new("data:image/png;base64,AAAA", 10.0, 10.0).radius(2.0))
            .into();
        let svg = to_svg(&tree, Size::new(50, 50), &FontSet::default(), &NoEmoji);
        assert!(svg.contains("<clipPath id=\"clip-1\">"));
        assert!(svg.contains("clip-path=\"url(#clip-1)\""));
    }
}
