//! Abstract visual tree produced by templates and consumed by renderers.
//!
//! Three node kinds: boxes (flex containers with optional fill), text runs
//! and images. Builders take `self` by value so a layout reads top-down:
//!
//! ```text
//! BoxNode::column()
//!     .padding(Edges::all(60.0))
//!     .background("#faf8f8")
//!     .child(TextNode::new("Title", font).max_lines(2))
//! ```

/// Main axis of a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Row,
    #[default]
    Column,
}

/// Distribution of free space along the main axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justify {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
}

/// Placement of children on the cross axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Start,
    Center,
    End,
}

/// Padding on each side, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    pub fn all(v: f32) -> Self {
        Self::xy(v, v)
    }

    pub fn xy(horizontal: f32, vertical: f32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// Layout and paint properties of a box.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoxStyle {
    pub direction: Direction,
    pub padding: Edges,
    pub gap: f32,
    /// Share of the parent's free main-axis space this box takes.
    pub grow: f32,
    pub justify: Justify,
    pub align: Align,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub background: Option<String>,
    pub radius: f32,
}

/// A flex container.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoxNode {
    pub style: BoxStyle,
    pub children: Vec<Node>,
}

impl BoxNode {
    pub fn row() -> Self {
        Self::with_direction(Direction::Row)
    }

    pub fn column() -> Self {
        Self::with_direction(Direction::Column)
    }

    fn with_direction(direction: Direction) -> Self {
        Self {
            style: BoxStyle {
                direction,
                ..BoxStyle::default()
            },
            children: Vec::new(),
        }
    }

    pub fn padding(mut self, padding: Edges) -> Self {
        self.style.padding = padding;
        self
    }

    pub fn gap(mut self, gap: f32) -> Self {
        self.style.gap = gap;
        self
    }

    pub fn grow(mut self, grow: f32) -> Self {
        self.style.grow = grow;
        self
    }

    pub fn justify(mut self, justify: Justify) -> Self {
        self.style.justify = justify;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.style.align = align;
        self
    }

    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.style.width = Some(width);
        self.style.height = Some(height);
        self
    }

    pub fn width(mut self, width: f32) -> Self {
        self.style.width = Some(width);
        self
    }

    pub fn background(mut self, color: impl Into<String>) -> Self {
        self.style.background = Some(color.into());
        self
    }

    pub fn radius(mut self, radius: f32) -> Self {
        self.style.radius = radius;
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    /// Append a child only when present.
    pub fn child_opt(mut self, node: Option<impl Into<Node>>) -> Self {
        if let Some(node) = node {
            self.children.push(node.into());
        }
        self
    }

    pub fn children<N: Into<Node>>(mut self, nodes: impl IntoIterator<Item = N>) -> Self {
        self.children.extend(nodes.into_iter().map(Into::into));
        self
    }
}

/// Font face and paint of a text run.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub family: String,
    pub weight: u16,
    pub size: f32,
    pub color: String,
    /// Line height as a multiple of `size`.
    pub line_height: f32,
}

impl TextStyle {
    pub fn new(
        family: impl Into<String>,
        weight: u16,
        size: f32,
        color: impl Into<String>,
    ) -> Self {
        Self {
            family: family.into(),
            weight,
            size,
            color: color.into(),
            line_height: 1.2,
        }
    }

    pub fn line_height(mut self, line_height: f32) -> Self {
        self.line_height = line_height;
        self
    }
}

/// Wrapped text. Lines past `max_lines` are dropped and the last kept
/// line ends in an ellipsis.
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub text: String,
    pub style: TextStyle,
    pub max_lines: Option<usize>,
}

impl TextNode {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
            max_lines: None,
        }
    }

    pub fn max_lines(mut self, lines: usize) -> Self {
        self.max_lines = Some(lines);
        self
    }
}

/// A raster or vector image embedded by URI (usually a `data:` URI).
#[derive(Debug, Clone, PartialEq)]
pub struct ImageNode {
    pub href: String,
    pub width: f32,
    pub height: f32,
    pub radius: f32,
}

impl ImageNode {
    pub fn new(href: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            href: href.into(),
            width,
            height,
            radius: 0.0,
        }
    }

    pub fn radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Box(BoxNode),
    Text(TextNode),
    Image(ImageNode),
}

impl Node {
    /// All text content in document order, one entry per text node.
    pub fn texts(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_texts(&mut out);
        out
    }

    fn collect_texts<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Node::Text(t) => out.push(&t.text),
            Node::Box(b) => b.children.iter().for_each(|c| c.collect_texts(out)),
            Node::Image(_) => {}
        }
    }

    /// First text node whose content equals `text`.
    pub fn find_text(&self, text: &str) -> Option<&TextNode> {
        match self {
            Node::Text(t) if t.text == text => Some(t),
            Node::Box(b) => b.children.iter().find_map(|c| c.find_text(text)),
            _ => None,
        }
    }

    pub fn images(&self) -> Vec<&ImageNode> {
        match self {
            Node::Image(i) => vec![i],
            Node::Box(b) => b.children.iter().flat_map(|c| c.images()).collect(),
            Node::Text(_) => Vec::new(),
        }
    }
}

impl From<BoxNode> for Node {
    fn from(b: BoxNode) -> Self {
        Node::Box(b)
    }
}

impl From<TextNode> for Node {
    fn from(t: TextNode) -> Self {
        Node::Text(t)
    }
}

impl From<ImageNode> for Node {
    fn from(i: ImageNode) -> Self {
        Node::Image(i)
    }
}
