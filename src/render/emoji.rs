//! Emoji detection and lookup.
//!
//! Text is split into plain runs and emoji clusters. A cluster is a base
//! pictograph plus whatever modifies it: variation selector 16, skin tone
//! modifiers, keycap marks, tag sequences, and further pictographs joined by
//! ZERO WIDTH JOINER. Two regional indicators form a flag.
//!
//! Each cluster maps to a Twemoji-style code: lowercase hex code points
//! joined by `-`, with `fe0f` dropped unless the sequence contains a ZWJ.
//!
//! ```text
//! "👍🏽"   → "1f44d-1f3fd"
//! "❤️"    → "2764"
//! "👩‍💻"   → "1f469-200d-1f4bb"
//! "🇳🇱"   → "1f1f3-1f1f1"
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

use crate::fetch::Fetcher;

const VS16: char = '\u{fe0f}';
const ZWJ: char = '\u{200d}';
const KEYCAP: char = '\u{20e3}';

pub const TWEMOJI_BASE: &str = "https://cdnjs.cloudflare.com/ajax/libs/twemoji/14.0.2/svg";

/// A piece of text: plain characters or one emoji cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Emoji(&'a str),
}

/// Pictographs that render as emoji without a variation selector.
fn is_pictograph(c: char) -> bool {
    matches!(c as u32,
        0x1F000..=0x1F0FF
        | 0x1F300..=0x1F64F
        | 0x1F680..=0x1F6FF
        | 0x1F900..=0x1F9FF
        | 0x1FA70..=0x1FAFF
        | 0x2614..=0x2615
        | 0x26A1 | 0x26AA..=0x26AB
        | 0x2705 | 0x270A..=0x270B
        | 0x2728 | 0x274C | 0x2753..=0x2755
        | 0x2795..=0x2797
        | 0x2B50 | 0x2B55)
}

/// Symbols that only become emoji when followed by VS16.
fn is_text_symbol(c: char) -> bool {
    matches!(c as u32,
        0x00A9 | 0x00AE | 0x203C | 0x2049 | 0x2122 | 0x2139
        | 0x2190..=0x21FF
        | 0x2300..=0x23FF
        | 0x2600..=0x27BF
        | 0x2B00..=0x2BFF
        | 0x3030 | 0x303D | 0x3297 | 0x3299)
}

fn is_regional_indicator(c: char) -> bool {
    matches!(c as u32, 0x1F1E6..=0x1F1FF)
}

fn is_modifier(c: char) -> bool {
    matches!(c as u32, 0x1F3FB..=0x1F3FF | 0xE0020..=0xE007F) || c == VS16 || c == KEYCAP
}

fn is_keycap_base(c: char) -> bool {
    c.is_ascii_digit() || c == '#' || c == '*'
}

/// Byte length of the emoji cluster starting at `s`, or 0 if none does.
fn cluster_len(s: &str) -> usize {
    let mut chars = s.char_indices().peekable();
    let Some((_, first)) = chars.next() else {
        return 0;
    };
    let next = chars.peek().map(|&(_, c)| c);

    if is_regional_indicator(first) {
        return match next {
            Some(c) if is_regional_indicator(c) => first.len_utf8() + c.len_utf8(),
            _ => 0,
        };
    }

    let starts = is_pictograph(first)
        || (is_text_symbol(first) && next == Some(VS16))
        || (is_keycap_base(first)
            && (next == Some(KEYCAP)
                || (next == Some(VS16) && s[first.len_utf8()..].chars().nth(1) == Some(KEYCAP))));
    if !starts {
        return 0;
    }

    let mut end = first.len_utf8();
    while let Some(&(i, c)) = chars.peek() {
        if is_modifier(c) {
            chars.next();
            end = i + c.len_utf8();
        } else if c == ZWJ {
            chars.next();
            match chars.peek() {
                Some(&(j, d)) if is_pictograph(d) || is_text_symbol(d) => {
                    chars.next();
                    end = j + d.len_utf8();
                }
                _ => break,
            }
        } else {
            break;
        }
    }
    end
}

/// Split text into plain runs and emoji clusters, in order.
pub fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut run_start = 0;
    let mut i = 0;
    while i < text.len() {
        let len = cluster_len(&text[i..]);
        if len > 0 {
            if run_start < i {
                out.push(Segment::Text(&text[run_start..i]));
            }
            out.push(Segment::Emoji(&text[i..i + len]));
            i += len;
            run_start = i;
        } else {
            i += text[i..].chars().next().map_or(1, char::len_utf8);
        }
    }
    if run_start < text.len() {
        out.push(Segment::Text(&text[run_start..]));
    }
    out
}

/// Twemoji file code for a cluster.
pub fn emoji_code(cluster: &str) -> String {
    let keep_vs16 = cluster.contains(ZWJ);
    cluster
        .chars()
        .filter(|&c| keep_vs16 || c != VS16)
        .map(|c| format!("{:x}", c as u32))
        .collect::<Vec<_>>()
        .join("-")
}

/// Source of emoji artwork, keyed by [`emoji_code`].
pub trait EmojiProvider: Sync {
    /// SVG document for the code, or `None` if unavailable.
    fn svg(&self, code: &str) -> Option<Vec<u8>>;
}

/// Renders emoji as plain text. Used when emoji artwork is not wanted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEmoji;

impl EmojiProvider for NoEmoji {
    fn svg(&self, _code: &str) -> Option<Vec<u8>> {
        None
    }
}

/// Twemoji SVGs from the cdnjs mirror.
pub struct TwemojiProvider {
    fetcher: Box<dyn Fetcher>,
}

impl TwemojiProvider {
    pub fn new(fetcher: Box<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    pub fn url(code: &str) -> String {
        format!("{TWEMOJI_BASE}/{code}.svg")
    }
}

impl EmojiProvider for TwemojiProvider {
    fn svg(&self, code: &str) -> Option<Vec<u8>> {
        match self.fetcher.fetch_bytes(&Self::url(code)) {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::warn!(code, error = %e, "emoji unavailable, drawing as text");
                None
            }
        }
    }
}

/// Memoizes another provider for the lifetime of a build, misses included.
pub struct CachedEmoji<P> {
    inner: P,
    entries: Mutex<HashMap<String, Option<Vec<u8>>>>,
}

impl<P: EmojiProvider> CachedEmoji<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<P: EmojiProvider> EmojiProvider for CachedEmoji<P> {
    fn svg(&self, code: &str) -> Option<Vec<u8>> {
        if let Some(hit) = self.entries.lock().ok()?.get(code) {
            return hit.clone();
        }
        // Lookup runs unlocked; two pages racing on a code both fetch it.
        let found = self.inner.svg(code);
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(code.to_string(), found.clone());
        }
        found
    }
}
