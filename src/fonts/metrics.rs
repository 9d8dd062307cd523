//! Glyph advances for text layout.
//!
//! Lines are broken before `usvg` shapes the text, so layout has to measure
//! with the face `usvg` will end up drawing. [`TextMetrics`] runs the same
//! `fontdb` query (the named family, then `sans-serif`, then `serif`, at the
//! requested weight) and sums horizontal advances from the face's `hmtx`
//! table. Kerning is not applied.
//!
//! Characters the face has no glyph for, and text with no matching face at
//! all (an empty database), use a per-character estimate instead.

use resvg::usvg::fontdb;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Owned copy of one face's file, so advances can be read without going
/// back to disk for system fonts.
struct FaceData {
    bytes: Arc<[u8]>,
    index: u32,
}

/// Measures text against the faces of a font database.
pub struct TextMetrics {
    database: Arc<fontdb::Database>,
    faces: Mutex<HashMap<(String, u16), Option<Arc<FaceData>>>>,
}

impl TextMetrics {
    pub fn new(database: Arc<fontdb::Database>) -> Self {
        Self {
            database,
            faces: Mutex::new(HashMap::new()),
        }
    }

    /// Metrics with no faces: every advance is estimated.
    pub fn estimated() -> Self {
        Self::new(Arc::new(fontdb::Database::new()))
    }

    /// Width of `text` in pixels, set in `family` at `weight` and `size`.
    pub fn width(&self, text: &str, family: &str, weight: u16, size: f32) -> f32 {
        let data = self.face(family, weight);
        let face = data
            .as_ref()
            .and_then(|d| ttf_parser::Face::parse(&d.bytes, d.index).ok());
        let Some(face) = face else {
            return text
                .chars()
                .map(|c| estimated_advance(c, weight) * size)
                .sum();
        };

        let scale = size / f32::from(face.units_per_em());
        text.chars()
            .map(|c| {
                face.glyph_index(c)
                    .and_then(|gid| face.glyph_hor_advance(gid))
                    .map(|advance| f32::from(advance) * scale)
                    .unwrap_or_else(|| estimated_advance(c, weight) * size)
            })
            .sum()
    }

    fn face(&self, family: &str, weight: u16) -> Option<Arc<FaceData>> {
        let key = (family.to_string(), weight);
        if let Some(hit) = self.faces.lock().ok().and_then(|f| f.get(&key).cloned()) {
            return hit;
        }
        let loaded = self.load(family, weight).map(Arc::new);
        if let Ok(mut faces) = self.faces.lock() {
            faces.insert(key, loaded.clone());
        }
        loaded
    }

    fn load(&self, family: &str, weight: u16) -> Option<FaceData> {
        let families = [
            fontdb::Family::Name(family),
            fontdb::Family::SansSerif,
            fontdb::Family::Serif,
        ];
        let query = fontdb::Query {
            families: &families,
            weight: fontdb::Weight(weight),
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        };
        let Some(id) = self.database.query(&query) else {
            tracing::debug!(family, weight, "no face to measure with, estimating advances");
            return None;
        };
        self.database.with_face_data(id, |bytes, index| FaceData {
            bytes: Arc::from(bytes),
            index,
        })
    }
}

impl std::fmt::Debug for TextMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextMetrics")
            .field("faces", &self.database.len())
            .finish()
    }
}

/// Estimated advance of a character, in em.
fn estimated_advance(c: char, weight: u16) -> f32 {
    let em = match c {
        ' ' => 0.3,
        'i' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.3,
        'f' | 'j' | 'r' | 't' => 0.4,
        '(' | ')' | '[' | ']' | '{' | '}' => 0.4,
        '-' => 0.4,
        'm' | 'w' => 0.95,
        'M' | 'W' => 1.0,
        '…' => 1.0,
        c if c.is_ascii_uppercase() => 0.75,
        c if c.is_ascii_digit() => 0.65,
        c if c.is_ascii_lowercase() => 0.62,
        c if is_wide(c) => 1.0,
        _ => 0.7,
    };
    if weight >= 600 { em * 1.08 } else { em }
}

fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F
        | 0x2E80..=0x9FFF
        | 0xAC00..=0xD7AF
        | 0xF900..=0xFAFF
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_without_faces() {
        let metrics = TextMetrics::estimated();
        let narrow = metrics.width("iiii", "Inter", 400, 10.0);
        let wide = metrics.width("mmmm", "Inter", 400, 10.0);
        assert!(narrow < wide);
        assert!(metrics.width("mmmm", "Inter", 700, 10.0) > wide);
        assert_eq!(metrics.width("", "Inter", 400, 10.0), 0.0);
    }

    #[test]
    fn width_scales_with_size() {
        let metrics = TextMetrics::estimated();
        let small = metrics.width("hello", "Inter", 400, 10.0);
        let large = metrics.width("hello", "Inter", 400, 20.0);
        assert!((large - 2.0 * small).abs() < 1e-3);
    }

    #[test]
    fn real_face_widths_are_additive() {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        let metrics = TextMetrics::new(Arc::new(db));
        let a = metrics.width("momentum", "DejaVu Sans", 400, 36.0);
        let b = metrics.width("memento", "DejaVu Sans", 400, 36.0);
        let joined = metrics.width("momentummemento", "DejaVu Sans", 400, 36.0);
        assert!((joined - (a + b)).abs() < 1e-2);
    }
}
