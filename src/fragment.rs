//! Positioned text fragments as reported by a PDF decoder.

use serde::{Deserialize, Serialize};

/// Glyph height assumed when the decoder reports none.
pub const DEFAULT_GLYPH_HEIGHT: f64 = 12.0;

/// One positioned run of text from a page's content stream.
///
/// Coordinates use the PDF convention: origin at the bottom-left corner,
/// so a larger `origin_y` is higher on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub content: String,
    /// Horizontal origin in PDF points.
    pub origin_x: f64,
    /// Baseline Y position (bottom-up coordinate system).
    pub origin_y: f64,
    /// Font size approximation.
    pub glyph_height: f64,
}

impl TextFragment {
    pub fn new(content: impl Into<String>, origin_x: f64, origin_y: f64) -> Self {
        Self {
            content: content.into(),
            origin_x,
            origin_y,
            glyph_height: DEFAULT_GLYPH_HEIGHT,
        }
    }

    #[must_use]
    pub fn with_glyph_height(mut self, glyph_height: f64) -> Self {
        self.glyph_height = glyph_height;
        self
    }

    /// True when the content is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// X rounded half-up to whole units, `None` for NaN or infinite input.
    pub fn rounded_x(&self) -> Option<i64> {
        round_half_up(self.origin_x)
    }

    /// Y rounded half-up to whole units, `None` for NaN or infinite input.
    pub fn rounded_y(&self) -> Option<i64> {
        round_half_up(self.origin_y)
    }
}

/// Round to the nearest integer with ties going towards positive infinity.
///
/// `f64::round` sends ties away from zero, which would put `-2.5` and `2.5`
/// in asymmetric buckets.
pub fn round_half_up(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    Some((value + 0.5).floor() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_detection() {
        assert!(TextFragment::new("", 0.0, 0.0).is_blank());
        assert!(TextFragment::new("  \t", 0.0, 0.0).is_blank());
        assert!(!TextFragment::new(" a ", 0.0, 0.0).is_blank());
    }

    #[test]
    fn rounding_goes_half_up() {
        assert_eq!(round_half_up(2.5), Some(3));
        assert_eq!(round_half_up(-2.5), Some(-2));
        assert_eq!(round_half_up(99.49), Some(99));
        assert_eq!(round_half_up(f64::NAN), None);
        assert_eq!(round_half_up(f64::INFINITY), None);
    }

    #[test]
    fn default_glyph_height() {
        let frag = TextFragment::new("x", 1.0, 2.0);
        assert!((frag.glyph_height - DEFAULT_GLYPH_HEIGHT).abs() < f64::EPSILON);
        let frag = frag.with_glyph_height(9.0);
        assert!((frag.glyph_height - 9.0).abs() < f64::EPSILON);
    }
}
