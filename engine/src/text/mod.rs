//! # Text Height Estimation
//!
//! The editor has no font metrics, so wrapped text height is estimated from
//! character counts: every glyph is assumed to be `charWidthRatio × fontSize`
//! wide, each explicit line wraps at `width / avgCharWidth` characters, and
//! the wrapped line count is multiplied by the line pitch.
//!
//! The estimate is deliberately rough. What callers rely on is that it is
//! pure, deterministic, and never shrinks when text grows.

use serde::{Deserialize, Serialize};

use crate::style::ElementStyle;

/// Constants for the character-count heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextMetrics {
    /// Average glyph width as a fraction of font size.
    pub char_width_ratio: f64,
    pub default_font_size: f64,
    pub default_line_height: f64,
    /// Widths below this are clamped up.
    pub min_width: f64,
    /// Used when the element has no usable width at all.
    pub default_width: f64,
    /// Added to every estimate before rounding up.
    pub safety_buffer: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width_ratio: 0.55,
            default_font_size: 14.0,
            default_line_height: 1.2,
            min_width: 40.0,
            default_width: 200.0,
            safety_buffer: 2.0,
        }
    }
}

impl TextMetrics {
    /// Estimate the pixel height of `text` wrapped into `width`.
    pub fn estimate(&self, text: &str, style: &ElementStyle, width: f64) -> u32 {
        let font_size = style.font_size_or(self.default_font_size);
        let line_height = style.line_height_or(self.default_line_height);

        let width = if width.is_finite() && width != 0.0 {
            width
        } else {
            self.default_width
        };
        let usable_width = width.max(self.min_width).max(1.0);

        let wrapped_lines = self.wrapped_line_count(text, font_size, usable_width);
        let content_height = wrapped_lines as f64 * (font_size * line_height);
        let height = (content_height + self.safety_buffer).ceil();

        if height.is_finite() && height > 0.0 {
            height as u32
        } else {
            0
        }
    }

    /// Number of visual lines `text` occupies. Every explicit line counts at
    /// least once, so blank lines still take space.
    pub fn wrapped_line_count(&self, text: &str, font_size: f64, width: f64) -> usize {
        let avg_char_width = font_size * self.char_width_ratio;
        let chars_per_line = chars_per_line(width, avg_char_width);

        let count: usize = text
            .split('\n')
            .map(|line| line.chars().count().div_ceil(chars_per_line).max(1))
            .sum();
        count.max(1)
    }
}

fn chars_per_line(width: f64, avg_char_width: f64) -> usize {
    let per_line = (width / avg_char_width).floor();
    if per_line.is_finite() && per_line >= 1.0 {
        per_line as usize
    } else {
        1
    }
}

/// Estimate wrapped text height with the default metrics.
pub fn estimate_height(text: &str, style: &ElementStyle, width: f64) -> u32 {
    TextMetrics::default().estimate(text, style, width)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(font_size: f64, line_height: f64) -> ElementStyle {
        ElementStyle {
            font_size: Some(font_size),
            line_height: Some(line_height),
            ..Default::default()
        }
    }

    #[test]
    fn test_single_short_line() {
        // 14 * 1.2 = 16.8 per line, + 2 buffer = 18.8 -> 19
        assert_eq!(estimate_height("Hello", &ElementStyle::default(), 200.0), 19);
    }

    #[test]
    fn test_empty_text_is_one_line() {
        assert_eq!(estimate_height("", &ElementStyle::default(), 200.0), 19);
    }

    #[test]
    fn test_wrapping() {
        // avg width 7.7 -> 25 chars per line at width 200
        let text = "a".repeat(26);
        assert_eq!(estimate_height(&text, &ElementStyle::default(), 200.0), 36);
    }

    #[test]
    fn test_explicit_newlines_count() {
        let s = style(10.0, 1.0);
        // three lines of 10 + 2
        assert_eq!(estimate_height("a\nb\nc", &s, 200.0), 32);
        // blank middle line still counts
        assert_eq!(estimate_height("a\n\nc", &s, 200.0), 32);
    }

    #[test]
    fn test_width_clamped_to_minimum() {
        let s = style(10.0, 1.0);
        assert_eq!(
            estimate_height("abcdefgh", &s, 5.0),
            estimate_height("abcdefgh", &s, 40.0)
        );
    }

    #[test]
    fn test_tiny_width_still_fits_one_char() {
        let s = style(100.0, 1.0);
        // 40 / 55 < 1 char per line, clamped to 1
        assert_eq!(estimate_height("abc", &s, 40.0), 302);
    }

    #[test]
    fn test_monotonic_in_length() {
        let s = ElementStyle::default();
        let mut text = String::new();
        let mut last = estimate_height(&text, &s, 120.0);
        for _ in 0..200 {
            text.push('x');
            let next = estimate_height(&text, &s, 120.0);
            assert!(next >= last);
            last = next;
        }
    }

    #[test]
    fn test_deterministic() {
        let s = style(12.0, 1.5);
        let text = "Senior engineer\nBuilt things";
        assert_eq!(estimate_height(text, &s, 180.0), estimate_height(text, &s, 180.0));
    }

    #[test]
    fn test_custom_metrics() {
        let metrics = TextMetrics {
            safety_buffer: 0.0,
            ..Default::default()
        };
        assert_eq!(metrics.estimate("x", &style(10.0, 1.0), 200.0), 10);
    }
}
