//! # Element Style
//!
//! The visual style record attached to every element. Only `fontSize` and
//! `lineHeight` feed the engine (through text height estimation); the rest
//! is carried for the rendering surface and must survive a load/save round
//! trip untouched, including keys this crate does not know about.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Style properties for one element, wire-compatible with the editor JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStyle {
    /// Font size in layout units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Text color, usually a `#rrggbb` string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Line height as a multiplier of font size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<BorderRadius>,
    /// Stacking order on the canvas.
    #[serde(
        default,
        deserialize_with = "deserialize_z_index",
        skip_serializing_if = "Option::is_none"
    )]
    pub z_index: Option<i32>,

    /// Style keys this crate doesn't interpret, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ElementStyle {
    /// Font size with the editor default applied to missing or unusable values.
    pub fn font_size_or(&self, default: f64) -> f64 {
        positive_or(self.font_size, default)
    }

    /// Line-height ratio with the default applied to missing or unusable values.
    pub fn line_height_or(&self, default: f64) -> f64 {
        positive_or(self.line_height, default)
    }
}

/// Stacking order from any JSON number or numeric string, rounded to the
/// nearest integer. Anything else reads as unset.
pub(crate) fn deserialize_z_index<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let number = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number
        .filter(|n| n.is_finite())
        .map(|n| n.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32))
}

/// A configured number counts only when it is finite and non-zero. Zero and
/// NaN mean "unset", the same as an absent key.
fn positive_or(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() && v != 0.0 => v,
        _ => default,
    }
}

/// Font weight: either a CSS keyword (`"bold"`, `"normal"`) or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FontWeight {
    Numeric(u32),
    Named(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
    Justify,
}

/// Border radius: a bare number or a CSS length such as `"8px"` or `"50%"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BorderRadius {
    Number(f64),
    Css(String),
}
