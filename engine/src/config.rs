//! Engine configuration.
//!
//! Every heuristic constant the engine uses lives here. `EngineConfig::default()`
//! reproduces the editor's behavior; a JSON file can override any subset of
//! fields since every field has a default.

use serde::{Deserialize, Serialize};

use crate::model::Page;
use crate::text::TextMetrics;
use crate::VitaeError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub text: TextMetrics,
    pub list: ListMetrics,
    /// Row pitch used when a repeat has no usable `gap`, or when collapse
    /// finds only one row.
    pub repeat_gap: f64,
    /// Page used for new, empty layouts.
    pub page: Page,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            text: TextMetrics::default(),
            list: ListMetrics::default(),
            repeat_gap: 140.0,
            page: Page::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, VitaeError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Item sizing for auto-height `list` elements bound to arrays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListMetrics {
    pub default_line_height: f64,
    /// Extra space per item on top of one line of text.
    pub item_padding: f64,
}

impl Default for ListMetrics {
    fn default() -> Self {
        Self {
            default_line_height: 1.4,
            item_padding: 4.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override() {
        let config = EngineConfig::from_json(r#"{"repeatGap": 120, "text": {"safetyBuffer": 0}}"#)
            .unwrap();
        assert_eq!(config.repeat_gap, 120.0);
        assert_eq!(config.text.safety_buffer, 0.0);
        assert_eq!(config.text.char_width_ratio, 0.55);
        assert_eq!(config.list.item_padding, 4.0);
        assert_eq!(config.page.width, 595.0);
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(EngineConfig::from_json("{repeatGap: }").is_err());
    }
}
