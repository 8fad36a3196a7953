//! # Flow Layout
//!
//! Places elements for the canvas preview. Absolute elements already carry
//! authoritative coordinates and pass through untouched. Flow elements stack
//! top to bottom in document order along a single vertical cursor:
//!
//! 1. Resolve content: bound value, else literal text.
//! 2. Empty content collapses the element (height 0, cursor unchanged),
//!    unless it is a container, section or list.
//! 3. Place the element at `cursor + marginTop`.
//! 4. With `autoHeight`, derive the height from content: item count for
//!    lists bound to arrays, estimated wrapped text height for text. Images
//!    keep their authored height.
//! 5. Advance the cursor past the element.
//!
//! It is a single pass. Nothing overlapping is resolved and nothing flows
//! horizontally.

use serde_json::Value;
use tracing::trace;

use crate::config::EngineConfig;
use crate::model::{Element, ElementType, Layout};
use crate::path::{resolve, resolve_raw, scalar_text};

/// Computes positioned elements from a layout and a resume data snapshot.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: EngineConfig,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Lay out every top-level element. The input is not modified; the
    /// returned elements are fresh copies.
    pub fn layout(&self, layout: &Layout, data: &Value) -> Vec<Element> {
        let mut cursor = 0.0;
        layout
            .elements
            .iter()
            .map(|element| self.place(element, data, &mut cursor))
            .collect()
    }

    fn place(&self, element: &Element, data: &Value, cursor: &mut f64) -> Element {
        let mut el = element.clone();
        if !el.is_flow() {
            return el;
        }

        let content = content_for(&el, data);

        if content.is_empty() && !el.kind.keeps_space_when_empty() {
            trace!(id = %el.id, y = *cursor, "collapsing empty flow element");
            el.height = 0.0;
            el.y = *cursor;
            el.collapsed = true;
            return el;
        }

        el.y = *cursor + el.margin_top.unwrap_or(0.0);

        if el.auto_height {
            if let Some(height) = self.auto_height(&el, &content, data) {
                el.height = height;
            }
        }

        *cursor = el.y + el.height;
        el
    }

    /// Height derived from content, or `None` when the authored height stays.
    fn auto_height(&self, el: &Element, content: &str, data: &Value) -> Option<f64> {
        match el.kind {
            ElementType::List => {
                let items = resolve_raw(data, el.bind_path())?.as_array()?;
                Some(items.len() as f64 * self.item_height(el))
            }
            ElementType::Image => None,
            _ => Some(self.config.text.estimate(content, &el.style, el.width) as f64),
        }
    }

    fn item_height(&self, el: &Element) -> f64 {
        if let Some(h) = el.item_height.filter(|h| *h > 0.0) {
            return h;
        }
        let font_size = el.style.font_size_or(self.config.text.default_font_size);
        let line_height = el.style.line_height_or(self.config.list.default_line_height);
        (font_size * line_height + self.config.list.item_padding).ceil()
    }
}

/// Lay out with default configuration.
pub fn layout(layout: &Layout, data: &Value) -> Vec<Element> {
    LayoutEngine::new().layout(layout, data)
}

/// Content that drives collapse and height: the bound value when it is a
/// non-empty scalar, otherwise the literal text.
fn content_for(el: &Element, data: &Value) -> String {
    let bind = el.bind_path();
    if !bind.is_empty() {
        let bound = resolve(data, bind);
        if !bound.is_empty() {
            return bound;
        }
    }
    el.literal_text().unwrap_or_default().to_string()
}

/// Text shown for an element in a preview.
///
/// Lists get item formatting: a string value becomes one bullet per
/// non-empty line (or blank-line separated paragraphs when `itemTag` isn't
/// `li`), an array becomes a numbered list of each row's headline field.
pub fn element_content(el: &Element, data: &Value) -> String {
    if el.collapsed {
        return String::new();
    }

    let bind = el.bind_path();
    if el.kind.is_list() && !bind.is_empty() {
        return match resolve_raw(data, bind) {
            Some(Value::String(raw)) => list_lines(el, raw),
            Some(Value::Array(rows)) => numbered_rows(rows),
            _ => String::new(),
        };
    }

    content_for(el, data)
}

fn list_lines(el: &Element, raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let item_tag = el
        .extra
        .get("itemTag")
        .and_then(Value::as_str)
        .unwrap_or("li");
    if item_tag == "li" {
        lines
            .iter()
            .map(|line| format!("\u{2022} {}", line))
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        lines.join("\n\n")
    }
}

/// Field shown for a row in a numbered list, in priority order.
const HEADLINE_FIELDS: [&str; 4] = ["company", "name", "title", "schoolOrCollegeName"];

fn numbered_rows(rows: &[Value]) -> String {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            let headline = HEADLINE_FIELDS
                .iter()
                .filter_map(|field| row.get(*field))
                .map(scalar_text)
                .find(|text| !text.is_empty())
                .unwrap_or_default();
            format!("{}. {}", idx + 1, headline)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
