//! Browser bindings. The editor calls these with JSON strings and gets JSON
//! strings back; errors surface as JS exceptions carrying the message.

use wasm_bindgen::prelude::*;

use crate::ids::IdSource;
use crate::style::ElementStyle;

/// `prefix-<Date.now()>-<index>-<random 0..999>`, from the JS runtime.
struct JsClockIds;

impl IdSource for JsClockIds {
    fn next_id(&mut self, prefix: &str, index: usize) -> String {
        let millis = js_sys::Date::now() as u64;
        let suffix = (js_sys::Math::random() * 1000.0).floor() as u32;
        format!("{}-{}-{}-{}", prefix, millis, index, suffix)
    }
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Editable layout JSON in, stored record JSON out.
#[wasm_bindgen]
pub fn save_template(layout_json: &str) -> Result<String, JsValue> {
    crate::save_json(layout_json).map_err(to_js)
}

/// Stored record JSON in, editable layout JSON out.
#[wasm_bindgen]
pub fn load_template(record_json: &str) -> Result<String, JsValue> {
    let layout = crate::load_json(record_json, &mut JsClockIds).map_err(to_js)?;
    serde_json::to_string(&layout).map_err(to_js)
}

/// Estimated height of `text` wrapped to `width`. Zero `font_size` or
/// `line_height` fall back to the defaults.
#[wasm_bindgen]
pub fn estimate_text_height(text: &str, font_size: f64, line_height: f64, width: f64) -> u32 {
    let style = ElementStyle {
        font_size: Some(font_size),
        line_height: Some(line_height),
        ..Default::default()
    };
    crate::text::estimate_height(text, &style, width)
}

/// Every bind target as `[{ path, label, category, isArray? }]`.
#[wasm_bindgen]
pub fn bind_path_catalog() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(crate::schema::catalog()).map_err(to_js)
}
