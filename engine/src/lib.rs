//! # Vitae
//!
//! The layout and data-binding engine behind a resume template editor.
//!
//! A template is a page of positioned elements. Elements can be bound to a
//! location in the resume data (`basic.firstName`, `experience.company`), and
//! sections that list rows are stored as a single `repeat` element drawn once
//! per row. The engine does not render anything itself; it answers the
//! questions a canvas needs answered:
//!
//! - how tall is this text at this width ([`text`]),
//! - what does this bind path point at ([`path`]),
//! - where do flow elements land ([`layout`]),
//! - how do repeat templates turn into editable rows and back ([`repeat`]),
//! - what sample data does this template imply ([`sample`]).
//!
//! ## Architecture
//!
//! ```text
//! Stored record { layoutJSON, sampleData }
//!       ↓
//!   [repeat::expand] + [ids]   : load: concrete rows, unique ids
//!       ↓
//!   [editor]                   : session state, history, derived heights
//!       ↓                              ↘
//!   [sample::builder]                  [layout]: preview placement
//!       ↓
//!   [repeat::collapse] + normalize_for_save
//!       ↓
//! Saved record { layoutJSON, sampleData }
//! ```
//!
//! Every core operation is infallible. Only JSON decoding at the edges
//! returns [`VitaeError`].

pub mod config;
pub mod editor;
pub mod error;
pub mod ids;
pub mod layout;
pub mod model;
pub mod path;
pub mod repeat;
pub mod sample;
pub mod schema;
pub mod style;
pub mod text;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::VitaeError;

use serde_json::Value;
use tracing::debug;

use config::EngineConfig;
use ids::{normalize_ids, IdSource};
use model::{Layout, SavedTemplate, TemplateRecord};
use sample::builder::build_sample_data;

/// Turn a stored record into an editable layout.
///
/// Repeat elements are expanded against the record's sample data and every
/// element gets a unique id.
pub fn load(record: &TemplateRecord, ids: &mut dyn IdSource) -> Result<Layout, VitaeError> {
    load_with(record, ids, &EngineConfig::default())
}

pub fn load_with(
    record: &TemplateRecord,
    ids: &mut dyn IdSource,
    config: &EngineConfig,
) -> Result<Layout, VitaeError> {
    let stored = record
        .layout_json
        .as_ref()
        .ok_or_else(|| VitaeError::InvalidRecord("record has no layoutJSON".to_string()))?;

    let expanded = repeat::expand(stored, &record.sample_data, ids, config.repeat_gap);
    let elements = normalize_ids(expanded.elements, ids);
    debug!(elements = elements.len(), "loaded layout");
    Ok(Layout {
        page: expanded.page,
        elements,
    })
}

/// Load a record given as JSON.
pub fn load_json(json: &str, ids: &mut dyn IdSource) -> Result<Layout, VitaeError> {
    let record: TemplateRecord = serde_json::from_str(json)?;
    load(&record, ids)
}

/// Prepare an editable layout for storage.
///
/// Sample data is inferred from the layout as edited, merged over
/// `existing` when given. Flat row elements are then collapsed into repeat
/// elements and every top-level element is normalized.
pub fn save(layout: &Layout, existing: Option<&Value>) -> SavedTemplate {
    save_with(layout, existing, &EngineConfig::default())
}

pub fn save_with(layout: &Layout, existing: Option<&Value>, config: &EngineConfig) -> SavedTemplate {
    let inference = build_sample_data(layout, existing);
    let elements = repeat::collapse(layout.elements.clone(), config.repeat_gap)
        .iter()
        .map(repeat::normalize_for_save)
        .collect();
    debug!(
        bound_paths = inference.bound_paths.len(),
        "saved layout"
    );
    SavedTemplate {
        layout_json: Layout {
            page: layout.page.clone(),
            elements,
        },
        sample_data: inference.sample_data,
    }
}

/// Save a layout given as JSON, returning the stored record as JSON.
pub fn save_json(json: &str) -> Result<String, VitaeError> {
    let layout: Layout = serde_json::from_str(json)?;
    let saved = save(&layout, None);
    Ok(serde_json::to_string_pretty(&saved)?)
}
