//! # Template Model
//!
//! The editable representation of a resume template. A layout is a page
//! descriptor plus an ordered list of elements. Elements sit at absolute
//! canvas coordinates, or stack vertically when their `positionType` is
//! `flow`. An element may carry a `bind` path that ties it to a location in
//! the resume data, and a literal `text` typed by the template author.
//!
//! One element type is special: `repeat`. It owns a list of child elements
//! whose binds are relative to a row of an array root (`experience`,
//! `education`, ...). The child set is drawn once per row, `gap` units apart.
//!
//! All types here are wire-compatible with the editor JSON. Keys the engine
//! doesn't interpret are kept in `extra` maps so they survive a round trip.

use crate::sample::{lenient_text, SampleData};
use crate::style::{deserialize_z_index, ElementStyle};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A complete template layout: page descriptor plus elements in z-order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    #[serde(default)]
    pub page: Page,
    #[serde(default)]
    pub elements: Vec<Element>,
}

/// Page size and background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default = "default_page_width")]
    pub width: f64,
    #[serde(default = "default_page_height")]
    pub height: f64,
    #[serde(default = "default_background")]
    pub background_color: String,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            width: default_page_width(),
            height: default_page_height(),
            background_color: default_background(),
        }
    }
}

// A4 at 72 units per inch, rounded the way the editor canvas does.
fn default_page_width() -> f64 {
    595.0
}

fn default_page_height() -> f64 {
    842.0
}

fn default_background() -> String {
    "#ffffff".to_string()
}

/// A visual unit on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Unique within a layout once loaded; may be empty in raw input.
    /// Numeric ids are read as their decimal text.
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(rename = "type", default)]
    pub kind: ElementType,

    #[serde(default)]
    pub position_type: PositionType,

    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,

    /// Dotted data path, e.g. `basic.firstName` or `experience.0.company`.
    /// For children of a `repeat` element the path is relative to the row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,

    /// Literal text typed by the template author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Recompute height from content whenever content, width or style change.
    #[serde(default, skip_serializing_if = "is_false")]
    pub auto_height: bool,

    #[serde(default)]
    pub style: ElementStyle,

    /// Row pitch for `repeat` elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<f64>,

    /// Explicit per-item height for auto-height `list` elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_height: Option<f64>,

    /// Space above a flow element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_top: Option<f64>,

    /// Set by flow layout when the element has no content. Transient.
    #[serde(default, skip_serializing_if = "is_false")]
    pub collapsed: bool,

    /// Legacy top-level stacking order; folded into `style.zIndex` on save.
    #[serde(
        default,
        deserialize_with = "deserialize_z_index",
        skip_serializing_if = "Option::is_none"
    )]
    pub z_index: Option<i32>,

    /// Children of a `repeat` (or any grouping) element.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<Element>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(lenient_text(&value).unwrap_or_default())
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Element {
    /// A bare absolute element of the given type at the origin.
    pub fn new(kind: ElementType, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            position_type: PositionType::Absolute,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            bind: None,
            text: None,
            auto_height: false,
            style: ElementStyle::default(),
            gap: None,
            item_height: None,
            margin_top: None,
            collapsed: false,
            z_index: None,
            elements: vec![],
            extra: Map::new(),
        }
    }

    /// The bind path with surrounding whitespace removed, or `""` when unbound.
    pub fn bind_path(&self) -> &str {
        self.bind.as_deref().map(str::trim).unwrap_or("")
    }

    /// The author's literal text, if any.
    pub fn literal_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    /// Trimmed literal text when it has any visible content.
    pub fn manual_text(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    pub fn is_repeat(&self) -> bool {
        self.kind == ElementType::Repeat
    }

    pub fn is_flow(&self) -> bool {
        self.position_type == PositionType::Flow
    }

    /// Builder-style helper used by the palette and tests.
    pub fn with_bind(mut self, bind: &str) -> Self {
        self.bind = Some(bind.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// Whether an element keeps its authored coordinates or stacks vertically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionType {
    #[default]
    Absolute,
    Flow,
}

/// The kind of element. Unknown type names are preserved as `Other`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementType {
    #[default]
    Text,
    Heading,
    Subheading,
    Paragraph,
    BulletList,
    List,
    Section,
    Image,
    Repeat,
    Container,
    Other(String),
}

impl ElementType {
    pub fn as_str(&self) -> &str {
        match self {
            ElementType::Text => "text",
            ElementType::Heading => "heading",
            ElementType::Subheading => "subheading",
            ElementType::Paragraph => "paragraph",
            ElementType::BulletList => "bullet-list",
            ElementType::List => "list",
            ElementType::Section => "section",
            ElementType::Image => "image",
            ElementType::Repeat => "repeat",
            ElementType::Container => "container",
            ElementType::Other(name) => name,
        }
    }

    /// Types whose height tracks their text when `autoHeight` is on.
    pub fn is_text_like(&self) -> bool {
        matches!(
            self,
            ElementType::Text
                | ElementType::Heading
                | ElementType::Subheading
                | ElementType::Paragraph
                | ElementType::BulletList
        )
    }

    /// Types that keep their space in flow layout even without content.
    pub fn keeps_space_when_empty(&self) -> bool {
        matches!(
            self,
            ElementType::Container | ElementType::Section | ElementType::List
        )
    }

    /// Types rendered as item lists in previews.
    pub fn is_list(&self) -> bool {
        matches!(self, ElementType::List | ElementType::BulletList)
    }
}

impl From<String> for ElementType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "text" => ElementType::Text,
            "heading" => ElementType::Heading,
            "subheading" => ElementType::Subheading,
            "paragraph" => ElementType::Paragraph,
            "bullet-list" => ElementType::BulletList,
            "list" => ElementType::List,
            "section" => ElementType::Section,
            "image" => ElementType::Image,
            "repeat" => ElementType::Repeat,
            "container" => ElementType::Container,
            _ => ElementType::Other(name),
        }
    }
}

impl From<ElementType> for String {
    fn from(kind: ElementType) -> Self {
        kind.as_str().to_string()
    }
}

/// A template as stored by the persistence layer.
///
/// `sampleData` stays loosely typed: older records use legacy shapes, and on
/// load it is used verbatim as the resume data behind the canvas.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    #[serde(rename = "layoutJSON", default)]
    pub layout_json: Option<Layout>,
    #[serde(default)]
    pub sample_data: Value,
}

/// The output of the save pipeline: a normalized layout plus sample data
/// inferred from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedTemplate {
    #[serde(rename = "layoutJSON")]
    pub layout_json: Layout,
    pub sample_data: SampleData,
}
