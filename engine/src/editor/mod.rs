//! # Editor Session
//!
//! The state behind one open template: the editable layout, the resume data
//! shown on the canvas, the current selection, a one-element clipboard and
//! an undo history.
//!
//! History is a list of layout snapshots with a cursor; the snapshot at the
//! cursor is always the current layout. Every mutation truncates anything
//! after the cursor and appends. Selection, clipboard and resume data are not
//! part of history.
//!
//! Auto height is derived state: whenever a text-like element with
//! `autoHeight` has its text, bind, width or style changed, its height is
//! recomputed from the content it shows.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::EngineConfig;
use crate::ids::IdSource;
use crate::layout::{element_content, LayoutEngine};
use crate::model::{Element, ElementType, Layout, PositionType, SavedTemplate, TemplateRecord};
use crate::sample::SampleData;
use crate::style::{ElementStyle, FontWeight};
use crate::VitaeError;

/// A partial update to an element. Absent fields are left alone; `style`
/// merges key-wise over the current style. An empty `bind` unbinds.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub text: Option<String>,
    pub bind: Option<String>,
    pub auto_height: Option<bool>,
    pub position_type: Option<PositionType>,
    pub gap: Option<f64>,
    pub item_height: Option<f64>,
    pub style: Option<ElementStyle>,
}

impl ElementPatch {
    /// Whether the patch touches anything the derived height depends on.
    fn affects_content(&self) -> bool {
        self.text.is_some()
            || self.bind.is_some()
            || self.width.is_some()
            || self.style.is_some()
            || self.auto_height == Some(true)
    }
}

/// Defaults the element palette applies to a new element of `kind`.
pub fn palette_defaults(kind: &ElementType) -> ElementPatch {
    let font_size = match kind {
        ElementType::Heading => 24.0,
        ElementType::Subheading => 18.0,
        _ => 14.0,
    };
    let text = match kind {
        ElementType::Heading => "New Heading",
        ElementType::Text => "New Text",
        _ => "",
    };
    let weight = if *kind == ElementType::Heading { "bold" } else { "normal" };

    ElementPatch {
        text: Some(text.to_string()),
        height: (*kind == ElementType::Image).then_some(120.0),
        style: Some(ElementStyle {
            font_size: Some(font_size),
            font_weight: Some(FontWeight::Named(weight.to_string())),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// One open template.
pub struct EditorSession {
    config: EngineConfig,
    ids: Box<dyn IdSource>,
    layout: Layout,
    resume_data: Value,
    selected: Option<String>,
    clipboard: Option<Element>,
    history: Vec<Layout>,
    cursor: usize,
}

impl EditorSession {
    /// An empty page, default sample data, one history entry.
    pub fn new(ids: Box<dyn IdSource>) -> Self {
        Self::with_config(EngineConfig::default(), ids)
    }

    pub fn with_config(config: EngineConfig, ids: Box<dyn IdSource>) -> Self {
        let layout = Layout {
            page: config.page.clone(),
            elements: vec![],
        };
        Self {
            config,
            ids,
            history: vec![layout.clone()],
            layout,
            resume_data: SampleData::default().to_value(),
            selected: None,
            clipboard: None,
            cursor: 0,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn resume_data(&self) -> &Value {
        &self.resume_data
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected(&self) -> Option<&Element> {
        let id = self.selected.as_deref()?;
        self.element(id)
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.layout.elements.iter().find(|el| el.id == id)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.history.len()
    }

    /// Flow layout of the current state against the session's resume data.
    pub fn preview(&self) -> Vec<Element> {
        LayoutEngine::with_config(self.config.clone()).layout(&self.layout, &self.resume_data)
    }

    /// Add an element of `kind` at the default position, apply `defaults`,
    /// select it and return its id.
    pub fn add_element(&mut self, kind: ElementType, defaults: ElementPatch) -> String {
        let index = self.layout.elements.len();
        let id = self.ids.next_id(kind.as_str(), index);
        let mut el = Element::new(kind, id.clone()).at(50.0, 50.0).sized(200.0, 24.0);
        el.style = ElementStyle {
            font_size: Some(14.0),
            color: Some("#000000".to_string()),
            z_index: Some(1),
            ..Default::default()
        };

        let explicit_height = defaults.height.is_some();
        apply_patch(&mut el, defaults);
        if !explicit_height && el.kind.is_text_like() {
            el.height = self.estimate(&el);
        }

        debug!(id = %id, kind = el.kind.as_str(), "added element");
        self.layout.elements.push(el);
        self.selected = Some(id.clone());
        self.commit();
        id
    }

    /// Apply `patch` to the element with `id`. Returns false if there is no
    /// such element.
    pub fn update_element(&mut self, id: &str, patch: ElementPatch) -> bool {
        let derive = patch.height.is_none() && patch.affects_content();
        let Some(idx) = self.position_of(id) else {
            return false;
        };

        let mut el = self.layout.elements[idx].clone();
        apply_patch(&mut el, patch);
        if derive && el.auto_height && el.kind.is_text_like() {
            el.height = self.estimate(&el);
        }
        self.layout.elements[idx] = el;
        self.commit();
        true
    }

    /// Inline text edit on the canvas. Editing a bound element detaches it
    /// from its data.
    pub fn edit_text(&mut self, id: &str, text: &str) -> bool {
        let bound = self.element(id).is_some_and(|el| !el.bind_path().is_empty());
        let patch = ElementPatch {
            text: Some(text.to_string()),
            bind: bound.then(String::new),
            ..Default::default()
        };
        self.update_element(id, patch)
    }

    pub fn remove_element(&mut self, id: &str) -> bool {
        let Some(idx) = self.position_of(id) else {
            return false;
        };
        self.layout.elements.remove(idx);
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        self.commit();
        true
    }

    pub fn select(&mut self, id: Option<&str>) {
        self.selected = id.map(str::to_string);
    }

    /// Copy the selected element. Returns false when nothing is selected.
    pub fn copy_selected(&mut self) -> bool {
        match self.selected().cloned() {
            Some(el) => {
                self.clipboard = Some(el);
                true
            }
            None => false,
        }
    }

    /// Paste a copy of the clipboard 20 units down and right, with fresh ids,
    /// and select it.
    pub fn paste(&mut self) -> Option<String> {
        let mut el = self.clipboard.clone()?;
        let index = self.layout.elements.len();
        el.id = self.ids.next_id(el.kind.as_str(), index);
        el.x += 20.0;
        el.y += 20.0;
        for (child_index, child) in el.elements.iter_mut().enumerate() {
            child.id = self.ids.next_id(child.kind.as_str(), child_index);
        }

        let id = el.id.clone();
        self.layout.elements.push(el);
        self.selected = Some(id.clone());
        self.commit();
        Some(id)
    }

    /// Move the element at `from` to `to`, shifting the ones in between.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let len = self.layout.elements.len();
        if from >= len {
            return false;
        }
        let el = self.layout.elements.remove(from);
        self.layout.elements.insert(to.min(len - 1), el);
        self.commit();
        true
    }

    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        self.layout = self.history[self.cursor].clone();
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        self.layout = self.history[self.cursor].clone();
        true
    }

    /// Write `value` into the resume data at a dotted path. Missing or
    /// non-container intermediate steps become objects; numeric steps index
    /// into existing arrays.
    pub fn update_resume_data(&mut self, path: &str, value: Value) {
        let keys: Vec<&str> = path
            .split('.')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .collect();
        let Some((last, parents)) = keys.split_last() else {
            return;
        };

        let mut node = &mut self.resume_data;
        for key in parents {
            node = child_container(node, key);
        }
        match node {
            Value::Array(items) => match last.parse::<usize>() {
                Ok(i) if i < items.len() => items[i] = value,
                _ => {}
            },
            other => {
                if !other.is_object() {
                    *other = Value::Object(Map::new());
                }
                if let Value::Object(map) = other {
                    map.insert(last.to_string(), value);
                }
            }
        }
    }

    /// Replace the session with a stored template: repeats expanded against
    /// the record's sample data, ids normalized, history reset.
    pub fn load(&mut self, record: &TemplateRecord) -> Result<(), VitaeError> {
        let layout = crate::load_with(record, self.ids.as_mut(), &self.config)?;
        self.resume_data = if record.sample_data.is_object() {
            record.sample_data.clone()
        } else {
            SampleData::default().to_value()
        };
        self.layout = layout;
        self.selected = None;
        self.clipboard = None;
        self.history = vec![self.layout.clone()];
        self.cursor = 0;
        debug!(elements = self.layout.elements.len(), "loaded template");
        Ok(())
    }

    /// Run the save pipeline on the current layout.
    pub fn save(&self, existing: Option<&Value>) -> SavedTemplate {
        crate::save_with(&self.layout, existing, &self.config)
    }

    fn position_of(&self, id: &str) -> Option<usize> {
        self.layout.elements.iter().position(|el| el.id == id)
    }

    /// Height for the content an element shows: its bound value, or its
    /// literal text when unbound.
    fn estimate(&self, el: &Element) -> f64 {
        let content = if el.bind_path().is_empty() {
            el.text.clone().unwrap_or_default()
        } else {
            element_content(el, &self.resume_data)
        };
        self.config.text.estimate(&content, &el.style, el.width) as f64
    }

    fn commit(&mut self) {
        self.history.truncate(self.cursor + 1);
        self.history.push(self.layout.clone());
        self.cursor = self.history.len() - 1;
    }
}

fn child_container<'a>(node: &'a mut Value, key: &str) -> &'a mut Value {
    let index = key
        .parse::<usize>()
        .ok()
        .filter(|i| node.as_array().is_some_and(|items| *i < items.len()));
    if let Some(i) = index {
        return &mut node[i];
    }

    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => {
            let child = map.entry(key.to_string()).or_insert(Value::Null);
            if !child.is_object() && !child.is_array() {
                *child = Value::Object(Map::new());
            }
            child
        }
        other => other,
    }
}

fn apply_patch(el: &mut Element, patch: ElementPatch) {
    if let Some(x) = patch.x {
        el.x = x;
    }
    if let Some(y) = patch.y {
        el.y = y;
    }
    if let Some(width) = patch.width {
        el.width = width;
    }
    if let Some(height) = patch.height {
        el.height = height;
    }
    if let Some(text) = patch.text {
        el.text = Some(text);
    }
    if let Some(bind) = patch.bind {
        el.bind = (!bind.trim().is_empty()).then_some(bind);
    }
    if let Some(auto_height) = patch.auto_height {
        el.auto_height = auto_height;
    }
    if let Some(position_type) = patch.position_type {
        el.position_type = position_type;
    }
    if let Some(gap) = patch.gap {
        el.gap = Some(gap);
    }
    if let Some(item_height) = patch.item_height {
        el.item_height = Some(item_height);
    }
    if let Some(style) = patch.style {
        merge_style(&mut el.style, style);
    }
}

fn merge_style(base: &mut ElementStyle, over: ElementStyle) {
    let ElementStyle {
        font_size,
        color,
        font_weight,
        font_family,
        line_height,
        text_align,
        background_color,
        border_radius,
        z_index,
        extra,
    } = over;
    base.font_size = font_size.or(base.font_size);
    base.color = color.or(base.color.take());
    base.font_weight = font_weight.or(base.font_weight.take());
    base.font_family = font_family.or(base.font_family.take());
    base.line_height = line_height.or(base.line_height);
    base.text_align = text_align.or(base.text_align.take());
    base.background_color = background_color.or(base.background_color.take());
    base.border_radius = border_radius.or(base.border_radius.take());
    base.z_index = z_index.or(base.z_index);
    base.extra.extend(extra);
}
