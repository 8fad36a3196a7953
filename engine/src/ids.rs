//! Element identifier generation.
//!
//! Elements coming out of storage may lack identifiers, carry only a legacy
//! `_id`, or collide after repeat expansion. The editor needs every element
//! to be uniquely addressable, so loading normalizes them here.

use std::collections::HashSet;

use tracing::warn;

use crate::model::Element;

/// A source of fresh element identifiers.
pub trait IdSource {
    /// A new identifier starting with `prefix`. `index` is the element's
    /// position among its siblings and only makes ids easier to read.
    fn next_id(&mut self, prefix: &str, index: usize) -> String;
}

/// `prefix-<millis>-<index>-<random 0..999>`, the scheme the editor uses.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct ClockIds;

#[cfg(not(target_arch = "wasm32"))]
impl IdSource for ClockIds {
    fn next_id(&mut self, prefix: &str, index: usize) -> String {
        use rand::Rng;
        use std::time::{SystemTime, UNIX_EPOCH};

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let suffix: u32 = rand::thread_rng().gen_range(0..1000);
        format!("{}-{}-{}-{}", prefix, millis, index, suffix)
    }
}

/// Deterministic ids: `prefix-<index>-<counter>`.
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    counter: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self, prefix: &str, index: usize) -> String {
        self.counter += 1;
        format!("{}-{}-{}", prefix, index, self.counter)
    }
}

/// Give every element (children included) a unique, non-empty `id`.
///
/// An existing `id` is kept, then a legacy `_id`; otherwise one is
/// generated from the element type. An id already used earlier in the
/// layout is replaced with a generated one.
pub fn normalize_ids(elements: Vec<Element>, ids: &mut dyn IdSource) -> Vec<Element> {
    let mut seen = HashSet::new();
    normalize_level(elements, ids, &mut seen)
}

fn normalize_level(
    elements: Vec<Element>,
    ids: &mut dyn IdSource,
    seen: &mut HashSet<String>,
) -> Vec<Element> {
    elements
        .into_iter()
        .enumerate()
        .map(|(index, mut el)| {
            let current = existing_id(&el);
            el.id = match current {
                Some(id) if !seen.contains(&id) => id,
                Some(id) => {
                    warn!(%id, "duplicate element id, regenerating");
                    fresh_id(el.kind.as_str(), index, ids, seen)
                }
                None => fresh_id(el.kind.as_str(), index, ids, seen),
            };
            seen.insert(el.id.clone());

            let children = std::mem::take(&mut el.elements);
            el.elements = normalize_level(children, ids, seen);
            el
        })
        .collect()
}

fn existing_id(el: &Element) -> Option<String> {
    if !el.id.trim().is_empty() {
        return Some(el.id.clone());
    }
    match el.extra.get("_id")? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn fresh_id(kind: &str, index: usize, ids: &mut dyn IdSource, seen: &HashSet<String>) -> String {
    let prefix = if kind.is_empty() { "element" } else { kind };
    loop {
        let id = ids.next_id(prefix, index);
        if !seen.contains(&id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementType;
    use serde_json::json;

    #[test]
    fn test_keeps_existing_ids() {
        let els = vec![
            Element::new(ElementType::Text, "a"),
            Element::new(ElementType::Text, "b"),
        ];
        let out = normalize_ids(els, &mut SequentialIds::new());
        assert_eq!(out[0].id, "a");
        assert_eq!(out[1].id, "b");
    }

    #[test]
    fn test_generates_missing_ids() {
        let els = vec![
            Element::new(ElementType::Heading, ""),
            Element::new(ElementType::Image, "  "),
        ];
        let out = normalize_ids(els, &mut SequentialIds::new());
        assert_eq!(out[0].id, "heading-0-1");
        assert_eq!(out[1].id, "image-1-2");
    }

    #[test]
    fn test_legacy_underscore_id() {
        let mut el = Element::new(ElementType::Text, "");
        el.extra.insert("_id".into(), json!("65f0c1"));
        let out = normalize_ids(vec![el], &mut SequentialIds::new());
        assert_eq!(out[0].id, "65f0c1");
    }

    #[test]
    fn test_duplicates_regenerated_including_children() {
        let mut repeat = Element::new(ElementType::Repeat, "dup");
        repeat.elements = vec![
            Element::new(ElementType::Text, "dup"),
            Element::new(ElementType::Text, ""),
        ];
        let out = normalize_ids(
            vec![Element::new(ElementType::Text, "dup"), repeat],
            &mut SequentialIds::new(),
        );
        let mut all = vec![out[0].id.clone(), out[1].id.clone()];
        all.extend(out[1].elements.iter().map(|c| c.id.clone()));
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), 4);
        assert_eq!(out[0].id, "dup");
        assert!(out[1].id.starts_with("repeat-"));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_clock_ids_shape() {
        let id = ClockIds.next_id("text", 3);
        let parts: Vec<_> = id.split('-').collect();
        assert_eq!(parts[0], "text");
        assert_eq!(parts[2], "3");
        assert!(parts[3].parse::<u32>().unwrap() < 1000);
    }
}
