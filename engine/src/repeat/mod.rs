//! # Repeat Groups
//!
//! A section such as work experience is stored as one `repeat` element: a
//! child set with row-relative binds (`company`, `position`) drawn once per
//! row of the bound array, `gap` units apart. The editor works on concrete
//! elements instead, so the two forms convert into each other:
//!
//! - [`collapse`] turns flat per-row elements (`experience.0.company`,
//!   `experience.1.company`, ...) into a single repeat template. Row pitch is
//!   recovered from the `y` positions of the most frequent field.
//! - [`expand`] turns each repeat into one concrete element per row and
//!   child, sized to the data behind the canvas.
//!
//! [`normalize_for_save`] strips editor-only state before a layout is
//! persisted.

use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use crate::ids::IdSource;
use crate::model::{Element, ElementType, Layout, PositionType};
use crate::path::{resolve, strip_leading_index};
use crate::schema::{repeat_root, repeat_root_of_bind, Root};

/// Replace flat row elements with one `repeat` element per array root.
///
/// Roots that already have a repeat element are left alone. Each new repeat
/// is appended after the remaining elements. A root whose rows can't be
/// grouped keeps its flat elements.
pub fn collapse(elements: Vec<Element>, default_gap: f64) -> Vec<Element> {
    let with_repeat: HashSet<&str> = elements
        .iter()
        .filter(|el| el.is_repeat())
        .map(Element::bind_path)
        .filter(|bind| repeat_root(bind).is_some())
        .collect();

    // Written root -> indices of its flat elements, in first-seen order.
    let mut by_root: Vec<(String, Vec<usize>)> = Vec::new();
    for (idx, el) in elements.iter().enumerate() {
        if el.is_repeat() {
            continue;
        }
        let Some(root) = repeat_root_of_bind(el.bind_path()) else {
            continue;
        };
        if with_repeat.contains(root) {
            continue;
        }
        match by_root.iter_mut().find(|(r, _)| r == root) {
            Some((_, members)) => members.push(idx),
            None => by_root.push((root.to_string(), vec![idx])),
        }
    }

    if by_root.is_empty() {
        return elements;
    }

    let mut removed = HashSet::new();
    let mut repeats = Vec::new();
    for (root, members) in &by_root {
        let group: Vec<&Element> = members.iter().map(|&i| &elements[i]).collect();
        if let Some(repeat) = build_repeat(root, &group, default_gap) {
            debug!(
                root = %root,
                gap = repeat.gap.unwrap_or(default_gap),
                children = repeat.elements.len(),
                "collapsed flat elements into repeat"
            );
            removed.extend(members.iter().copied());
            repeats.push(repeat);
        } else {
            debug!(root = %root, "no row could be grouped, keeping flat elements");
        }
    }

    let mut out: Vec<Element> = elements
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| !removed.contains(idx))
        .map(|(_, el)| el)
        .collect();
    out.extend(repeats);
    out
}

struct Candidate<'a> {
    field: &'a str,
    y: f64,
    element: &'a Element,
}

fn build_repeat(root: &str, group: &[&Element], default_gap: f64) -> Option<Element> {
    let mut candidates: Vec<Candidate> = Vec::new();
    for &el in group {
        let Some(field) = el
            .bind_path()
            .strip_prefix(root)
            .and_then(|rest| rest.strip_prefix('.'))
            .map(strip_leading_index)
            .filter(|field| !field.is_empty())
        else {
            continue;
        };
        let seen = candidates.iter().any(|c| c.field == field && c.y == el.y);
        if !seen {
            candidates.push(Candidate {
                field,
                y: el.y,
                element: el,
            });
        }
    }
    if candidates.is_empty() {
        return None;
    }

    let anchor = anchor_field(&candidates);
    let mut row_starts: Vec<f64> = candidates
        .iter()
        .filter(|c| c.field == anchor)
        .map(|c| c.y)
        .collect();
    row_starts.sort_by(f64::total_cmp);
    row_starts.dedup();

    let repeat_y = row_starts[0];
    let gap = row_starts
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .min_by(f64::total_cmp)
        .unwrap_or(default_gap);
    let next_row = row_starts.get(1).copied().unwrap_or(f64::INFINITY);

    let first_row: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| c.y >= repeat_y && c.y < next_row)
        .collect();
    if first_row.is_empty() {
        return None;
    }

    let repeat_x = first_row
        .iter()
        .map(|c| c.element.x)
        .min_by(f64::total_cmp)
        .unwrap_or(0.0);

    let children = first_row
        .iter()
        .map(|c| {
            let mut child = c.element.clone();
            child.bind = Some(c.field.to_string());
            child.x -= repeat_x;
            child.y -= repeat_y;
            child.position_type = PositionType::Absolute;
            child
        })
        .collect();

    let mut repeat = Element::new(ElementType::Repeat, format!("repeat-{}", root))
        .with_bind(root)
        .at(repeat_x, repeat_y);
    repeat.gap = Some(gap);
    repeat.elements = children;
    Some(repeat)
}

/// The field seen at the most distinct `y` positions. Ties go to the field
/// encountered first.
fn anchor_field<'a>(candidates: &[Candidate<'a>]) -> &'a str {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for c in candidates {
        match counts.iter_mut().find(|(f, _)| *f == c.field) {
            Some((_, n)) => *n += 1,
            None => counts.push((c.field, 1)),
        }
    }
    let mut best = counts[0];
    for entry in &counts[1..] {
        if entry.1 > best.1 {
            best = *entry;
        }
    }
    best.0
}

/// Replace each recognized `repeat` element with concrete per-row elements.
///
/// The row count is the length of the matching array in `data`, at least
/// one. Each concrete element shows its row's value when the data has one,
/// else the child's own text. Flat elements bound to a root that already has a repeat are dropped
/// as superseded. Everything else passes through unchanged.
pub fn expand(layout: &Layout, data: &Value, ids: &mut dyn IdSource, default_gap: f64) -> Layout {
    let repeat_roots: HashSet<Root> = layout
        .elements
        .iter()
        .filter(|el| el.is_repeat())
        .filter_map(|el| repeat_root(el.bind_path()))
        .collect();

    let mut elements = Vec::with_capacity(layout.elements.len());
    for el in &layout.elements {
        if !el.is_repeat() {
            let superseded = repeat_root_of_bind(el.bind_path())
                .and_then(repeat_root)
                .is_some_and(|root| repeat_roots.contains(&root));
            if superseded {
                debug!(id = %el.id, bind = el.bind_path(), "dropping flat element superseded by repeat");
            } else {
                elements.push(el.clone());
            }
            continue;
        }

        match repeat_root(el.bind_path()) {
            Some(root) => expand_repeat(el, root, data, ids, default_gap, &mut elements),
            None => elements.push(el.clone()),
        }
    }

    Layout {
        page: layout.page.clone(),
        elements,
    }
}

fn expand_repeat(
    repeat: &Element,
    root: Root,
    data: &Value,
    ids: &mut dyn IdSource,
    default_gap: f64,
    out: &mut Vec<Element>,
) {
    let written = repeat.bind_path();
    let data_rows: &[Value] = root
        .names()
        .find_map(|name| data.get(name).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or_default();
    let rows = data_rows.len().max(1);
    let gap = repeat.gap.filter(|g| *g > 0.0).unwrap_or(default_gap);
    debug!(root = %root, rows, gap, "expanding repeat");

    for row in 0..rows {
        for (index, child) in repeat.elements.iter().enumerate() {
            let relative = child_field(written, child.bind_path());
            let mut el = child.clone();
            el.bind = Some(if relative.is_empty() {
                written.to_string()
            } else {
                format!("{}.{}", written, relative)
            });
            el.position_type = PositionType::Absolute;
            el.x = repeat.x + child.x;
            el.y = repeat.y + child.y + row as f64 * gap;

            let base = if !child.id.is_empty() {
                child.id.as_str()
            } else if !child.kind.as_str().is_empty() {
                child.kind.as_str()
            } else {
                "element"
            };
            el.id = ids.next_id(&format!("{}-r{}-c{}", base, row, index), index);

            // Row data wins over the template's sample text.
            if !relative.is_empty() {
                let value = data_rows
                    .get(row)
                    .map(|entry| resolve(entry, relative))
                    .unwrap_or_default();
                if !value.is_empty() {
                    el.text = Some(value);
                }
            }
            out.push(el);
        }
    }
}

/// A repeat child's bind relative to the row: `root.` and a leading row
/// index are removed.
fn child_field<'a>(root: &str, bind: &'a str) -> &'a str {
    let rest = bind
        .strip_prefix(root)
        .and_then(|rest| rest.strip_prefix('.'))
        .unwrap_or(bind);
    strip_leading_index(rest)
}

/// Rewrite a repeat child's bind to row-relative form:
/// `experience.0.position` and `experience.position` both become `position`.
/// Binds outside the root are returned unchanged.
pub fn normalize_repeat_child_bind(root: &str, bind: &str) -> String {
    let root = root.trim();
    if root.is_empty() || bind.trim().is_empty() {
        return bind.to_string();
    }
    match bind.strip_prefix(root).and_then(|rest| rest.strip_prefix('.')) {
        Some(rest) if !rest.is_empty() => strip_leading_index(rest).to_string(),
        _ => bind.to_string(),
    }
}

/// Prepare a top-level element for persistence.
///
/// Stacking order moves into `style.zIndex` (falling back to the legacy
/// top-level field, then 1). Transient fields are dropped and the element
/// becomes absolute. Children of a recognized repeat get row-relative binds.
pub fn normalize_for_save(element: &Element) -> Element {
    let mut el = element.clone();
    el.style.z_index = Some(element.style.z_index.or(element.z_index).unwrap_or(1));
    el.z_index = None;
    el.margin_top = None;
    el.collapsed = false;
    el.position_type = PositionType::Absolute;

    if el.is_repeat() && repeat_root(el.bind_path()).is_some() {
        let root = el.bind_path().to_string();
        for child in &mut el.elements {
            if let Some(bind) = child.bind.as_deref() {
                child.bind = Some(normalize_repeat_child_bind(&root, bind));
            }
        }
    }
    el
}
