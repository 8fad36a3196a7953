//! Sample data inference.
//!
//! Walks the whole element tree (repeat children included), and for every
//! element that has both a bind path and literal text, writes that text into
//! sample data at the bound location. Array roots without an explicit row
//! index (`experience.company`) are auto-indexed: a per-root cursor moves to
//! a new row when the target field already holds a different value.
//!
//! After all writes, rows are deduplicated, experience and education rows
//! that describe the same entry are merged, and the experience row count is
//! clamped to the number of distinct positions the layout binds.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde_json::Value;
use tracing::{debug, trace};

use super::{dedupe, Record, SampleData, Skills};
use crate::model::{Element, Layout};
use crate::path::{is_index, BindPath};
use crate::schema::{Root, LEGACY_LANGUAGES_KEY};

/// Rows past this index are never materialized from an explicit bind index.
const MAX_ROW_INDEX: usize = 999;

const EXPERIENCE_SIGNATURE: [&str; 5] = ["company", "position", "startDate", "endDate", "location"];

const EDUCATION_SIGNATURE: [&str; 6] = [
    "schoolOrCollegeName",
    "degreeOrStandard",
    "fieldOfStudy",
    "startDate",
    "endDate",
    "location",
];

/// Result of inference: the sample data plus every bind path (indices
/// removed) that received text.
#[derive(Debug, Clone, PartialEq)]
pub struct Inference {
    pub sample_data: SampleData,
    pub bound_paths: BTreeSet<String>,
}

/// A bound element reduced to what inference needs.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatBinding {
    /// Full bind path, with repeat children composed under their root.
    pub bind: String,
    /// Trimmed literal text, if any.
    pub text: Option<String>,
}

/// Infer sample data from a layout, merging over `existing` when given.
/// Neither input is modified.
pub fn build_sample_data(layout: &Layout, existing: Option<&Value>) -> Inference {
    let mut sample = existing.map(SampleData::from_existing).unwrap_or_default();
    let bindings = flatten_bindings(&layout.elements);
    let mut bound_paths = BTreeSet::new();

    let mut writer = Writer::new(&mut sample);
    for binding in &bindings {
        let Some(text) = binding.text.as_deref() else {
            continue;
        };
        writer.write(&binding.bind, text);
        let tracked = BindPath::parse(&binding.bind).without_indices();
        if !tracked.is_empty() {
            bound_paths.insert(tracked);
        }
    }

    post_process(&mut sample);

    let expected = expected_row_count(&bindings, "experience", "position");
    if expected > 0 && sample.experience.len() > expected {
        debug!(
            rows = sample.experience.len(),
            expected, "clamping experience rows to bound positions"
        );
        sample.experience.truncate(expected);
    }

    Inference {
        sample_data: sample,
        bound_paths,
    }
}

/// Flatten the element tree depth-first in reading order (by `y`, then `x`).
/// Children of a `repeat` get their binds composed under the repeat's root.
pub fn flatten_bindings(elements: &[Element]) -> Vec<FlatBinding> {
    let mut out = Vec::new();
    flatten_into(elements, "", &mut out);
    out
}

fn flatten_into(elements: &[Element], parent_bind: &str, out: &mut Vec<FlatBinding>) {
    let mut sorted: Vec<&Element> = elements.iter().collect();
    sorted.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));

    for el in sorted {
        let own = el.bind_path();
        let effective = if parent_bind.is_empty() {
            own.to_string()
        } else {
            compose_bind(parent_bind, own)
        };

        if !effective.is_empty() {
            out.push(FlatBinding {
                bind: effective.clone(),
                text: el.manual_text().map(str::to_string),
            });
        }

        if !el.elements.is_empty() {
            let next_parent = if el.is_repeat() && !effective.is_empty() {
                effective.as_str()
            } else {
                parent_bind
            };
            flatten_into(&el.elements, next_parent, out);
        }
    }
}

/// Compose a repeat child's bind under its parent root. Binds that already
/// name the root are kept as they are.
pub fn compose_bind(parent: &str, child: &str) -> String {
    if child.is_empty() || child == parent {
        return parent.to_string();
    }
    match child.strip_prefix(parent) {
        Some(rest) if rest.starts_with('.') => child.to_string(),
        _ => format!("{}.{}", parent, child),
    }
}

/// Applies bound text to sample data, tracking an auto-index cursor per
/// array root.
struct Writer<'a> {
    sample: &'a mut SampleData,
    cursors: HashMap<Root, usize>,
}

impl<'a> Writer<'a> {
    fn new(sample: &'a mut SampleData) -> Self {
        Self {
            sample,
            cursors: HashMap::new(),
        }
    }

    fn write(&mut self, bind: &str, value: &str) {
        let parts: Vec<&str> = bind
            .split('.')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        let Some(first) = parts.first() else {
            return;
        };
        let Some(root) = Root::from_name(first) else {
            trace!(bind, "ignoring bind with unrecognized root");
            return;
        };
        let key = parts.get(1).copied();

        match root {
            Root::Summary => self.sample.summary = Some(value.to_string()),
            Root::Basic => {
                if let Some(slot) = key.and_then(|k| self.sample.basic.field_mut(k)) {
                    *slot = Some(value.to_string());
                }
            }
            Root::Customization => {
                if let Some(slot) = key.and_then(|k| self.sample.customization.field_mut(k)) {
                    *slot = Some(value.to_string());
                }
            }
            Root::Skills => {
                if let Some(group) = key.and_then(|k| self.sample.skills.group_mut(k)) {
                    *group = list_items(value);
                }
            }
            Root::Languages => {
                if key.is_some_and(|k| k != LEGACY_LANGUAGES_KEY) {
                    return;
                }
                self.sample.languages = list_items(value);
            }
            Root::Experience => {
                let cursor = self.cursors.entry(root).or_insert(0);
                write_row(&mut self.sample.experience, cursor, &parts, value);
            }
            Root::Education => {
                let cursor = self.cursors.entry(root).or_insert(0);
                write_row(&mut self.sample.education, cursor, &parts, value);
            }
            Root::Certifications => {
                let cursor = self.cursors.entry(root).or_insert(0);
                write_row(&mut self.sample.certifications, cursor, &parts, value);
            }
            Root::Projects => {
                let cursor = self.cursors.entry(root).or_insert(0);
                write_row(&mut self.sample.projects, cursor, &parts, value);
            }
        }
    }
}

/// Write `value` into an array root. `parts` is the split bind path:
/// `[root, index, field]` or `[root, field]`.
fn write_row<R: Record>(rows: &mut Vec<R>, cursor: &mut usize, parts: &[&str], value: &str) {
    let (explicit, field) = match parts.get(1) {
        Some(p) if is_index(p) => (p.parse::<usize>().ok().or(Some(usize::MAX)), parts.get(2)),
        _ => (None, parts.get(1)),
    };
    let Some(field) = field.copied() else {
        return;
    };

    let index = match explicit {
        Some(index) if index > MAX_ROW_INDEX => {
            debug!(index, "ignoring bind with out-of-range row index");
            return;
        }
        Some(index) => index,
        None => {
            let current = *cursor;
            grow(rows, current);
            let advance = rows[current]
                .text_of(field)
                .is_some_and(|existing| existing != value.trim());
            let index = if advance { current + 1 } else { current };
            *cursor = index;
            grow(rows, index);

            if rows[index].text_of(field) == Some(value.trim()) {
                trace!(field, index, "skipping duplicate auto-indexed write");
                return;
            }
            index
        }
    };

    grow(rows, index);
    if let Some(slot) = rows[index].field_mut(field) {
        *slot = Some(value.to_string());
    }
}

/// Make sure `rows[index]` exists, padding with template rows.
fn grow<R: Record>(rows: &mut Vec<R>, index: usize) {
    if rows.len() <= index {
        rows.resize(index + 1, R::default());
    }
}

/// Split list text into clean items: one per line, with bullet and number
/// markers removed, duplicates dropped.
fn list_items(value: &str) -> Vec<String> {
    let lines: Vec<String> = value
        .split('\n')
        .map(clean_list_line)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        let whole = value.trim();
        if whole.is_empty() {
            return vec![];
        }
        return vec![whole.to_string()];
    }
    dedupe(lines)
}

/// Strip the "↵" glyph some editors insert, and a leading `-`, `*`, `•`,
/// `1.` or `1)` marker followed by whitespace.
fn clean_list_line(line: &str) -> String {
    let line = line.replace('\u{21B5}', "");
    let trimmed = line.trim_start();
    let rest = strip_marker(trimmed).unwrap_or(trimmed);
    rest.trim().to_string()
}

fn strip_marker(line: &str) -> Option<&str> {
    let after = if let Some(rest) = line.strip_prefix(['-', '*', '\u{2022}']) {
        rest
    } else {
        let digits = line.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        line[digits..].strip_prefix(['.', ')'])?
    };
    // the marker only counts when followed by whitespace
    after.starts_with(char::is_whitespace).then_some(after)
}

fn post_process(sample: &mut SampleData) {
    sample.experience = dedupe(std::mem::take(&mut sample.experience));
    sample.education = dedupe(std::mem::take(&mut sample.education));
    sample.certifications = dedupe(std::mem::take(&mut sample.certifications));
    sample.projects = dedupe(std::mem::take(&mut sample.projects));

    sample.languages = dedupe(non_empty(std::mem::take(&mut sample.languages)));
    for name in Skills::GROUPS {
        if let Some(group) = sample.skills.group_mut(name) {
            *group = dedupe(non_empty(std::mem::take(group)));
        }
    }

    sample.experience =
        collapse_by_signature(std::mem::take(&mut sample.experience), &EXPERIENCE_SIGNATURE);
    sample.education =
        collapse_by_signature(std::mem::take(&mut sample.education), &EDUCATION_SIGNATURE);
}

fn non_empty(items: Vec<String>) -> Vec<String> {
    items.into_iter().filter(|s| !s.is_empty()).collect()
}

/// Grouping key for [`collapse_by_signature`]. Rows with no identifying
/// field at all only group with exact copies of themselves.
#[derive(PartialEq, Eq, Hash)]
enum Signature<R> {
    Fields(Vec<String>),
    Whole(R),
}

/// Merge rows that agree on every identifying field. The first occurrence
/// wins; its empty fields are filled from later duplicates.
fn collapse_by_signature<R: Record>(rows: Vec<R>, key_fields: &[&str]) -> Vec<R> {
    let mut out: Vec<R> = Vec::with_capacity(rows.len());
    let mut positions: HashMap<Signature<R>, usize> = HashMap::new();

    for row in rows {
        let parts: Vec<String> = key_fields
            .iter()
            .map(|k| row.text_of(k).unwrap_or_default().to_string())
            .collect();
        let signature = if parts.iter().any(|p| !p.is_empty()) {
            Signature::Fields(parts)
        } else {
            Signature::Whole(row.clone())
        };

        match positions.get(&signature) {
            Some(&idx) => fill_missing(&mut out[idx], &row),
            None => {
                positions.insert(signature, out.len());
                out.push(row);
            }
        }
    }
    out
}

fn fill_missing<R: Record>(target: &mut R, source: &R) {
    for field in R::FIELDS {
        if target.text_of(field).is_some() || source.text_of(field).is_none() {
            continue;
        }
        let incoming = source.field(field).cloned().flatten();
        if let Some(slot) = target.field_mut(field) {
            *slot = incoming;
        }
    }
}

/// Distinct non-empty texts bound to `root.field` or `root.N.field`.
fn expected_row_count(bindings: &[FlatBinding], root: &str, field: &str) -> usize {
    bindings
        .iter()
        .filter(|b| {
            let parts: Vec<&str> = b.bind.split('.').collect();
            match parts.as_slice() {
                [r, f] => *r == root && *f == field,
                [r, idx, f] => *r == root && is_index(idx) && *f == field,
                _ => false,
            }
        })
        .filter_map(|b| b.text.as_deref())
        .collect::<HashSet<_>>()
        .len()
}
