//! Reduce sample data to what a layout actually binds.
//!
//! The full sample-data object carries every root with template rows and
//! default colors. Downstream consumers that only want the values a template
//! shows can filter it against the bound paths reported by inference.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use super::{Record, SampleData, Skills};

/// Keep only bound, non-empty values.
///
/// Flat roots keep bound fields. Skill groups and languages are kept when
/// bound. Array roots keep every row that has a non-empty field, with empty
/// fields dropped. Returns `{}` when nothing is bound.
pub fn filter_by_bound_fields(sample: &SampleData, bound_paths: &BTreeSet<String>) -> Value {
    let mut filtered = Map::new();
    if bound_paths.is_empty() {
        return Value::Object(filtered);
    }

    if let Some(basic) = bound_fields(&sample.basic, "basic", bound_paths) {
        filtered.insert("basic".into(), basic);
    }
    if let Some(customization) = bound_fields(&sample.customization, "customization", bound_paths) {
        filtered.insert("customization".into(), customization);
    }

    if bound_paths.contains("summary") {
        if let Some(summary) = non_empty(sample.summary.as_deref()) {
            filtered.insert("summary".into(), Value::String(summary.to_string()));
        }
    }

    let mut skills = Map::new();
    for name in Skills::GROUPS {
        if !bound_paths.contains(&format!("skills.{}", name)) {
            continue;
        }
        let values = string_list(sample.skills.group(name).map(Vec::as_slice).unwrap_or_default());
        if !values.is_empty() {
            skills.insert(name.to_string(), Value::Array(values));
        }
    }
    if !skills.is_empty() {
        filtered.insert("skills".into(), Value::Object(skills));
    }

    let languages_bound = bound_paths
        .iter()
        .any(|p| p == "languages" || p.starts_with("languages."));
    if languages_bound {
        let values = string_list(&sample.languages);
        if !values.is_empty() {
            filtered.insert("languages".into(), Value::Array(values));
        }
    }

    insert_rows(&mut filtered, "experience", &sample.experience);
    insert_rows(&mut filtered, "education", &sample.education);
    insert_rows(&mut filtered, "certifications", &sample.certifications);
    insert_rows(&mut filtered, "projects", &sample.projects);

    Value::Object(filtered)
}

fn bound_fields<R: Record>(record: &R, root: &str, bound: &BTreeSet<String>) -> Option<Value> {
    let fields: Map<String, Value> = R::FIELDS
        .iter()
        .filter(|field| bound.contains(&format!("{}.{}", root, field)))
        .filter_map(|field| {
            let value = non_empty(record.field(field)?.as_deref())?;
            Some((field.to_string(), Value::String(value.to_string())))
        })
        .collect();
    (!fields.is_empty()).then_some(Value::Object(fields))
}

fn insert_rows<R: Record>(out: &mut Map<String, Value>, root: &str, rows: &[R]) {
    let entries: Vec<Value> = rows
        .iter()
        .filter_map(|row| {
            let cleaned: Map<String, Value> = R::FIELDS
                .iter()
                .filter_map(|field| {
                    let value = non_empty(row.field(field)?.as_deref())?;
                    Some((field.to_string(), Value::String(value.to_string())))
                })
                .collect();
            (!cleaned.is_empty()).then_some(Value::Object(cleaned))
        })
        .collect();
    if !entries.is_empty() {
        out.insert(root.to_string(), Value::Array(entries));
    }
}

fn string_list(items: &[String]) -> Vec<Value> {
    items
        .iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| Value::String(s.clone()))
        .collect()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
