//! Bind path parsing and resolution.
//!
//! A bind path is a dotted string such as `basic.firstName`,
//! `experience.0.company` or `experience.company`. Segments that parse as a
//! non-negative integer index into arrays; everything else is an object key.
//!
//! Resolution walks a `serde_json::Value` and never fails: a missing key, a
//! type mismatch or an out-of-range index all yield "nothing".

use serde_json::Value;

/// One step of a bind path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl Segment {
    fn parse(part: &str) -> Segment {
        if is_index(part) {
            if let Ok(idx) = part.parse() {
                return Segment::Index(idx);
            }
        }
        Segment::Key(part.to_string())
    }
}

/// True if the segment is written as a decimal row index.
pub fn is_index(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

/// A parsed bind path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindPath {
    segments: Vec<Segment>,
}

impl BindPath {
    /// Parse a dotted path, trimming whitespace around each segment.
    ///
    /// A path with an empty segment (`a..b`, a leading or trailing dot) is
    /// malformed and parses to the empty path, which resolves to nothing.
    pub fn parse(path: &str) -> BindPath {
        let segments = path
            .split('.')
            .map(str::trim)
            .map(|p| (!p.is_empty()).then(|| Segment::parse(p)))
            .collect::<Option<Vec<_>>>()
            .unwrap_or_default();
        BindPath { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The first key segment, if the path starts with one.
    pub fn root(&self) -> Option<&str> {
        match self.segments.first()? {
            Segment::Key(k) => Some(k),
            Segment::Index(_) => None,
        }
    }

    /// The path with every index segment removed, e.g.
    /// `experience.0.company` becomes `experience.company`.
    pub fn without_indices(&self) -> String {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Key(k) => Some(k.as_str()),
                Segment::Index(_) => None,
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Walk `data` along `path`, returning the raw value found there.
pub fn resolve_raw<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    let path = BindPath::parse(path);
    if path.is_empty() {
        return None;
    }
    traverse(data, path.segments())
}

fn traverse<'a>(value: &'a Value, segments: &[Segment]) -> Option<&'a Value> {
    let mut current = value;
    for segment in segments {
        current = match (current, segment) {
            (Value::Object(map), Segment::Key(key)) => map.get(key)?,
            (Value::Object(map), Segment::Index(idx)) => map.get(&idx.to_string())?,
            (Value::Array(arr), Segment::Index(idx)) => arr.get(*idx)?,
            _ => return None,
        };
        if current.is_null() {
            return None;
        }
    }
    Some(current)
}

/// Resolve `path` against `data` for display.
///
/// Scalars are rendered as strings; `null`, missing values, objects and
/// arrays all become the empty string, since only scalars can be shown in a
/// text element. Callers that need the structured value use [`resolve_raw`].
pub fn resolve(data: &Value, path: &str) -> String {
    resolve_raw(data, path).map(scalar_text).unwrap_or_default()
}

/// Display text of a scalar JSON value; empty for anything else.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Strip a single leading `N.` row index from a relative bind.
pub fn strip_leading_index(bind: &str) -> &str {
    match bind.split_once('.') {
        Some((head, rest)) if is_index(head) => rest,
        _ => bind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resume() -> Value {
        json!({
            "basic": {"firstName": "Ada", "age": 36, "remote": true, "middle": null},
            "summary": "Builder of engines.",
            "experience": [
                {"company": "Acme", "position": "Engineer"},
                {"company": "Globex", "position": "Lead"}
            ],
            "skills": {"technical": ["Rust", "SQL"]}
        })
    }

    #[test]
    fn test_resolve_simple_key() {
        assert_eq!(resolve(&resume(), "basic.firstName"), "Ada");
        assert_eq!(resolve(&resume(), "summary"), "Builder of engines.");
    }

    #[test]
    fn test_resolve_indexed() {
        assert_eq!(resolve(&resume(), "experience.1.company"), "Globex");
        assert_eq!(resolve(&resume(), "skills.technical.0"), "Rust");
    }

    #[test]
    fn test_resolve_scalars_stringified() {
        assert_eq!(resolve(&resume(), "basic.age"), "36");
        assert_eq!(resolve(&resume(), "basic.remote"), "true");
    }

    #[test]
    fn test_structured_values_render_empty() {
        assert_eq!(resolve(&resume(), "experience"), "");
        assert_eq!(resolve(&resume(), "basic"), "");
        // array root without index resolves to nothing
        assert_eq!(resolve(&resume(), "experience.company"), "");
    }

    #[test]
    fn test_missing_and_malformed_paths() {
        assert_eq!(resolve(&resume(), "basic.middle"), "");
        assert_eq!(resolve(&resume(), "basic.middle.deeper"), "");
        assert_eq!(resolve(&resume(), "experience.9.company"), "");
        assert_eq!(resolve(&resume(), "summary.0"), "");
        assert_eq!(resolve(&resume(), ""), "");
        assert_eq!(resolve(&resume(), "..."), "");
        assert_eq!(resolve(&resume(), "basic..firstName"), "");
        assert_eq!(resolve(&resume(), "basic.firstName."), "");
        assert!(BindPath::parse(".basic").is_empty());
        assert_eq!(resolve(&Value::Null, "basic.firstName"), "");
    }

    #[test]
    fn test_resolve_raw_keeps_structure() {
        let data = resume();
        let raw = resolve_raw(&data, "experience").unwrap();
        assert_eq!(raw.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_parse_and_strip_indices() {
        let path = BindPath::parse(" experience . 0 . company ");
        assert_eq!(path.root(), Some("experience"));
        assert_eq!(
            path.segments(),
            &[
                Segment::Key("experience".into()),
                Segment::Index(0),
                Segment::Key("company".into())
            ]
        );
        assert_eq!(path.without_indices(), "experience.company");
    }

    #[test]
    fn test_strip_leading_index() {
        assert_eq!(strip_leading_index("0.company"), "company");
        assert_eq!(strip_leading_index("company"), "company");
        assert_eq!(strip_leading_index("12"), "12");
        assert_eq!(strip_leading_index("a.0.b"), "a.0.b");
    }
}
