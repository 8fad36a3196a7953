//! # Sample Data
//!
//! The canonical resume data object that a template is saved with. It
//! mirrors the bind path taxonomy in [`crate::schema`]: flat records for
//! `basic` and `customization`, a scalar `summary`, sequences of fixed-shape
//! rows for the array roots, grouped skills, and a flat language list.
//!
//! Sample data is never authored directly. It is inferred from the text a
//! template author types into bound elements (see [`builder`]), optionally on
//! top of sample data loaded from an earlier save. Older saves use legacy
//! shapes; [`SampleData::from_existing`] accepts those and normalizes them.

pub mod builder;
pub mod filter;

use std::collections::HashSet;
use std::hash::Hash;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::schema::LEGACY_LANGUAGES_KEY;

/// A flat record with a fixed set of optional text fields, addressable by
/// their wire name.
pub trait Record: Clone + Default + PartialEq + Eq + Hash {
    /// Wire names of every field, in declaration order.
    const FIELDS: &'static [&'static str];

    fn field(&self, key: &str) -> Option<&Option<String>>;

    fn field_mut(&mut self, key: &str) -> Option<&mut Option<String>>;

    /// The field's value if it has visible content.
    fn text_of(&self, key: &str) -> Option<&str> {
        self.field(key)?
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Overlay the keys of a JSON object onto this record. Unknown keys are
    /// ignored; a present `null` clears the field.
    fn overlay(&mut self, value: &Value) {
        let Some(map) = value.as_object() else {
            return;
        };
        for (key, v) in map {
            if let Some(slot) = self.field_mut(key) {
                *slot = lenient_text(v);
            }
        }
    }
}

macro_rules! record {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $($field:ident => $key:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name {
            $(
                #[serde(rename = $key, default, deserialize_with = "deserialize_text")]
                pub $field: Option<String>,
            )*
        }

        impl Record for $name {
            const FIELDS: &'static [&'static str] = &[$($key),*];

            fn field(&self, key: &str) -> Option<&Option<String>> {
                match key {
                    $($key => Some(&self.$field),)*
                    _ => None,
                }
            }

            fn field_mut(&mut self, key: &str) -> Option<&mut Option<String>> {
                match key {
                    $($key => Some(&mut self.$field),)*
                    _ => None,
                }
            }
        }
    };
}

record! {
    /// Contact and headline details.
    #[derive(Default)]
    pub struct Basic {
        first_name => "firstName",
        last_name => "lastName",
        email => "email",
        phone => "phone",
        address => "address",
        job_title => "jobTitle",
        country => "country",
        city => "city",
        postal_code => "postalCode",
        state => "state",
        profile_image => "profileImage",
        linked_in => "linkedIn",
        github => "github",
        portfolio => "portfolio",
    }
}

record! {
    #[derive(Default)]
    pub struct ExperienceRow {
        company => "company",
        position => "position",
        start_date => "startDate",
        end_date => "endDate",
        description => "description",
        location => "location",
    }
}

record! {
    #[derive(Default)]
    pub struct EducationRow {
        school_or_college_name => "schoolOrCollegeName",
        degree_or_standard => "degreeOrStandard",
        field_of_study => "fieldOfStudy",
        start_date => "startDate",
        end_date => "endDate",
        location => "location",
        description => "description",
    }
}

record! {
    #[derive(Default)]
    pub struct CertificationRow {
        name => "name",
        description => "description",
        link => "link",
    }
}

record! {
    #[derive(Default)]
    pub struct ProjectRow {
        title => "title",
        description => "description",
        link => "link",
    }
}

record! {
    /// Theme values a template can bind to.
    pub struct Customization {
        primary_color => "primaryColor",
        secondary_color => "secondaryColor",
        font_family => "fontFamily",
    }
}

impl Default for Customization {
    fn default() -> Self {
        Self {
            primary_color: Some("#2c3e50".to_string()),
            secondary_color: Some("#34495e".to_string()),
            font_family: Some("Roboto".to_string()),
        }
    }
}

/// Skill names in four fixed groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skills {
    #[serde(default)]
    pub technical: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub softskills: Vec<String>,
    #[serde(default)]
    pub otherskills: Vec<String>,
}

impl Skills {
    pub const GROUPS: [&'static str; 4] = ["technical", "tools", "softskills", "otherskills"];

    pub fn group(&self, name: &str) -> Option<&Vec<String>> {
        match name {
            "technical" => Some(&self.technical),
            "tools" => Some(&self.tools),
            "softskills" => Some(&self.softskills),
            "otherskills" => Some(&self.otherskills),
            _ => None,
        }
    }

    pub fn group_mut(&mut self, name: &str) -> Option<&mut Vec<String>> {
        match name {
            "technical" => Some(&mut self.technical),
            "tools" => Some(&mut self.tools),
            "softskills" => Some(&mut self.softskills),
            "otherskills" => Some(&mut self.otherskills),
            _ => None,
        }
    }
}

/// The complete sample-data object saved alongside a layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleData {
    #[serde(default)]
    pub basic: Basic,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default = "one_row")]
    pub experience: Vec<ExperienceRow>,
    #[serde(default = "one_row")]
    pub education: Vec<EducationRow>,
    #[serde(default)]
    pub skills: Skills,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default = "one_row", alias = "certificate")]
    pub certifications: Vec<CertificationRow>,
    #[serde(default = "one_row", alias = "project")]
    pub projects: Vec<ProjectRow>,
    #[serde(default)]
    pub customization: Customization,
}

/// Array roots always hold at least a template row of nulls.
fn one_row<R: Default>() -> Vec<R> {
    vec![R::default()]
}

impl Default for SampleData {
    fn default() -> Self {
        Self {
            basic: Basic::default(),
            summary: None,
            experience: one_row(),
            education: one_row(),
            skills: Skills::default(),
            languages: vec![],
            certifications: one_row(),
            projects: one_row(),
            customization: Customization::default(),
        }
    }
}

impl SampleData {
    /// Defaults merged with previously saved sample data.
    ///
    /// Object roots merge key by key over the defaults. Array roots replace
    /// the default template row only when non-empty, each row merged over
    /// the default row shape. Legacy shapes are accepted: `skills` as a bare
    /// list (becomes `technical`), skill entries as `{name}`/`{label}`
    /// objects, languages as `{name, level}` objects or nested under
    /// `languages.langugaes`, and the singular `certificate` / `project`
    /// root names. The input is never modified.
    pub fn from_existing(existing: &Value) -> SampleData {
        let mut sample = SampleData::default();
        let Some(map) = existing.as_object() else {
            return sample;
        };

        if let Some(basic) = map.get("basic") {
            sample.basic.overlay(basic);
        }
        if let Some(customization) = map.get("customization") {
            sample.customization.overlay(customization);
        }
        if let Some(summary) = map.get("summary") {
            sample.summary = lenient_text(summary);
        }

        if let Some(rows) = merged_rows(map.get("experience")) {
            sample.experience = rows;
        }
        if let Some(rows) = merged_rows(map.get("education")) {
            sample.education = rows;
        }
        if let Some(rows) =
            merged_rows(map.get("certifications")).or_else(|| merged_rows(map.get("certificate")))
        {
            sample.certifications = rows;
        }
        if let Some(rows) = merged_rows(map.get("projects")).or_else(|| merged_rows(map.get("project")))
        {
            sample.projects = rows;
        }

        match map.get("skills") {
            Some(Value::Array(items)) => sample.skills.technical = skill_names(items),
            Some(Value::Object(groups)) => {
                for name in Skills::GROUPS {
                    let items = groups.get(name).and_then(Value::as_array);
                    if let Some(group) = sample.skills.group_mut(name) {
                        *group = items.map(|i| skill_names(i)).unwrap_or_default();
                    }
                }
            }
            _ => {}
        }

        match map.get("languages") {
            Some(Value::Array(items)) => sample.languages = language_names(items),
            Some(Value::Object(nested)) => {
                sample.languages = nested
                    .get(LEGACY_LANGUAGES_KEY)
                    .and_then(Value::as_array)
                    .map(|i| language_names(i))
                    .unwrap_or_default();
            }
            _ => {}
        }

        sample
    }

    pub fn to_value(&self) -> Value {
        // Plain structs of strings and vectors always serialize.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn merged_rows<R: Record>(value: Option<&Value>) -> Option<Vec<R>> {
    let items = value?.as_array().filter(|a| !a.is_empty())?;
    Some(
        items
            .iter()
            .map(|item| {
                let mut row = R::default();
                row.overlay(item);
                row
            })
            .collect(),
    )
}

fn skill_names(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => s.trim().to_string(),
            Value::Object(obj) => first_text(obj.get("name"))
                .or_else(|| first_text(obj.get("label")))
                .unwrap_or_default(),
            _ => String::new(),
        })
        .filter(|s| !s.is_empty())
        .collect()
}

fn language_names(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => s.trim().to_string(),
            Value::Object(obj) => {
                let name = first_text(obj.get("name")).unwrap_or_default();
                let level = first_text(obj.get("level")).unwrap_or_default();
                match (name.is_empty(), level.is_empty()) {
                    (false, false) => format!("{} ({})", name, level),
                    (false, true) => name,
                    _ => level,
                }
            }
            _ => String::new(),
        })
        .filter(|s| !s.is_empty())
        .collect()
}

fn first_text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(lenient_text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Scalars become text; `null`, arrays and objects become `None`.
pub(crate) fn lenient_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(lenient_text(&value))
}

/// Remove repeated items, keeping the first occurrence of each.
pub(crate) fn dedupe<T: Clone + Eq + Hash>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
