//! # Resume Data Taxonomy
//!
//! The fixed set of top-level roots a bind path can address, the alias table
//! for legacy root names, and the catalog of bind paths offered to template
//! authors.
//!
//! Two name spaces exist for array roots. Layouts keep the root *as written*
//! (`certificate`, `project`, ...) in `repeat` binds, while the data model
//! always uses the canonical key (`certifications`, `projects`). [`Root`] is
//! the data-layer name; the written string is carried alongside it wherever
//! the display layer needs it.

use serde::Serialize;
use std::fmt;

/// A top-level section of the resume data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Root {
    Basic,
    Summary,
    Experience,
    Education,
    Skills,
    Languages,
    Certifications,
    Projects,
    Customization,
}

/// Legacy root names and the canonical root each one means.
const ROOT_ALIASES: &[(&str, Root)] = &[
    ("project", Root::Projects),
    ("certificate", Root::Certifications),
    ("certificates", Root::Certifications),
    ("certification", Root::Certifications),
];

/// Persisted data once nested languages under this misspelled key, as
/// `languages.langugaes`. It is still accepted on read and in bind paths.
pub const LEGACY_LANGUAGES_KEY: &str = "langugaes";

impl Root {
    pub const ALL: [Root; 9] = [
        Root::Basic,
        Root::Summary,
        Root::Experience,
        Root::Education,
        Root::Skills,
        Root::Languages,
        Root::Certifications,
        Root::Projects,
        Root::Customization,
    ];

    /// Roots holding a sequence of row records.
    pub const ARRAY_ROOTS: [Root; 4] = [
        Root::Experience,
        Root::Education,
        Root::Certifications,
        Root::Projects,
    ];

    /// Canonical key in sample data.
    pub fn key(&self) -> &'static str {
        match self {
            Root::Basic => "basic",
            Root::Summary => "summary",
            Root::Experience => "experience",
            Root::Education => "education",
            Root::Skills => "skills",
            Root::Languages => "languages",
            Root::Certifications => "certifications",
            Root::Projects => "projects",
            Root::Customization => "customization",
        }
    }

    /// Resolve a written root name, canonical or alias.
    pub fn from_name(name: &str) -> Option<Root> {
        if let Some(root) = Root::ALL.iter().find(|r| r.key() == name) {
            return Some(*root);
        }
        ROOT_ALIASES
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, root)| *root)
    }

    pub fn is_array_root(&self) -> bool {
        Root::ARRAY_ROOTS.contains(self)
    }

    /// Every written name that resolves to this root, canonical first.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.key()).chain(
            ROOT_ALIASES
                .iter()
                .filter(move |(_, root)| root == self)
                .map(|(alias, _)| *alias),
        )
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The array root a `repeat` element or flat row element may iterate, if the
/// written name is one.
pub fn repeat_root(name: &str) -> Option<Root> {
    Root::from_name(name).filter(Root::is_array_root)
}

/// The written repeat root of a flat bind such as `experience.company`.
/// Returns `None` for unrecognized roots and for bare roots without a field.
pub fn repeat_root_of_bind(bind: &str) -> Option<&str> {
    let (root, rest) = bind.split_once('.')?;
    if rest.is_empty() {
        return None;
    }
    repeat_root(root).map(|_| root)
}

// ─── Bind path catalog ──────────────────────────────────────────────

/// Grouping shown in the property panel's bind selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Basic,
    Summary,
    Experience,
    Education,
    Skills,
    Languages,
    Certifications,
    Projects,
    Customization,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Basic,
        Category::Summary,
        Category::Experience,
        Category::Education,
        Category::Skills,
        Category::Languages,
        Category::Certifications,
        Category::Projects,
        Category::Customization,
    ];
}

/// One selectable bind target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindPathEntry {
    pub path: &'static str,
    pub label: &'static str,
    pub category: Category,
    #[serde(skip_serializing_if = "is_false")]
    pub is_array: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

const fn entry(path: &'static str, label: &'static str, category: Category) -> BindPathEntry {
    BindPathEntry {
        path,
        label,
        category,
        is_array: false,
    }
}

const fn list(path: &'static str, label: &'static str, category: Category) -> BindPathEntry {
    BindPathEntry {
        path,
        label,
        category,
        is_array: true,
    }
}

static CATALOG: &[BindPathEntry] = &[
    entry("basic.firstName", "First Name", Category::Basic),
    entry("basic.lastName", "Last Name", Category::Basic),
    entry("basic.email", "Email", Category::Basic),
    entry("basic.phone", "Phone", Category::Basic),
    entry("basic.address", "Address", Category::Basic),
    entry("basic.city", "City", Category::Basic),
    entry("basic.state", "State", Category::Basic),
    entry("basic.country", "Country", Category::Basic),
    entry("basic.postalCode", "Postal Code", Category::Basic),
    entry("basic.jobTitle", "Job Title", Category::Basic),
    entry("basic.linkedIn", "LinkedIn", Category::Basic),
    entry("basic.github", "GitHub", Category::Basic),
    entry("basic.portfolio", "Portfolio", Category::Basic),
    entry("basic.profileImage", "Profile Image", Category::Basic),
    entry("summary", "Summary", Category::Summary),
    list("experience", "Experience List", Category::Experience),
    entry("experience.company", "Company (in list)", Category::Experience),
    entry("experience.position", "Position (in list)", Category::Experience),
    entry("experience.location", "Location (in list)", Category::Experience),
    entry("experience.startDate", "Start Date (in list)", Category::Experience),
    entry("experience.endDate", "End Date (in list)", Category::Experience),
    entry("experience.description", "Description (in list)", Category::Experience),
    list("education", "Education List", Category::Education),
    entry("education.schoolOrCollegeName", "School / College (in list)", Category::Education),
    entry("education.degreeOrStandard", "Degree / Standard (in list)", Category::Education),
    entry("education.fieldOfStudy", "Field of Study (in list)", Category::Education),
    entry("education.location", "Location (in list)", Category::Education),
    entry("education.startDate", "Start Date (in list)", Category::Education),
    entry("education.endDate", "End Date (in list)", Category::Education),
    entry("education.description", "Description (in list)", Category::Education),
    list("skills.technical", "Technical Skills", Category::Skills),
    list("skills.tools", "Tools Skills", Category::Skills),
    list("skills.softskills", "Soft Skills", Category::Skills),
    list("skills.otherskills", "Other Skills", Category::Skills),
    list("languages", "Languages List", Category::Languages),
    list("certifications", "Certifications List", Category::Certifications),
    entry("certifications.name", "Certification Name (in list)", Category::Certifications),
    entry("certifications.description", "Certification Description (in list)", Category::Certifications),
    entry("certifications.link", "Certification Link (in list)", Category::Certifications),
    list("projects", "Projects List", Category::Projects),
    entry("projects.title", "Project Title (in list)", Category::Projects),
    entry("projects.description", "Project Description (in list)", Category::Projects),
    entry("projects.link", "Project Link (in list)", Category::Projects),
    entry("customization.primaryColor", "Primary Color", Category::Customization),
    entry("customization.secondaryColor", "Secondary Color", Category::Customization),
    entry("customization.fontFamily", "Font Family", Category::Customization),
];

/// Every valid bind target, in display order.
pub fn catalog() -> &'static [BindPathEntry] {
    CATALOG
}

/// The catalog grouped by category, categories in display order. Empty
/// categories are omitted.
pub fn catalog_by_category() -> Vec<(Category, Vec<&'static BindPathEntry>)> {
    Category::ALL
        .iter()
        .filter_map(|category| {
            let entries: Vec<_> = CATALOG.iter().filter(|e| e.category == *category).collect();
            (!entries.is_empty()).then_some((*category, entries))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_normalize() {
        assert_eq!(Root::from_name("project"), Some(Root::Projects));
        assert_eq!(Root::from_name("certificate"), Some(Root::Certifications));
        assert_eq!(Root::from_name("certificates"), Some(Root::Certifications));
        assert_eq!(Root::from_name("certification"), Some(Root::Certifications));
        assert_eq!(Root::from_name("experience"), Some(Root::Experience));
        assert_eq!(Root::from_name("hobbies"), None);
    }

    #[test]
    fn test_repeat_roots() {
        assert_eq!(repeat_root("education"), Some(Root::Education));
        assert_eq!(repeat_root("certificate"), Some(Root::Certifications));
        assert_eq!(repeat_root("basic"), None);
        assert_eq!(repeat_root("skills"), None);
    }

    #[test]
    fn test_repeat_root_of_bind() {
        assert_eq!(repeat_root_of_bind("experience.company"), Some("experience"));
        assert_eq!(repeat_root_of_bind("project.0.title"), Some("project"));
        assert_eq!(repeat_root_of_bind("experience"), None);
        assert_eq!(repeat_root_of_bind("experience."), None);
        assert_eq!(repeat_root_of_bind("basic.email"), None);
    }

    #[test]
    fn test_names_include_aliases() {
        let names: Vec<_> = Root::Certifications.names().collect();
        assert_eq!(names[0], "certifications");
        assert!(names.contains(&"certificate"));
        assert_eq!(Root::Basic.names().count(), 1);
    }

    #[test]
    fn test_catalog_paths_use_known_roots() {
        for e in catalog() {
            let root = e.path.split('.').next().unwrap();
            assert!(Root::from_name(root).is_some(), "unknown root in {}", e.path);
        }
    }

    #[test]
    fn test_catalog_grouping_order() {
        let groups = catalog_by_category();
        assert_eq!(groups.len(), 9);
        assert_eq!(groups[0].0, Category::Basic);
        assert_eq!(groups[0].1.len(), 14);
        assert_eq!(groups[8].0, Category::Customization);
    }
}
