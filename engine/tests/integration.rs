//! Integration tests for the Vitae template pipeline.
//!
//! These tests exercise the path from stored JSON to an editable layout and
//! back. They verify:
//! - Repeat collapse and expand agree with each other
//! - Sample data inference produces the canonical shape and sensible rows
//! - Flow layout collapses empty elements
//! - Load and save round-trip through JSON
//! - Editor sessions produce records that load again

use std::collections::HashSet;

use serde_json::{json, Value};
use vitae::editor::{palette_defaults, EditorSession, ElementPatch};
use vitae::ids::SequentialIds;
use vitae::layout::layout;
use vitae::model::*;
use vitae::repeat::{collapse, expand};
use vitae::sample::builder::build_sample_data;
use vitae::sample::filter::filter_by_bound_fields;
use vitae::style::ElementStyle;
use vitae::text::estimate_height;
use vitae::VitaeError;

// ─── Helpers ────────────────────────────────────────────────────

fn make_text(id: &str, bind: &str, text: &str, x: f64, y: f64) -> Element {
    Element::new(ElementType::Text, id)
        .with_bind(bind)
        .with_text(text)
        .at(x, y)
        .sized(200.0, 20.0)
}

fn make_flow(id: &str, kind: ElementType, bind: &str, text: &str) -> Element {
    let mut el = Element::new(kind, id)
        .with_bind(bind)
        .with_text(text)
        .sized(300.0, 30.0);
    el.position_type = PositionType::Flow;
    el
}

fn make_repeat(bind: &str, gap: f64, children: Vec<Element>) -> Element {
    let mut repeat = Element::new(ElementType::Repeat, format!("repeat-{}", bind))
        .with_bind(bind)
        .at(40.0, 200.0);
    repeat.gap = Some(gap);
    repeat.elements = children;
    repeat
}

fn make_layout(elements: Vec<Element>) -> Layout {
    Layout {
        elements,
        ..Default::default()
    }
}

fn binds(elements: &[Element]) -> Vec<&str> {
    elements.iter().map(Element::bind_path).collect()
}

// ─── Repeat groups ──────────────────────────────────────────────

#[test]
fn test_collapse_scenario() {
    let elements = vec![
        make_text("c0", "experience.0.company", "", 40.0, 0.0),
        make_text("p0", "experience.0.position", "", 300.0, 0.0),
        make_text("c1", "experience.1.company", "", 40.0, 140.0),
        make_text("p1", "experience.1.position", "", 300.0, 140.0),
    ];
    let out = collapse(elements, 140.0);

    assert_eq!(out.len(), 1);
    let repeat = &out[0];
    assert_eq!(repeat.kind, ElementType::Repeat);
    assert_eq!(repeat.bind_path(), "experience");
    assert_eq!(repeat.gap, Some(140.0));
    assert_eq!(binds(&repeat.elements), vec!["company", "position"]);
    assert!(repeat.elements.iter().all(|c| c.y == 0.0));
}

#[test]
fn test_expand_scenario() {
    let repeat = make_repeat(
        "experience",
        140.0,
        vec![
            make_text("pos", "position", "", 0.0, 0.0),
            make_text("co", "company", "", 0.0, 24.0),
        ],
    );
    let data = json!({"experience": [
        {"position": "Engineer", "company": "Acme"},
        {"position": "Lead", "company": "Globex"}
    ]});
    let out = expand(&make_layout(vec![repeat]), &data, &mut SequentialIds::new(), 140.0);

    assert_eq!(out.elements.len(), 4);
    assert_eq!(
        binds(&out.elements),
        vec!["experience.position", "experience.company", "experience.position", "experience.company"]
    );
    assert_eq!(out.elements[2].y - out.elements[0].y, 140.0);
    assert_eq!(out.elements[3].y - out.elements[1].y, 140.0);
    assert_eq!(out.elements[0].text.as_deref(), Some("Engineer"));
    assert_eq!(out.elements[3].text.as_deref(), Some("Globex"));
}

#[test]
fn test_expand_then_collapse_is_stable() {
    let original = make_layout(vec![make_repeat(
        "education",
        90.0,
        vec![
            make_text("school", "schoolOrCollegeName", "", 0.0, 0.0),
            make_text("degree", "degreeOrStandard", "", 0.0, 22.0),
        ],
    )]);
    let data = json!({"education": [{}, {}, {}]});

    let first = expand(&original, &data, &mut SequentialIds::new(), 140.0);
    let recollapsed = make_layout(collapse(first.elements.clone(), 140.0));
    let second = expand(&recollapsed, &data, &mut SequentialIds::new(), 140.0);

    let placement = |layout: &Layout| -> Vec<(String, f64, f64)> {
        layout
            .elements
            .iter()
            .map(|e| (e.bind_path().to_string(), e.x, e.y))
            .collect()
    };
    assert_eq!(placement(&first), placement(&second));
    assert_eq!(recollapsed.elements[0].gap, Some(90.0));
}

// ─── Text and flow layout ───────────────────────────────────────

#[test]
fn test_estimator_is_monotonic_and_deterministic() {
    let style = ElementStyle {
        font_size: Some(12.0),
        ..Default::default()
    };
    let mut text = String::from("Led a team");
    let mut last = estimate_height(&text, &style, 180.0);
    for _ in 0..20 {
        text.push_str(" and more text");
        let next = estimate_height(&text, &style, 180.0);
        assert!(next >= last);
        assert_eq!(next, estimate_height(&text, &style, 180.0));
        last = next;
    }
}

#[test]
fn test_flow_collapse_does_not_advance_cursor() {
    let data = json!({"basic": {"firstName": "Ada"}, "summary": ""});
    let elements = vec![
        make_flow("name", ElementType::Heading, "basic.firstName", ""),
        make_flow("summary", ElementType::Paragraph, "summary", ""),
        make_flow("section", ElementType::Section, "", ""),
        make_flow("footer", ElementType::Text, "", "Footer"),
    ];
    let placed = layout(&make_layout(elements), &data);

    assert_eq!(placed[0].y, 0.0);
    assert!(placed[1].collapsed);
    assert_eq!(placed[1].height, 0.0);
    assert_eq!(placed[1].y, 30.0);
    assert!(!placed[2].collapsed);
    assert_eq!(placed[2].y, 30.0);
    assert_eq!(placed[3].y, 60.0);
}

// ─── Sample data ────────────────────────────────────────────────

#[test]
fn test_sample_data_has_every_root() {
    let inference = build_sample_data(&Layout::default(), None);
    let value = inference.sample_data.to_value();
    for root in [
        "basic",
        "summary",
        "experience",
        "education",
        "skills",
        "languages",
        "certifications",
        "projects",
        "customization",
    ] {
        assert!(value.get(root).is_some(), "missing root {}", root);
    }
    assert_eq!(value["experience"].as_array().map(Vec::len), Some(1));
    assert_eq!(value["languages"], json!([]));
    assert_eq!(value["skills"]["technical"], json!([]));
    assert_eq!(value["customization"]["fontFamily"], "Roboto");
    assert!(inference.bound_paths.is_empty());
}

#[test]
fn test_auto_index_advances_on_new_value() {
    let layout = make_layout(vec![
        make_text("a", "experience.company", "Acme", 0.0, 0.0),
        make_text("b", "experience.company", "Globex", 0.0, 100.0),
    ]);
    let sample = build_sample_data(&layout, None).sample_data;
    assert_eq!(sample.experience.len(), 2);
    assert_eq!(sample.experience[0].company.as_deref(), Some("Acme"));
    assert_eq!(sample.experience[1].company.as_deref(), Some("Globex"));
}

#[test]
fn test_duplicate_auto_index_write_is_suppressed() {
    let layout = make_layout(vec![
        make_text("a", "experience.company", "Acme", 0.0, 0.0),
        make_text("b", "experience.company", "Acme", 0.0, 100.0),
    ]);
    let sample = build_sample_data(&layout, None).sample_data;
    assert_eq!(sample.experience.len(), 1);
    assert_eq!(sample.experience[0].company.as_deref(), Some("Acme"));
}

#[test]
fn test_inference_merges_over_legacy_sample() {
    let existing = json!({
        "basic": {"email": "ada@example.com"},
        "project": [{"title": "Old"}],
        "languages": {"langugaes": [{"name": "English", "level": "Native"}]},
        "skills": ["Rust"]
    });
    let layout = make_layout(vec![
        make_text("n", "basic.firstName", "Ada", 0.0, 0.0),
        make_text("s", "skills.tools", "- Git\n- Docker\n- Git", 0.0, 50.0),
    ]);
    let inference = build_sample_data(&layout, Some(&existing));
    let sample = inference.sample_data;

    assert_eq!(sample.basic.first_name.as_deref(), Some("Ada"));
    assert_eq!(sample.basic.email.as_deref(), Some("ada@example.com"));
    assert_eq!(sample.projects[0].title.as_deref(), Some("Old"));
    assert_eq!(sample.languages, vec!["English (Native)"]);
    assert_eq!(sample.skills.technical, vec!["Rust"]);
    assert_eq!(sample.skills.tools, vec!["Git", "Docker"]);
    assert_eq!(existing["skills"], json!(["Rust"]));

    let filtered = filter_by_bound_fields(&sample, &inference.bound_paths);
    assert_eq!(filtered["basic"], json!({"firstName": "Ada"}));
    assert_eq!(filtered["skills"], json!({"tools": ["Git", "Docker"]}));
}

// ─── Load and save ──────────────────────────────────────────────

#[test]
fn test_save_collapses_and_normalizes() {
    let mut name = make_text("name", "basic.firstName", "Ada", 40.0, 40.0);
    name.z_index = Some(3);
    name.margin_top = Some(12.0);
    let layout = make_layout(vec![
        name,
        make_text("c0", "experience.company", "Acme", 40.0, 200.0),
        make_text("p0", "experience.position", "Engineer", 300.0, 200.0),
        make_text("c1", "experience.company", "Globex", 40.0, 280.0),
        make_text("p1", "experience.position", "Lead", 300.0, 280.0),
    ]);

    let saved = vitae::save(&layout, None);
    let elements = &saved.layout_json.elements;
    assert_eq!(elements.len(), 2);
    assert_eq!(elements[0].style.z_index, Some(3));
    assert_eq!(elements[0].margin_top, None);
    assert_eq!(elements[0].z_index, None);

    let repeat = &elements[1];
    assert_eq!(repeat.bind_path(), "experience");
    assert_eq!(repeat.gap, Some(80.0));
    assert_eq!(repeat.style.z_index, Some(1));
    assert_eq!(binds(&repeat.elements), vec!["company", "position"]);

    let rows = &saved.sample_data.experience;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].position.as_deref(), Some("Lead"));
}

#[test]
fn test_save_then_load_restores_rows() {
    let layout = make_layout(vec![
        make_text("c0", "experience.company", "Acme", 40.0, 200.0),
        make_text("c1", "experience.company", "Globex", 40.0, 300.0),
        make_text("c2", "experience.company", "Initech", 40.0, 400.0),
    ]);
    let saved = vitae::save(&layout, None);
    let record_json = serde_json::to_string(&saved).unwrap();

    let loaded = vitae::load_json(&record_json, &mut SequentialIds::new()).unwrap();
    let texts: Vec<_> = loaded.elements.iter().filter_map(|e| e.text.as_deref()).collect();
    assert_eq!(texts, vec!["Acme", "Globex", "Initech"]);
    let ys: Vec<_> = loaded.elements.iter().map(|e| e.y).collect();
    assert_eq!(ys, vec![200.0, 300.0, 400.0]);

    let ids: HashSet<_> = loaded.elements.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids.len(), 3);
}

#[test]
fn test_load_keeps_unknown_keys() {
    let record = json!({
        "layoutJSON": {
            "page": {"width": 612, "height": 792, "backgroundColor": "#fafafa"},
            "elements": [
                {"_id": "abc", "type": "divider", "x": 1, "y": 2, "thickness": 2,
                 "style": {"zIndex": 4, "borderStyle": "dashed"}}
            ]
        },
        "sampleData": {}
    });
    let loaded = vitae::load_json(&record.to_string(), &mut SequentialIds::new()).unwrap();
    assert_eq!(loaded.page.width, 612.0);

    let value: Value = serde_json::to_value(&loaded.elements[0]).unwrap();
    assert_eq!(value["id"], "abc");
    assert_eq!(value["type"], "divider");
    assert_eq!(value["thickness"], 2);
    assert_eq!(value["style"]["borderStyle"], "dashed");
}

#[test]
fn test_load_reads_legacy_project_rows() {
    let record = json!({
        "layoutJSON": {
            "page": {"width": 595, "height": 842},
            "elements": [
                {"id": "proj", "type": "repeat", "bind": "projects", "x": 40, "y": 100, "gap": 50,
                 "elements": [
                     {"id": "title", "type": "text", "bind": "title", "x": 0, "y": 0, "text": "Sample"}
                 ]}
            ]
        },
        "sampleData": {"project": [{"title": "Alpha"}, {"title": "Beta"}]}
    });
    let loaded = vitae::load_json(&record.to_string(), &mut SequentialIds::new()).unwrap();
    let texts: Vec<_> = loaded.elements.iter().map(|e| e.text.as_deref()).collect();
    assert_eq!(texts, vec![Some("Alpha"), Some("Beta")]);
    assert_eq!(loaded.elements[1].y, 150.0);
}

#[test]
fn test_load_accepts_loose_ids_and_stacking() {
    let record = json!({
        "layoutJSON": {
            "page": {"width": 595, "height": 842},
            "elements": [
                {"id": 17, "type": "text", "x": 0, "y": 0, "style": {"zIndex": 1.5}},
                {"id": null, "type": "divider", "x": 0, "y": 40, "zIndex": 2.2}
            ]
        },
        "sampleData": {}
    });
    let loaded = vitae::load_json(&record.to_string(), &mut SequentialIds::new()).unwrap();
    assert_eq!(loaded.elements[0].id, "17");
    assert_eq!(loaded.elements[0].style.z_index, Some(2));
    assert!(!loaded.elements[1].id.is_empty());
    assert_eq!(loaded.elements[1].z_index, Some(2));

    let value: Value = serde_json::to_value(&loaded.elements[0]).unwrap();
    assert_eq!(value["style"]["zIndex"], 2);
}

#[test]
fn test_load_errors() {
    let err = vitae::load_json(r#"{"sampleData": {}}"#, &mut SequentialIds::new()).unwrap_err();
    assert!(matches!(err, VitaeError::InvalidRecord(_)));

    let err = vitae::load_json("{ not json", &mut SequentialIds::new()).unwrap_err();
    assert!(matches!(err, VitaeError::ParseError { .. }));
    assert!(err.to_string().contains("Hint"));
}

#[test]
fn test_save_json_shape() {
    let layout = json!({
        "page": {"width": 595, "height": 842, "backgroundColor": "#ffffff"},
        "elements": [
            {"id": "s", "type": "paragraph", "bind": "summary", "text": "Hello", "positionType": "flow"}
        ]
    });
    let saved: Value = serde_json::from_str(&vitae::save_json(&layout.to_string()).unwrap()).unwrap();
    assert_eq!(saved["layoutJSON"]["elements"][0]["positionType"], "absolute");
    assert_eq!(saved["sampleData"]["summary"], "Hello");
    assert!(saved["sampleData"]["projects"].is_array());
}

// ─── Editor sessions ────────────────────────────────────────────

#[test]
fn test_editor_round_trip() {
    let mut session = EditorSession::new(Box::new(SequentialIds::new()));
    let heading = session.add_element(ElementType::Heading, palette_defaults(&ElementType::Heading));
    session.update_element(
        &heading,
        ElementPatch {
            bind: Some("basic.firstName".into()),
            text: Some("Ada".into()),
            ..Default::default()
        },
    );
    let company = session.add_element(ElementType::Text, palette_defaults(&ElementType::Text));
    session.update_element(
        &company,
        ElementPatch {
            bind: Some("projects.title".into()),
            text: Some("Vitae".into()),
            y: Some(200.0),
            ..Default::default()
        },
    );

    let saved = session.save(None);
    assert_eq!(saved.sample_data.basic.first_name.as_deref(), Some("Ada"));
    assert_eq!(saved.sample_data.projects[0].title.as_deref(), Some("Vitae"));
    assert!(saved.layout_json.elements.iter().any(|e| e.is_repeat()));

    let record: TemplateRecord =
        serde_json::from_value(serde_json::to_value(&saved).unwrap()).unwrap();
    let mut reopened = EditorSession::new(Box::new(SequentialIds::new()));
    reopened.load(&record).unwrap();
    assert_eq!(reopened.layout().elements.len(), 2);
    assert_eq!(reopened.layout().elements[1].bind_path(), "projects.title");
    assert_eq!(reopened.layout().elements[1].text.as_deref(), Some("Vitae"));
}
