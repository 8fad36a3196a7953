//! # Vitae CLI
//!
//! Usage:
//!   vitae save layout.json [--sample existing.json] [-o record.json]
//!   vitae load record.json [-o layout.json]
//!   vitae layout layout.json [--data resume.json]
//!   vitae paths
//!   vitae --example > layout.json
//!
//! `--config engine.json` overrides engine constants for any command. A
//! missing input file or `-` reads stdin. Logs go to stderr; set `RUST_LOG`
//! (e.g. `RUST_LOG=vitae=debug`) to see engine decisions.

use std::env;
use std::fs;
use std::io::{self, Read};

use serde_json::Value;
use tracing_subscriber::EnvFilter;
use vitae::config::EngineConfig;
use vitae::ids::ClockIds;
use vitae::layout::LayoutEngine;
use vitae::model::{Layout, TemplateRecord};
use vitae::schema::catalog_by_category;
use vitae::VitaeError;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(e) = run(&args) {
        eprintln!("✗ {}", e);
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), VitaeError> {
    if args.iter().any(|a| a == "--example") {
        print!("{}", example_layout_json());
        return Ok(());
    }

    let config = match flag(args, "--config") {
        Some(path) => EngineConfig::from_json(&fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };

    let command = args
        .first()
        .ok_or_else(|| VitaeError::Usage("expected a command: save, load, layout or paths".into()))?;
    let input = positional(args);

    match command.as_str() {
        "save" => {
            let layout: Layout = serde_json::from_str(&read_input(input)?)?;
            let existing = flag(args, "--sample")
                .map(|path| -> Result<Value, VitaeError> {
                    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
                })
                .transpose()?;
            let saved = vitae::save_with(&layout, existing.as_ref(), &config);
            write_output(args, &serde_json::to_string_pretty(&saved)?)
        }
        "load" => {
            let record: TemplateRecord = serde_json::from_str(&read_input(input)?)?;
            let layout = vitae::load_with(&record, &mut ClockIds, &config)?;
            write_output(args, &serde_json::to_string_pretty(&layout)?)
        }
        "layout" => {
            let layout: Layout = serde_json::from_str(&read_input(input)?)?;
            let data: Value = match flag(args, "--data") {
                Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
                None => Value::Object(Default::default()),
            };
            let placed = LayoutEngine::with_config(config).layout(&layout, &data);
            write_output(args, &serde_json::to_string_pretty(&placed)?)
        }
        "paths" => {
            let mut grouped = serde_json::Map::new();
            for (category, entries) in catalog_by_category() {
                grouped.insert(format!("{:?}", category), serde_json::to_value(entries)?);
            }
            write_output(args, &serde_json::to_string_pretty(&grouped)?)
        }
        other => Err(VitaeError::Usage(format!("unknown command `{}`", other))),
    }
}

/// Value following `name`, e.g. `-o out.json`.
fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

/// The first argument after the command that isn't a flag or a flag's value.
fn positional(args: &[String]) -> Option<&str> {
    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        if arg == "-" {
            return None;
        }
        if arg.starts_with('-') {
            rest.next();
            continue;
        }
        return Some(arg);
    }
    None
}

fn read_input(path: Option<&str>) -> Result<String, VitaeError> {
    match path {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn write_output(args: &[String], json: &str) -> Result<(), VitaeError> {
    match flag(args, "-o") {
        Some(path) => {
            fs::write(path, json)?;
            eprintln!("✓ Written {} bytes to {}", json.len(), path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn example_layout_json() -> &'static str {
    r##"{
  "page": { "width": 595, "height": 842, "backgroundColor": "#ffffff" },
  "elements": [
    {
      "id": "name",
      "type": "heading",
      "x": 40, "y": 40, "width": 400, "height": 31,
      "bind": "basic.firstName",
      "text": "Ada",
      "style": { "fontSize": 24, "fontWeight": "bold", "color": "#2c3e50", "zIndex": 1 }
    },
    {
      "id": "title",
      "type": "subheading",
      "x": 40, "y": 76, "width": 400, "height": 24,
      "bind": "basic.jobTitle",
      "text": "Systems Engineer",
      "style": { "fontSize": 18, "color": "#34495e", "zIndex": 1 }
    },
    {
      "id": "summary",
      "type": "paragraph",
      "x": 40, "y": 110, "width": 515, "height": 40,
      "autoHeight": true,
      "bind": "summary",
      "text": "Builds reliable infrastructure and the tools around it.",
      "style": { "fontSize": 12, "lineHeight": 1.4, "zIndex": 1 }
    },
    {
      "id": "exp-company-0",
      "type": "text",
      "x": 40, "y": 180, "width": 250, "height": 20,
      "bind": "experience.company",
      "text": "Acme Corp",
      "style": { "fontSize": 14, "fontWeight": "bold", "zIndex": 1 }
    },
    {
      "id": "exp-position-0",
      "type": "text",
      "x": 300, "y": 180, "width": 255, "height": 20,
      "bind": "experience.position",
      "text": "Senior Engineer",
      "style": { "fontSize": 14, "zIndex": 1 }
    },
    {
      "id": "exp-company-1",
      "type": "text",
      "x": 40, "y": 260, "width": 250, "height": 20,
      "bind": "experience.company",
      "text": "Globex",
      "style": { "fontSize": 14, "fontWeight": "bold", "zIndex": 1 }
    },
    {
      "id": "exp-position-1",
      "type": "text",
      "x": 300, "y": 260, "width": 255, "height": 20,
      "bind": "experience.position",
      "text": "Engineer",
      "style": { "fontSize": 14, "zIndex": 1 }
    },
    {
      "id": "skills",
      "type": "bullet-list",
      "x": 40, "y": 340, "width": 515, "height": 60,
      "bind": "skills.technical",
      "text": "• Rust\n• PostgreSQL\n• Kubernetes",
      "style": { "fontSize": 12, "zIndex": 1 }
    }
  ]
}
"##
}
