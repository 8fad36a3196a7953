//! Structured error types for the Vitae engine.
//!
//! The binding and layout components never fail: malformed paths, missing
//! data and ambiguous row groupings degrade to empty or unchanged output.
//! Errors only come from the outer surfaces: decoding JSON, reading files,
//! and CLI arguments.

use thiserror::Error;

/// The unified error type returned by all fallible public Vitae functions.
#[derive(Debug, Error)]
pub enum VitaeError {
    /// JSON input failed to parse as a layout, record or sample-data object.
    #[error("Failed to parse input: {source}{}", hint_suffix(.hint))]
    ParseError {
        #[source]
        source: serde_json::Error,
        hint: String,
    },
    /// A persisted template record is missing its layout.
    #[error("Invalid template record: {0}")]
    InvalidRecord(String),
    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The command line could not be understood.
    #[error("Usage error: {0}")]
    Usage(String),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for VitaeError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the layout schema. Check element fields like `x`, `y`, `type` and `elements`.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        VitaeError::ParseError { source: e, hint }
    }
}
