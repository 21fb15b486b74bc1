//! Structured error types for formpress.
//!
//! Building a document is pure and never fails: missing values become
//! placeholders and malformed fields degrade to empty tables. Errors only come
//! from parsing inputs, resolving templates, and the render backend.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FormpressError>;

/// The unified error type returned by all public formpress API functions.
#[derive(Debug, Error)]
pub enum FormpressError {
    /// JSON input failed to parse as a template, record or configuration.
    #[error("Failed to parse input: {source}{}", hint_suffix(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },

    /// No field definitions could be resolved for the requested template.
    #[error("No field definitions found for template '{0}'")]
    MissingTemplate(String),

    /// The render backend or its font bundle could not be initialized.
    #[error("Render backend initialization failed: {0}")]
    BackendInit(String),

    /// A font file could not be read or parsed.
    #[error("Font error: {0}")]
    Font(String),

    /// A logo or other embedded image could not be decoded.
    #[error("Image error: {0}")]
    Image(String),

    /// The backend failed while producing output.
    #[error("Render error: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for FormpressError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the expected shape. Check field names, `type` tags and value types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        FormpressError::Parse { source: e, hint }
    }
}
