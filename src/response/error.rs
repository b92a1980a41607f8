use thiserror::Error;

use crate::validation::SchemaViolation;

/// No JSON object could be located in the engine output.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("engine returned an empty response")]
    Empty,

    #[error("no JSON object found in response (starts with: {preview:?})")]
    NoObject { preview: String },
}

impl ExtractionError {
    pub(crate) fn no_object(text: &str) -> Self {
        Self::NoObject {
            preview: text.chars().take(80).collect(),
        }
    }
}

/// A single attempt's failure. Every variant is retryable.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("invalid JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("invalid JSON: top-level value is a {kind}, expected an object")]
    NotAnObject { kind: &'static str },

    #[error("schema violation: {0}")]
    Schema(#[from] SchemaViolation),
}

impl AttemptError {
    /// Short label used in logs and operational log entries.
    pub fn kind(&self) -> &'static str {
        match self {
            AttemptError::Extraction(_) => "extraction",
            AttemptError::Decode(_) | AttemptError::NotAnObject { .. } => "decode",
            AttemptError::Schema(_) => "schema",
        }
    }
}
