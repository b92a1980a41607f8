use thiserror::Error;

/// A parsed payload does not satisfy its tier's schema.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaViolation {
    #[error("missing required field '{field}'")]
    MissingField { field: String },

    #[error("field '{field}' must be {expected}, got {found}")]
    InvalidType {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("field '{field}' = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl SchemaViolation {
    /// Name (or path) of the offending field.
    pub fn field(&self) -> &str {
        match self {
            SchemaViolation::MissingField { field }
            | SchemaViolation::InvalidType { field, .. }
            | SchemaViolation::OutOfRange { field, .. } => field,
        }
    }
}
