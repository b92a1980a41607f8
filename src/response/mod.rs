//! Recovery of JSON objects from free-text reasoning engine output.
//!
//! [`extract`] locates the object inside fenced or chatty output and [`repair`]
//! fixes the string-escaping defects engines commonly produce. [`parse_object`]
//! chains the two the way the retry loop consumes them.

pub mod error;
pub mod extract;
pub mod repair;

#[cfg(test)]
mod tests;

pub use error::{AttemptError, ExtractionError};
pub use extract::extract;
pub use repair::repair;

use serde_json::{Map, Value};
use tracing::debug;

/// Extracts, parses and (only if needed) repairs an engine response into a JSON object.
pub fn parse_object(raw: &str) -> Result<Map<String, Value>, AttemptError> {
    let candidate = extract(raw)?;

    let value = match serde_json::from_str::<Value>(candidate) {
        Ok(value) => value,
        Err(first) => {
            debug!(error = %first, "strict parse failed, repairing");
            let repaired = repair(candidate);
            serde_json::from_str::<Value>(&repaired).map_err(AttemptError::Decode)?
        }
    };

    match value {
        Value::Object(map) => Ok(map),
        other => Err(AttemptError::NotAnObject {
            kind: json_kind(&other),
        }),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
