//! Lenient field access over engine-produced JSON objects.

use serde_json::{Map, Value};

use super::error::SchemaViolation;

/// First non-null value among `names`.
pub(crate) fn lookup<'a>(map: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| map.get(*name))
        .find(|v| !v.is_null())
}

/// Reads a JSON number or numeric string; a trailing `%` is tolerated.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Replaces NaN and infinities with 0.
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

pub(crate) fn required_number(
    map: &Map<String, Value>,
    names: &[&str],
) -> Result<f64, SchemaViolation> {
    let field = names[0];
    let value = lookup(map, names).ok_or_else(|| SchemaViolation::MissingField {
        field: field.to_string(),
    })?;
    as_number(value)
        .map(sanitize)
        .ok_or_else(|| SchemaViolation::InvalidType {
            field: field.to_string(),
            expected: "a number",
            found: kind(value),
        })
}

pub(crate) fn check_range(
    field: &str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<f64, SchemaViolation> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(SchemaViolation::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        })
    }
}

pub(crate) fn required_present<'a>(
    map: &'a Map<String, Value>,
    names: &[&str],
) -> Result<&'a Value, SchemaViolation> {
    lookup(map, names).ok_or_else(|| SchemaViolation::MissingField {
        field: names[0].to_string(),
    })
}

/// Text rendering of a loosely typed value. Arrays of strings are joined with `"; "`.
pub(crate) fn as_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .map(as_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

pub(crate) fn text(map: &Map<String, Value>, names: &[&str]) -> String {
    lookup(map, names).map(as_text).unwrap_or_default()
}

pub(crate) fn optional_int(map: &Map<String, Value>, names: &[&str]) -> Option<i64> {
    let value = lookup(map, names)?;
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    }
}

pub(crate) fn kind(value: &Value) -> &'static str {
    crate::response::json_kind(value)
}
