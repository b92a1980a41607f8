use super::*;
use serde_json::{Value, json};

fn question_payload() -> Value {
    json!({
        "ai_score": 2.75,
        "ai_progress": 68.75,
        "confidence_level": "High",
        "evidence_summary": "Collection covers 80% of households {per} the 2023 audit.",
        "red_flag": "",
    })
}

#[test]
fn test_extract_plain_object() {
    let raw = r#"{"a": 1}"#;
    assert_eq!(extract(raw).unwrap(), raw);
}

#[test]
fn test_extract_recovers_object_from_fences_and_prose() {
    let payload = question_payload();
    let body = serde_json::to_string_pretty(&payload).unwrap();

    let wrappings = [
        format!("```json\n{body}\n```"),
        format!("```\n{body}\n```"),
        format!("```JSON {body}```"),
        format!("Here is my assessment:\n{body}\nLet me know if you need more."),
        format!("  ```json\n{body}\n```\nNote: figures are estimates.  "),
        format!("```json\n{body}"),
    ];

    for raw in wrappings {
        let extracted = extract(&raw).unwrap();
        let parsed: Value = serde_json::from_str(extracted).unwrap();
        assert_eq!(parsed, payload, "failed for {raw:?}");
    }
}

#[test]
fn test_extract_ignores_text_after_closing_fence() {
    let raw = "```json\n{\"a\": 1}\n```\nsee {appendix}";
    assert_eq!(extract(raw).unwrap(), "{\"a\": 1}");
}

#[test]
fn test_extract_errors() {
    assert_eq!(extract("   \n").unwrap_err(), ExtractionError::Empty);
    assert!(matches!(
        extract("I could not find any data."),
        Err(ExtractionError::NoObject { .. })
    ));
    assert!(matches!(
        extract("} backwards {"),
        Err(ExtractionError::NoObject { .. })
    ));
}

#[test]
fn test_repair_escapes_raw_control_whitespace_in_strings() {
    let original = "line one\nline two\twith tab\r\nend";
    let broken = format!("{{\"evidence_summary\": \"{original}\"}}");
    assert!(serde_json::from_str::<Value>(&broken).is_err());

    let repaired = repair(&broken);
    let parsed: Value = serde_json::from_str(&repaired).unwrap();
    assert_eq!(parsed["evidence_summary"], original);
}

#[test]
fn test_repair_keeps_whitespace_between_tokens() {
    let text = "{\n\t\"a\": 1,\r\n\t\"b\": \"x\"\n}";
    assert_eq!(repair(text), text);
}

#[test]
fn test_repair_passes_valid_escapes_through() {
    let text = r#"{"s": "quote \" slash \/ back \\ nl \n uni \u00e9 tab \t"}"#;
    assert_eq!(repair(text), text);
    let parsed: Value = serde_json::from_str(&repair(text)).unwrap();
    assert_eq!(parsed["s"], "quote \" slash / back \\ nl \n uni \u{e9} tab \t");
}

#[test]
fn test_repair_doubles_stray_backslashes() {
    let text = r#"{"path": "C:\data\2024\stats", "re": "\d+"}"#;
    let parsed: Value = serde_json::from_str(&repair(text)).unwrap();
    assert_eq!(parsed["path"], r"C:\data\2024\stats");
    assert_eq!(parsed["re"], r"\d+");
}

#[test]
fn test_repair_incomplete_unicode_escape_is_literal() {
    let text = r#"{"s": "\u12"}"#;
    let parsed: Value = serde_json::from_str(&repair(text)).unwrap();
    assert_eq!(parsed["s"], r"\u12");
}

#[test]
fn test_repair_escaped_single_quote() {
    let text = r#"{"s": "the city\'s budget"}"#;
    let parsed: Value = serde_json::from_str(&repair(text)).unwrap();
    assert_eq!(parsed["s"], "the city's budget");
}

#[test]
fn test_repair_normalizes_typographic_punctuation() {
    let text = "{\"s\": \"2019\u{2013}2023 \u{2018}pilot\u{2019} phase\u{2026}\"}";
    let parsed: Value = serde_json::from_str(&repair(text)).unwrap();
    assert_eq!(parsed["s"], "2019-2023 'pilot' phase...");
}

#[test]
fn test_repair_typographic_quotes_inside_ascii_string_are_content() {
    let text = "{\"s\": \"the \u{201C}smart city\u{201D} label\"}";
    let parsed: Value = serde_json::from_str(&repair(text)).unwrap();
    assert_eq!(parsed["s"], "the \"smart city\" label");
}

#[test]
fn test_repair_typographic_quotes_as_delimiters() {
    let text = "{\u{201C}ai_score\u{201D}: 3, \u{201C}note\u{201D}: \u{201C}ok\u{201D}}";
    let parsed: Value = serde_json::from_str(&repair(text)).unwrap();
    assert_eq!(parsed["ai_score"], 3);
    assert_eq!(parsed["note"], "ok");
}

#[test]
fn test_repair_drops_control_chars_outside_strings_and_trailing_commas() {
    let text = "{\u{0007}\"a\": [1, 2,],\u{0000} \"b\": 2,\n}";
    let parsed: Value = serde_json::from_str(&repair(text)).unwrap();
    assert_eq!(parsed, json!({"a": [1, 2], "b": 2}));
}

#[test]
fn test_repair_trailing_backslash() {
    let repaired = repair("{\"s\": \"abc\\");
    assert!(repaired.ends_with("abc\\\\"));
}

#[test]
fn test_repair_is_identity_on_valid_json() {
    let text = serde_json::to_string(&question_payload()).unwrap();
    assert_eq!(repair(&text), text);
}

#[test]
fn test_parse_object_repairs_only_when_needed() {
    let raw = "```json\n{\"evidence_summary\": \"a\nb\", \"ai_score\": 3}\n```";
    let map = parse_object(raw).unwrap();
    assert_eq!(map["evidence_summary"], "a\nb");
    assert_eq!(map["ai_score"], 3);
}

#[test]
fn test_parse_object_failures() {
    assert!(matches!(
        parse_object("no json here"),
        Err(AttemptError::Extraction(_))
    ));
    assert!(matches!(
        parse_object("{ this is not: json }"),
        Err(AttemptError::Decode(_))
    ));
    assert_eq!(parse_object("{ broken").unwrap_err().kind(), "extraction");
}
