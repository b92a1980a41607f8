use super::*;
use serde_json::{Map, Value, json};

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn base() -> Value {
    json!({
        "ai_score": 3.0,
        "ai_progress": 75.0,
        "confidence_level": "High",
        "evidence_summary": "Municipal data shows broad coverage.",
    })
}

fn with(mut value: Value, key: &str, field: Value) -> Value {
    value[key] = field;
    value
}

fn without(mut value: Value, key: &str) -> Value {
    value.as_object_mut().unwrap().remove(key);
    value
}

#[test]
fn test_question_payload_validates() {
    let payload = json!({
        "ai_score": 2.5,
        "ai_progress": "62.5%",
        "confidence_level": "low",
        "evidence_summary": "Limited audit data.",
        "red_flags": ["no peripheral data", "stale census"],
        "geographic_equity_note": "CBD favoured",
        "data_sources_count": "3",
        "source_type": "Government",
        "source_name": "City Sanitation Department",
        "source_url": "https://city.example/report",
        "source_data_year": 2023,
        "source_trust_level": 7,
        "source_data_extract": "82% collection coverage",
    });

    let result = validate(Tier::Question, &object(payload)).unwrap();
    let TierResult::Question(q) = result else {
        panic!("expected question result");
    };
    assert_eq!(q.assessment.ai_score, 2.5);
    assert_eq!(q.assessment.ai_progress, 62.5);
    assert_eq!(q.assessment.confidence_level, ConfidenceLevel::Low);
    assert_eq!(q.red_flag, "no peripheral data; stale census");
    assert_eq!(q.data_sources_count, 3);
    assert_eq!(q.source.source_type, SourceType::Government);
    assert_eq!(q.source.data_year, Some(2023));
    assert_eq!(q.source.trust_level, 7);
}

#[test]
fn test_out_of_range_scores_fail() {
    for score in [-0.01, 4.01, 4.5, 100.0] {
        let payload = object(with(base(), "ai_score", json!(score)));
        let err = validate(Tier::City, &payload).unwrap_err();
        assert!(
            matches!(err, SchemaViolation::OutOfRange { ref field, .. } if field == "ai_score"),
            "score {score} gave {err:?}"
        );
    }

    for progress in [-1.0, 100.5, 250.0] {
        let payload = object(with(base(), "ai_progress", json!(progress)));
        let err = validate(Tier::Pillar, &payload).unwrap_err();
        assert_eq!(err.field(), "ai_progress");
    }
}

#[test]
fn test_range_boundaries_are_inclusive() {
    let payload = object(with(with(base(), "ai_score", json!(4)), "ai_progress", json!(0)));
    assert!(validate(Tier::City, &payload).is_ok());
    let payload = object(with(with(base(), "ai_score", json!(0)), "ai_progress", json!(100)));
    assert!(validate(Tier::City, &payload).is_ok());
}

#[test]
fn test_validation_is_deterministic() {
    let payload = object(with(base(), "ai_score", json!(4.5)));
    let first = validate(Tier::Question, &payload).unwrap_err();
    let second = validate(Tier::Question, &payload).unwrap_err();
    assert_eq!(first, second);
}

#[test]
fn test_missing_required_fields() {
    for field in ["ai_score", "ai_progress", "confidence_level", "evidence_summary"] {
        let payload = object(without(base(), field));
        let err = validate(Tier::Question, &payload).unwrap_err();
        assert_eq!(
            err,
            SchemaViolation::MissingField {
                field: field.to_string()
            }
        );
    }

    let payload = object(with(base(), "ai_score", Value::Null));
    assert!(matches!(
        validate(Tier::City, &payload),
        Err(SchemaViolation::MissingField { .. })
    ));
}

#[test]
fn test_non_numeric_score_is_invalid_type() {
    let payload = object(with(base(), "ai_score", json!("excellent")));
    let err = validate(Tier::City, &payload).unwrap_err();
    assert!(matches!(
        err,
        SchemaViolation::InvalidType { found: "string", .. }
    ));
}

#[test]
fn test_non_finite_numeric_string_sanitizes_to_zero() {
    let payload = object(with(base(), "ai_progress", json!("NaN")));
    let result = validate(Tier::City, &payload).unwrap();
    assert_eq!(result.assessment().ai_progress, 0.0);
    assert_eq!(sanitize(f64::INFINITY), 0.0);
    assert_eq!(sanitize(f64::NEG_INFINITY), 0.0);
    assert_eq!(sanitize(2.5), 2.5);
}

#[test]
fn test_confidence_coerced_to_medium() {
    for raw in [json!("Very High"), json!("unsure"), json!(""), json!(5), json!(["High"])] {
        let payload = object(with(base(), "confidence_level", raw.clone()));
        let result = validate(Tier::City, &payload).unwrap();
        assert_eq!(
            result.assessment().confidence_level,
            ConfidenceLevel::Medium,
            "input {raw}"
        );
    }

    let payload = object(with(base(), "confidence_level", json!("  HIGH ")));
    let result = validate(Tier::City, &payload).unwrap();
    assert_eq!(result.assessment().confidence_level, ConfidenceLevel::High);
}

#[test]
fn test_pillar_sources_placeholder_when_absent_or_empty() {
    let cases = [
        without(base(), "sources"),
        with(base(), "sources", json!([])),
        with(base(), "sources", json!("World Bank")),
        with(base(), "sources", json!([1, "two", null, {}])),
    ];

    for payload in cases {
        let TierResult::Pillar(p) = validate(Tier::Pillar, &object(payload)).unwrap() else {
            panic!("expected pillar result");
        };
        assert_eq!(p.sources.len(), 1);
        let placeholder = &p.sources[0];
        assert!(placeholder.is_placeholder());
        assert_eq!(placeholder.source_type, SourceType::Unknown);
        assert_eq!(placeholder.trust_level, 1);
        assert_eq!(placeholder.data_extract, INSUFFICIENT_DATA);
        assert_eq!(placeholder.source_url, NOT_AVAILABLE);
    }
}

#[test]
fn test_pillar_sources_parsed_and_malformed_entries_dropped() {
    let payload = with(
        base(),
        "sources",
        json!([
            {
                "source_type": "International",
                "source_name": "World Bank",
                "source_url": "",
                "data_year": "2023",
                "trust_level": 5,
                "data_extract": "Access rate 71%"
            },
            "not an object",
            {
                "source_type": "NGO",
                "source_name": "Transparency International",
                "data_extract": "CPI 41"
            }
        ]),
    );

    let TierResult::Pillar(p) = validate(Tier::Pillar, &object(payload)).unwrap() else {
        panic!("expected pillar result");
    };
    assert_eq!(p.sources.len(), 2);
    assert_eq!(p.sources[0].source_url, NOT_AVAILABLE);
    assert_eq!(p.sources[0].data_year, Some(2023));
    assert_eq!(p.sources[1].source_type, SourceType::Ngo);
    // Inferred from the source name.
    assert_eq!(p.sources[1].trust_level, 3);
}

#[test]
fn test_trust_level_out_of_range_names_source_path() {
    let payload = with(
        base(),
        "sources",
        json!([
            {"source_name": "Ministry of Health", "trust_level": 7, "data_extract": "x"},
            {"source_name": "Blog", "trust_level": 9, "data_extract": "y"}
        ]),
    );
    let err = validate(Tier::Pillar, &object(payload)).unwrap_err();
    assert_eq!(err.field(), "sources[1].trust_level");

    let payload = with(
        with(base(), "source_name", json!("Daily News")),
        "source_trust_level",
        json!(0),
    );
    let err = validate(Tier::Question, &object(payload)).unwrap_err();
    assert_eq!(err.field(), "source_trust_level");
}

#[test]
fn test_question_without_source_uses_placeholder() {
    let TierResult::Question(q) = validate(Tier::Question, &object(base())).unwrap() else {
        panic!("expected question result");
    };
    assert!(q.source.is_placeholder());
    assert_eq!(q.data_sources_count, 0);
}

#[test]
fn test_city_accepts_aliases() {
    let payload = with(
        with(base(), "strategic_recommendations", json!(["expand transit", "audit land"])),
        "cross_pillar_patterns",
        json!("Weak enforcement across pillars"),
    );
    let TierResult::City(c) = validate(Tier::City, &object(payload)).unwrap() else {
        panic!("expected city result");
    };
    assert_eq!(c.strategic_recommendation, "expand transit; audit land");
    assert_eq!(c.cross_pillar_patterns, "Weak enforcement across pillars");
    assert_eq!(c.data_transparency_note, "");
}

#[test]
fn test_classify_source() {
    assert_eq!(classify_source(SourceType::Unknown, "Nairobi City County Government"), 7);
    assert_eq!(classify_source(SourceType::Unknown, "Office of the Ombudsman"), 6);
    assert_eq!(classify_source(SourceType::Unknown, "UN-Habitat Urban Indicators"), 5);
    assert_eq!(classify_source(SourceType::Academic, "Journal of Urban Affairs"), 4);
    assert_eq!(classify_source(SourceType::Ngo, "Local residents' network"), 3);
    assert_eq!(classify_source(SourceType::Unknown, "National Telecom Company"), 2);
    assert_eq!(classify_source(SourceType::Media, "Daily Nation"), 1);
    assert_eq!(classify_source(SourceType::Unknown, "Congo Herald"), 1);
}

#[test]
fn test_tier_result_serializes_flat_with_tag() {
    let result = validate(Tier::City, &object(base())).unwrap();
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["tier"], "city");
    assert_eq!(value["ai_score"], 3.0);
    assert_eq!(value["confidence_level"], "High");
}
