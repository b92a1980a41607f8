//! Tier result types and the schema contracts engine payloads must satisfy.
//!
//! [`validate`] is a total function from a parsed JSON object to a [`TierResult`] or
//! a [`SchemaViolation`] naming the offending field. Scores and progress are
//! range-checked; confidence is coerced; missing pillar sources become a placeholder.

pub mod error;
mod fields;
pub mod trust;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::SchemaViolation;
pub use fields::sanitize;
pub use trust::classify_source;
pub use types::{
    Assessment, CityResult, ConfidenceLevel, INSUFFICIENT_DATA, MAX_PROGRESS, MAX_SCORE,
    MAX_TRUST_LEVEL, MIN_PROGRESS, MIN_SCORE, MIN_TRUST_LEVEL, NOT_AVAILABLE, PillarResult,
    QuestionResult, SourceCitation, SourceType, Tier, TierResult,
};

use serde_json::{Map, Value};

use fields::{
    as_number, check_range, lookup, optional_int, required_number, required_present, text,
};

/// Validates `payload` against the schema of `tier`.
pub fn validate(tier: Tier, payload: &Map<String, Value>) -> Result<TierResult, SchemaViolation> {
    let assessment = validate_assessment(payload)?;
    let result = match tier {
        Tier::Question => TierResult::Question(validate_question(payload, assessment)?),
        Tier::Pillar => TierResult::Pillar(validate_pillar(payload, assessment)?),
        Tier::City => TierResult::City(validate_city(payload, assessment)),
    };
    Ok(result)
}

fn validate_assessment(payload: &Map<String, Value>) -> Result<Assessment, SchemaViolation> {
    let ai_score = required_number(payload, &["ai_score"])?;
    let ai_score = check_range("ai_score", ai_score, MIN_SCORE, MAX_SCORE)?;

    let ai_progress = required_number(payload, &["ai_progress"])?;
    let ai_progress = check_range("ai_progress", ai_progress, MIN_PROGRESS, MAX_PROGRESS)?;

    let confidence = required_present(payload, &["confidence_level", "confidence"])?;
    let confidence_level = match confidence {
        Value::String(s) => ConfidenceLevel::coerce(s),
        _ => ConfidenceLevel::Medium,
    };

    let evidence = required_present(payload, &["evidence_summary"])?;
    let evidence_summary = fields::as_text(evidence);

    Ok(Assessment {
        ai_score,
        ai_progress,
        confidence_level,
        evidence_summary,
    })
}

fn validate_question(
    payload: &Map<String, Value>,
    assessment: Assessment,
) -> Result<QuestionResult, SchemaViolation> {
    let source = citation(payload, &INLINE_SOURCE, "source_trust_level")?
        .unwrap_or_else(SourceCitation::placeholder);

    let data_sources_count = optional_int(payload, &["data_sources_count", "data_sources_used"])
        .unwrap_or(0)
        .clamp(0, i64::from(u32::MAX)) as u32;

    Ok(QuestionResult {
        assessment,
        red_flag: text(payload, &["red_flag", "red_flags"]),
        geographic_equity_note: text(payload, &["geographic_equity_note"]),
        data_sources_count,
        source,
    })
}

fn validate_pillar(
    payload: &Map<String, Value>,
    assessment: Assessment,
) -> Result<PillarResult, SchemaViolation> {
    let mut sources = Vec::new();
    if let Some(Value::Array(entries)) = lookup(payload, &["sources"]) {
        for (index, entry) in entries.iter().enumerate() {
            let Value::Object(entry) = entry else {
                continue;
            };
            let path = format!("sources[{index}].trust_level");
            if let Some(source) = citation(entry, &LISTED_SOURCE, &path)? {
                sources.push(source);
            }
        }
    }
    if sources.is_empty() {
        sources.push(SourceCitation::placeholder());
    }

    Ok(PillarResult {
        assessment,
        sources,
        red_flag: text(payload, &["red_flag", "red_flags"]),
        geographic_equity_note: text(payload, &["geographic_equity_note"]),
        institutional_assessment: text(payload, &["institutional_assessment"]),
        data_gap_analysis: text(payload, &["data_gap_analysis"]),
    })
}

fn validate_city(payload: &Map<String, Value>, assessment: Assessment) -> CityResult {
    CityResult {
        assessment,
        cross_pillar_patterns: text(payload, &["cross_pillar_patterns"]),
        institutional_capacity: text(payload, &["institutional_capacity"]),
        equity_assessment: text(payload, &["equity_assessment"]),
        sustainability_outlook: text(payload, &["sustainability_outlook"]),
        strategic_recommendation: text(
            payload,
            &["strategic_recommendation", "strategic_recommendations"],
        ),
        data_transparency_note: text(payload, &["data_transparency_note"]),
    }
}

/// Field names for one citation shape.
struct CitationKeys {
    source_type: &'static [&'static str],
    name: &'static [&'static str],
    url: &'static [&'static str],
    year: &'static [&'static str],
    trust: &'static [&'static str],
    extract: &'static [&'static str],
}

/// Source fields inlined into a question payload.
const INLINE_SOURCE: CitationKeys = CitationKeys {
    source_type: &["source_type"],
    name: &["source_name"],
    url: &["source_url"],
    year: &["source_data_year", "data_year"],
    trust: &["source_trust_level", "trust_level"],
    extract: &["source_data_extract", "data_extract"],
};

/// Entries of a pillar's `sources` array.
const LISTED_SOURCE: CitationKeys = CitationKeys {
    source_type: &["source_type", "type"],
    name: &["source_name", "name"],
    url: &["source_url", "url"],
    year: &["data_year", "source_data_year", "year"],
    trust: &["trust_level", "source_trust_level"],
    extract: &["data_extract", "source_data_extract", "extract"],
};

/// Builds a citation, or `None` when the object names no source and quotes nothing.
fn citation(
    map: &Map<String, Value>,
    keys: &CitationKeys,
    trust_field: &str,
) -> Result<Option<SourceCitation>, SchemaViolation> {
    let source_name = text(map, keys.name);
    let data_extract = text(map, keys.extract);
    if source_name.is_empty() && data_extract.is_empty() {
        return Ok(None);
    }

    let source_type = SourceType::parse(&text(map, keys.source_type));

    let trust_level = match lookup(map, keys.trust).and_then(as_number) {
        Some(level) => {
            let level = check_range(
                trust_field,
                level,
                f64::from(MIN_TRUST_LEVEL),
                f64::from(MAX_TRUST_LEVEL),
            )?;
            level.round() as u8
        }
        None => classify_source(source_type, &source_name),
    };

    let source_url = Some(text(map, keys.url))
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let data_year = optional_int(map, keys.year)
        .and_then(|year| i32::try_from(year).ok())
        .filter(|year| *year > 0);

    Ok(Some(SourceCitation {
        source_type,
        source_name: if source_name.is_empty() {
            source_type.as_str().to_string()
        } else {
            source_name
        },
        source_url,
        data_year,
        trust_level,
        data_extract: if data_extract.is_empty() {
            INSUFFICIENT_DATA.to_string()
        } else {
            data_extract
        },
    }))
}
