//! Persisted record shapes and the context rows read from the evaluation views.
//!
//! Column order in each [`Record::COLUMNS`] is the positional order used for
//! upserts and must not be reordered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{ConfidenceLevel, SourceType};

/// Reference data for one assessed city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub city_id: i64,
    pub city_name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
}

impl City {
    /// Geographic context line used in prompts.
    pub fn address(&self) -> String {
        format!("State: {}, Country: {}", self.state, self.country)
    }
}

/// Row of the question evaluation view: one question of one city with its human baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionContext {
    pub city_id: i64,
    pub pillar_id: i64,
    pub pillar_name: String,
    pub question_id: i64,
    pub question_text: String,
    /// Evaluator progress, 0..=100.
    pub score_progress: Option<f64>,
    /// Evaluator score normalized to 0..=1.
    pub normalized_value: Option<f64>,
}

/// Row of the pillar evaluation view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarContext {
    pub city_id: i64,
    pub pillar_id: i64,
    pub pillar_name: String,
    /// Pre-joined question texts with evaluator scores.
    pub questions_with_scores: Option<String>,
    /// Evaluator pillar score, 0..=4.
    pub evaluator_score: Option<f64>,
    /// Most recent stored AI pillar score, 0..=4.
    pub ai_score: Option<f64>,
}

/// Row of the city evaluation view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityContext {
    pub city_id: i64,
    pub evaluator_score: Option<f64>,
    pub ai_score: Option<f64>,
    /// Pre-joined pillar names with evaluator scores.
    pub pillars_with_scores: Option<String>,
}

/// Which cities to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CityFilter {
    pub city_id: Option<i64>,
}

impl CityFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn one(city_id: i64) -> Self {
        Self {
            city_id: Some(city_id),
        }
    }
}

/// Filter for the evaluation views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub city_id: i64,
    pub pillar_id: Option<i64>,
    pub question_id: Option<i64>,
    pub limit: Option<u32>,
}

impl ViewQuery {
    pub fn city(city_id: i64) -> Self {
        Self {
            city_id,
            ..Default::default()
        }
    }

    pub fn pillar(mut self, pillar_id: Option<i64>) -> Self {
        self.pillar_id = pillar_id;
        self
    }

    pub fn question(mut self, question_id: Option<i64>) -> Self {
        self.question_id = question_id;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A store-agnostic column value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(Option<i64>),
    Real(Option<f64>),
    Text(String),
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(Some(v))
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(Some(i64::from(v)))
    }
}

impl From<Option<i32>> for SqlValue {
    fn from(v: Option<i32>) -> Self {
        SqlValue::Int(v.map(i64::from))
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Real(Some(v))
    }
}

impl From<Option<f64>> for SqlValue {
    fn from(v: Option<f64>) -> Self {
        SqlValue::Real(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<&String> for SqlValue {
    fn from(v: &String) -> Self {
        SqlValue::Text(v.clone())
    }
}

/// Identity of a persisted evaluation: `(city, pillar?, question?, year)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NaturalKey {
    pub city_id: i64,
    pub pillar_id: Option<i64>,
    pub question_id: Option<i64>,
    pub year: i32,
}

/// A row the store can upsert positionally.
pub trait Record {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];
    /// Columns forming the conflict target.
    const KEY: &'static [&'static str];

    /// Values in [`Record::COLUMNS`] order.
    fn values(&self) -> Vec<SqlValue>;

    fn natural_key(&self) -> NaturalKey;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionEvaluation {
    pub city_id: i64,
    pub pillar_id: i64,
    pub question_id: i64,
    pub year: i32,
    pub ai_score: f64,
    pub ai_progress: f64,
    pub evaluator_score: Option<f64>,
    pub discrepancy: f64,
    pub confidence_level: ConfidenceLevel,
    pub data_sources_used: i64,
    pub evidence_summary: String,
    pub red_flags: String,
    pub geographic_equity_note: String,
    pub source_type: SourceType,
    pub source_name: String,
    pub source_url: String,
    pub source_data_year: Option<i32>,
    pub source_data_extract: String,
    pub source_trust_level: i64,
}

impl Record for QuestionEvaluation {
    const TABLE: &'static str = "question_evaluations";
    const COLUMNS: &'static [&'static str] = &[
        "city_id",
        "pillar_id",
        "question_id",
        "year",
        "ai_score",
        "ai_progress",
        "evaluator_score",
        "discrepancy",
        "confidence_level",
        "data_sources_used",
        "evidence_summary",
        "red_flags",
        "geographic_equity_note",
        "source_type",
        "source_name",
        "source_url",
        "source_data_year",
        "source_data_extract",
        "source_trust_level",
    ];
    const KEY: &'static [&'static str] = &["city_id", "pillar_id", "question_id", "year"];

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.city_id.into(),
            self.pillar_id.into(),
            self.question_id.into(),
            self.year.into(),
            self.ai_score.into(),
            self.ai_progress.into(),
            self.evaluator_score.into(),
            self.discrepancy.into(),
            self.confidence_level.as_str().into(),
            self.data_sources_used.into(),
            (&self.evidence_summary).into(),
            (&self.red_flags).into(),
            (&self.geographic_equity_note).into(),
            self.source_type.as_str().into(),
            (&self.source_name).into(),
            (&self.source_url).into(),
            self.source_data_year.into(),
            (&self.source_data_extract).into(),
            self.source_trust_level.into(),
        ]
    }

    fn natural_key(&self) -> NaturalKey {
        NaturalKey {
            city_id: self.city_id,
            pillar_id: Some(self.pillar_id),
            question_id: Some(self.question_id),
            year: self.year,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarEvaluation {
    pub city_id: i64,
    pub pillar_id: i64,
    pub year: i32,
    pub ai_score: f64,
    pub ai_progress: f64,
    pub evaluator_score: Option<f64>,
    pub discrepancy: f64,
    pub confidence_level: ConfidenceLevel,
    pub evidence_summary: String,
    pub red_flags: String,
    pub geographic_equity_note: String,
    pub institutional_assessment: String,
    pub data_gap_analysis: String,
}

impl Record for PillarEvaluation {
    const TABLE: &'static str = "pillar_evaluations";
    const COLUMNS: &'static [&'static str] = &[
        "city_id",
        "pillar_id",
        "year",
        "ai_score",
        "ai_progress",
        "evaluator_score",
        "discrepancy",
        "confidence_level",
        "evidence_summary",
        "red_flags",
        "geographic_equity_note",
        "institutional_assessment",
        "data_gap_analysis",
    ];
    const KEY: &'static [&'static str] = &["city_id", "pillar_id", "year"];

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.city_id.into(),
            self.pillar_id.into(),
            self.year.into(),
            self.ai_score.into(),
            self.ai_progress.into(),
            self.evaluator_score.into(),
            self.discrepancy.into(),
            self.confidence_level.as_str().into(),
            (&self.evidence_summary).into(),
            (&self.red_flags).into(),
            (&self.geographic_equity_note).into(),
            (&self.institutional_assessment).into(),
            (&self.data_gap_analysis).into(),
        ]
    }

    fn natural_key(&self) -> NaturalKey {
        NaturalKey {
            city_id: self.city_id,
            pillar_id: Some(self.pillar_id),
            question_id: None,
            year: self.year,
        }
    }
}

/// A citation attached to a pillar evaluation. Replaced wholesale with its pillar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarEvaluationSource {
    pub city_id: i64,
    /// Assessment year of the owning pillar evaluation.
    pub data_year: i32,
    pub pillar_id: i64,
    pub source_type: SourceType,
    pub source_name: String,
    pub source_url: String,
    pub data_extract: String,
    pub trust_level: i64,
    /// Year the cited data refers to, when the engine reported one.
    pub source_data_year: Option<i32>,
}

impl Record for PillarEvaluationSource {
    const TABLE: &'static str = "pillar_evaluation_sources";
    const COLUMNS: &'static [&'static str] = &[
        "city_id",
        "data_year",
        "pillar_id",
        "source_type",
        "source_name",
        "source_url",
        "data_extract",
        "trust_level",
        "source_data_year",
    ];
    const KEY: &'static [&'static str] = &["city_id", "pillar_id", "data_year"];

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.city_id.into(),
            self.data_year.into(),
            self.pillar_id.into(),
            self.source_type.as_str().into(),
            (&self.source_name).into(),
            (&self.source_url).into(),
            (&self.data_extract).into(),
            self.trust_level.into(),
            self.source_data_year.into(),
        ]
    }

    /// Key of the owning pillar evaluation.
    fn natural_key(&self) -> NaturalKey {
        NaturalKey {
            city_id: self.city_id,
            pillar_id: Some(self.pillar_id),
            question_id: None,
            year: self.data_year,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityEvaluation {
    pub city_id: i64,
    pub year: i32,
    pub ai_score: f64,
    pub ai_progress: f64,
    pub evaluator_score: Option<f64>,
    pub discrepancy: f64,
    pub confidence_level: ConfidenceLevel,
    pub evidence_summary: String,
    pub cross_pillar_patterns: String,
    pub institutional_capacity: String,
    pub equity_assessment: String,
    pub sustainability_outlook: String,
    pub strategic_recommendations: String,
    pub data_transparency_note: String,
}

impl Record for CityEvaluation {
    const TABLE: &'static str = "city_evaluations";
    const COLUMNS: &'static [&'static str] = &[
        "city_id",
        "year",
        "ai_score",
        "ai_progress",
        "evaluator_score",
        "discrepancy",
        "confidence_level",
        "evidence_summary",
        "cross_pillar_patterns",
        "institutional_capacity",
        "equity_assessment",
        "sustainability_outlook",
        "strategic_recommendations",
        "data_transparency_note",
    ];
    const KEY: &'static [&'static str] = &["city_id", "year"];

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.city_id.into(),
            self.year.into(),
            self.ai_score.into(),
            self.ai_progress.into(),
            self.evaluator_score.into(),
            self.discrepancy.into(),
            self.confidence_level.as_str().into(),
            (&self.evidence_summary).into(),
            (&self.cross_pillar_patterns).into(),
            (&self.institutional_capacity).into(),
            (&self.equity_assessment).into(),
            (&self.sustainability_outlook).into(),
            (&self.strategic_recommendations).into(),
            (&self.data_transparency_note).into(),
        ]
    }

    fn natural_key(&self) -> NaturalKey {
        NaturalKey {
            city_id: self.city_id,
            pillar_id: None,
            question_id: None,
            year: self.year,
        }
    }
}

/// One chunk of records written by a single store call.
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertBatch {
    Questions(Vec<QuestionEvaluation>),
    /// Pillar rows and their sources, written atomically.
    Pillars {
        rows: Vec<PillarEvaluation>,
        sources: Vec<PillarEvaluationSource>,
    },
    Cities(Vec<CityEvaluation>),
}

impl UpsertBatch {
    /// Number of evaluation rows (sources excluded).
    pub fn len(&self) -> usize {
        match self {
            UpsertBatch::Questions(rows) => rows.len(),
            UpsertBatch::Pillars { rows, .. } => rows.len(),
            UpsertBatch::Cities(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            UpsertBatch::Questions(_) => "questions",
            UpsertBatch::Pillars { .. } => "pillars",
            UpsertBatch::Cities(_) => "cities",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Stored level, prefixed to distinguish pipeline entries from other writers.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "AI_INFO",
            LogLevel::Warning => "AI_WARNING",
            LogLevel::Error => "AI_ERROR",
        }
    }
}

/// Operational log entry persisted alongside results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub exception: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LogEntry {
    pub fn error(message: impl Into<String>, exception: impl ToString) -> Self {
        Self {
            level: LogLevel::Error,
            message: message.into(),
            exception: Some(exception.to_string()),
            created_at: Utc::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: LogLevel::Info,
            message: message.into(),
            exception: None,
            created_at: Utc::now(),
        }
    }
}
