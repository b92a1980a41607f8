use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{City, PillarEvaluation, PillarEvaluationSource};
use crate::validation::{MAX_PROGRESS, MAX_SCORE, sanitize};

/// Human evaluator's prior verdict, shown to the engine as non-binding context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorBaseline {
    /// 0..=4
    pub score: Option<f64>,
    /// 0..=100
    pub progress: Option<f64>,
}

impl EvaluatorBaseline {
    pub fn none() -> Self {
        Self::default()
    }

    /// Baseline from a 0..=4 score; progress is derived from it.
    pub fn from_score(score: Option<f64>) -> Self {
        let score = score.map(sanitize);
        Self {
            score,
            progress: score.map(|s| s / MAX_SCORE * MAX_PROGRESS),
        }
    }

    /// Baseline from a question row: a 0..=1 normalized value and optional progress.
    pub fn from_normalized(normalized: Option<f64>, progress: Option<f64>) -> Self {
        let normalized = normalized.map(sanitize);
        Self {
            score: normalized.map(|n| n * MAX_SCORE),
            progress: progress
                .map(sanitize)
                .or(normalized.map(|n| n * MAX_PROGRESS)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.score.is_none() && self.progress.is_none()
    }
}

/// Distance between AI and evaluator progress.
///
/// Without a baseline the AI progress itself is returned, i.e. the distance from zero.
pub fn discrepancy(ai_progress: f64, evaluator_progress: Option<f64>) -> f64 {
    let ai_progress = sanitize(ai_progress);
    match evaluator_progress.map(sanitize) {
        Some(evaluator) => (ai_progress - evaluator).abs(),
        None => ai_progress,
    }
}

pub fn current_year() -> i32 {
    Utc::now().year()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionTask {
    pub city: City,
    pub pillar_id: i64,
    pub pillar_name: String,
    pub question_id: i64,
    pub question_text: String,
    #[serde(default)]
    pub baseline: EvaluatorBaseline,
    #[serde(default = "current_year")]
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarTask {
    pub city: City,
    pub pillar_id: i64,
    pub pillar_name: String,
    /// Question-level evidence for this pillar.
    #[serde(default)]
    pub question_context: String,
    #[serde(default)]
    pub baseline: EvaluatorBaseline,
    /// Last stored AI score for this pillar, 0..=4.
    #[serde(default)]
    pub prior_ai_score: Option<f64>,
    #[serde(default = "current_year")]
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityTask {
    pub city: City,
    /// Pillar-level findings to synthesise.
    #[serde(default)]
    pub pillar_context: String,
    #[serde(default)]
    pub baseline: EvaluatorBaseline,
    #[serde(default)]
    pub prior_ai_score: Option<f64>,
    #[serde(default = "current_year")]
    pub year: i32,
}

/// A pillar evaluation with the sources it cites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarRecord {
    pub evaluation: PillarEvaluation,
    pub sources: Vec<PillarEvaluationSource>,
}
