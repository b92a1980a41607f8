use tracing::{info, instrument};

use super::error::{ResearchError, ResearchResult};
use super::retry::RetryController;
use super::types::{
    CityTask, EvaluatorBaseline, PillarRecord, PillarTask, QuestionTask, discrepancy,
};
use crate::prompts::{self, CITY_TEMPLATE, PILLAR_TEMPLATE, QUESTION_TEMPLATE, TemplateVars};
use crate::store::{CityEvaluation, PillarEvaluation, PillarEvaluationSource, QuestionEvaluation};
use crate::validation::{Assessment, Tier, TierResult, sanitize};

const NO_PILLAR_GUIDANCE: &str = "No additional guidance for this pillar.";
const NO_QUESTION_CONTEXT: &str = "No question-level research is available.";
const NO_PILLAR_CONTEXT: &str = "No pillar-level findings are available.";

/// Question, pillar and city orchestrators over one [`RetryController`].
///
/// Each call builds the tier prompt, obtains a validated result and shapes it into
/// a persisted record with its discrepancy against the evaluator baseline.
#[derive(Clone)]
pub struct Researcher {
    retry: RetryController,
}

impl Researcher {
    pub fn new(retry: RetryController) -> Self {
        Self { retry }
    }

    pub fn retry(&self) -> &RetryController {
        &self.retry
    }

    #[instrument(
        skip_all,
        fields(
            city_id = task.city.city_id,
            pillar_id = task.pillar_id,
            question_id = task.question_id
        )
    )]
    pub async fn research_question(
        &self,
        task: &QuestionTask,
    ) -> ResearchResult<QuestionEvaluation> {
        let mut vars = city_vars(&task.city, task.year);
        vars.insert("pillar_name", task.pillar_name.clone());
        vars.insert("question_text", task.question_text.clone());
        vars.insert("pillar_context", pillar_guidance(task.pillar_id));
        vars.insert("evaluator_context", evaluator_context(&task.baseline, None));

        let prompt = QUESTION_TEMPLATE.render(&vars);
        let result = match self.retry.run_with_retries(&prompt, Tier::Question).await? {
            TierResult::Question(result) => result,
            other => return Err(mismatch(Tier::Question, &other)),
        };

        let Assessment {
            ai_score,
            ai_progress,
            confidence_level,
            evidence_summary,
        } = result.assessment;
        let source = result.source;

        info!(ai_score, ai_progress, "question scored");
        Ok(QuestionEvaluation {
            city_id: task.city.city_id,
            pillar_id: task.pillar_id,
            question_id: task.question_id,
            year: task.year,
            ai_score: sanitize(ai_score),
            ai_progress: sanitize(ai_progress),
            evaluator_score: task.baseline.score.map(sanitize),
            discrepancy: discrepancy(ai_progress, task.baseline.progress),
            confidence_level,
            data_sources_used: i64::from(result.data_sources_count),
            evidence_summary,
            red_flags: result.red_flag,
            geographic_equity_note: result.geographic_equity_note,
            source_type: source.source_type,
            source_name: source.source_name,
            source_url: source.source_url,
            source_data_year: source.data_year,
            source_data_extract: source.data_extract,
            source_trust_level: i64::from(source.trust_level),
        })
    }

    #[instrument(skip_all, fields(city_id = task.city.city_id, pillar_id = task.pillar_id))]
    pub async fn research_pillar(&self, task: &PillarTask) -> ResearchResult<PillarRecord> {
        let mut vars = city_vars(&task.city, task.year);
        vars.insert("pillar_name", task.pillar_name.clone());
        vars.insert("pillar_context", pillar_guidance(task.pillar_id));
        vars.insert(
            "question_context",
            non_empty_or(&task.question_context, NO_QUESTION_CONTEXT),
        );
        vars.insert(
            "evaluator_context",
            evaluator_context(&task.baseline, task.prior_ai_score),
        );

        let prompt = PILLAR_TEMPLATE.render(&vars);
        let result = match self.retry.run_with_retries(&prompt, Tier::Pillar).await? {
            TierResult::Pillar(result) => result,
            other => return Err(mismatch(Tier::Pillar, &other)),
        };

        let sources = result
            .sources
            .into_iter()
            .map(|source| PillarEvaluationSource {
                city_id: task.city.city_id,
                data_year: task.year,
                pillar_id: task.pillar_id,
                source_type: source.source_type,
                source_name: source.source_name,
                source_url: source.source_url,
                data_extract: source.data_extract,
                trust_level: i64::from(source.trust_level),
                source_data_year: source.data_year,
            })
            .collect::<Vec<_>>();

        let assessment = result.assessment;
        info!(
            ai_score = assessment.ai_score,
            sources = sources.len(),
            "pillar scored"
        );

        Ok(PillarRecord {
            evaluation: PillarEvaluation {
                city_id: task.city.city_id,
                pillar_id: task.pillar_id,
                year: task.year,
                ai_score: sanitize(assessment.ai_score),
                ai_progress: sanitize(assessment.ai_progress),
                evaluator_score: task.baseline.score.map(sanitize),
                discrepancy: discrepancy(assessment.ai_progress, task.baseline.progress),
                confidence_level: assessment.confidence_level,
                evidence_summary: assessment.evidence_summary,
                red_flags: result.red_flag,
                geographic_equity_note: result.geographic_equity_note,
                institutional_assessment: result.institutional_assessment,
                data_gap_analysis: result.data_gap_analysis,
            },
            sources,
        })
    }

    #[instrument(skip_all, fields(city_id = task.city.city_id))]
    pub async fn research_city(&self, task: &CityTask) -> ResearchResult<CityEvaluation> {
        let mut vars = city_vars(&task.city, task.year);
        vars.insert(
            "pillar_context",
            non_empty_or(&task.pillar_context, NO_PILLAR_CONTEXT),
        );
        vars.insert(
            "evaluator_context",
            evaluator_context(&task.baseline, task.prior_ai_score),
        );

        let prompt = CITY_TEMPLATE.render(&vars);
        let result = match self.retry.run_with_retries(&prompt, Tier::City).await? {
            TierResult::City(result) => result,
            other => return Err(mismatch(Tier::City, &other)),
        };

        let assessment = result.assessment;
        info!(ai_score = assessment.ai_score, "city scored");

        Ok(CityEvaluation {
            city_id: task.city.city_id,
            year: task.year,
            ai_score: sanitize(assessment.ai_score),
            ai_progress: sanitize(assessment.ai_progress),
            evaluator_score: task.baseline.score.map(sanitize),
            discrepancy: discrepancy(assessment.ai_progress, task.baseline.progress),
            confidence_level: assessment.confidence_level,
            evidence_summary: assessment.evidence_summary,
            cross_pillar_patterns: result.cross_pillar_patterns,
            institutional_capacity: result.institutional_capacity,
            equity_assessment: result.equity_assessment,
            sustainability_outlook: result.sustainability_outlook,
            strategic_recommendations: result.strategic_recommendation,
            data_transparency_note: result.data_transparency_note,
        })
    }
}

fn city_vars(city: &crate::store::City, year: i32) -> TemplateVars {
    let mut vars = prompts::base_vars();
    vars.insert("city_name", city.city_name.clone());
    vars.insert("city_address", city.address());
    vars.insert("year", year.to_string());
    vars
}

fn pillar_guidance(pillar_id: i64) -> String {
    prompts::pillar_brief(pillar_id)
        .map(|brief| brief.to_context())
        .unwrap_or_else(|| NO_PILLAR_GUIDANCE.to_string())
}

fn non_empty_or(text: &str, fallback: &str) -> String {
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text.to_string()
    }
}

/// Context block describing the human baseline and prior AI score.
pub(crate) fn evaluator_context(
    baseline: &EvaluatorBaseline,
    prior_ai_score: Option<f64>,
) -> String {
    let mut lines = Vec::new();

    match (baseline.score, baseline.progress) {
        (None, None) => lines.push("No human evaluator baseline is available.".to_string()),
        (score, progress) => {
            let mut parts = Vec::new();
            if let Some(score) = score {
                parts.push(format!("score {score:.2}/4.0"));
            }
            if let Some(progress) = progress {
                parts.push(format!("progress {progress:.1}%"));
            }
            lines.push(format!(
                "Human evaluator baseline: {}. Treat it as context only and score independently from the evidence.",
                parts.join(", ")
            ));
        }
    }

    if let Some(prior) = prior_ai_score {
        lines.push(format!("Previous AI score: {prior:.2}/4.0."));
    }

    lines.join("\n")
}

fn mismatch(expected: Tier, found: &TierResult) -> ResearchError {
    ResearchError::TierMismatch {
        expected,
        found: found.tier(),
    }
}
