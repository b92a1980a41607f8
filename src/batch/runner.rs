use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, error, info, instrument, warn};

use super::buffer::{ChunkBuffer, IntoBatch};
use super::error::{BatchError, BatchResult};
use super::types::{BatchConfig, Entity, EntityId, RunReport, RunScope, TierSet};
use crate::research::{
    CityTask, EvaluatorBaseline, PillarRecord, PillarTask, QuestionTask, Researcher,
};
use crate::store::{
    City, CityEvaluation, CityFilter, EvaluationStore, LogEntry, QuestionEvaluation,
    UpsertBatch, ViewQuery,
};

/// Drives the question, pillar and city tiers over a [`RunScope`].
///
/// Entity failures are recorded and skipped. Only a failure to list cities aborts a run.
#[derive(Clone)]
pub struct BatchRunner {
    store: Arc<dyn EvaluationStore>,
    researcher: Researcher,
    config: BatchConfig,
}

impl BatchRunner {
    pub fn new(
        store: Arc<dyn EvaluationStore>,
        researcher: Researcher,
        config: BatchConfig,
    ) -> Self {
        Self {
            store,
            researcher,
            config,
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn EvaluationStore> {
        &self.store
    }

    pub fn researcher(&self) -> &Researcher {
        &self.researcher
    }

    pub async fn run(&self, scope: RunScope) -> BatchResult<RunReport> {
        self.run_tiers(scope, self.config.tiers).await
    }

    /// Runs `scope` with `tiers` in place of the configured tier set.
    #[instrument(skip(self), fields(year = self.config.year))]
    pub async fn run_tiers(&self, scope: RunScope, tiers: TierSet) -> BatchResult<RunReport> {
        let tiers = scope.allowed_tiers().intersect(tiers);
        let filter = CityFilter {
            city_id: scope.city_id(),
        };

        let cities = self
            .store
            .list_cities(filter)
            .await
            .map_err(BatchError::CityList)?;

        info!(%scope, cities = cities.len(), ?tiers, "batch run started");
        if cities.is_empty() {
            warn!(%scope, "no cities matched");
        }

        let mut report = RunReport::new(scope, self.config.year);
        let city_reports: Vec<RunReport> = stream::iter(cities)
            .map(|city| self.run_city(city, scope, tiers))
            .buffer_unordered(self.config.city_concurrency.max(1))
            .collect()
            .await;

        for city_report in city_reports {
            report.merge(city_report);
        }
        report.finish();

        info!(
            %scope,
            success = report.success(),
            questions = report.questions.succeeded,
            pillars = report.pillars.succeeded,
            cities = report.city_syntheses.succeeded,
            rows_written = report.rows_written,
            rows_dropped = report.rows_dropped,
            "batch run finished"
        );
        Ok(report)
    }

    #[instrument(skip_all, fields(city_id = city.city_id))]
    async fn run_city(&self, city: City, scope: RunScope, tiers: TierSet) -> RunReport {
        let mut run = CityRun {
            store: self.store.as_ref(),
            chunk_size: self.config.chunk_size,
            report: RunReport::new(scope, self.config.year),
            question_findings: BTreeMap::new(),
            pillar_findings: Vec::new(),
        };
        run.report.cities = 1;

        if tiers.question {
            self.question_tier(&mut run, &city, scope).await;
        }
        if tiers.pillar {
            self.pillar_tier(&mut run, &city, scope).await;
        }
        if tiers.city {
            self.city_tier(&mut run, &city).await;
        }

        run.report
    }

    async fn question_tier(&self, run: &mut CityRun<'_>, city: &City, scope: RunScope) {
        let query = ViewQuery::city(city.city_id)
            .pillar(scope.pillar_id())
            .question(scope.question_id());
        let Some(contexts) = run
            .read("question contexts", self.store.question_contexts(query))
            .await
        else {
            return;
        };

        let mut buffer = ChunkBuffer::<QuestionEvaluation>::new(run.chunk_size);
        for context in contexts {
            let task = QuestionTask {
                city: city.clone(),
                pillar_id: context.pillar_id,
                pillar_name: context.pillar_name,
                question_id: context.question_id,
                question_text: context.question_text,
                baseline: EvaluatorBaseline::from_normalized(
                    context.normalized_value,
                    context.score_progress,
                ),
                year: self.config.year,
            };
            let id = EntityId::Question {
                city_id: city.city_id,
                pillar_id: task.pillar_id,
                question_id: task.question_id,
            };

            let outcome = run
                .research(id, self.researcher.research_question(&task))
                .await;
            if let Some(record) = outcome {
                run.question_findings
                    .entry(task.pillar_id)
                    .or_default()
                    .push(question_finding(&task.question_text, &record));
                run.buffer(&mut buffer, record).await;
            }
        }
        run.flush_remaining(&mut buffer).await;
    }

    async fn pillar_tier(&self, run: &mut CityRun<'_>, city: &City, scope: RunScope) {
        let query = ViewQuery::city(city.city_id).pillar(scope.pillar_id());
        let Some(contexts) = run
            .read("pillar contexts", self.store.pillar_contexts(query))
            .await
        else {
            return;
        };

        let mut buffer = ChunkBuffer::<PillarRecord>::new(run.chunk_size);
        for context in contexts {
            let question_context = match run.question_findings.get(&context.pillar_id) {
                Some(findings) => findings.join("\n"),
                None => context.questions_with_scores.clone().unwrap_or_default(),
            };
            let task = PillarTask {
                city: city.clone(),
                pillar_id: context.pillar_id,
                pillar_name: context.pillar_name,
                question_context,
                baseline: EvaluatorBaseline::from_score(context.evaluator_score),
                prior_ai_score: context.ai_score,
                year: self.config.year,
            };
            let id = EntityId::Pillar {
                city_id: city.city_id,
                pillar_id: task.pillar_id,
            };

            let outcome = run.research(id, self.researcher.research_pillar(&task)).await;
            if let Some(record) = outcome {
                run.pillar_findings
                    .push(pillar_finding(&task.pillar_name, &record));
                run.buffer(&mut buffer, record).await;
            }
        }
        run.flush_remaining(&mut buffer).await;
    }

    async fn city_tier(&self, run: &mut CityRun<'_>, city: &City) {
        let Some(contexts) = run
            .read(
                "city context",
                self.store.city_contexts(ViewQuery::city(city.city_id)),
            )
            .await
        else {
            return;
        };
        let context = contexts.into_iter().next();

        let pillar_context = if run.pillar_findings.is_empty() {
            context
                .as_ref()
                .and_then(|c| c.pillars_with_scores.clone())
                .unwrap_or_default()
        } else {
            run.pillar_findings.join("\n")
        };
        let task = CityTask {
            city: city.clone(),
            pillar_context,
            baseline: EvaluatorBaseline::from_score(
                context.as_ref().and_then(|c| c.evaluator_score),
            ),
            prior_ai_score: context.as_ref().and_then(|c| c.ai_score),
            year: self.config.year,
        };
        let id = EntityId::City {
            city_id: city.city_id,
        };

        let mut buffer = ChunkBuffer::<CityEvaluation>::new(run.chunk_size);
        if let Some(record) = run.research(id, self.researcher.research_city(&task)).await {
            run.buffer(&mut buffer, record).await;
        }
        run.flush_remaining(&mut buffer).await;
    }
}

/// Per-city state: its chunk buffers' sink, its report and the fresh findings
/// handed up to the next tier.
struct CityRun<'a> {
    store: &'a dyn EvaluationStore,
    chunk_size: usize,
    report: RunReport,
    question_findings: BTreeMap<i64, Vec<String>>,
    pillar_findings: Vec<String>,
}

impl CityRun<'_> {
    async fn read<T, E, F>(&mut self, what: &str, read: F) -> Option<T>
    where
        E: std::fmt::Display,
        F: Future<Output = Result<T, E>>,
    {
        match read.await {
            Ok(rows) => Some(rows),
            Err(err) => {
                error!(error = %err, "failed to read {what}");
                self.log(LogEntry::error(format!("failed to read {what}"), &err))
                    .await;
                None
            }
        }
    }

    /// Runs one entity through `Pending -> Researching -> Succeeded | Failed`.
    async fn research<T, E, F>(&mut self, id: EntityId, research: F) -> Option<T>
    where
        E: std::fmt::Display,
        F: Future<Output = Result<T, E>>,
    {
        let mut entity = Entity::new(id);
        entity.start();
        debug!(entity = %id, "researching");

        let outcome = match research.await {
            Ok(record) => {
                entity.succeed();
                Some(record)
            }
            Err(err) => {
                warn!(entity = %id, error = %err, "entity failed");
                self.log(LogEntry::error(format!("{id} failed"), &err)).await;
                entity.fail(&err);
                None
            }
        };

        self.report.record(entity);
        outcome
    }

    async fn buffer<T: IntoBatch>(&mut self, buffer: &mut ChunkBuffer<T>, record: T) {
        if let Some(chunk) = buffer.push(record) {
            self.flush(chunk).await;
        }
    }

    async fn flush_remaining<T: IntoBatch>(&mut self, buffer: &mut ChunkBuffer<T>) {
        if let Some(chunk) = buffer.drain() {
            self.flush(chunk).await;
        }
    }

    /// Writes one chunk. A failed chunk is logged and dropped.
    async fn flush(&mut self, chunk: UpsertBatch) {
        let kind = chunk.kind();
        let rows = chunk.len() as u64;

        match self.store.bulk_upsert(chunk).await {
            Ok(written) => {
                debug!(kind, rows = written, "chunk flushed");
                self.report.rows_written += written;
            }
            Err(err) => {
                error!(kind, rows, error = %err, "chunk flush failed, rows dropped");
                self.report.rows_dropped += rows;
                self.report.flush_failures += 1;
                self.log(LogEntry::error(format!("failed to write {rows} {kind} rows"), &err))
                    .await;
            }
        }
    }

    /// Appends to the operational log; failures are only traced.
    async fn log(&self, entry: LogEntry) {
        if let Err(err) = self.store.append_log(entry).await {
            warn!(error = %err, "failed to append operational log");
        }
    }
}

fn question_finding(question_text: &str, record: &QuestionEvaluation) -> String {
    format!(
        "- {question_text}: AI score {:.2}/4.0, progress {:.1}% ({} confidence). {}",
        record.ai_score, record.ai_progress, record.confidence_level, record.evidence_summary
    )
}

fn pillar_finding(pillar_name: &str, record: &PillarRecord) -> String {
    let evaluation = &record.evaluation;
    format!(
        "- {pillar_name}: AI score {:.2}/4.0, progress {:.1}% ({} confidence). {}",
        evaluation.ai_score,
        evaluation.ai_progress,
        evaluation.confidence_level,
        evaluation.evidence_summary
    )
}
