use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::{StoreError, StoreResult};
use super::model::{
    City, CityContext, CityEvaluation, CityFilter, LogEntry, NaturalKey, PillarContext,
    PillarEvaluation, PillarEvaluationSource, QuestionContext, QuestionEvaluation, Record,
    UpsertBatch, ViewQuery,
};
use super::EvaluationStore;

#[derive(Default)]
struct Tables {
    cities: Vec<City>,
    question_contexts: Vec<QuestionContext>,
    pillar_contexts: Vec<PillarContext>,
    city_contexts: Vec<CityContext>,
    questions: BTreeMap<NaturalKey, QuestionEvaluation>,
    pillars: BTreeMap<NaturalKey, PillarEvaluation>,
    sources: BTreeMap<NaturalKey, Vec<PillarEvaluationSource>>,
    cities_written: BTreeMap<NaturalKey, CityEvaluation>,
    logs: Vec<LogEntry>,
}

#[derive(Default)]
struct Faults {
    ping: bool,
    list_cities: bool,
    contexts: bool,
    upserts_remaining: usize,
    upsert_kind: Option<&'static str>,
}

/// In-memory [`EvaluationStore`] keyed by natural key, with failure injection.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    faults: Mutex<Faults>,
    upsert_calls: AtomicUsize,
    context_reads: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cities(cities: impl IntoIterator<Item = City>) -> Self {
        let store = Self::new();
        store.tables.lock().cities.extend(cities);
        store
    }

    pub fn add_question_context(&self, row: QuestionContext) {
        self.tables.lock().question_contexts.push(row);
    }

    pub fn add_pillar_context(&self, row: PillarContext) {
        self.tables.lock().pillar_contexts.push(row);
    }

    pub fn add_city_context(&self, row: CityContext) {
        self.tables.lock().city_contexts.push(row);
    }

    /// Makes `ping` report the store as unreachable.
    pub fn fail_ping(&self) {
        self.faults.lock().ping = true;
    }

    /// Makes every `list_cities` call fail.
    pub fn fail_list_cities(&self) {
        self.faults.lock().list_cities = true;
    }

    /// Makes every context read fail.
    pub fn fail_contexts(&self) {
        self.faults.lock().contexts = true;
    }

    /// Fails the next `count` upserts, optionally only those of one batch kind.
    pub fn fail_next_upserts(&self, count: usize, kind: Option<&'static str>) {
        let mut faults = self.faults.lock();
        faults.upserts_remaining = count;
        faults.upsert_kind = kind;
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub fn context_reads(&self) -> usize {
        self.context_reads.load(Ordering::SeqCst)
    }

    pub fn questions(&self) -> Vec<QuestionEvaluation> {
        self.tables.lock().questions.values().cloned().collect()
    }

    pub fn pillars(&self) -> Vec<PillarEvaluation> {
        self.tables.lock().pillars.values().cloned().collect()
    }

    pub fn sources(&self) -> Vec<PillarEvaluationSource> {
        self.tables
            .lock()
            .sources
            .values()
            .flatten()
            .cloned()
            .collect()
    }

    pub fn city_evaluations(&self) -> Vec<CityEvaluation> {
        self.tables.lock().cities_written.values().cloned().collect()
    }

    pub fn logs(&self) -> Vec<LogEntry> {
        self.tables.lock().logs.clone()
    }

    fn check_contexts(&self) -> StoreResult<()> {
        self.context_reads.fetch_add(1, Ordering::SeqCst);
        if self.faults.lock().contexts {
            return Err(StoreError::Unavailable("context read failure injected".to_string()));
        }
        Ok(())
    }

    fn take_upsert_fault(&self, kind: &'static str) -> bool {
        let mut faults = self.faults.lock();
        let matches = faults.upsert_kind.is_none_or(|k| k == kind);
        if faults.upserts_remaining > 0 && matches {
            faults.upserts_remaining -= 1;
            return true;
        }
        false
    }
}

fn matches_view(
    view: &ViewQuery,
    city_id: i64,
    pillar_id: Option<i64>,
    question_id: Option<i64>,
) -> bool {
    city_id == view.city_id
        && view.pillar_id.is_none_or(|p| Some(p) == pillar_id)
        && view.question_id.is_none_or(|q| Some(q) == question_id)
}

fn limited<T>(rows: impl Iterator<Item = T>, view: &ViewQuery) -> Vec<T> {
    match view.limit {
        Some(limit) => rows.take(limit as usize).collect(),
        None => rows.collect(),
    }
}

#[async_trait]
impl EvaluationStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        if self.faults.lock().ping {
            return Err(StoreError::Unavailable("ping failure injected".to_string()));
        }
        Ok(())
    }

    async fn list_cities(&self, filter: CityFilter) -> StoreResult<Vec<City>> {
        if self.faults.lock().list_cities {
            return Err(StoreError::Unavailable("city list failure injected".to_string()));
        }

        let mut cities: Vec<City> = self
            .tables
            .lock()
            .cities
            .iter()
            .filter(|c| filter.city_id.is_none_or(|id| id == c.city_id))
            .cloned()
            .collect();
        cities.sort_by_key(|c| c.city_id);
        Ok(cities)
    }

    async fn question_contexts(&self, query: ViewQuery) -> StoreResult<Vec<QuestionContext>> {
        self.check_contexts()?;
        let tables = self.tables.lock();
        let rows = tables
            .question_contexts
            .iter()
            .filter(|r| matches_view(&query, r.city_id, Some(r.pillar_id), Some(r.question_id)))
            .cloned();
        Ok(limited(rows, &query))
    }

    async fn pillar_contexts(&self, query: ViewQuery) -> StoreResult<Vec<PillarContext>> {
        self.check_contexts()?;
        let tables = self.tables.lock();
        let rows = tables
            .pillar_contexts
            .iter()
            .filter(|r| matches_view(&query, r.city_id, Some(r.pillar_id), None))
            .cloned();
        Ok(limited(rows, &query))
    }

    async fn city_contexts(&self, query: ViewQuery) -> StoreResult<Vec<CityContext>> {
        self.check_contexts()?;
        let tables = self.tables.lock();
        let rows = tables
            .city_contexts
            .iter()
            .filter(|r| r.city_id == query.city_id)
            .cloned();
        Ok(limited(rows, &query))
    }

    async fn bulk_upsert(&self, batch: UpsertBatch) -> StoreResult<u64> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);

        if self.take_upsert_fault(batch.kind()) {
            return Err(StoreError::UpsertFailed {
                kind: batch.kind(),
                rows: batch.len(),
                message: "upsert failure injected".to_string(),
            });
        }

        let written = batch.len() as u64;
        let mut tables = self.tables.lock();
        match batch {
            UpsertBatch::Questions(rows) => {
                for row in rows {
                    tables.questions.insert(row.natural_key(), row);
                }
            }
            UpsertBatch::Pillars { rows, sources } => {
                for row in &rows {
                    tables.sources.remove(&row.natural_key());
                }
                for source in sources {
                    tables
                        .sources
                        .entry(source.natural_key())
                        .or_default()
                        .push(source);
                }
                for row in rows {
                    tables.pillars.insert(row.natural_key(), row);
                }
            }
            UpsertBatch::Cities(rows) => {
                for row in rows {
                    tables.cities_written.insert(row.natural_key(), row);
                }
            }
        }
        Ok(written)
    }

    async fn append_log(&self, entry: LogEntry) -> StoreResult<()> {
        self.tables.lock().logs.push(entry);
        Ok(())
    }
}
