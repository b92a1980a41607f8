//! Relational store boundary.
//!
//! The pipeline reads cities and pre-joined context rows from three evaluation views
//! and writes evaluation records in chunks. Writes are upserts keyed by each record's
//! natural key, so flushing the same chunk twice leaves the same logical state.

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;
pub mod schema;
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use error::{StoreError, StoreResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::MemoryStore;
pub use model::{
    City, CityContext, CityEvaluation, CityFilter, LogEntry, LogLevel, NaturalKey,
    PillarContext, PillarEvaluation, PillarEvaluationSource, QuestionContext,
    QuestionEvaluation, Record, SqlValue, UpsertBatch, ViewQuery,
};
pub use sqlite::SqliteStore;

use async_trait::async_trait;

/// Reads reference and context data; writes evaluation records and operational logs.
#[async_trait]
pub trait EvaluationStore: Send + Sync {
    /// Cheap liveness probe.
    async fn ping(&self) -> StoreResult<()>;

    /// Active cities matching `filter`, ordered by id.
    async fn list_cities(&self, filter: CityFilter) -> StoreResult<Vec<City>>;

    /// Rows of the question evaluation view.
    async fn question_contexts(&self, query: ViewQuery) -> StoreResult<Vec<QuestionContext>>;

    /// Rows of the pillar evaluation view.
    async fn pillar_contexts(&self, query: ViewQuery) -> StoreResult<Vec<PillarContext>>;

    /// Rows of the city evaluation view.
    async fn city_contexts(&self, query: ViewQuery) -> StoreResult<Vec<CityContext>>;

    /// Writes one chunk atomically; returns the number of evaluation rows written.
    async fn bulk_upsert(&self, batch: UpsertBatch) -> StoreResult<u64>;

    /// Appends an operational log entry.
    async fn append_log(&self, entry: LogEntry) -> StoreResult<()>;
}
