use std::str::FromStr;

use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};

use super::error::{StoreError, StoreResult};
use super::model::{
    City, CityContext, CityFilter, LogEntry, PillarContext, PillarEvaluationSource,
    QuestionContext, Record, SqlValue, UpsertBatch, ViewQuery,
};
use super::schema::{CITY_VIEW, PILLAR_VIEW, QUESTION_VIEW, TABLES, VIEWS};
use super::EvaluationStore;

/// Default pool size for file-backed databases.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// [`EvaluationStore`] backed by a SQLite pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if missing) the database at `url`.
    ///
    /// In-memory URLs get a single connection so every query sees the same database.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let connection_failed = |e: sqlx::Error| StoreError::ConnectionFailed {
            url: url.to_string(),
            message: e.to_string(),
        };

        let options = SqliteConnectOptions::from_str(url)
            .map_err(connection_failed)?
            .create_if_missing(true);

        let max_connections = if url.contains(":memory:") {
            1
        } else {
            DEFAULT_MAX_CONNECTIONS
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(connection_failed)?;

        info!(url, max_connections, "connected to database");
        Ok(Self { pool })
    }

    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates missing tables and views.
    pub async fn migrate(&self) -> StoreResult<()> {
        for statement in TABLES.iter().chain(VIEWS) {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(StoreError::MigrationFailed)?;
        }
        debug!(tables = TABLES.len(), views = VIEWS.len(), "schema ready");
        Ok(())
    }

    async fn write(&self, batch: &UpsertBatch) -> Result<u64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let written = match batch {
            UpsertBatch::Questions(rows) => upsert_all(&mut tx, rows).await?,
            UpsertBatch::Cities(rows) => upsert_all(&mut tx, rows).await?,
            UpsertBatch::Pillars { rows, sources } => {
                let written = upsert_all(&mut tx, rows).await?;
                for row in rows {
                    sqlx::query(
                        r#"
                        DELETE FROM pillar_evaluation_sources
                        WHERE city_id = ? AND pillar_id = ? AND data_year = ?
                        "#,
                    )
                    .bind(row.city_id)
                    .bind(row.pillar_id)
                    .bind(row.year)
                    .execute(&mut *tx)
                    .await?;
                }
                insert_all(&mut tx, sources).await?;
                written
            }
        };

        tx.commit().await?;
        Ok(written)
    }
}

#[async_trait]
impl EvaluationStore for SqliteStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_cities(&self, filter: CityFilter) -> StoreResult<Vec<City>> {
        let rows = sqlx::query(
            r#"
            SELECT city_id, city_name, state, country
            FROM cities
            WHERE is_deleted = 0 AND (? IS NULL OR city_id = ?)
            ORDER BY city_id
            "#,
        )
        .bind(filter.city_id)
        .bind(filter.city_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(city).collect()
    }

    async fn question_contexts(&self, query: ViewQuery) -> StoreResult<Vec<QuestionContext>> {
        let sql = format!(
            r#"
            SELECT city_id, pillar_id, pillar_name, question_id, question_text,
                   score_progress, normalized_value
            FROM {QUESTION_VIEW}
            WHERE city_id = ?
              AND (? IS NULL OR pillar_id = ?)
              AND (? IS NULL OR question_id = ?)
            ORDER BY pillar_order, pillar_id, question_order, question_id
            LIMIT ?
            "#
        );
        let rows = bind_view(sqlx::query(&sql), &query)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(question_context).collect()
    }

    async fn pillar_contexts(&self, query: ViewQuery) -> StoreResult<Vec<PillarContext>> {
        let sql = format!(
            r#"
            SELECT city_id, pillar_id, pillar_name, questions_with_scores,
                   evaluator_score, ai_score
            FROM {PILLAR_VIEW}
            WHERE city_id = ?
              AND (? IS NULL OR pillar_id = ?)
            ORDER BY pillar_order, pillar_id
            LIMIT ?
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(query.city_id)
            .bind(query.pillar_id)
            .bind(query.pillar_id)
            .bind(limit(&query))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(pillar_context).collect()
    }

    async fn city_contexts(&self, query: ViewQuery) -> StoreResult<Vec<CityContext>> {
        let sql = format!(
            r#"
            SELECT city_id, evaluator_score, ai_score, pillars_with_scores
            FROM {CITY_VIEW}
            WHERE city_id = ?
            LIMIT ?
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(query.city_id)
            .bind(limit(&query))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(city_context).collect()
    }

    async fn bulk_upsert(&self, batch: UpsertBatch) -> StoreResult<u64> {
        if batch.is_empty() {
            return Ok(0);
        }

        let written = self
            .write(&batch)
            .await
            .map_err(|e| StoreError::UpsertFailed {
                kind: batch.kind(),
                rows: batch.len(),
                message: e.to_string(),
            })?;

        debug!(kind = batch.kind(), rows = written, "chunk upserted");
        Ok(written)
    }

    async fn append_log(&self, entry: LogEntry) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO app_logs (level, message, exception, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(entry.level.as_str())
        .bind(entry.message)
        .bind(entry.exception)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// `INSERT ... ON CONFLICT (key) DO UPDATE` over every non-key column.
pub(crate) fn upsert_sql<R: Record>() -> String {
    let updates = R::COLUMNS
        .iter()
        .filter(|column| !R::KEY.contains(column))
        .map(|column| format!("{column} = excluded.{column}"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "{} ON CONFLICT ({}) DO UPDATE SET {updates}, updated_at = CURRENT_TIMESTAMP",
        insert_sql::<R>(),
        R::KEY.join(", ")
    )
}

pub(crate) fn insert_sql<R: Record>() -> String {
    let placeholders = vec!["?"; R::COLUMNS.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({placeholders})",
        R::TABLE,
        R::COLUMNS.join(", ")
    )
}

async fn upsert_all<R: Record + Sync>(
    tx: &mut Transaction<'_, Sqlite>,
    rows: &[R],
) -> Result<u64, sqlx::Error> {
    let sql = upsert_sql::<R>();
    for row in rows {
        bind_values(sqlx::query(&sql), row.values())
            .execute(&mut **tx)
            .await?;
    }
    Ok(rows.len() as u64)
}

async fn insert_all(
    tx: &mut Transaction<'_, Sqlite>,
    rows: &[PillarEvaluationSource],
) -> Result<(), sqlx::Error> {
    let sql = insert_sql::<PillarEvaluationSource>();
    for row in rows {
        bind_values(sqlx::query(&sql), row.values())
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

fn bind_values(mut query: SqliteQuery<'_>, values: Vec<SqlValue>) -> SqliteQuery<'_> {
    for value in values {
        query = match value {
            SqlValue::Int(v) => query.bind(v),
            SqlValue::Real(v) => query.bind(v),
            SqlValue::Text(v) => query.bind(v),
        };
    }
    query
}

fn bind_view<'q>(query: SqliteQuery<'q>, view: &ViewQuery) -> SqliteQuery<'q> {
    query
        .bind(view.city_id)
        .bind(view.pillar_id)
        .bind(view.pillar_id)
        .bind(view.question_id)
        .bind(view.question_id)
        .bind(limit(view))
}

/// SQLite treats a negative LIMIT as unbounded.
fn limit(view: &ViewQuery) -> i64 {
    view.limit.map(i64::from).unwrap_or(-1)
}

fn city(row: &SqliteRow) -> StoreResult<City> {
    Ok(City {
        city_id: row.try_get("city_id")?,
        city_name: row.try_get("city_name")?,
        state: row.try_get("state")?,
        country: row.try_get("country")?,
    })
}

fn question_context(row: &SqliteRow) -> StoreResult<QuestionContext> {
    Ok(QuestionContext {
        city_id: row.try_get("city_id")?,
        pillar_id: row.try_get("pillar_id")?,
        pillar_name: row.try_get("pillar_name")?,
        question_id: row.try_get("question_id")?,
        question_text: row.try_get("question_text")?,
        score_progress: row.try_get("score_progress")?,
        normalized_value: row.try_get("normalized_value")?,
    })
}

fn pillar_context(row: &SqliteRow) -> StoreResult<PillarContext> {
    Ok(PillarContext {
        city_id: row.try_get("city_id")?,
        pillar_id: row.try_get("pillar_id")?,
        pillar_name: row.try_get("pillar_name")?,
        questions_with_scores: row.try_get("questions_with_scores")?,
        evaluator_score: row.try_get("evaluator_score")?,
        ai_score: row.try_get("ai_score")?,
    })
}

fn city_context(row: &SqliteRow) -> StoreResult<CityContext> {
    Ok(CityContext {
        city_id: row.try_get("city_id")?,
        evaluator_score: row.try_get("evaluator_score")?,
        ai_score: row.try_get("ai_score")?,
        pillars_with_scores: row.try_get("pillars_with_scores")?,
    })
}
