use super::sqlite::{insert_sql, upsert_sql};
use super::*;
use crate::validation::{ConfidenceLevel, SourceType};

async fn sqlite_store() -> SqliteStore {
    let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
    store.migrate().await.unwrap();

    for statement in [
        "INSERT INTO cities (city_id, city_name, state, country) VALUES (1, 'Nairobi', 'Nairobi County', 'Kenya')",
        "INSERT INTO cities (city_id, city_name, state, country) VALUES (2, 'Lagos', 'Lagos State', 'Nigeria')",
        "INSERT INTO cities (city_id, city_name, state, country, is_deleted) VALUES (3, 'Atlantis', '', '', 1)",
        "INSERT INTO pillars (pillar_id, pillar_name, display_order) VALUES (1, 'Sanitation & Waste', 1)",
        "INSERT INTO pillars (pillar_id, pillar_name, display_order) VALUES (2, 'Water', 2)",
        "INSERT INTO questions (question_id, pillar_id, question_text, display_order) VALUES (11, 1, 'Safe sanitation coverage', 1)",
        "INSERT INTO questions (question_id, pillar_id, question_text, display_order) VALUES (12, 1, 'Solid waste collection', 2)",
        "INSERT INTO questions (question_id, pillar_id, question_text, display_order) VALUES (21, 2, 'Piped water access', 1)",
        "INSERT INTO evaluator_question_scores (city_id, question_id, score_progress, normalized_value) VALUES (1, 11, 60.0, 0.6)",
        "INSERT INTO evaluator_pillar_scores (city_id, pillar_id, score) VALUES (1, 1, 2.5)",
        "INSERT INTO evaluator_city_scores (city_id, score) VALUES (1, 2.75)",
    ] {
        sqlx::query(statement).execute(store.pool()).await.unwrap();
    }

    store
}

fn question_row(question_id: i64, ai_score: f64) -> QuestionEvaluation {
    QuestionEvaluation {
        city_id: 1,
        pillar_id: 1,
        question_id,
        year: 2024,
        ai_score,
        ai_progress: ai_score * 25.0,
        evaluator_score: Some(2.4),
        discrepancy: 15.0,
        confidence_level: ConfidenceLevel::High,
        data_sources_used: 2,
        evidence_summary: "Coverage is rising.".to_string(),
        red_flags: String::new(),
        geographic_equity_note: String::new(),
        source_type: SourceType::Government,
        source_name: "National Bureau of Statistics".to_string(),
        source_url: "Not available".to_string(),
        source_data_year: Some(2023),
        source_data_extract: "82% coverage".to_string(),
        source_trust_level: 7,
    }
}

fn pillar_row(pillar_id: i64) -> PillarEvaluation {
    PillarEvaluation {
        city_id: 1,
        pillar_id,
        year: 2024,
        ai_score: 2.0,
        ai_progress: 50.0,
        evaluator_score: Some(2.5),
        discrepancy: 12.5,
        confidence_level: ConfidenceLevel::Medium,
        evidence_summary: "Mixed.".to_string(),
        red_flags: String::new(),
        geographic_equity_note: String::new(),
        institutional_assessment: String::new(),
        data_gap_analysis: String::new(),
    }
}

fn source_row(pillar_id: i64, name: &str) -> PillarEvaluationSource {
    PillarEvaluationSource {
        city_id: 1,
        data_year: 2024,
        pillar_id,
        source_type: SourceType::Ngo,
        source_name: name.to_string(),
        source_url: "Not available".to_string(),
        data_extract: "CPI 31".to_string(),
        trust_level: 3,
        source_data_year: None,
    }
}

fn city_row(ai_score: f64) -> CityEvaluation {
    CityEvaluation {
        city_id: 1,
        year: 2024,
        ai_score,
        ai_progress: 70.0,
        evaluator_score: Some(2.75),
        discrepancy: 1.25,
        confidence_level: ConfidenceLevel::Low,
        evidence_summary: "Broad improvement.".to_string(),
        cross_pillar_patterns: String::new(),
        institutional_capacity: String::new(),
        equity_assessment: String::new(),
        sustainability_outlook: String::new(),
        strategic_recommendations: String::new(),
        data_transparency_note: String::new(),
    }
}

async fn count(store: &SqliteStore, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(store.pool())
        .await
        .unwrap()
}

#[test]
fn test_upsert_sql_updates_non_key_columns() {
    let sql = upsert_sql::<CityEvaluation>();
    assert!(sql.starts_with("INSERT INTO city_evaluations (city_id, year, ai_score"));
    assert!(sql.contains("ON CONFLICT (city_id, year) DO UPDATE SET ai_score = excluded.ai_score"));
    assert!(!sql.contains("year = excluded.year"));
    assert!(sql.ends_with("updated_at = CURRENT_TIMESTAMP"));

    let sql = insert_sql::<PillarEvaluationSource>();
    assert_eq!(sql.matches('?').count(), PillarEvaluationSource::COLUMNS.len());
    assert!(!sql.contains("ON CONFLICT"));
}

#[test]
fn test_record_values_follow_column_order() {
    let row = question_row(11, 3.0);
    let values = row.values();
    assert_eq!(values.len(), QuestionEvaluation::COLUMNS.len());
    assert_eq!(values[8], SqlValue::Text("High".to_string()));
    assert_eq!(values[13], SqlValue::Text("Government".to_string()));

    assert_eq!(PillarEvaluation::COLUMNS.len(), pillar_row(1).values().len());
    assert_eq!(CityEvaluation::COLUMNS.len(), city_row(3.0).values().len());
    assert_eq!(source_row(1, "x").natural_key(), pillar_row(1).natural_key());
}

#[tokio::test]
async fn test_sqlite_list_cities_skips_deleted() {
    let store = sqlite_store().await;

    let all = store.list_cities(CityFilter::all()).await.unwrap();
    assert_eq!(
        all.iter().map(|c| c.city_id).collect::<Vec<_>>(),
        vec![1, 2]
    );
    assert_eq!(all[0].address(), "State: Nairobi County, Country: Kenya");

    let one = store.list_cities(CityFilter::one(2)).await.unwrap();
    assert_eq!(one.len(), 1);
    assert_eq!(one[0].city_name, "Lagos");

    assert!(store.list_cities(CityFilter::one(3)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sqlite_question_view_filters_and_limits() {
    let store = sqlite_store().await;

    let rows = store.question_contexts(ViewQuery::city(1)).await.unwrap();
    assert_eq!(
        rows.iter().map(|r| r.question_id).collect::<Vec<_>>(),
        vec![11, 12, 21]
    );
    assert_eq!(rows[0].score_progress, Some(60.0));
    assert_eq!(rows[1].score_progress, None);

    let rows = store
        .question_contexts(ViewQuery::city(1).pillar(Some(1)).question(Some(12)))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].question_text, "Solid waste collection");

    let rows = store
        .question_contexts(ViewQuery::city(1).limit(2))
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn test_sqlite_pillar_and_city_views() {
    let store = sqlite_store().await;

    let pillars = store.pillar_contexts(ViewQuery::city(1)).await.unwrap();
    assert_eq!(pillars.len(), 2);
    assert_eq!(pillars[0].evaluator_score, Some(2.5));
    assert_eq!(pillars[0].ai_score, None);
    let questions = pillars[0].questions_with_scores.as_deref().unwrap();
    assert!(questions.contains("Safe sanitation coverage: 60.0%"));
    assert!(questions.contains("Solid waste collection: no evaluator score"));

    store
        .bulk_upsert(UpsertBatch::Pillars {
            rows: vec![pillar_row(1)],
            sources: vec![],
        })
        .await
        .unwrap();
    let pillars = store
        .pillar_contexts(ViewQuery::city(1).pillar(Some(1)))
        .await
        .unwrap();
    assert_eq!(pillars.len(), 1);
    assert_eq!(pillars[0].ai_score, Some(2.0));

    let cities = store.city_contexts(ViewQuery::city(1)).await.unwrap();
    assert_eq!(cities.len(), 1);
    assert_eq!(cities[0].evaluator_score, Some(2.75));
    assert!(
        cities[0]
            .pillars_with_scores
            .as_deref()
            .unwrap()
            .contains("Sanitation & Waste: 2.50/4")
    );
}

#[tokio::test]
async fn test_sqlite_double_flush_is_idempotent() {
    let store = sqlite_store().await;
    let chunk = UpsertBatch::Questions(vec![question_row(11, 3.0), question_row(12, 2.0)]);

    assert_eq!(store.bulk_upsert(chunk.clone()).await.unwrap(), 2);
    assert_eq!(store.bulk_upsert(chunk).await.unwrap(), 2);
    assert_eq!(count(&store, "question_evaluations").await, 2);

    store
        .bulk_upsert(UpsertBatch::Questions(vec![question_row(11, 1.0)]))
        .await
        .unwrap();
    let score: f64 = sqlx::query_scalar(
        "SELECT ai_score FROM question_evaluations WHERE question_id = 11",
    )
    .fetch_one(store.pool())
    .await
    .unwrap();
    assert_eq!(score, 1.0);

    let city = UpsertBatch::Cities(vec![city_row(3.0)]);
    store.bulk_upsert(city.clone()).await.unwrap();
    store.bulk_upsert(city).await.unwrap();
    assert_eq!(count(&store, "city_evaluations").await, 1);
}

#[tokio::test]
async fn test_sqlite_pillar_flush_replaces_sources() {
    let store = sqlite_store().await;
    let chunk = UpsertBatch::Pillars {
        rows: vec![pillar_row(1), pillar_row(2)],
        sources: vec![
            source_row(1, "Transparency International"),
            source_row(1, "Kenya National Bureau of Statistics"),
            source_row(2, "Water Services Regulatory Board"),
        ],
    };

    assert_eq!(store.bulk_upsert(chunk.clone()).await.unwrap(), 2);
    assert_eq!(store.bulk_upsert(chunk).await.unwrap(), 2);
    assert_eq!(count(&store, "pillar_evaluations").await, 2);
    assert_eq!(count(&store, "pillar_evaluation_sources").await, 3);

    store
        .bulk_upsert(UpsertBatch::Pillars {
            rows: vec![pillar_row(1)],
            sources: vec![source_row(1, "World Bank")],
        })
        .await
        .unwrap();
    assert_eq!(count(&store, "pillar_evaluation_sources").await, 2);
}

#[tokio::test]
async fn test_sqlite_empty_batch_is_a_no_op() {
    let store = sqlite_store().await;
    assert_eq!(
        store.bulk_upsert(UpsertBatch::Questions(vec![])).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_sqlite_append_log_and_ping() {
    let store = sqlite_store().await;
    store.ping().await.unwrap();

    store
        .append_log(LogEntry::error("question 11 failed", "engine timed out"))
        .await
        .unwrap();
    store.append_log(LogEntry::info("run finished")).await.unwrap();

    let levels: Vec<String> = sqlx::query_scalar("SELECT level FROM app_logs ORDER BY id")
        .fetch_all(store.pool())
        .await
        .unwrap();
    assert_eq!(levels, vec!["AI_ERROR", "AI_INFO"]);
}

#[tokio::test]
async fn test_memory_store_double_flush_is_idempotent() {
    let store = MemoryStore::new();
    let chunk = UpsertBatch::Pillars {
        rows: vec![pillar_row(1)],
        sources: vec![source_row(1, "a"), source_row(1, "b")],
    };

    store.bulk_upsert(chunk.clone()).await.unwrap();
    store.bulk_upsert(chunk).await.unwrap();

    assert_eq!(store.pillars().len(), 1);
    assert_eq!(store.sources().len(), 2);
    assert_eq!(store.upsert_calls(), 2);
}

#[tokio::test]
async fn test_memory_store_failure_injection() {
    let store = MemoryStore::with_cities([City {
        city_id: 1,
        city_name: "Nairobi".to_string(),
        state: String::new(),
        country: "Kenya".to_string(),
    }]);

    store.fail_next_upserts(1, Some("cities"));
    store
        .bulk_upsert(UpsertBatch::Questions(vec![question_row(11, 3.0)]))
        .await
        .unwrap();
    let err = store
        .bulk_upsert(UpsertBatch::Cities(vec![city_row(3.0)]))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::UpsertFailed { kind: "cities", rows: 1, .. }));
    store
        .bulk_upsert(UpsertBatch::Cities(vec![city_row(3.0)]))
        .await
        .unwrap();

    assert_eq!(store.list_cities(CityFilter::all()).await.unwrap().len(), 1);
    store.fail_list_cities();
    assert!(store.list_cities(CityFilter::all()).await.is_err());

    store.fail_contexts();
    assert!(store.question_contexts(ViewQuery::city(1)).await.is_err());
    assert_eq!(store.context_reads(), 1);
}
