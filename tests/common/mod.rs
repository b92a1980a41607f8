//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use veridian::batch::{BatchConfig, BatchRunner, TierSet};
use veridian::engine::MockEngine;
use veridian::gateway::{HandlerState, create_router_with_state};
use veridian::research::{Researcher, RetryController, RetryPolicy};
use veridian::store::SqliteStore;
use veridian::supervisor::RunSupervisor;

pub const YEAR: i32 = 2024;

/// Minimal document accepted at every tier.
pub const VALID: &str = r#"```json
{"ai_score": 3.0, "ai_progress": 75, "confidence_level": "High", "evidence_summary": "Published budget and coverage data."}
```"#;

const SEED: &[&str] = &[
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
];

/// Migrated store with two live cities, two pillars and three questions.
pub async fn seeded_store(url: &str) -> Arc<SqliteStore> {
    let store = SqliteStore::connect(url).await.expect("store should connect");
    store.migrate().await.expect("schema should apply");
    for statement in SEED {
        sqlx::query(statement)
            .execute(store.pool())
            .await
            .expect("seed row should insert");
    }
    Arc::new(store)
}

pub async fn count(store: &SqliteStore, table: &str) -> i64 {
    let sql = format!("SELECT COUNT(*) FROM {table}");
    sqlx::query_scalar::<_, i64>(&sql)
        .fetch_one(store.pool())
        .await
        .expect("count should succeed")
}

pub fn always_valid() -> Arc<MockEngine> {
    Arc::new(MockEngine::from_fn(|_| Ok(VALID.to_string())))
}

pub fn batch_config(tiers: TierSet) -> BatchConfig {
    BatchConfig {
        chunk_size: 2,
        city_concurrency: 2,
        tiers,
        year: YEAR,
    }
}

pub fn researcher(engine: Arc<MockEngine>) -> Researcher {
    Researcher::new(RetryController::new(
        engine,
        RetryPolicy::new(3, Duration::ZERO),
    ))
}

pub fn runner(store: Arc<SqliteStore>, engine: Arc<MockEngine>) -> BatchRunner {
    BatchRunner::new(store, researcher(engine), batch_config(TierSet::all()))
}

pub fn handler_state(store: Arc<SqliteStore>, engine: Arc<MockEngine>) -> HandlerState {
    let researcher = researcher(engine);
    let runner = Arc::new(BatchRunner::new(
        store.clone(),
        researcher.clone(),
        batch_config(TierSet::all()),
    ));
    HandlerState::new(store, researcher, RunSupervisor::new(runner))
}

/// A gateway bound to an ephemeral port.
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub async fn spawn_test_server(state: HandlerState) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral port should bind");
    let addr = listener.local_addr().expect("listener should have an address");
    let app = create_router_with_state(state);

    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    TestServer { addr, handle }
}
