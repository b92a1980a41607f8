use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use super::{STATUS_HEADER, create_router_with_state};
use crate::batch::{BatchConfig, BatchRunner, TierSet};
use crate::engine::{EngineError, MockEngine};
use crate::gateway::state::HandlerState;
use crate::research::{Researcher, RetryController, RetryPolicy};
use crate::store::{City, MemoryStore, QuestionContext};
use crate::supervisor::RunSupervisor;

const VALID: &str = r#"{"ai_score": 3.0, "ai_progress": 75, "confidence_level": "High", "evidence_summary": "Budget data published."}"#;
const API_KEY: &str = "secret-key";

fn seeded_store() -> Arc<MemoryStore> {
    let store = MemoryStore::with_cities([City {
        city_id: 1,
        city_name: "Nairobi".to_string(),
        state: "Nairobi County".to_string(),
        country: "Kenya".to_string(),
    }]);
    store.add_question_context(QuestionContext {
        city_id: 1,
        pillar_id: 1,
        pillar_name: "Sanitation".to_string(),
        question_id: 11,
        question_text: "Safe sanitation coverage".to_string(),
        score_progress: Some(50.0),
        normalized_value: Some(0.5),
    });
    Arc::new(store)
}

fn state_with(store: Arc<MemoryStore>, engine: Arc<MockEngine>) -> HandlerState {
    let retry = RetryController::new(engine, RetryPolicy::new(1, Duration::ZERO));
    let researcher = Researcher::new(retry);
    let config = BatchConfig {
        chunk_size: 5,
        city_concurrency: 1,
        tiers: TierSet::all(),
        year: 2024,
    };
    let runner = Arc::new(BatchRunner::new(store.clone(), researcher.clone(), config));
    HandlerState::new(store, researcher, RunSupervisor::new(runner))
}

fn app(store: Arc<MemoryStore>) -> Router {
    let engine = Arc::new(MockEngine::from_fn(|_| Ok(VALID.to_string())));
    create_router_with_state(state_with(store, engine))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn question_task() -> Value {
    json!({
        "city": {"city_id": 1, "city_name": "Nairobi", "country": "Kenya"},
        "pillar_id": 1,
        "pillar_name": "Sanitation",
        "question_id": 11,
        "question_text": "Safe sanitation coverage",
        "year": 2024
    })
}

#[tokio::test]
async fn test_health_handler() {
    let response = app(seeded_store()).oneshot(get("/healthz")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(STATUS_HEADER).unwrap(), "healthy");
    assert_eq!(body_json(response).await, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_ready_handler_with_reachable_store() {
    let response = app(seeded_store()).oneshot(get("/ready")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["components"]["store"], "ready");
}

#[tokio::test]
async fn test_ready_handler_with_unreachable_store() {
    let store = seeded_store();
    store.fail_ping();

    let response = app(store).oneshot(get("/ready")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.headers().get(STATUS_HEADER).unwrap(), "unavailable");
    let body = body_json(response).await;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["components"]["store"], "unavailable");
}

#[tokio::test]
async fn test_start_run_returns_accepted() {
    let response = app(seeded_store())
        .oneshot(post_json("/api/score-analysis/runs", json!({"city_id": 1})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "started");
    assert!(body["run_id"].as_str().unwrap().parse::<uuid::Uuid>().is_ok());
}

#[tokio::test]
async fn test_start_run_with_wait_returns_report() {
    let store = seeded_store();
    let response = app(store.clone())
        .oneshot(post_json(
            "/api/score-analysis/runs",
            json!({"city_id": 1, "tiers": ["question"], "wait": true}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["completed"], true);
    assert_eq!(body["report"]["questions"]["succeeded"], 1);
    assert_eq!(body["report"]["pillars"]["succeeded"], 0);
    assert!(body.get("error").is_none());
    assert_eq!(store.questions().len(), 1);
    assert!(store.pillars().is_empty());
}

#[tokio::test]
async fn test_start_run_with_wait_reports_fatal_failure() {
    let store = seeded_store();
    store.fail_list_cities();

    let response = app(store)
        .oneshot(post_json("/api/score-analysis/runs", json!({"wait": true})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["completed"], false);
    assert!(body["error"].as_str().unwrap().contains("failed to list cities"));
}

#[tokio::test]
async fn test_start_run_rejects_question_without_city() {
    let response = app(seeded_store())
        .oneshot(post_json("/api/score-analysis/runs", json!({"question_id": 11})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers().get(STATUS_HEADER).unwrap(), "invalid_request");
    let body = body_json(response).await;
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn test_start_run_rejects_empty_tiers() {
    let response = app(seeded_store())
        .oneshot(post_json("/api/score-analysis/runs", json!({"tiers": []})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("tiers"));
}

#[tokio::test]
async fn test_start_run_rejects_unknown_fields() {
    let response = app(seeded_store())
        .oneshot(post_json("/api/score-analysis/runs", json!({"cityId": 1})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_run_status_round_trip() {
    let router = app(seeded_store());
    let response = router
        .clone()
        .oneshot(post_json(
            "/api/score-analysis/runs",
            json!({"city_id": 1, "wait": true}),
        ))
        .await
        .unwrap();
    let run_id = body_json(response).await["run_id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = router
        .oneshot(get(&format!("/api/score-analysis/runs/{run_id}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["run_id"], run_id.as_str());
    assert_eq!(body["status"], "completed");
    assert_eq!(body["report"]["cities"], 1);
}

#[tokio::test]
async fn test_run_status_unknown_id_is_not_found() {
    let router = app(seeded_store());

    let unknown = uuid::Uuid::new_v4();
    let response = router
        .clone()
        .oneshot(get(&format!("/api/score-analysis/runs/{unknown}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = router
        .oneshot(get("/api/score-analysis/runs/not-a-uuid"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_analysis_all_cities_trigger() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/score-analysis/analysisAllCities?Id=1")
        .body(Body::empty())
        .unwrap();

    let response = app(seeded_store()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Analysis started for city 1");
    assert!(body["run_id"].is_string());
}

#[tokio::test]
async fn test_research_question_returns_record() {
    let response = app(seeded_store())
        .oneshot(post_json(
            "/api/v1/ai-research/question/research",
            question_task(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["question_id"], 11);
    assert_eq!(body["ai_score"], 3.0);
    assert_eq!(body["confidence_level"], "High");
}

#[tokio::test]
async fn test_research_city_returns_record() {
    let body = json!({
        "city": {"city_id": 1, "city_name": "Nairobi", "country": "Kenya"},
        "pillar_context": "- Sanitation: AI score 3.00/4.0",
        "year": 2024
    });

    let response = app(seeded_store())
        .oneshot(post_json("/api/v1/ai-research/city/research", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["city_id"], 1);
    assert_eq!(body["ai_progress"], 75.0);
}

#[tokio::test]
async fn test_research_engine_failure_is_bad_gateway() {
    let engine = Arc::new(MockEngine::from_fn(|_| {
        Err(EngineError::Transport("connection refused".to_string()))
    }));
    let router = create_router_with_state(state_with(seeded_store(), engine));

    let response = router
        .oneshot(post_json(
            "/api/v1/ai-research/question/research",
            question_task(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(response.headers().get(STATUS_HEADER).unwrap(), "research_error");
}

#[tokio::test]
async fn test_research_pillar_rejects_malformed_task() {
    let response = app(seeded_store())
        .oneshot(post_json(
            "/api/v1/ai-research/pillar/research",
            json!({"pillar_id": 1}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

fn secured_app() -> Router {
    let engine = Arc::new(MockEngine::from_fn(|_| Ok(VALID.to_string())));
    let state = state_with(seeded_store(), engine).with_api_key(Some(API_KEY.to_string()));
    create_router_with_state(state)
}

#[tokio::test]
async fn test_missing_api_key_is_unauthorized() {
    let response = secured_app()
        .oneshot(post_json("/api/score-analysis/runs", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Unauthorized");
    assert!(body["message"].as_str().unwrap().contains("missing"));
}

#[tokio::test]
async fn test_wrong_api_key_is_unauthorized() {
    let mut request = post_json("/api/score-analysis/runs", json!({}));
    request
        .headers_mut()
        .insert("x-api-key", "wrong".parse().unwrap());

    let response = secured_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Invalid API key.");
}

#[tokio::test]
async fn test_api_key_header_and_bearer_are_accepted() {
    let mut request = post_json("/api/score-analysis/runs", json!({}));
    request
        .headers_mut()
        .insert("x-api-key", API_KEY.parse().unwrap());
    let response = secured_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let mut request = post_json("/api/score-analysis/runs", json!({}));
    request.headers_mut().insert(
        "authorization",
        format!("Bearer {API_KEY}").parse().unwrap(),
    );
    let response = secured_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_probes_skip_api_key() {
    let response = secured_app().oneshot(get("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = secured_app().oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
