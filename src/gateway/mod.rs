//! HTTP gateway (Axum): probes, run triggers, run status and direct research.

pub mod auth;
pub mod error;
pub mod handler;
pub mod state;

#[cfg(test)]
mod handler_tests;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::{
    analysis_all_cities_handler, research_city_handler, research_pillar_handler,
    research_question_handler, run_status_handler, start_run_handler,
};
pub use state::HandlerState;

pub const STATUS_HEADER: &str = "x-veridian-status";
pub const STATUS_HEALTHY: &str = "healthy";
pub const STATUS_READY: &str = "ready";
pub const STATUS_UNAVAILABLE: &str = "unavailable";

pub fn create_router_with_state(state: HandlerState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/api/score-analysis/runs", post(start_run_handler))
        .route("/api/score-analysis/runs/{run_id}", get(run_status_handler))
        .route(
            "/api/score-analysis/analysisAllCities",
            post(analysis_all_cities_handler),
        )
        .route(
            "/api/v1/ai-research/question/research",
            post(research_question_handler),
        )
        .route(
            "/api/v1/ai-research/pillar/research",
            post(research_pillar_handler),
        )
        .route(
            "/api/v1/ai-research/city/research",
            post(research_city_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub store: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(STATUS_HEADER, HeaderValue::from_static(STATUS_HEALTHY));

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler(State(state): State<HandlerState>) -> Response {
    let store_status = match state.store.ping().await {
        Ok(()) => STATUS_READY,
        Err(e) => {
            tracing::warn!(error = %e, "store ping failed");
            STATUS_UNAVAILABLE
        }
    };

    let is_ready = store_status == STATUS_READY;
    let (status_code, status_msg) = if is_ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "pending")
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        STATUS_HEADER,
        HeaderValue::from_static(if is_ready { STATUS_READY } else { STATUS_UNAVAILABLE }),
    );

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg,
            components: ComponentStatus {
                http: STATUS_READY,
                store: store_status,
            },
        }),
    )
        .into_response()
}
