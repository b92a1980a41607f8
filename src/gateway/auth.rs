use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::error::GatewayError;
use super::state::HandlerState;

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Paths reachable without a key.
pub const PUBLIC_PATHS: &[&str] = &["/healthz", "/ready"];

/// Rejects requests without the configured API key.
///
/// The key is read from `X-API-Key`, falling back to `Authorization: Bearer <key>`.
pub async fn require_api_key(
    State(state): State<HandlerState>,
    req: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.api_key.as_deref() else {
        return next.run(req).await;
    };
    if PUBLIC_PATHS.contains(&req.uri().path()) {
        return next.run(req).await;
    }

    let rejection = match presented_key(req.headers()) {
        None => Some("API key is missing. Provide the X-API-Key header."),
        Some(key) if key != expected => Some("Invalid API key."),
        Some(_) => None,
    };

    match rejection {
        Some(message) => {
            warn!(method = %req.method(), path = req.uri().path(), message, "request rejected");
            GatewayError::Unauthorized(message).into_response()
        }
        None => next.run(req).await,
    }
}

fn presented_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)
        .or_else(|| headers.get("Authorization"))
        .and_then(|v| v.to_str().ok())
        .map(|v| v.strip_prefix("Bearer ").unwrap_or(v).trim())
        .filter(|v| !v.is_empty())
}
