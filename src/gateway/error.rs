use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::STATUS_HEADER;
use crate::research::ResearchError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("run not found: {0}")]
    RunNotFound(String),

    #[error("research failed: {0}")]
    ResearchFailed(#[from] ResearchError),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub code: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, status_tag) = match &self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            GatewayError::RunNotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            GatewayError::ResearchFailed(_) => (StatusCode::BAD_GATEWAY, "research_error"),
            GatewayError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            GatewayError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let body = match self {
            GatewayError::Unauthorized(message) => ErrorResponse {
                error: "Unauthorized".to_string(),
                message: Some(message.to_string()),
                code: status.as_u16(),
            },
            other => ErrorResponse {
                error: other.to_string(),
                message: None,
                code: status.as_u16(),
            },
        };

        let mut headers = HeaderMap::new();
        headers.insert(STATUS_HEADER, HeaderValue::from_static(status_tag));

        (status, headers, Json(body)).into_response()
    }
}
