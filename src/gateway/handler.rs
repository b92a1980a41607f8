use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{info, instrument};

use super::error::GatewayError;
use super::state::HandlerState;
use crate::batch::{RunReport, RunScope, TierSet};
use crate::research::{CityTask, PillarTask, QuestionTask};
use crate::supervisor::{RunId, RunStatus};
use crate::validation::Tier;

/// Body of `POST /api/score-analysis/runs`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunRequest {
    pub city_id: Option<i64>,
    pub pillar_id: Option<i64>,
    pub question_id: Option<i64>,
    pub tiers: Option<Vec<Tier>>,
    /// Block until the run finishes.
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Serialize)]
pub struct RunStarted {
    pub run_id: RunId,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RunCompleted {
    pub run_id: RunId,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<RunReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisAllCitiesQuery {
    #[serde(rename = "Id")]
    pub id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisStarted {
    pub success: bool,
    pub message: String,
    pub run_id: RunId,
}

#[derive(Debug, Serialize)]
pub struct RunStatusResponse {
    pub run_id: RunId,
    #[serde(flatten)]
    pub status: RunStatus,
}

fn parse_body<T: DeserializeOwned>(body: serde_json::Value) -> Result<T, GatewayError> {
    serde_json::from_value(body)
        .map_err(|e| GatewayError::InvalidRequest(format!("invalid request schema: {}", e)))
}

fn tier_set(tiers: Option<Vec<Tier>>) -> Result<Option<TierSet>, GatewayError> {
    match tiers {
        None => Ok(None),
        Some(tiers) if tiers.is_empty() => Err(GatewayError::InvalidRequest(
            "tiers must not be empty".to_string(),
        )),
        Some(tiers) => Ok(Some(TierSet::from_tiers(tiers))),
    }
}

#[instrument(skip(state, body))]
pub async fn start_run_handler(
    State(state): State<HandlerState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, GatewayError> {
    let request: RunRequest = parse_body(body)?;
    let scope = RunScope::from_parts(request.city_id, request.pillar_id, request.question_id)
        .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;
    let tiers = tier_set(request.tiers)?;

    if !request.wait {
        let run_id = state.supervisor.launch_with_tiers(scope, tiers);
        let body = RunStarted {
            run_id,
            status: "started",
        };
        return Ok((StatusCode::ACCEPTED, Json(body)).into_response());
    }

    let (run_id, status) = state.supervisor.run_to_completion(scope, tiers).await;
    let body = match status {
        RunStatus::Completed { report } => RunCompleted {
            run_id,
            completed: report.success(),
            report: Some(report),
            error: None,
        },
        RunStatus::Failed { error } => RunCompleted {
            run_id,
            completed: false,
            report: None,
            error: Some(error),
        },
        RunStatus::Running { .. } => {
            return Err(GatewayError::InternalError(
                "run finished without a terminal status".to_string(),
            ));
        }
    };
    Ok((StatusCode::OK, Json(body)).into_response())
}

/// Background run over every city, or one city when `Id` is given.
#[instrument(skip(state))]
pub async fn analysis_all_cities_handler(
    State(state): State<HandlerState>,
    Query(query): Query<AnalysisAllCitiesQuery>,
) -> Response {
    let (scope, message) = match query.id {
        Some(city_id) => (
            RunScope::City { city_id },
            format!("Analysis started for city {city_id}"),
        ),
        None => (
            RunScope::AllCities,
            "Analysis started for all cities".to_string(),
        ),
    };

    let run_id = state.supervisor.launch(scope);
    info!(%run_id, %scope, "analysis triggered");

    (
        StatusCode::ACCEPTED,
        Json(AnalysisStarted {
            success: true,
            message,
            run_id,
        }),
    )
        .into_response()
}

#[instrument(skip(state))]
pub async fn run_status_handler(
    State(state): State<HandlerState>,
    Path(run_id): Path<String>,
) -> Result<Json<RunStatusResponse>, GatewayError> {
    let parsed: RunId = run_id
        .parse()
        .map_err(|_| GatewayError::RunNotFound(run_id.clone()))?;
    let status = state
        .supervisor
        .status(parsed)
        .ok_or(GatewayError::RunNotFound(run_id))?;

    Ok(Json(RunStatusResponse {
        run_id: parsed,
        status,
    }))
}

#[instrument(skip(state, body))]
pub async fn research_question_handler(
    State(state): State<HandlerState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, GatewayError> {
    let task: QuestionTask = parse_body(body)?;
    let record = state.researcher.research_question(&task).await?;
    Ok(Json(record).into_response())
}

#[instrument(skip(state, body))]
pub async fn research_pillar_handler(
    State(state): State<HandlerState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, GatewayError> {
    let task: PillarTask = parse_body(body)?;
    let record = state.researcher.research_pillar(&task).await?;
    Ok(Json(record).into_response())
}

#[instrument(skip(state, body))]
pub async fn research_city_handler(
    State(state): State<HandlerState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, GatewayError> {
    let task: CityTask = parse_body(body)?;
    let record = state.researcher.research_city(&task).await?;
    Ok(Json(record).into_response())
}
