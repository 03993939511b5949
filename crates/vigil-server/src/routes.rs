//! HTTP handlers.
//!
//! Handlers stay thin: decode, call the controller, encode. Short store
//! operations run inline on the request task.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use serde_json::Value;
use vigil_core::Diagnosis;
use vigil_store::SessionRow;
use vigil_tracking::{
    EndOutcome, FatigueReport, NewSession, RestActivity, RestBreak, SessionDetails,
    SubmissionOutcome,
};

use crate::error::ApiError;
use crate::health::{self, HealthResponse};
use crate::server::AppState;

type ApiResult<T> = Result<T, ApiError>;

/// GET /health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let pool = state.pool.clone();
    let database_ok = match tokio::task::spawn_blocking(move || vigil_store::connection::ping(&pool)).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            false
        }
        Err(e) => {
            tracing::warn!(error = %e, "health check: ping task failed");
            false
        }
    };
    let resp = health::health_check(state.start_time, database_ok, state.controller.reconciler().backend());
    let status = if resp.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(resp))
}

/// GET /metrics
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::metrics::render(&state.metrics),
    )
}

/// POST /sessions
pub async fn create_session(
    State(state): State<AppState>,
    payload: Result<Json<NewSession>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SessionRow>)> {
    let Json(request) = payload?;
    let session = state.controller.create_session(&request).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /sessions/{id}
pub async fn session_details(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SessionDetails>> {
    Ok(Json(state.controller.session_details(&session_id).await?))
}

/// POST /sessions/{id}/end
pub async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<EndOutcome>> {
    Ok(Json(state.controller.end_session(&session_id).await?))
}

/// POST /sessions/{id}/rest-breaks
pub async fn record_rest_break(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<RestBreak>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(rest_break) = payload?;
    let entry = state.controller.record_rest_break(&session_id, &rest_break).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// POST /sessions/{id}/diagnosis
pub async fn diagnose(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Diagnosis>> {
    Ok(Json(state.controller.diagnose(&session_id).await?))
}

/// POST /fatigue-reports
pub async fn submit_report(
    State(state): State<AppState>,
    payload: Result<Json<FatigueReport>, JsonRejection>,
) -> ApiResult<Json<SubmissionOutcome>> {
    let Json(report) = payload?;
    Ok(Json(state.controller.submit(report).await?))
}

/// GET /rest-activities
pub async fn rest_activities(State(state): State<AppState>) -> Json<&'static [RestActivity]> {
    Json(state.controller.rest_activities())
}
