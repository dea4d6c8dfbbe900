//! Feedback endpoints
//!
//! - `POST /api/feedback` record feedback, possibly triggering learning
//! - `GET /api/feedback?action=stats|analyze`
//! - `POST /api/feedback/retrain` force a learning run
//! - `DELETE /api/feedback?confirm=yes` purge the history

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use lead_intel_scoring::{FeedbackOutcome, FeedbackRequest, LearningRun};

use crate::response::ApiResponse;
use crate::state::AppState;
use crate::ServerError;

#[derive(Debug, Default, Deserialize)]
pub struct FeedbackParams {
    pub action: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PurgeParams {
    pub confirm: Option<String>,
}

pub async fn submit_feedback(
    State(state): State<AppState>,
    body: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<ApiResponse<FeedbackOutcome>, ServerError> {
    let Json(request) = body?;
    let outcome = state.pipeline.record_feedback(request).await?;

    let message = match &outcome.learning {
        Some(run) if run.applied => format!(
            "Feedback recorded; learned weights updated to version {}",
            run.weights_version
        ),
        _ => "Feedback recorded".to_string(),
    };
    Ok(ApiResponse::created(outcome).with_message(message))
}

pub async fn query_feedback(
    State(state): State<AppState>,
    params: Result<Query<FeedbackParams>, QueryRejection>,
) -> Result<Response, ServerError> {
    let Query(params) = params?;
    match params.action.as_deref().map(str::trim) {
        Some("stats") => Ok(ApiResponse::ok(state.pipeline.feedback_stats().await?).into_response()),
        Some("analyze") => Ok(ApiResponse::ok(state.pipeline.analyze().await?).into_response()),
        _ => Err(ServerError::InvalidRequest(
            "action must be 'stats' or 'analyze'".to_string(),
        )),
    }
}

pub async fn retrain(State(state): State<AppState>) -> Result<ApiResponse<LearningRun>, ServerError> {
    let run = state.pipeline.retrain().await?;
    let message = if run.applied {
        format!("Learned weights updated to version {}", run.weights_version)
    } else {
        "No weight changes suggested".to_string()
    };
    Ok(ApiResponse::ok(run).with_message(message))
}

pub async fn purge_feedback(
    State(state): State<AppState>,
    params: Result<Query<PurgeParams>, QueryRejection>,
) -> Result<Response, ServerError> {
    let Query(params) = params?;
    if params.confirm.as_deref() != Some("yes") {
        return Err(ServerError::InvalidRequest(
            "purging feedback requires confirm=yes".to_string(),
        ));
    }

    let removed = state.pipeline.purge_feedback().await?;
    Ok(ApiResponse::ok(serde_json::json!({ "removed": removed }))
        .with_message(format!("Purged {} feedback records", removed))
        .into_response())
}
