//! Scoring endpoints
//!
//! `POST /api/score` accepts exactly one of `leadId` (rescore and persist),
//! `lead` (ad-hoc preview, not persisted) or `all: true` (batch rescore).
//! `GET /api/score?leadId=` returns a stored score; without a lead id it
//! returns the active learned weights.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lead_intel_core::{Lead, ScoreBreakdown};
use lead_intel_scoring::NewLead;

use crate::response::ApiResponse;
use crate::state::AppState;
use crate::ServerError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    #[serde(default)]
    pub lead_id: Option<String>,
    #[serde(default)]
    pub lead: Option<NewLead>,
    #[serde(default)]
    pub all: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreParams {
    pub lead_id: Option<String>,
}

/// Stored score of a lead
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadScoreView {
    pub lead_id: String,
    pub score: u32,
    pub breakdown: ScoreBreakdown,
    pub explanation: Vec<String>,
    pub ml_adjusted: bool,
    pub ml_adjustments: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<Lead> for LeadScoreView {
    fn from(lead: Lead) -> Self {
        Self {
            lead_id: lead.id,
            score: lead.score,
            breakdown: lead.breakdown,
            explanation: lead.explanation,
            ml_adjusted: lead.ml_adjusted,
            ml_adjustments: lead.ml_adjustments,
            updated_at: lead.updated_at,
        }
    }
}

pub async fn score(
    State(state): State<AppState>,
    body: Result<Json<ScoreRequest>, JsonRejection>,
) -> Result<Response, ServerError> {
    let Json(request) = body?;
    let lead_id = request
        .lead_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());

    let targets = [lead_id.is_some(), request.lead.is_some(), request.all];
    if targets.iter().filter(|t| **t).count() != 1 {
        return Err(ServerError::InvalidRequest(
            "provide exactly one of leadId, lead or all".to_string(),
        ));
    }

    if let Some(id) = lead_id {
        let lead = state.pipeline.rescore(id).await?;
        return Ok(ApiResponse::ok(LeadScoreView::from(lead))
            .with_message("Lead rescored")
            .into_response());
    }

    if let Some(input) = request.lead {
        let scored = state.pipeline.score_input(input).await?;
        return Ok(ApiResponse::ok(scored).into_response());
    }

    let summary = state.pipeline.rescore_all().await?;
    let message = format!("Rescored {} leads ({} failed)", summary.rescored, summary.failed);
    Ok(ApiResponse::ok(summary).with_message(message).into_response())
}

pub async fn get_score(
    State(state): State<AppState>,
    params: Result<Query<ScoreParams>, QueryRejection>,
) -> Result<Response, ServerError> {
    let Query(params) = params?;
    match params.lead_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => {
            let lead = state.pipeline.lead(id).await?;
            Ok(ApiResponse::ok(LeadScoreView::from(lead)).into_response())
        }
        None => {
            let weights = state.pipeline.current_weights().await?;
            Ok(ApiResponse::ok(weights).into_response())
        }
    }
}
