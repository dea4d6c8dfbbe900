//! Lead endpoints
//!
//! - `POST /api/leads` ingest a signal
//! - `GET /api/leads` list with optional `status` and `limit`
//! - `GET /api/leads/:id` fetch one lead

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use lead_intel_core::{Lead, LeadFilter, LeadStatus};
use lead_intel_scoring::{IngestOutcome, NewLead};

use crate::response::ApiResponse;
use crate::state::AppState;
use crate::ServerError;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    pub limit: Option<usize>,
}

impl ListParams {
    fn into_filter(self) -> Result<LeadFilter, ServerError> {
        let status = match self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(LeadStatus::parse(raw).ok_or_else(|| {
                ServerError::InvalidRequest(format!("unknown status '{}'", raw))
            })?),
            None => None,
        };
        Ok(LeadFilter {
            status,
            limit: self.limit,
        })
    }
}

pub async fn create_lead(
    State(state): State<AppState>,
    body: Result<Json<NewLead>, JsonRejection>,
) -> Result<ApiResponse<IngestOutcome>, ServerError> {
    let Json(input) = body?;
    let outcome = state.pipeline.ingest(input).await?;
    let message = match &outcome.lead.assigned_to {
        Some(owner) => format!("Lead scored {} and assigned to {}", outcome.lead.score, owner),
        None => format!("Lead scored {}; no sales user covers its region", outcome.lead.score),
    };
    Ok(ApiResponse::created(outcome).with_message(message))
}

pub async fn list_leads(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<ApiResponse<Vec<Lead>>, ServerError> {
    let Query(params) = params?;
    let filter = params.into_filter()?;
    let leads = state.pipeline.list_leads(&filter).await?;
    Ok(ApiResponse::ok(leads))
}

pub async fn get_lead(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Lead>, ServerError> {
    Ok(ApiResponse::ok(state.pipeline.lead(&id).await?))
}
