//! Lead Intelligence Server
//!
//! HTTP endpoints for lead ingestion, scoring and feedback learning.

pub mod feedback;
pub mod http;
pub mod leads;
pub mod metrics;
pub mod rate_limit;
pub mod response;
pub mod score;
pub mod state;

pub use http::create_router;
pub use metrics::{init_metrics, metrics_handler};
pub use rate_limit::{RateLimitError, RateLimiter};
pub use state::{AppState, Backends};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Pipeline(#[from] lead_intel_core::Error),

    #[error("Rate limit exceeded, retry in {0}s")]
    RateLimit(u64),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Pipeline(lead_intel_core::Error::NotFound(_)) => StatusCode::NOT_FOUND,
            ServerError::Pipeline(lead_intel_core::Error::Validation(_)) => StatusCode::BAD_REQUEST,
            ServerError::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::RateLimit(_) => StatusCode::TOO_MANY_REQUESTS,
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable kind for the error envelope
    pub fn kind(&self) -> &'static str {
        match self {
            ServerError::Pipeline(e) => e.kind(),
            ServerError::RateLimit(_) => "rate_limited",
            ServerError::InvalidRequest(_) => "validation",
            ServerError::Internal(_) => "internal",
        }
    }
}

impl From<ServerError> for StatusCode {
    fn from(err: ServerError) -> Self {
        err.status_code()
    }
}

impl From<axum::extract::rejection::JsonRejection> for ServerError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        ServerError::InvalidRequest(rejection.body_text())
    }
}

impl From<axum::extract::rejection::QueryRejection> for ServerError {
    fn from(rejection: axum::extract::rejection::QueryRejection) -> Self {
        ServerError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }
        response::failure(status, self.kind(), self.to_string())
    }
}
