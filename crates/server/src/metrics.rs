//! Prometheus metrics
//!
//! The recorder is installed once per process; `/metrics` renders it.

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static HANDLE: OnceCell<Option<PrometheusHandle>> = OnceCell::new();

/// Install the Prometheus recorder (idempotent)
pub fn init_metrics() -> Option<PrometheusHandle> {
    HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install Prometheus recorder");
                None
            }
        })
        .clone()
}

/// `GET /metrics`
pub async fn metrics_handler() -> impl IntoResponse {
    match HANDLE.get().and_then(|h| h.as_ref()) {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics disabled\n".to_string(),
        ),
    }
}

/// Count requests by method and status
pub async fn track_requests(request: Request, next: Next) -> Response {
    let method = request.method().as_str().to_string();
    let start = std::time::Instant::now();
    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    metrics::counter!("lead_intel_http_requests_total", "method" => method, "status" => status)
        .increment(1);
    metrics::histogram!("lead_intel_http_request_seconds").record(start.elapsed().as_secs_f64());
    response
}
