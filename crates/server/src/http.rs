//! HTTP Endpoints
//!
//! REST API for lead ingestion, scoring and feedback.

use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderValue, Method, StatusCode},
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::metrics::{metrics_handler, track_requests};
use crate::rate_limit::rate_limit_middleware;
use crate::state::AppState;
use crate::{feedback, leads, score};

const DEFAULT_ORIGIN: &str = "http://localhost:3000";

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let server = &state.config.server;
    let cors_layer = build_cors_layer(&server.cors_origins, server.cors_enabled);
    let timeout = Duration::from_secs(server.timeout_seconds);

    Router::new()
        .route("/api/leads", post(leads::create_lead).get(leads::list_leads))
        .route("/api/leads/:id", get(leads::get_lead))
        .route("/api/score", post(score::score).get(score::get_score))
        .route(
            "/api/feedback",
            post(feedback::submit_feedback)
                .get(feedback::query_feedback)
                .delete(feedback::purge_feedback),
        )
        .route("/api/feedback/retrain", post(feedback::retrain))
        // Health check
        .route("/health", get(health_check))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(middleware::from_fn(track_requests))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns permissive layer (for dev)
/// - If cors_origins is empty or all invalid, allows localhost:3000 only
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];
    if parsed_origins.is_empty() {
        tracing::info!("No usable CORS origins configured, defaulting to {}", DEFAULT_ORIGIN);
        return CorsLayer::new()
            .allow_origin(HeaderValue::from_static(DEFAULT_ORIGIN))
            .allow_methods(methods)
            .allow_headers(Any);
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods(methods)
        .allow_headers(Any)
}

/// Health check that verifies the weights store answers
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let mut checks = serde_json::Map::new();

    let storage_ok = match state.pipeline.current_weights().await {
        Ok(weights) => {
            checks.insert(
                "storage".to_string(),
                serde_json::json!({
                    "status": "ok",
                    "backend": state.storage,
                    "weightsVersion": weights.version,
                    "weightsSampleSize": weights.sample_size,
                }),
            );
            true
        }
        Err(e) => {
            checks.insert(
                "storage".to_string(),
                serde_json::json!({
                    "status": "error",
                    "backend": state.storage,
                    "error": e.to_string(),
                }),
            );
            false
        }
    };

    checks.insert(
        "annotator".to_string(),
        serde_json::json!({
            "status": "ok",
            "backend": state.pipeline.annotator_name().unwrap_or("none"),
        }),
    );

    let (status, code) = if storage_ok {
        ("healthy", StatusCode::OK)
    } else {
        ("degraded", StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        code,
        Json(serde_json::json!({
            "status": status,
            "version": env!("CARGO_PKG_VERSION"),
            "checks": checks
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use lead_intel_config::{RateLimitConfig, Settings};
    use lead_intel_core::{NotificationChannel, SalesUser};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn settings() -> Settings {
        let mut settings = Settings::default();
        settings.sales_users = vec![SalesUser {
            id: "priya".to_string(),
            name: "Priya".to_string(),
            email: Some("priya@example.com".to_string()),
            phone: None,
            region: "Gujarat".to_string(),
            channels: vec![NotificationChannel::Email],
        }];
        settings
    }

    fn app() -> Router {
        create_router(AppState::in_memory(settings()))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn lead_body() -> Value {
        json!({
            "company": "UltraTech",
            "signal": "Urgent tender for diesel supply worth 500 crore",
            "sourceType": "tender_portal",
            "geo": "Gujarat",
            "trust": 90
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["checks"]["storage"]["backend"], "memory");
    }

    #[tokio::test]
    async fn test_ingest_and_fetch_lead() {
        let app = app();
        let (status, body) = send(&app, Method::POST, "/api/leads", Some(lead_body())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["ok"], true);
        assert_eq!(body["data"]["lead"]["assignedTo"], "priya");
        assert_eq!(body["data"]["notifications"].as_array().unwrap().len(), 1);

        let id = body["data"]["lead"]["id"].as_str().unwrap().to_string();
        let (status, body) = send(&app, Method::GET, &format!("/api/leads/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["company"], "UltraTech");

        let (status, body) = send(&app, Method::GET, "/api/leads?status=new", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_error_envelopes() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/api/leads/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"ok": false, "error": "not_found", "message": "Lead missing not found"}));

        let (status, body) = send(&app, Method::POST, "/api/leads", Some(json!({"company": "X"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation");

        let (status, _) = send(&app, Method::GET, "/api/leads?status=archived", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_score_endpoints() {
        let app = app();
        let (_, created) = send(&app, Method::POST, "/api/leads", Some(lead_body())).await;
        let id = created["data"]["lead"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(&app, Method::POST, "/api/score", Some(json!({"leadId": id}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["leadId"], id.as_str());
        assert_eq!(body["data"]["mlAdjusted"], false);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/score",
            Some(json!({"lead": {"company": "Acme", "signal": "profile update"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["score"].as_u64().unwrap() <= 100);

        let (_, body) = send(&app, Method::POST, "/api/score", Some(json!({"all": true}))).await;
        assert_eq!(body["data"]["rescored"], 1);

        let (status, _) = send(&app, Method::POST, "/api/score", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = send(&app, Method::GET, "/api/score", None).await;
        assert_eq!(body["data"]["version"], 0);

        let (_, body) = send(&app, Method::GET, &format!("/api/score?leadId={}", id), None).await;
        assert_eq!(body["data"]["leadId"], id.as_str());
    }

    #[tokio::test]
    async fn test_feedback_flow() {
        let app = app();
        let (_, created) = send(&app, Method::POST, "/api/leads", Some(lead_body())).await;
        let id = created["data"]["lead"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/feedback",
            Some(json!({"leadId": id, "userId": "priya", "action": "rejected", "rejectionReason": "too_small"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["leadStatus"], "rejected");

        let (status, body) = send(&app, Method::GET, "/api/feedback?action=stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], 1);

        let (_, body) = send(&app, Method::GET, "/api/feedback?action=analyze", None).await;
        assert_eq!(body["data"]["insights"].as_array().unwrap().len(), 1);

        let (status, _) = send(&app, Method::GET, "/api/feedback", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, Method::POST, "/api/feedback/retrain", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["applied"], false);

        let (status, _) = send(&app, Method::DELETE, "/api/feedback", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, body) = send(&app, Method::DELETE, "/api/feedback?confirm=yes", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["removed"], 1);
    }

    #[tokio::test]
    async fn test_rate_limit_returns_envelope() {
        let mut settings = settings();
        settings.server.rate_limit = RateLimitConfig {
            enabled: true,
            requests_per_minute: 1,
            exempt_paths: vec!["/health".to_string()],
        };
        let app = create_router(AppState::in_memory(settings));

        let (status, _) = send(&app, Method::GET, "/api/score", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(&app, Method::GET, "/api/score", None).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], "rate_limited");

        let (status, _) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
