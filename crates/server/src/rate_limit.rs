//! Fixed-window rate limiting
//!
//! Each client key gets `requests_per_minute` requests per one-minute window.
//! The key is the first hop of `x-forwarded-for`, then `x-real-ip`, else
//! `anonymous`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use parking_lot::Mutex;
use thiserror::Error;

use lead_intel_config::RateLimitConfig;

use crate::state::AppState;
use crate::ServerError;

const WINDOW: Duration = Duration::from_secs(60);
/// Stale windows are swept once the table grows past this
const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Rate limit exceeded for {key}, retry in {retry_after_secs}s")]
pub struct RateLimitError {
    pub key: String,
    pub retry_after_secs: u64,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Per-client fixed-window limiter
#[derive(Debug)]
pub struct RateLimiter {
    enabled: bool,
    limit: u32,
    exempt_paths: Vec<String>,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            enabled: config.enabled,
            limit: config.requests_per_minute,
            exempt_paths: config.exempt_paths.clone(),
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_exempt(&self, path: &str) -> bool {
        !self.enabled || self.exempt_paths.iter().any(|p| p == path)
    }

    /// Count one request for the key
    pub fn check(&self, key: &str) -> Result<(), RateLimitError> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<(), RateLimitError> {
        if !self.enabled {
            return Ok(());
        }

        let mut windows = self.windows.lock();
        if windows.len() > SWEEP_THRESHOLD {
            windows.retain(|_, w| now.duration_since(w.started) < WINDOW);
        }

        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(window.started) >= WINDOW {
            *window = Window {
                started: now,
                count: 0,
            };
        }

        if window.count >= self.limit {
            let elapsed = now.duration_since(window.started);
            let retry_after_secs = WINDOW.saturating_sub(elapsed).as_secs().max(1);
            return Err(RateLimitError {
                key: key.to_string(),
                retry_after_secs,
            });
        }

        window.count += 1;
        Ok(())
    }
}

/// Client key from proxy headers
pub fn client_key(headers: &HeaderMap) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    header("x-forwarded-for")
        .or_else(|| header("x-real-ip"))
        .unwrap_or_else(|| "anonymous".to_string())
}

/// Axum middleware enforcing the limiter
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let limiter = &state.rate_limiter;
    if limiter.is_exempt(request.uri().path()) {
        return next.run(request).await;
    }

    let key = client_key(request.headers());
    match limiter.check(&key) {
        Ok(()) => next.run(request).await,
        Err(e) => {
            metrics::counter!("lead_intel_rate_limited_total").increment(1);
            tracing::warn!(client = %e.key, path = %request.uri().path(), "Rate limit exceeded");
            ServerError::RateLimit(e.retry_after_secs).into_response()
        }
    }
}
