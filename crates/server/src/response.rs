//! JSON response envelope
//!
//! Success: `{"ok": true, "data": ..., "message": ...}`
//! Failure: `{"ok": false, "error": "<kind>", "message": "<detail>"}`

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    ok: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data,
            message: None,
            status: StatusCode::OK,
        }
    }

    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(data)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ApiFailure<'a> {
    ok: bool,
    error: &'a str,
    message: String,
}

/// Error envelope with the given status
pub fn failure(status: StatusCode, kind: &str, message: String) -> Response {
    (
        status,
        Json(ApiFailure {
            ok: false,
            error: kind,
            message,
        }),
    )
        .into_response()
}
