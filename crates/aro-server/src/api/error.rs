//! JSON error responses for API handlers.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use aro_core::error::{AroError, ClientCode};

/// Handler error: wraps `AroError` and renders it as `{"error", "message"}`.
#[derive(Debug)]
pub struct ApiError(pub AroError);

impl From<AroError> for ApiError {
    fn from(e: AroError) -> Self {
        Self(e)
    }
}

pub fn status_for(code: ClientCode) -> StatusCode {
    match code {
        ClientCode::BadRequest
        | ClientCode::InvalidSortField
        | ClientCode::InvalidPageRequest
        | ClientCode::InvalidMetric
        | ClientCode::UnsupportedVersion => StatusCode::BAD_REQUEST,
        ClientCode::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let status = status_for(code);
        if status.is_server_error() {
            tracing::error!(code = code.as_str(), error = %self.0, "request failed");
        } else {
            tracing::debug!(code = code.as_str(), error = %self.0, "request rejected");
        }

        let body = Json(json!({
            "error": code.as_str(),
            "message": self.0.to_string(),
        }));
        if code.is_retryable() {
            (status, [(header::RETRY_AFTER, "1")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
