//! Error taxonomy for the request gate.
//!
//! Every rejection becomes a JSON body `{error, code, ...}` with a
//! stable `code` for programmatic branching. Internal causes are
//! logged at the call site and collapsed to INTERNAL_ERROR here so no
//! stack detail reaches the caller.

use std::collections::BTreeMap;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::observability::metrics;

/// Rejection reasons, ordered as the gate checks them.
/// The Display string doubles as the user-facing `error` field.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid JSON body.")]
    InvalidJson,

    #[error("A session is required. Call GET /session first to obtain one.")]
    SessionRequired,

    #[error("Too many requests. Please try again shortly.")]
    RateLimitExceeded { retry_after_secs: u64 },

    #[error("The submitted form failed validation.")]
    Validation { details: BTreeMap<String, String> },

    #[error("Request rejected.")]
    BotDetected,

    #[error("The server is not configured for this deployment mode.")]
    Misconfigured,

    #[error("An unexpected error occurred.")]
    Internal,
}

impl ApiError {
    /// Stable machine-readable rejection code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidJson => "INVALID_JSON",
            ApiError::SessionRequired => "SESSION_REQUIRED",
            ApiError::RateLimitExceeded { .. } => "RATE_LIMIT_EXCEEDED",
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::BotDetected => "BOT_DETECTED",
            ApiError::Misconfigured => "SERVER_MISCONFIGURED",
            ApiError::Internal => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson | ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::SessionRequired => StatusCode::UNAUTHORIZED,
            ApiError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::BotDetected => StatusCode::FORBIDDEN,
            ApiError::Misconfigured => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        metrics::record_request(self.code());

        let mut body = json!({
            "error": self.to_string(),
            "code": self.code(),
        });
        match &self {
            ApiError::RateLimitExceeded { retry_after_secs } => {
                body["retryAfter"] = json!(retry_after_secs);
            }
            ApiError::Validation { details } => {
                body["details"] = json!(details);
            }
            _ => {}
        }

        let mut response = (self.status(), Json(body)).into_response();
        if let ApiError::RateLimitExceeded { retry_after_secs } = &self {
            if let Ok(value) = header::HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn response_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::InvalidJson.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::SessionRequired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::RateLimitExceeded { retry_after_secs: 60 }.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::Validation { details: BTreeMap::new() }.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::BotDetected.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::Misconfigured.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ApiError::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_rate_limit_response_carries_retry_after() {
        let response = ApiError::RateLimitExceeded { retry_after_secs: 60 }.into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "60");

        let body = response_json(response).await;
        assert_eq!(body["code"], "RATE_LIMIT_EXCEEDED");
        assert_eq!(body["retryAfter"], 60);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_validation_response_carries_details() {
        let mut details = BTreeMap::new();
        details.insert(
            "jobDescription".to_string(),
            "Please provide a longer job description.".to_string(),
        );
        let response = ApiError::Validation { details }.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response_json(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(
            body["details"]["jobDescription"],
            "Please provide a longer job description."
        );
    }

    #[tokio::test]
    async fn test_internal_error_reveals_nothing() {
        let response = ApiError::Internal.into_response();
        let body = response_json(response).await;

        assert_eq!(body["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"], "An unexpected error occurred.");
        assert!(body.get("details").is_none());
    }
}
