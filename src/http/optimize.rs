//! The optimize request gate.
//!
//! # Responsibilities
//! - Enforce the admission sequence for POST /optimize, in order:
//!   parse, resolve session, rate limit, require session, validate,
//!   honeypot, escape, submit, stream
//! - Keep rate limiting ahead of the session check so anonymous
//!   floods are throttled instead of probing the auth response
//!
//! # Design Decisions
//! - The limiter consumes a slot for every parseable request, even
//!   ones later rejected; retries of failing requests are not free
//! - Rejections map to ApiError; only genuinely unexpected failures
//!   become INTERNAL_ERROR, with the cause logged server-side only

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;

use crate::http::error::ApiError;
use crate::http::payload::OptimizeRequest;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::prompt::OptimizationPrompt;
use crate::security::build_limit_key;
use crate::session::session_cookie_value;

/// POST /optimize.
pub async fn optimize_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    // 1. Parse the body. Syntax errors end here.
    let raw: serde_json::Value =
        serde_json::from_slice(&body).map_err(|_| ApiError::InvalidJson)?;
    let payload = parse_payload(raw)?;

    // 2. Resolve the session without rejecting yet: anonymous callers
    // must still be counted by the limiter first.
    let session_id =
        session_cookie_value(&headers).and_then(|token| state.signer.verify_token(&token));

    // 3. Derive the bucket key from client identity.
    let ip = client_ip(&headers);
    let key = build_limit_key(&ip, session_id.as_deref());

    // An in-process store behind a load balancer limits nothing.
    // Startup validation normally catches this; refuse traffic in
    // case a production deployment reaches here anyway.
    if state.environment.is_production() && !state.limiter.shared() {
        tracing::error!("production traffic on a non-shared rate limit store");
        return Err(ApiError::Misconfigured);
    }

    // 4. Consume an admission slot. This happens for every request,
    // whatever the later checks decide.
    let decision = state.limiter.check_and_consume(&key).await.map_err(|error| {
        tracing::error!(error = %error, "rate limit store failure");
        ApiError::Internal
    })?;
    if !decision.allowed {
        tracing::warn!(anonymous = session_id.is_none(), "rate limit exceeded");
        metrics::record_rate_limited();
        return Err(ApiError::RateLimitExceeded {
            retry_after_secs: state.retry_after_secs,
        });
    }

    // 5. Now require a verified session.
    let Some(session_id) = session_id else {
        return Err(ApiError::SessionRequired);
    };
    tracing::debug!(session = %session_id, "session verified");

    // 6. Length bounds on the four text fields.
    payload
        .validate()
        .map_err(|details| ApiError::Validation { details })?;

    // 7. Honeypot: the hidden field stays empty for humans.
    if !payload.website.is_empty() {
        tracing::warn!("honeypot field populated, rejecting");
        return Err(ApiError::BotDetected);
    }
    if let Some(elapsed_ms) = payload.time_to_submit_ms(now_ms()) {
        tracing::debug!(time_to_submit_ms = elapsed_ms, "form timing signal");
    }

    // 8-9. Escape the free-text fields into the prompt and submit.
    let prompt = OptimizationPrompt::build(
        &payload.job_description,
        &payload.current_role,
        &payload.target_role,
        &payload.resume_text,
    );
    let stream = state
        .generator
        .stream_optimization(&prompt)
        .await
        .map_err(|error| {
            tracing::error!(error = %error, "generation call failed");
            ApiError::Internal
        })?;

    tracing::info!(remaining = decision.remaining, "optimization admitted");
    metrics::record_request("OK");

    // 10. Forward chunks as they arrive.
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .body(Body::from_stream(stream))
        .map_err(|error| {
            tracing::error!(error = %error, "failed to build streaming response");
            ApiError::Internal
        })
}

/// Map structurally-wrong payloads (for example a numeric field where
/// a string belongs) to a validation rejection rather than a parse
/// rejection: the body was valid JSON, its shape was not.
fn parse_payload(raw: serde_json::Value) -> Result<OptimizeRequest, ApiError> {
    serde_json::from_value(raw).map_err(|_| {
        let mut details = BTreeMap::new();
        details.insert(
            "payload".to_string(),
            "Text fields must be strings.".to_string(),
        );
        ApiError::Validation { details }
    })
}

/// Resolve the client IP: first hop of x-forwarded-for, then
/// x-real-ip, then "unknown". Headers are set by the fronting proxy;
/// absent one, all direct traffic shares the unknown bucket.
fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        return forwarded.to_string();
    }

    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
