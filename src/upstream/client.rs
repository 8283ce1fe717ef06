//! Generation API client.
//!
//! # Responsibilities
//! - Submit assembled prompts to an OpenAI-compatible chat endpoint
//! - Request a streamed, JSON-constrained completion
//! - Surface upstream failures without leaking them to callers
//!
//! # Design Decisions
//! - The response body is returned as a stream, never buffered; the
//!   handler forwards chunks as they arrive
//! - Non-2xx upstream responses are logged (truncated) and collapsed
//!   into one error variant; the caller maps them to a generic 500

use std::time::Duration;

use serde_json::{json, Value};
use thiserror::Error;

use crate::config::UpstreamConfig;
use crate::prompt::OptimizationPrompt;
use crate::upstream::stream::MeteredStream;

/// Failures talking to the generation API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("failed to reach the generation API: {0}")]
    Request(#[from] reqwest::Error),

    #[error("generation API returned status {status}")]
    Status { status: reqwest::StatusCode },

    #[error("generation stream failed: {0}")]
    Stream(reqwest::Error),
}

/// HTTP client for the generation API.
pub struct GenerationClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GenerationClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Submit the prompt and return the streaming response body.
    pub async fn stream_optimization(
        &self,
        prompt: &OptimizationPrompt,
    ) -> Result<MeteredStream, UpstreamError> {
        let mut request = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request_body(&self.model, prompt));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %truncate(&body, 256),
                "generation API rejected the request"
            );
            return Err(UpstreamError::Status { status });
        }

        Ok(MeteredStream::new(response.bytes_stream()))
    }
}

fn request_body(model: &str, prompt: &OptimizationPrompt) -> Value {
    json!({
        "model": model,
        "stream": true,
        "response_format": { "type": "json_object" },
        "messages": [
            { "role": "system", "content": prompt.system },
            { "role": "user", "content": prompt.user },
        ],
    })
}

/// Byte-limited prefix that never splits a UTF-8 character.
fn truncate(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
