//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (admissions, rejections, stream outcomes)
//! - Expose a Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by outcome code
//! - `gateway_rate_limited_total` (counter): admission denials
//! - `gateway_stream_outcomes_total` (counter): streams by outcome
//! - `gateway_stream_bytes_total` (counter): bytes forwarded to clients
//! - `gateway_stream_duration_seconds` (histogram): stream lifetimes
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Outcome code as the only request label to keep cardinality flat
//! - Exporter failure logs and continues; metrics are not load-bearing

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on its own listener. Must run inside
/// the Tokio runtime. Exporter failure is logged, not fatal.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            metrics::describe_counter!(
                "gateway_requests_total",
                "Requests handled, labelled by outcome code"
            );
            metrics::describe_counter!(
                "gateway_rate_limited_total",
                "Requests denied by the rate limiter"
            );
            metrics::describe_counter!(
                "gateway_stream_outcomes_total",
                "Generation streams by outcome"
            );
            metrics::describe_counter!(
                "gateway_stream_bytes_total",
                "Bytes forwarded from the generation API to clients"
            );
            metrics::describe_histogram!(
                "gateway_stream_duration_seconds",
                "Wall-clock lifetime of generation streams"
            );
            tracing::info!(address = %addr, "metrics endpoint started");
        }
        Err(error) => {
            tracing::error!(error = %error, "failed to start metrics endpoint");
        }
    }
}

/// Count one handled request by its outcome code ("OK" or an error code).
pub fn record_request(code: &'static str) {
    metrics::counter!("gateway_requests_total", "code" => code).increment(1);
}

/// Count one admission denial.
pub fn record_rate_limited() {
    metrics::counter!("gateway_rate_limited_total").increment(1);
}

/// Record the outcome of one generation stream.
pub fn record_stream(bytes: u64, elapsed: Duration, completed: bool) {
    let outcome = if completed { "completed" } else { "aborted" };
    metrics::counter!("gateway_stream_outcomes_total", "outcome" => outcome).increment(1);
    metrics::counter!("gateway_stream_bytes_total").increment(bytes);
    metrics::histogram!("gateway_stream_duration_seconds").record(elapsed.as_secs_f64());
}
