//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured fields, filtered by RUST_LOG)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging via tracing; the subscriber is installed in main
//! - Metrics are cheap (atomic increments) and never block a request
//! - Rejected requests log the outcome code, never payload contents

pub mod metrics;
