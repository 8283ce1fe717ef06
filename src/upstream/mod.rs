//! Upstream generation subsystem.
//!
//! # Data Flow
//! ```text
//! OptimizationPrompt
//!     → client.rs (POST chat/completions, stream: true)
//!     → stream.rs (MeteredStream wraps the byte stream)
//!     → axum Body::from_stream → client
//! ```

pub mod client;
pub mod stream;

pub use client::{GenerationClient, UpstreamError};
pub use stream::MeteredStream;
