//! HTTP surface of the gateway.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack, session bootstrap)
//!     → optimize.rs (admission sequence for POST /optimize)
//!     → payload.rs (parse & validate the request body)
//!     → error.rs (rejections become stable {error, code} JSON)
//!     → streamed response from the upstream subsystem
//! ```

pub mod error;
pub mod optimize;
pub mod payload;
pub mod server;

pub use error::ApiError;
pub use payload::OptimizeRequest;
pub use server::{AppState, GatewayServer};
