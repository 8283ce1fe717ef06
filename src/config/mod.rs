//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (overlay environment variables: APP_ENV,
//!       SESSION_SECRET, REDIS_URL, GENERATION_API_KEY, GENERATION_API_URL)
//!     → validation.rs (semantic checks, production requirements)
//!     → GatewayConfig (validated, immutable)
//!     → shared via AppState with all handlers
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults so a bare binary runs in development
//! - Secrets come from the environment, not from files on disk
//! - Production mode turns missing-secret and missing-store into
//!   startup failures instead of silent downgrades

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{Environment, GatewayConfig};
pub use schema::{
    LimitsConfig, ListenerConfig, ObservabilityConfig, RateLimitConfig, SessionConfig,
    TimeoutConfig, UpstreamConfig,
};
