//! Request-admission gateway for a text-generation API.

pub mod config;
pub mod http;
pub mod observability;
pub mod prompt;
pub mod security;
pub mod session;
pub mod upstream;

pub use config::GatewayConfig;
pub use http::{AppState, GatewayServer};
pub use session::TokenSigner;
