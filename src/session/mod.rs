//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! First visit (no cookie):
//!     → bootstrap.rs (middleware notices missing cookie)
//!     → token.rs (mint id.signature token)
//!     → Set-Cookie on the outgoing response
//!
//! Subsequent requests:
//!     → bootstrap.rs (cookie present, pass through)
//!     → token.rs (handler verifies signature, recovers session id)
//! ```
//!
//! # Design Decisions
//! - Tokens are self-authenticating; no server-side session storage
//! - Invalid tokens are indistinguishable from absent ones downstream

pub mod bootstrap;
pub mod token;

pub use bootstrap::{session_bootstrap, session_cookie_value, SESSION_COOKIE};
pub use token::{SecretError, TokenSigner};
