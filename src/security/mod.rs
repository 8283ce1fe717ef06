//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (derive bucket key from IP + session id)
//!     → memory_store.rs or redis_store.rs (check-and-consume)
//!     → admitted or 429
//! ```
//!
//! # Design Decisions
//! - Fail closed: a store error rejects the request, never waves it through
//! - Store selection happens once at startup; handlers see one trait object
//! - No trust in client input: identity headers feed a hash, nothing else

pub mod memory_store;
pub mod rate_limit;
pub mod redis_store;

pub use memory_store::MemoryStore;
pub use rate_limit::{build_limit_key, RateLimitDecision, RateLimitError, RateLimitStore};
pub use redis_store::RedisStore;
