//! Rate limit contract and bucket key derivation.
//!
//! # Responsibilities
//! - Define the admission-check contract implemented by both stores
//! - Derive deterministic, non-reversible bucket keys from client identity
//!
//! # Design Decisions
//! - Keys carry a truncated SHA-256 digest, never the raw IP or session
//!   id, so the store contents do not leak client identity
//! - Anonymous traffic gets a distinct per-IP prefix: every session a
//!   client mints shares one bucket until it authenticates, which is
//!   the stricter policy for unauthenticated callers
//! - The store trait is object-safe so the handler can hold
//!   `Arc<dyn RateLimitStore>` picked at startup

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Prefix for session-scoped buckets.
const KEY_PREFIX: &str = "rl:";

/// Prefix for anonymous traffic, bucketed per IP only.
const IP_ONLY_PREFIX: &str = "rl:ip_only:";

/// Digest bytes kept in the key (hex-encoded, so twice this many characters).
const KEY_DIGEST_BYTES: usize = 16;

/// Outcome of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
}

impl RateLimitDecision {
    pub fn denied() -> Self {
        Self {
            allowed: false,
            remaining: 0,
        }
    }
}

/// Store-level failure. Backend details are flattened to a message so
/// callers stay independent of the concrete store.
#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("rate limit backend unavailable: {0}")]
    Backend(String),
}

/// Admission-control store.
///
/// `check_and_consume` must prune entries older than the window,
/// admit if fewer than the configured maximum remain, and record the
/// attempt atomically with respect to concurrent callers on the same
/// key. Implementations: [`crate::security::MemoryStore`] for a
/// single process, [`crate::security::RedisStore`] shared across
/// instances.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    async fn check_and_consume(&self, key: &str) -> Result<RateLimitDecision, RateLimitError>;

    /// True when the store coordinates across server instances.
    /// Production refuses to run behind a non-shared store.
    fn shared(&self) -> bool;
}

/// Derive the bucket key for a client.
///
/// With a verified session id the key hashes `ip|session`; without
/// one it hashes the IP alone under a distinct prefix. Pure function,
/// deterministic for identical inputs.
pub fn build_limit_key(ip: &str, session_id: Option<&str>) -> String {
    match session_id {
        Some(session_id) => {
            let digest = Sha256::digest(format!("{ip}|{session_id}"));
            format!("{KEY_PREFIX}{}", hex::encode(&digest[..KEY_DIGEST_BYTES]))
        }
        None => {
            let digest = Sha256::digest(ip);
            format!("{IP_ONLY_PREFIX}{}", hex::encode(&digest[..KEY_DIGEST_BYTES]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_deterministic() {
        let a = build_limit_key("203.0.113.9", Some("session-1"));
        let b = build_limit_key("203.0.113.9", Some("session-1"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_inputs_distinct_keys() {
        let base = build_limit_key("203.0.113.9", Some("session-1"));
        assert_ne!(base, build_limit_key("203.0.113.10", Some("session-1")));
        assert_ne!(base, build_limit_key("203.0.113.9", Some("session-2")));
    }

    #[test]
    fn test_anonymous_prefix_differs() {
        let anonymous = build_limit_key("203.0.113.9", None);
        let identified = build_limit_key("203.0.113.9", Some("session-1"));

        assert!(anonymous.starts_with(IP_ONLY_PREFIX));
        assert!(identified.starts_with(KEY_PREFIX));
        assert!(!identified.starts_with(IP_ONLY_PREFIX));
        assert_ne!(anonymous, identified);
    }

    #[test]
    fn test_key_shape() {
        let key = build_limit_key("203.0.113.9", Some("session-1"));
        let digest = key.strip_prefix(KEY_PREFIX).unwrap();
        assert_eq!(digest.len(), KEY_DIGEST_BYTES * 2);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_key_does_not_leak_identity() {
        let key = build_limit_key("203.0.113.9", Some("my-session-id"));
        assert!(!key.contains("203.0.113.9"));
        assert!(!key.contains("my-session-id"));
    }
}
