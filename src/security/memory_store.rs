//! In-process sliding-window store.
//!
//! Fallback for single-instance and development deployments. Keeps an
//! ordered timestamp list per key and prunes it on every check, with
//! an opportunistic full sweep so abandoned buckets do not accumulate
//! forever. Gives no protection behind a load balancer; production
//! refuses it via [`RateLimitStore::shared`].

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::security::rate_limit::{RateLimitDecision, RateLimitError, RateLimitStore};

/// How often expired buckets are swept out of the map.
const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Sliding-window limiter over a concurrent map.
pub struct MemoryStore {
    buckets: DashMap<String, Vec<Instant>>,
    window: Duration,
    max_requests: u32,
    last_sweep: Mutex<Instant>,
}

impl MemoryStore {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            buckets: DashMap::new(),
            window,
            max_requests,
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    /// Run the full sweep at most once per interval. Called on the
    /// request path, so the common case is a single mutex check.
    fn maybe_sweep(&self) {
        let now = Instant::now();
        {
            let mut last = self.last_sweep.lock().expect("sweep mutex poisoned");
            if now.duration_since(*last) < SWEEP_INTERVAL {
                return;
            }
            *last = now;
        }
        self.sweep(now);
    }

    /// Drop expired timestamps everywhere and remove empty buckets.
    fn sweep(&self, now: Instant) {
        self.buckets.retain(|_, timestamps| {
            timestamps.retain(|t| now.duration_since(*t) < self.window);
            !timestamps.is_empty()
        });
    }

    #[cfg(test)]
    fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

#[async_trait]
impl RateLimitStore for MemoryStore {
    async fn check_and_consume(&self, key: &str) -> Result<RateLimitDecision, RateLimitError> {
        self.maybe_sweep();

        let now = Instant::now();
        // The entry guard serializes concurrent checks on the same key.
        let mut bucket = self.buckets.entry(key.to_string()).or_default();
        bucket.retain(|t| now.duration_since(*t) < self.window);

        if bucket.len() >= self.max_requests as usize {
            return Ok(RateLimitDecision::denied());
        }

        bucket.push(now);
        Ok(RateLimitDecision {
            allowed: true,
            remaining: self.max_requests - bucket.len() as u32,
        })
    }

    fn shared(&self) -> bool {
        false
    }
}
