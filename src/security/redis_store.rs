//! Redis-backed sliding-window store.
//!
//! The shared store for multi-instance deployments. Each check runs a
//! single Lua script against a per-key sorted set of millisecond
//! timestamps, so prune-count-record is atomic across every gateway
//! instance sharing the Redis. The connection manager reconnects on
//! its own after transient failures.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{Client, RedisError, Script};

use crate::security::rate_limit::{RateLimitDecision, RateLimitError, RateLimitStore};

/// Prune expired members, deny if the bucket is full, otherwise record
/// the attempt and refresh the key TTL. Returns the remaining budget,
/// or -1 when denied. The nonce keeps same-millisecond attempts from
/// different instances from collapsing into one member.
const SLIDING_WINDOW: &str = r#"
local cutoff = tonumber(ARGV[1]) - tonumber(ARGV[2])
redis.call('ZREMRANGEBYSCORE', KEYS[1], '-inf', cutoff)
local count = redis.call('ZCARD', KEYS[1])
if count >= tonumber(ARGV[3]) then
  return -1
end
redis.call('ZADD', KEYS[1], ARGV[1], ARGV[1] .. '-' .. ARGV[4])
redis.call('PEXPIRE', KEYS[1], ARGV[2])
return tonumber(ARGV[3]) - count - 1
"#;

/// Sliding-window limiter over a shared Redis.
pub struct RedisStore {
    conn: ConnectionManager,
    script: Script,
    window: Duration,
    max_requests: u32,
}

impl RedisStore {
    /// Connect to Redis and prepare the admission script.
    pub async fn connect(
        url: &str,
        window: Duration,
        max_requests: u32,
    ) -> Result<Self, RedisError> {
        let config = ConnectionManagerConfig::new().set_number_of_retries(1);
        let client = Client::open(url)?;
        let conn = client.get_connection_manager_with_config(config).await?;

        Ok(Self {
            conn,
            script: Script::new(SLIDING_WINDOW),
            window,
            max_requests,
        })
    }
}

fn decision_from_outcome(outcome: i64) -> RateLimitDecision {
    if outcome < 0 {
        RateLimitDecision::denied()
    } else {
        RateLimitDecision {
            allowed: true,
            remaining: outcome as u32,
        }
    }
}

#[async_trait]
impl RateLimitStore for RedisStore {
    async fn check_and_consume(&self, key: &str) -> Result<RateLimitDecision, RateLimitError> {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64;
        let nonce: u64 = rand::random();

        // The manager multiplexes one connection; cloning is cheap.
        let mut conn = self.conn.clone();
        let outcome: i64 = self
            .script
            .key(key)
            .arg(now_ms)
            .arg(self.window.as_millis() as i64)
            .arg(self.max_requests as i64)
            .arg(nonce)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| RateLimitError::Backend(e.to_string()))?;

        Ok(decision_from_outcome(outcome))
    }

    fn shared(&self) -> bool {
        true
    }
}
