//! Fixed-window rate limiting for the ranking endpoint.
//!
//! Two backends: an in-process map for single-instance deployments and tests,
//! and Redis (`INCR` + `EXPIRE`) when several instances share one limit.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited { reset_time: DateTime<Utc> },
}

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Records one request for `key` and decides whether it may proceed.
    async fn check(&self, key: &str) -> Result<RateDecision>;
}

fn window_delta(window: Duration) -> chrono::Duration {
    chrono::Duration::from_std(window).unwrap_or_else(|_| chrono::Duration::seconds(60))
}

// ────────────────────────────────────────────────────────────────────────────
// In-process backend
// ────────────────────────────────────────────────────────────────────────────

struct Window {
    started: DateTime<Utc>,
    count: u64,
}

pub struct InMemoryRateLimiter {
    max_requests: u64,
    window: chrono::Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl InMemoryRateLimiter {
    pub fn new(max_requests: u64, window: Duration) -> Self {
        Self {
            max_requests,
            window: window_delta(window),
            windows: Mutex::new(HashMap::new()),
        }
    }

    async fn check_at(&self, key: &str, now: DateTime<Utc>) -> RateDecision {
        let mut windows = self.windows.lock().await;
        // Expired windows carry no state worth keeping.
        windows.retain(|_, w| now - w.started < self.window);

        let entry = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if entry.count >= self.max_requests {
            return RateDecision::Limited {
                reset_time: entry.started + self.window,
            };
        }

        entry.count += 1;
        RateDecision::Allowed
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.windows.lock().await.len()
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: &str) -> Result<RateDecision> {
        Ok(self.check_at(key, Utc::now()).await)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Redis backend
// ────────────────────────────────────────────────────────────────────────────

pub struct RedisRateLimiter {
    client: redis::Client,
    max_requests: u64,
    window: Duration,
}

impl RedisRateLimiter {
    pub fn new(client: redis::Client, max_requests: u64, window: Duration) -> Self {
        Self {
            client,
            max_requests,
            window,
        }
    }
}

/// Decision for a Redis window given the post-increment count and the key's TTL
/// (`-1` when the key has no expiry, `-2` when it is missing).
fn redis_decision(
    count: u64,
    ttl: i64,
    max_requests: u64,
    window: Duration,
    now: DateTime<Utc>,
) -> RateDecision {
    if count <= max_requests {
        return RateDecision::Allowed;
    }
    let remaining = if ttl > 0 {
        chrono::Duration::seconds(ttl)
    } else {
        window_delta(window)
    };
    RateDecision::Limited {
        reset_time: now + remaining,
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn check(&self, key: &str) -> Result<RateDecision> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("ratelimit:{key}");
        let window_secs = self.window.as_secs().max(1);

        let (count, ttl): (u64, i64) = redis::pipe()
            .atomic()
            .cmd("INCR")
            .arg(&key)
            .cmd("TTL")
            .arg(&key)
            .query_async(&mut conn)
            .await?;

        // A key without expiry (first hit, or an earlier EXPIRE that never landed)
        // is re-armed here so the window always closes.
        if ttl < 0 {
            redis::cmd("EXPIRE")
                .arg(&key)
                .arg(window_secs)
                .query_async::<_, ()>(&mut conn)
                .await?;
        }

        Ok(redis_decision(
            count,
            ttl,
            self.max_requests,
            self.window,
            Utc::now(),
        ))
    }
}
