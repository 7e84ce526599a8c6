use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Request budget for one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
    /// Key prefix, so presets never share a counter.
    pub namespace: &'static str,
}

impl RateLimitConfig {
    /// Form submissions: 5 per hour per client.
    pub const FORM_SUBMISSION: RateLimitConfig = RateLimitConfig {
        max_requests: 5,
        window: Duration::from_secs(60 * 60),
        namespace: "form",
    };

    /// General API calls: 60 per minute.
    pub const API: RateLimitConfig = RateLimitConfig {
        max_requests: 60,
        window: Duration::from_secs(60),
        namespace: "api",
    };

    /// Read-only endpoints: 100 per minute.
    pub const READ: RateLimitConfig = RateLimitConfig {
        max_requests: 100,
        window: Duration::from_secs(60),
        namespace: "read",
    };

    fn window_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.window).unwrap_or(chrono::Duration::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub window_reset_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed {
        limit: u32,
        remaining: u32,
        reset_at: DateTime<Utc>,
    },
    Rejected {
        retry_after_secs: u64,
        limit: u32,
        reset_at: DateTime<Utc>,
    },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

/// Fixed-window request counters keyed by client.
///
/// A window opens on a key's first request and is replaced lazily by the first
/// request after it ends. `sweep_expired` drops entries nobody has come back for.
/// Counters live in this process only.
#[derive(Clone, Default)]
pub struct RateLimiterStore {
    map: Arc<DashMap<String, RateLimitEntry>>,
}

impl RateLimiterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check_and_consume(&self, client_key: &str, config: &RateLimitConfig) -> RateLimitDecision {
        self.check_and_consume_at(client_key, config, Utc::now())
    }

    pub fn check_and_consume_at(
        &self,
        client_key: &str,
        config: &RateLimitConfig,
        now: DateTime<Utc>,
    ) -> RateLimitDecision {
        let key = format!("ratelimit:{}:{}", config.namespace, client_key);
        let limit = config.max_requests;

        // The entry guard holds the shard lock, so the read-modify-write is atomic per key
        let mut entry = self.map.entry(key).or_insert_with(|| RateLimitEntry {
            count: 0,
            window_reset_at: now + config.window_chrono(),
        });

        if entry.count == 0 || entry.window_reset_at <= now {
            *entry = RateLimitEntry {
                count: 1,
                window_reset_at: now + config.window_chrono(),
            };
            return RateLimitDecision::Allowed {
                limit,
                remaining: limit.saturating_sub(1),
                reset_at: entry.window_reset_at,
            };
        }

        if entry.count >= limit {
            let remaining_ms = (entry.window_reset_at - now).num_milliseconds().max(0) as u64;
            return RateLimitDecision::Rejected {
                retry_after_secs: remaining_ms.div_ceil(1000).max(1),
                limit,
                reset_at: entry.window_reset_at,
            };
        }

        entry.count += 1;
        RateLimitDecision::Allowed {
            limit,
            remaining: limit.saturating_sub(entry.count),
            reset_at: entry.window_reset_at,
        }
    }

    /// Removes every entry whose window has ended. Returns how many were dropped.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.map.len();
        self.map.retain(|_, entry| entry.window_reset_at > now);
        before.saturating_sub(self.map.len())
    }

    pub fn tracked_clients(&self) -> usize {
        self.map.len()
    }
}
