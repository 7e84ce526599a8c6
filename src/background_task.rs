use chrono::Utc;
use tokio::{
    task::JoinHandle,
    time::{interval, Duration, MissedTickBehavior},
};

use crate::limiter::rate_limiter::RateLimiterStore;

pub const RATE_LIMIT_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Periodically drops rate-limit entries whose window has ended.
pub async fn start_rate_limit_sweep(store: RateLimiterStore, every: Duration) {
    let mut interval = interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // The first tick completes immediately
    interval.tick().await;

    loop {
        interval.tick().await;

        let removed = store.sweep_expired(Utc::now());
        tracing::debug!(
            removed,
            remaining = store.tracked_clients(),
            "Swept expired rate limit entries"
        );
    }
}

/// Spawns the sweep on the current runtime. Abort the handle on shutdown.
pub fn spawn_rate_limit_sweep(store: RateLimiterStore, every: Duration) -> JoinHandle<()> {
    tokio::spawn(start_rate_limit_sweep(store, every))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limiter::rate_limiter::RateLimitConfig;

    #[actix_rt::test]
    async fn sweep_task_clears_expired_entries() {
        let store = RateLimiterStore::new();
        let short = RateLimitConfig {
            max_requests: 1,
            window: std::time::Duration::from_millis(10),
            namespace: "test",
        };
        store.check_and_consume("client", &short);
        assert_eq!(store.tracked_clients(), 1);

        let handle = spawn_rate_limit_sweep(store.clone(), Duration::from_millis(25));
        tokio::time::sleep(Duration::from_millis(120)).await;
        handle.abort();

        assert_eq!(store.tracked_clients(), 0);
    }
}
