//! Per-worker fetch rate limiting
//!
//! Every worker owns one [`RateLimiter`]. It only spaces out that worker's own
//! requests, so the pool as a whole issues up to `threadCount / interval`
//! requests per second.

use std::time::Duration;
use tokio::time::Instant;

/// Enforces a minimum interval between consecutive fetches of one worker
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_fetch: Option<Instant>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fetch: None,
        }
    }

    /// Waits until a fetch may be issued, then records it as issued
    ///
    /// The first call never waits. The wait is a timer sleep, so the worker
    /// yields to the runtime. Dropping the future before it completes leaves
    /// the previous timestamp in place.
    pub async fn acquire(&mut self) {
        if let Some(wait) = self.time_until_next_fetch(Instant::now()) {
            tracing::trace!("rate limiter sleeping {:?}", wait);
            tokio::time::sleep(wait).await;
        }
        self.last_fetch = Some(Instant::now());
    }

    /// Returns how long to wait before the next fetch, or `None` if it may
    /// happen now
    pub fn time_until_next_fetch(&self, now: Instant) -> Option<Duration> {
        let last = self.last_fetch?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.interval {
            Some(self.interval - elapsed)
        } else {
            None
        }
    }
}
