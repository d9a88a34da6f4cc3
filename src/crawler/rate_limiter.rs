//! Per-job rate limiting
//!
//! The delay is measured from the *start* of the previous fetch. A fetch that
//! takes longer than the delay is followed immediately by the next one.

use std::time::Duration;
use tokio::time::Instant;

/// Enforces a minimum interval between the starts of consecutive fetches
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Minimum time between fetch starts
    delay: Duration,

    /// When the previous fetch started
    last_fetch: Option<Instant>,

    /// Number of fetches recorded
    fetch_count: u64,
}

impl RateLimiter {
    /// Creates a limiter with the given delay in milliseconds
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            last_fetch: None,
            fetch_count: 0,
        }
    }

    /// Returns true if a fetch may start at `now`
    pub fn can_fetch(&self, now: Instant) -> bool {
        self.time_until_ready(now).is_none()
    }

    /// Calculates the time until the next fetch may start
    ///
    /// Returns None if a fetch can start now, or the duration to wait otherwise.
    pub fn time_until_ready(&self, now: Instant) -> Option<Duration> {
        let last = self.last_fetch?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.delay {
            Some(self.delay - elapsed)
        } else {
            None
        }
    }

    /// Records that a fetch started at `now`
    pub fn record_fetch(&mut self, now: Instant) {
        self.last_fetch = Some(now);
        self.fetch_count += 1;
    }

    /// Sleeps until a fetch may start
    pub async fn wait(&self) {
        if let Some(wait) = self.time_until_ready(Instant::now()) {
            tracing::trace!("Rate limit: waiting {:?}", wait);
            tokio::time::sleep(wait).await;
        }
    }

    /// Number of fetches recorded so far
    pub fn fetch_count(&self) -> u64 {
        self.fetch_count
    }
}
