//! Request pacing for one fetch client
//!
//! Every request made through a fetch client, result pages and detail pages
//! alike, first waits here until the minimum interval since the previous
//! request has elapsed. The interval is `min_interval` plus a random jitter
//! drawn when each request is recorded.

use crate::config::FetchConfig;
use rand::Rng;
use std::time::{Duration, Instant};

/// Minimum-interval pacing state
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Fixed part of the interval between requests
    min_interval: Duration,

    /// Upper bound of the random extra interval
    jitter: Duration,

    /// Interval required before the next request (min_interval + drawn jitter)
    next_interval: Duration,

    /// When the last request was issued
    last_request_time: Option<Instant>,

    /// Requests issued through this limiter
    request_count: u64,
}

impl RateLimiter {
    pub fn new(min_interval: Duration, jitter: Duration) -> Self {
        Self {
            min_interval,
            jitter,
            next_interval: min_interval,
            last_request_time: None,
            request_count: 0,
        }
    }

    /// Builds a limiter from the `[fetch]` pacing keys
    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(
            Duration::from_millis(config.min_interval_ms),
            Duration::from_millis(config.interval_jitter_ms),
        )
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now, or the duration to wait otherwise.
    pub fn time_until_next_request(&self, now: Instant) -> Option<Duration> {
        let last = self.last_request_time?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.next_interval {
            Some(self.next_interval - elapsed)
        } else {
            None
        }
    }

    /// Records that a request was issued at `now`
    ///
    /// Draws the jitter that applies before the following request.
    pub fn record_request(&mut self, now: Instant) {
        self.request_count += 1;
        self.last_request_time = Some(now);
        self.next_interval = self.min_interval + self.draw_jitter();
    }

    /// Waits until a request is allowed, then records it
    pub async fn acquire(&mut self) {
        if let Some(wait) = self.time_until_next_request(Instant::now()) {
            tracing::trace!("Pacing: sleeping {:?} before next request", wait);
            tokio::time::sleep(wait).await;
        }
        self.record_request(Instant::now());
    }

    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    fn draw_jitter(&self) -> Duration {
        let max_ms = self.jitter.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
    }
}
