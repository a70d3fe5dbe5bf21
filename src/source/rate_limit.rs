//! Request budget for HTTP sources
//!
//! Token bucket on top of governor. A source waits for a token before every
//! attempt, retries included, so a burst of page changes cannot exceed the
//! endpoint's published limit.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::debug;

/// Window the request budget refills over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatePeriod {
    #[default]
    Second,
    Minute,
}

/// `requests` per `per`, with up to `burst` sent back to back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub requests: u32,

    #[serde(default)]
    pub per: RatePeriod,

    /// Bucket size; defaults to `requests`
    #[serde(default)]
    pub burst: Option<u32>,
}

impl RateLimitConfig {
    /// `requests` per second
    pub fn per_second(requests: u32) -> Self {
        Self {
            requests,
            per: RatePeriod::Second,
            burst: None,
        }
    }

    /// `requests` per minute
    pub fn per_minute(requests: u32) -> Self {
        Self {
            requests,
            per: RatePeriod::Minute,
            burst: None,
        }
    }

    #[must_use]
    pub fn with_burst(mut self, burst: u32) -> Self {
        self.burst = Some(burst);
        self
    }

    /// Governor quota; zero values are raised to 1
    fn quota(&self) -> Quota {
        let requests = NonZeroU32::new(self.requests).unwrap_or(NonZeroU32::MIN);
        let burst = self
            .burst
            .and_then(NonZeroU32::new)
            .unwrap_or(requests);
        let quota = match self.per {
            RatePeriod::Second => Quota::per_second(requests),
            RatePeriod::Minute => Quota::per_minute(requests),
        };
        quota.allow_burst(burst)
    }
}

/// Shared token bucket
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            limiter: Arc::new(Governor::direct(config.quota())),
        }
    }

    /// Wait for a token before requesting page `current`
    pub async fn acquire(&self, current: u32) {
        if self.try_acquire() {
            return;
        }
        debug!(current, "Request budget exhausted, throttling");
        self.limiter.until_ready().await;
    }

    /// Take a token if one is available right now
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish_non_exhaustive()
    }
}
