//! Request pacing
//!
//! After every navigation the scraper pauses for a random duration drawn
//! from a fixed window, giving client-side content time to settle and
//! keeping the request rate against the catalog low. The policy is kept
//! apart from extraction so it can be tuned without touching either.

use crate::config::CrawlerConfig;
use rand::Rng;
use std::time::Duration;

/// Uniformly random delay in `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayPolicy {
    min: Duration,
    max: Duration,
}

impl DelayPolicy {
    /// Delay window; the bounds are swapped if given in reverse
    pub fn between(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn fixed(delay: Duration) -> Self {
        Self::between(delay, delay)
    }

    /// No pause at all
    pub fn none() -> Self {
        Self::fixed(Duration::ZERO)
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::between(
            Duration::from_millis(config.min_delay_ms),
            Duration::from_millis(config.max_delay_ms),
        )
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// Draws one delay from the window
    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let millis = rand::thread_rng()
            .gen_range(self.min.as_millis() as u64..=self.max.as_millis() as u64);
        Duration::from_millis(millis)
    }

    /// Sleeps for one sampled delay
    pub async fn pause(&self) {
        let delay = self.sample();
        if delay.is_zero() {
            return;
        }
        tracing::trace!("Settling for {:?}", delay);
        tokio::time::sleep(delay).await;
    }
}

impl Default for DelayPolicy {
    fn default() -> Self {
        Self::between(Duration::from_secs(5), Duration::from_secs(10))
    }
}
