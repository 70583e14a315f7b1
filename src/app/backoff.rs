//! Exponential backoff between primary-model attempts.

use std::time::Duration;

use crate::domain::RetryConfig;

/// Highest exponent applied to the base delay. The cap takes over long before.
const MAX_EXPONENT: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    max_retries: u32,
    base_delay: Duration,
    max_backoff: Duration,
}

impl BackoffPolicy {
    pub fn new(max_retries: u32, base_delay: Duration, max_backoff: Duration) -> Self {
        Self { max_retries: max_retries.max(1), base_delay, max_backoff: max_backoff.max(base_delay) }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.max_backoff_ms),
        )
    }

    /// Primary-model attempts per stage.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn max_backoff(&self) -> Duration {
        self.max_backoff
    }

    /// `min(base * 2^(n-1), max_backoff)` for the `n`th failed attempt.
    pub fn backoff(&self, failed_attempt: u32) -> Duration {
        // attempt=1 -> base, attempt=2 -> base*2, attempt=3 -> base*4, capped.
        let exponent = failed_attempt.saturating_sub(1).min(MAX_EXPONENT);
        self.base_delay.saturating_mul(1_u32 << exponent).min(self.max_backoff)
    }

    /// Delay before the next attempt. A provider-requested delay replaces the
    /// computed backoff but is still capped.
    pub fn delay_for(&self, failed_attempt: u32, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(requested) => requested.min(self.max_backoff),
            None => self.backoff(failed_attempt),
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
