//! Backoff between session re-setups after a non-401 close.

use std::time::Duration;
use wapair_core::cache::RetryCounterCache;
use wapair_core::config::ReconnectConfig;

const ATTEMPT_KEY: &str = "reconnect";

/// `base * 2^(attempt-1)`, capped at `max`.
pub fn backoff_delay(base: Duration, max: Duration, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    base.saturating_mul(factor).min(max)
}

/// Counts reconnect attempts inside a sliding window and paces them.
pub struct ReconnectPolicy {
    config: ReconnectConfig,
    attempts: RetryCounterCache,
}

impl ReconnectPolicy {
    pub fn new(config: ReconnectConfig) -> Self {
        let attempts = RetryCounterCache::new(config.window());
        Self { config, attempts }
    }

    /// Record an attempt and return how long to wait before it.
    ///
    /// `None` means the attempt budget is spent and the session should end.
    pub fn next_delay(&self) -> Option<(u32, Duration)> {
        let attempt = self.attempts.increment(ATTEMPT_KEY.to_string());
        if self.config.max_attempts.is_some_and(|max| attempt > max) {
            return None;
        }
        let delay = backoff_delay(
            Duration::from_millis(self.config.base_delay_ms),
            Duration::from_millis(self.config.max_delay_ms),
            attempt,
        );
        Some((attempt, delay))
    }
}
