//! Retry policy.
//!
//! # Responsibilities
//! - Bound the number of attempts made against a single route
//! - Compute the pause between consecutive attempts on that route
//!
//! # Design Decisions
//! - Attempts are counted per route; advancing to the next route resets them
//! - No pause after the last attempt on a route
//! - Delays double from the base and are capped

use std::time::Duration;

use crate::config::RemoteConfig;
use crate::resilience::backoff::calculate_backoff;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter: bool,
}

impl RetryPolicy {
    /// Same backoff, different attempt budget.
    pub fn with_attempts(self, max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..self
        }
    }

    /// Pause after failed attempt `attempt` (1-based), or `None` when the
    /// route has no attempts left.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        Some(calculate_backoff(
            attempt,
            self.base_delay_ms,
            self.max_delay_ms,
            self.jitter,
        ))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RemoteConfig::default())
    }
}

impl From<&RemoteConfig> for RetryPolicy {
    fn from(config: &RemoteConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
            jitter: config.jitter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delays_until_exhausted() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Some(Duration::from_millis(500)));
        assert_eq!(policy.delay_after(2), Some(Duration::from_millis(1000)));
        assert_eq!(policy.delay_after(3), None);
    }

    #[test]
    fn test_attempt_override() {
        let policy = RetryPolicy::default().with_attempts(5);
        assert_eq!(policy.delay_after(4), Some(Duration::from_millis(4000)));
        assert_eq!(policy.delay_after(5), None);
        assert_eq!(RetryPolicy::default().with_attempts(0).max_attempts, 1);
    }
}
