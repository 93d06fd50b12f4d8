/// Deterministic exponential backoff with a bounded attempt budget
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffConfig {
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Growth factor applied per attempt
    pub multiplier: u32,
    /// Number of retries allowed before giving up
    pub max_attempts: u32,
    /// Upper bound for a single delay
    pub max_delay: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(1000),
            multiplier: 2,
            max_attempts: 5,
            max_delay: Duration::from_secs(300),
        }
    }
}

impl BackoffConfig {
    pub fn new(base_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_attempts,
            ..Default::default()
        }
    }

    /// Delay to wait when `attempt` retries have already been made.
    ///
    /// `base_delay * multiplier^attempt`, saturating and capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.saturating_pow(attempt);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Whether another retry is allowed after `attempt` retries.
    pub fn allows(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Full delay schedule, one entry per allowed retry.
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_attempts).map(|a| self.delay_for(a)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let backoff = BackoffConfig::default();
        let millis: Vec<u128> = backoff.schedule().iter().map(|d| d.as_millis()).collect();
        assert_eq!(millis, vec![1000, 2000, 4000, 8000, 16000]);
    }

    #[test]
    fn test_budget() {
        let backoff = BackoffConfig::default();
        assert!(backoff.allows(0));
        assert!(backoff.allows(4));
        assert!(!backoff.allows(5));
        assert!(!backoff.allows(6));
    }

    #[test]
    fn test_max_delay_cap() {
        let backoff = BackoffConfig {
            max_delay: Duration::from_secs(5),
            ..Default::default()
        };
        assert_eq!(backoff.delay_for(2), Duration::from_secs(4));
        assert_eq!(backoff.delay_for(3), Duration::from_secs(5));
    }

    #[test]
    fn test_huge_attempt_saturates() {
        let backoff = BackoffConfig::default();
        assert_eq!(backoff.delay_for(200), backoff.max_delay);
    }

    #[test]
    fn test_zero_budget() {
        let backoff = BackoffConfig::new(Duration::from_millis(10), 0);
        assert!(!backoff.allows(0));
        assert!(backoff.schedule().is_empty());
    }
}
