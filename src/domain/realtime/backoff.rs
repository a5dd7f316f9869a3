//! Reconnect backoff policy.
//!
//! Capped exponential without jitter: `delay(n) = min(initial * multiplier^n, max)`.
//! Delays never decrease and never exceed `max_delay`.

use std::time::Duration;

/// When and how often the transport retries after a failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    /// Delay before the first retry.
    pub initial_delay: Duration,

    /// Upper bound for any single delay.
    pub max_delay: Duration,

    /// Growth factor between consecutive delays (values below 1.0 act as 1.0).
    pub multiplier: f64,

    /// Consecutive failed attempts allowed before giving up; 0 = unbounded.
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            max_attempts: 0,
        }
    }
}

impl ReconnectPolicy {
    /// Fixed-interval policy (multiplier 1).
    pub fn fixed(delay: Duration) -> Self {
        Self {
            initial_delay: delay,
            max_delay: delay,
            multiplier: 1.0,
            max_attempts: 0,
        }
    }

    /// Sets the attempt budget.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let multiplier = self.multiplier.max(1.0);
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.initial_delay.as_secs_f64() * multiplier.powi(exponent);

        Duration::try_from_secs_f64(secs)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// True if a retry numbered `attempt` (0-based) is still within budget.
    pub fn allows_attempt(&self, attempt: u32) -> bool {
        self.max_attempts == 0 || attempt < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_policy_doubles_until_cap() {
        let policy = ReconnectPolicy::default();
        let delays: Vec<u64> = (0..7).map(|n| policy.delay_for(n).as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 16, 30, 30]);
    }

    #[test]
    fn fixed_policy_is_constant() {
        let policy = ReconnectPolicy::fixed(Duration::from_millis(500));
        for n in 0..10 {
            assert_eq!(policy.delay_for(n), Duration::from_millis(500));
        }
    }

    #[test]
    fn huge_attempt_numbers_stay_capped() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_secs(30));
    }

    #[test]
    fn attempt_budget() {
        let unbounded = ReconnectPolicy::default();
        assert!(unbounded.allows_attempt(1_000_000));

        let bounded = ReconnectPolicy::default().with_max_attempts(3);
        assert!(bounded.allows_attempt(2));
        assert!(!bounded.allows_attempt(3));
    }

    proptest! {
        #[test]
        fn delays_are_non_decreasing_and_bounded(
            initial_ms in 1u64..5_000,
            max_ms in 1u64..120_000,
            multiplier in 0.5f64..4.0,
            attempt in 0u32..64,
        ) {
            let policy = ReconnectPolicy {
                initial_delay: Duration::from_millis(initial_ms),
                max_delay: Duration::from_millis(max_ms),
                multiplier,
                max_attempts: 0,
            };
            let current = policy.delay_for(attempt);
            let next = policy.delay_for(attempt + 1);
            prop_assert!(current <= next);
            prop_assert!(next <= policy.max_delay);
        }
    }
}
