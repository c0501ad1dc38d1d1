//! Retry schedules.

use std::time::Duration;

use rand::Rng;
use thiserror::Error;

/// Backoff strategy for retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackoffStrategy {
    /// base * 2^(attempt-1), capped at `max_delay`
    #[default]
    Exponential,
    /// base * attempt, capped at `max_delay`
    Linear,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PolicyError {
    #[error("jitter bounds must satisfy 0 <= min <= max <= 1 (got {min}..{max})")]
    InvalidJitter { min: f64, max: f64 },
}

/// Uniform jitter factor range applied to the capped delay.
///
/// A factor of `1.0` leaves the delay untouched; the default `0.2..0.5`
/// spreads concurrent callers well below the cap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JitterRange {
    min: f64,
    max: f64,
}

impl JitterRange {
    /// No jitter: the delay is used as computed.
    pub const NONE: JitterRange = JitterRange { min: 1.0, max: 1.0 };

    pub fn new(min: f64, max: f64) -> Result<Self, PolicyError> {
        let valid = min.is_finite() && max.is_finite() && 0.0 <= min && min <= max && max <= 1.0;
        if !valid {
            return Err(PolicyError::InvalidJitter { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Draw a factor from `[min, max)` (or exactly `min` for a degenerate range).
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.min >= self.max {
            self.min
        } else {
            rng.gen_range(self.min..self.max)
        }
    }
}

impl Default for JitterRange {
    fn default() -> Self {
        Self { min: 0.2, max: 0.5 }
    }
}

/// Retry policy configuration.
///
/// Immutable once handed to a [`crate::Retrier`].
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt (0 = no retries)
    pub max_retries: u32,
    /// Base delay between retries
    pub base_delay: Duration,
    /// Maximum delay cap (applied before jitter)
    pub max_delay: Duration,
    /// Backoff strategy
    pub strategy: BackoffStrategy,
    /// Jitter factor range
    pub jitter: JitterRange,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            strategy: BackoffStrategy::Exponential,
            jitter: JitterRange::default(),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with no retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Exponential backoff with the default jitter range.
    pub fn exponential(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
            strategy: BackoffStrategy::Exponential,
            jitter: JitterRange::default(),
        }
    }

    /// Linearly growing delay (`delay`, `2*delay`, ...) without jitter.
    pub fn linear(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay: delay,
            max_delay: Duration::MAX,
            strategy: BackoffStrategy::Linear,
            jitter: JitterRange::NONE,
        }
    }

    /// Unjittered delay before retry `attempt` (1-indexed).
    pub fn backoff_cap(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let delay = match self.strategy {
            BackoffStrategy::Exponential => self
                .base_delay
                .saturating_mul(2u32.saturating_pow(attempt - 1)),
            BackoffStrategy::Linear => self.base_delay.saturating_mul(attempt),
        };
        delay.min(self.max_delay)
    }

    /// Jittered delay before retry `attempt` (1-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.delay_with_rng(attempt, &mut rand::thread_rng())
    }

    pub fn delay_with_rng<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        let cap = self.backoff_cap(attempt);
        if cap.is_zero() {
            return cap;
        }
        let factor = self.jitter.sample(rng);
        if factor >= 1.0 {
            return cap;
        }
        cap.mul_f64(factor)
    }

    /// Check if another retry is allowed after `retries_so_far` retries.
    pub fn should_retry(&self, retries_so_far: u32) -> bool {
        retries_so_far < self.max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn exponential_backoff_doubles_until_cap() {
        let policy = RetryPolicy::exponential(
            10,
            Duration::from_millis(100),
            Duration::from_millis(500),
        );

        assert_eq!(policy.backoff_cap(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_cap(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_cap(3), Duration::from_millis(400));
        assert_eq!(policy.backoff_cap(4), Duration::from_millis(500));
        assert_eq!(policy.backoff_cap(30), Duration::from_millis(500));
    }

    #[test]
    fn linear_backoff_increases_linearly_without_jitter() {
        let policy = RetryPolicy::linear(3, Duration::from_millis(250));

        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(250));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(500));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(750));
    }

    #[test]
    fn should_retry_respects_max_retries() {
        let policy = RetryPolicy {
            max_retries: 2,
            ..Default::default()
        };

        assert!(policy.should_retry(0));
        assert!(policy.should_retry(1));
        assert!(!policy.should_retry(2));
        assert!(!RetryPolicy::no_retry().should_retry(0));
    }

    #[test]
    fn jitter_bounds_are_validated() {
        assert!(JitterRange::new(0.2, 0.5).is_ok());
        assert!(JitterRange::new(0.0, 1.0).is_ok());
        assert!(JitterRange::new(0.6, 0.5).is_err());
        assert!(JitterRange::new(-0.1, 0.5).is_err());
        assert!(JitterRange::new(0.2, 1.5).is_err());
        assert!(JitterRange::new(f64::NAN, 0.5).is_err());
    }

    #[test]
    fn huge_attempt_numbers_saturate() {
        let policy = RetryPolicy::exponential(u32::MAX, Duration::from_secs(1), Duration::from_secs(30));
        assert_eq!(policy.backoff_cap(u32::MAX), Duration::from_secs(30));
    }

    proptest! {
        #[test]
        fn jittered_delay_stays_below_cap(
            attempt in 1u32..20,
            base_ms in 1u64..2_000,
            max_ms in 1u64..60_000,
        ) {
            let policy = RetryPolicy::exponential(
                20,
                Duration::from_millis(base_ms),
                Duration::from_millis(max_ms),
            );

            let cap = Duration::from_millis(base_ms)
                .saturating_mul(2u32.saturating_pow(attempt - 1))
                .min(Duration::from_millis(max_ms));
            let delay = policy.delay_for_attempt(attempt);

            prop_assert!(delay <= cap.mul_f64(policy.jitter.max()));
            prop_assert!(delay < cap);
        }
    }
}
