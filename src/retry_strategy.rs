//! Retry policy for server errors.
//!
//! Decides whether a failed attempt is retried and how long to wait
//! before the next one. Only application-level server errors (HTTP
//! status >= 500) are eligible; client errors and successes are
//! terminal, and network failures or timeouts abort the call without
//! retry.
//!
//! Delay between attempts is either a fixed configured duration or, when
//! none is configured, exponential backoff capped at one second:
//! `min(1000ms, 100ms * 2^attempt)`.

use std::time::Duration;

/// Base delay for exponential backoff.
const BACKOFF_BASE: Duration = Duration::from_millis(100);
/// Cap on the exponential backoff delay.
const BACKOFF_CAP: Duration = Duration::from_millis(1000);

/// Retry policy derived from a per-call configuration.
///
/// # Example
///
/// ```rust
/// use reqflow::retry_strategy::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(3, None);
/// assert!(policy.should_retry(503, 0));
/// assert!(!policy.should_retry(503, 3)); // attempts exhausted
/// assert!(!policy.should_retry(404, 0)); // client errors are terminal
/// assert_eq!(policy.delay(2), Duration::from_millis(400));
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt.
    max_retries: u32,
    /// Fixed inter-attempt delay; `None` selects exponential backoff.
    fixed_delay: Option<Duration>,
    /// Jitter factor (0.0-1.0) added on top of the computed delay to
    /// spread out synchronized retriers. Zero keeps delays exact.
    jitter_factor: f64,
}

impl RetryPolicy {
    /// Creates a policy with the given retry cap and optional fixed
    /// delay.
    pub fn new(max_retries: u32, fixed_delay: Option<Duration>) -> Self {
        Self {
            max_retries,
            fixed_delay,
            jitter_factor: 0.0,
        }
    }

    /// Sets the jitter factor (clamped to 0.0-1.0).
    #[must_use]
    pub fn with_jitter(mut self, factor: f64) -> Self {
        self.jitter_factor = factor.clamp(0.0, 1.0);
        self
    }

    /// Maximum number of retries.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Whether another attempt should be made after receiving `status`,
    /// given that `attempts_made` retries have already happened.
    pub fn should_retry(&self, status: u16, attempts_made: u32) -> bool {
        status >= 500 && attempts_made < self.max_retries
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let base = match self.fixed_delay {
            Some(d) => d,
            None => {
                let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
                BACKOFF_CAP.min(BACKOFF_BASE.saturating_mul(factor))
            }
        };

        if self.jitter_factor > 0.0 {
            self.apply_jitter(base)
        } else {
            base
        }
    }

    fn apply_jitter(&self, delay: Duration) -> Duration {
        use rand::Rng;
        let mut rng = rand::rngs::ThreadRng::default();
        let jitter_cap = delay.as_secs_f64() * self.jitter_factor;
        delay + Duration::from_secs_f64(rng.random_range(0.0..=jitter_cap))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retries_only_server_errors() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(500, 0));
        assert!(policy.should_retry(503, 2));
        assert!(policy.should_retry(599, 0));

        assert!(!policy.should_retry(200, 0));
        assert!(!policy.should_retry(301, 0));
        assert!(!policy.should_retry(400, 0));
        assert!(!policy.should_retry(404, 0));
        assert!(!policy.should_retry(429, 0));
        assert!(!policy.should_retry(499, 0));
    }

    #[test]
    fn respects_retry_cap() {
        let policy = RetryPolicy::new(3, None);
        assert!(policy.should_retry(500, 2));
        assert!(!policy.should_retry(500, 3));
        assert!(!policy.should_retry(500, 4));

        let none = RetryPolicy::new(0, None);
        assert!(!none.should_retry(500, 0));
    }

    #[test]
    fn exponential_backoff_doubles_and_caps() {
        let policy = RetryPolicy::new(10, None);
        assert_eq!(policy.delay(0), Duration::from_millis(100));
        assert_eq!(policy.delay(1), Duration::from_millis(200));
        assert_eq!(policy.delay(2), Duration::from_millis(400));
        assert_eq!(policy.delay(3), Duration::from_millis(800));
        assert_eq!(policy.delay(4), Duration::from_millis(1000));
        assert_eq!(policy.delay(30), Duration::from_millis(1000));
    }

    #[test]
    fn fixed_delay_wins_over_backoff() {
        let policy = RetryPolicy::new(3, Some(Duration::from_millis(250)));
        assert_eq!(policy.delay(0), Duration::from_millis(250));
        assert_eq!(policy.delay(5), Duration::from_millis(250));
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let policy = RetryPolicy::new(3, Some(Duration::from_millis(100))).with_jitter(0.5);
        for _ in 0..100 {
            let d = policy.delay(0);
            assert!(d >= Duration::from_millis(100));
            assert!(d <= Duration::from_millis(150));
        }
    }
}
