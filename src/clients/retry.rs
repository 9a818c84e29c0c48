use std::time::Duration;

/// Bounded exponential backoff used by the outbound API clients
///
/// Attempt `n` (zero-based) waits `base_delay * 2^n` before the next try, so the
/// default one-second base yields 1s, 2s, 4s, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// How many times a failed call is retried after the first attempt
    pub max_retries: u32,

    /// Delay before the first retry; doubled for every further retry
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// One-second base delay with the given retry budget
    pub const fn with_max_retries(max_retries: u32) -> Self {
        Self::new(max_retries, Duration::from_secs(1))
    }

    /// Whether another try is allowed after `attempt` failed attempts' worth of retries
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// Delay to sleep before retrying after the zero-based `attempt`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}
