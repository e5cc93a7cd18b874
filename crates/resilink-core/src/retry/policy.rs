use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ConfigError;
use crate::failure::FailureClassification;

/// Predicate deciding whether a classified failure may be retried.
pub type RetryPredicate = Arc<dyn Fn(&FailureClassification) -> bool + Send + Sync>;

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Stop and surface the failure.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Bounded exponential backoff.
///
/// `max_attempts` counts total tries (the first one included), so a policy
/// with `max_attempts = 1` never retries.
#[derive(Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub backoff_multiplier: f64,
    pub max_backoff: Duration,
    is_retryable: RetryPredicate,
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("initial_backoff", &self.initial_backoff)
            .field("backoff_multiplier", &self.backoff_multiplier)
            .field("max_backoff", &self.max_backoff)
            .finish_non_exhaustive()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000), 2.0, Duration::from_millis(10_000))
    }
}

fn default_is_retryable(failure: &FailureClassification) -> bool {
    failure.retryable
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        initial_backoff: Duration,
        backoff_multiplier: f64,
        max_backoff: Duration,
    ) -> Self {
        Self {
            max_attempts,
            initial_backoff,
            backoff_multiplier,
            max_backoff,
            is_retryable: Arc::new(default_is_retryable),
        }
    }

    /// Replace the retry-eligibility predicate. The default trusts
    /// [`FailureClassification::retryable`].
    pub fn with_retryable<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&FailureClassification) -> bool + Send + Sync + 'static,
    {
        self.is_retryable = Arc::new(predicate);
        self
    }

    pub fn is_retryable(&self, failure: &FailureClassification) -> bool {
        (self.is_retryable)(failure)
    }

    /// Check the invariants: at least one attempt, a positive initial backoff,
    /// a multiplier of at least 1 and a cap no smaller than the initial backoff.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts < 1 {
            return Err(ConfigError::invalid("retry.max_attempts", ">= 1", self.max_attempts));
        }
        if self.initial_backoff.is_zero() {
            return Err(ConfigError::invalid(
                "retry.initial_backoff_ms",
                "> 0",
                self.initial_backoff.as_millis(),
            ));
        }
        if !(self.backoff_multiplier >= 1.0 && self.backoff_multiplier.is_finite()) {
            return Err(ConfigError::invalid(
                "retry.backoff_multiplier",
                "a finite number >= 1",
                self.backoff_multiplier,
            ));
        }
        if self.max_backoff < self.initial_backoff {
            return Err(ConfigError::invalid(
                "retry.max_backoff_ms",
                ">= retry.initial_backoff_ms",
                self.max_backoff.as_millis(),
            ));
        }
        Ok(())
    }

    /// Exponential delay after the `attempt`-th failure (1-based):
    /// `initial * multiplier^(attempt-1)`, capped at `max_backoff`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let raw_ms = self.initial_backoff.as_millis() as f64 * self.backoff_multiplier.powi(exp);
        let capped_ms = raw_ms.min(self.max_backoff.as_millis() as f64);
        Duration::from_millis(capped_ms.round() as u64)
    }

    /// Delay before the next try. A retry-after hint overrides the exponential schedule.
    pub fn delay_for(&self, attempt: u32, failure: &FailureClassification) -> Duration {
        failure
            .retry_after()
            .unwrap_or_else(|| self.backoff_for(attempt))
    }

    /// Decide what to do after the `attempt`-th failure (1-based).
    pub fn decide(&self, attempt: u32, failure: &FailureClassification) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }
        if !self.is_retryable(failure) {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.delay_for(attempt, failure))
    }
}
