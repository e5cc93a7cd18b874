//! Retry loop: run an async operation until success or the policy says stop.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use super::error::RetryError;
use super::policy::{RetryDecision, RetryPolicy};
use crate::clock::Clock;
use crate::failure::FailureClassification;

/// Runs `op` until it succeeds or the retry policy says to stop.
///
/// `op` receives the 1-based attempt number. Its error is classified (via
/// `Into<FailureClassification>`) before the policy is consulted. Attempts
/// are strictly sequential; on a retryable failure the calling task sleeps
/// on `clock` for the backoff delay. Cancelling `cancel` aborts the pending
/// wait or the in-flight attempt.
pub async fn run_with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    clock: &dyn Clock,
    cancel: &CancellationToken,
    mut op: F,
) -> Result<T, RetryError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<FailureClassification>,
{
    let mut attempts = 0u32;
    loop {
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RetryError::Cancelled { attempts }),
            outcome = op(attempts + 1) => outcome,
        };
        let failure: FailureClassification = match outcome {
            Ok(value) => return Ok(value),
            Err(e) => e.into(),
        };
        attempts += 1;

        if cancel.is_cancelled() {
            return Err(RetryError::Cancelled { attempts });
        }

        match policy.decide(attempts, &failure) {
            RetryDecision::NoRetry => {
                if attempts >= policy.max_attempts && policy.is_retryable(&failure) {
                    tracing::warn!(
                        attempts,
                        kind = %failure.kind,
                        "retry budget exhausted: {}",
                        failure.message
                    );
                } else {
                    tracing::debug!(
                        attempts,
                        kind = %failure.kind,
                        "failure not retryable: {}",
                        failure.message
                    );
                }
                return Err(RetryError::Failed { failure, attempts });
            }
            RetryDecision::RetryAfter(delay) => {
                tracing::debug!(
                    attempt = attempts,
                    max_attempts = policy.max_attempts,
                    kind = %failure.kind,
                    delay_ms = delay.as_millis() as u64,
                    "retrying after failure"
                );
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(RetryError::Cancelled { attempts }),
                    _ = clock.sleep(delay) => {}
                }
            }
        }
    }
}
