//! Shared, mutex-guarded circuit breaker.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;

use super::config::BreakerConfig;
use super::state::{Admission, BreakerState, BreakerStatus};
use crate::clock::Clock;
use crate::failure::FailureClassification;

/// Error returned by [`CircuitBreaker::execute`].
#[derive(Debug, thiserror::Error)]
pub enum BreakerError<E> {
    /// The breaker is open and the operation was not invoked.
    #[error("{0}")]
    Open(FailureClassification),
    /// The operation ran and failed; the failure was recorded.
    #[error("{0}")]
    Operation(E),
}

/// One breaker per integration endpoint, shared by every concurrent call to it.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: BreakerConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: BreakerConfig, clock: Arc<dyn Clock>) -> Self {
        let name = name.into();
        tracing::debug!(
            integration = %name,
            failure_threshold = config.failure_threshold,
            open_duration_ms = config.open_duration.as_millis() as u64,
            half_open_max_probes = config.half_open_max_probes,
            "circuit breaker initialized"
        );
        Self {
            name,
            config,
            clock,
            state: Mutex::new(BreakerState::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    pub fn status(&self) -> BreakerStatus {
        self.state.lock().status
    }

    /// Copy of the current bookkeeping.
    pub fn snapshot(&self) -> BreakerState {
        *self.state.lock()
    }

    /// Ask whether a call may proceed now. Moves Open to HalfOpen when the
    /// cooldown has elapsed; otherwise returns the breaker-open failure.
    pub fn admit(&self) -> Result<(), FailureClassification> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        match state.on_call(&self.config, now) {
            Admission::Admitted(next) => {
                self.store(&mut state, next);
                Ok(())
            }
            Admission::Rejected { remaining } => {
                tracing::debug!(
                    integration = %self.name,
                    remaining_ms = remaining.as_millis() as u64,
                    "circuit breaker rejected call"
                );
                Err(FailureClassification::breaker_open(&self.name, remaining))
            }
        }
    }

    pub fn record_success(&self) {
        let mut state = self.state.lock();
        let next = state.on_success(&self.config);
        self.store(&mut state, next);
    }

    pub fn record_failure(&self) {
        let now = self.clock.now();
        let mut state = self.state.lock();
        let next = state.on_failure(&self.config, now);
        self.store(&mut state, next);
    }

    /// Run `op` under breaker protection. Every failure is recorded and
    /// handed back to the caller.
    pub async fn execute<F, Fut, T, E>(&self, op: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute_counting(op, |_| true).await
    }

    /// Like [`execute`](Self::execute), but only errors for which `counts`
    /// returns true are recorded as failures. Errors that do not count (a
    /// caller-side cancellation, for instance) leave the state untouched.
    pub async fn execute_counting<F, Fut, T, E, C>(
        &self,
        op: F,
        counts: C,
    ) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: FnOnce(&E) -> bool,
    {
        self.admit().map_err(BreakerError::Open)?;
        match op().await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(e) => {
                if counts(&e) {
                    self.record_failure();
                }
                Err(BreakerError::Operation(e))
            }
        }
    }

    /// Return to a fresh Closed state with all counters cleared.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        self.store(&mut state, BreakerState::default());
    }

    /// Trip the breaker now, regardless of counters.
    pub fn force_open(&self) {
        let now = self.clock.now();
        let mut state = self.state.lock();
        let next = state.forced_open(now);
        tracing::warn!(integration = %self.name, "circuit breaker forced open");
        self.store(&mut state, next);
    }

    fn store(&self, state: &mut BreakerState, next: BreakerState) {
        let previous = state.status;
        *state = next;
        if previous == next.status {
            return;
        }
        match next.status {
            BreakerStatus::Open => tracing::warn!(
                integration = %self.name,
                from = %previous,
                consecutive_failures = next.consecutive_failures,
                open_duration_ms = self.config.open_duration.as_millis() as u64,
                "circuit breaker opened"
            ),
            BreakerStatus::HalfOpen => tracing::info!(
                integration = %self.name,
                from = %previous,
                "circuit breaker half-open, probing"
            ),
            BreakerStatus::Closed => tracing::info!(
                integration = %self.name,
                from = %previous,
                "circuit breaker closed"
            ),
        }
    }
}
