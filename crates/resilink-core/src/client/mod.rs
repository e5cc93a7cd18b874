//! Resilient client: one per integration.
//!
//! A request runs as `breaker(retry(raw call))`. The breaker sees the whole
//! retry sequence as one call, so a request that exhausts its retries counts
//! as a single breaker failure. Terminal failures carrying an HTTP status are
//! written to the dead-letter queue; network failures, breaker fail-fast
//! rejections and cancellations are not.

mod config;
mod error;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::breaker::{BreakerError, BreakerState, BreakerStatus, CircuitBreaker};
use crate::clock::Clock;
use crate::config::ConfigError;
use crate::dlq::{DeadLetterQueue, DlqEntry, NewDlqEntry};
use crate::failure::{FailureClassification, RawFailure};
use crate::request::{RequestDescriptor, Response};
use crate::retry::{run_with_retry, RetryError};
use crate::transport::Transport;

pub use config::{ClientBuilder, ClientConfig};
pub use error::RequestError;

/// Sets the transport abort flag when the attempt future is dropped, so a
/// cancelled attempt stops the underlying transfer. No-op once it has finished.
struct AbortOnDrop(Arc<AtomicBool>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

pub struct ResilientClient {
    config: ClientConfig,
    breaker: CircuitBreaker,
    transport: Arc<dyn Transport>,
    dlq: DeadLetterQueue,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ResilientClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientClient")
            .field("config", &self.config)
            .field("breaker", &self.breaker.status())
            .finish_non_exhaustive()
    }
}

impl ResilientClient {
    /// Client with default collaborators (curl, in-memory DLQ, system clock).
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        Self::builder(config).build()
    }

    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    fn assemble(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        dlq: DeadLetterQueue,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let breaker = CircuitBreaker::new(
            config.integration_name.clone(),
            config.breaker,
            clock.clone(),
        );
        Self {
            config,
            breaker,
            transport,
            dlq,
            clock,
        }
    }

    pub fn integration(&self) -> &str {
        &self.config.integration_name
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn dlq(&self) -> &DeadLetterQueue {
        &self.dlq
    }

    pub fn breaker_status(&self) -> BreakerStatus {
        self.breaker.status()
    }

    pub fn breaker_snapshot(&self) -> BreakerState {
        self.breaker.snapshot()
    }

    /// Force the breaker back to Closed with all counters cleared.
    pub fn reset_breaker(&self) {
        self.breaker.reset();
    }

    pub async fn request(&self, request: RequestDescriptor) -> Result<Response, RequestError> {
        self.request_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Send `request` through the breaker and retry loop. Cancelling `cancel`
    /// aborts a pending backoff wait or the in-flight attempt.
    pub async fn request_with_cancel(
        &self,
        request: RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<Response, RequestError> {
        self.send(request, cancel, true).await
    }

    async fn send(
        &self,
        request: RequestDescriptor,
        cancel: &CancellationToken,
        dead_letter: bool,
    ) -> Result<Response, RequestError> {
        let prepared = request.with_default_content_type();
        let outcome = self
            .breaker
            .execute_counting(
                || {
                    run_with_retry(&self.config.retry, self.clock.as_ref(), cancel, |attempt| {
                        self.raw_call(&prepared, attempt)
                    })
                },
                |e: &RetryError| !e.is_cancelled(),
            )
            .await;

        match outcome {
            Ok(response) => Ok(response),
            Err(BreakerError::Open(failure)) => {
                tracing::warn!(
                    integration = %self.config.integration_name,
                    url = %request.url,
                    "request rejected: {}",
                    failure
                );
                Err(RequestError::Failed {
                    failure,
                    attempts: 0,
                })
            }
            Err(BreakerError::Operation(RetryError::Cancelled { attempts })) => {
                tracing::info!(
                    integration = %self.config.integration_name,
                    url = %request.url,
                    attempts,
                    "request cancelled"
                );
                Err(RequestError::Cancelled { attempts })
            }
            Err(BreakerError::Operation(RetryError::Failed { failure, attempts })) => {
                tracing::warn!(
                    integration = %self.config.integration_name,
                    url = %request.url,
                    attempts,
                    kind = %failure.kind,
                    "request failed: {}",
                    failure.message
                );
                if dead_letter {
                    self.dead_letter(&request, &failure, attempts).await;
                }
                Err(RequestError::Failed { failure, attempts })
            }
        }
    }

    /// Send a dead-lettered request again through the full resilience stack.
    /// The entry is removed from this client's queue only after a success; on
    /// failure it stays as it was and no second entry is written.
    pub async fn replay(&self, entry: &DlqEntry) -> Result<Response, RequestError> {
        self.replay_with_cancel(entry, &CancellationToken::new())
            .await
    }

    pub async fn replay_with_cancel(
        &self,
        entry: &DlqEntry,
        cancel: &CancellationToken,
    ) -> Result<Response, RequestError> {
        tracing::info!(
            integration = %self.config.integration_name,
            dlq_id = %entry.id,
            "replaying dead-lettered request"
        );
        let response = self.send(entry.to_request(), cancel, false).await?;
        if let Err(e) = self.dlq.remove_entry(&entry.id).await {
            tracing::error!(
                integration = %self.config.integration_name,
                dlq_id = %entry.id,
                error = %e,
                "replay succeeded but the dead-letter entry could not be removed"
            );
        }
        Ok(response)
    }

    /// One attempt. Non-success statuses become a [`RawFailure::Http`] so the
    /// retry loop classifies every failure the same way.
    async fn raw_call(
        &self,
        request: &RequestDescriptor,
        attempt: u32,
    ) -> Result<Response, RawFailure> {
        let abort = Arc::new(AtomicBool::new(false));
        let _guard = AbortOnDrop(abort.clone());
        tracing::debug!(
            integration = %self.config.integration_name,
            method = %request.method,
            url = %request.url,
            attempt,
            "sending request"
        );
        let response = self.transport.send(request, abort).await?;
        if response.is_success() {
            return Ok(response);
        }
        Err(RawFailure::Http {
            status: response.status,
            retry_after: response.header("retry-after").map(str::to_string),
            body: response.text().into_owned(),
            url: request.url.clone(),
        })
    }

    /// Best effort: a failed write is logged and never replaces the caller's error.
    async fn dead_letter(
        &self,
        request: &RequestDescriptor,
        failure: &FailureClassification,
        attempts: u32,
    ) {
        if !failure.kind.is_status_bearing() {
            return;
        }
        let entry = NewDlqEntry::new(
            request.clone(),
            failure.to_string(),
            attempts,
            self.config.integration_name.clone(),
        );
        match self.dlq.add_entry(entry).await {
            Ok(id) => tracing::info!(
                integration = %self.config.integration_name,
                dlq_id = %id,
                retry_count = attempts,
                "request dead-lettered"
            ),
            Err(e) => tracing::error!(
                integration = %self.config.integration_name,
                url = %request.url,
                error = %e,
                "failed to write dead-letter entry"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breaker::BreakerConfig;
    use crate::retry::RetryPolicy;

    #[test]
    fn abort_guard_sets_flag_on_drop() {
        let flag = Arc::new(AtomicBool::new(false));
        {
            let _g = AbortOnDrop(flag.clone());
            assert!(!flag.load(Ordering::SeqCst));
        }
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn build_rejects_invalid_config() {
        let err = ResilientClient::new(ClientConfig::new("  ")).unwrap_err();
        assert_eq!(err, ConfigError::EmptyIntegrationName);

        let mut retry = RetryPolicy::default();
        retry.max_attempts = 0;
        let bad_retry = ClientConfig::new("hubspot").with_retry(retry);
        assert!(ResilientClient::new(bad_retry).is_err());

        let bad_breaker = ClientConfig::new("hubspot").with_breaker(BreakerConfig {
            failure_threshold: 0,
            ..BreakerConfig::default()
        });
        assert!(ResilientClient::new(bad_breaker).is_err());
    }

    #[test]
    fn new_client_starts_closed() {
        let client = ResilientClient::new(ClientConfig::new("stripe")).unwrap();
        assert_eq!(client.integration(), "stripe");
        assert_eq!(client.breaker_status(), BreakerStatus::Closed);
        assert_eq!(client.breaker_snapshot().consecutive_failures, 0);
    }
}
