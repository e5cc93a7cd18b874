use std::sync::Arc;

use crate::breaker::BreakerConfig;
use crate::clock::{Clock, SystemClock};
use crate::config::ConfigError;
use crate::dlq::DeadLetterQueue;
use crate::retry::RetryPolicy;
use crate::transport::{CurlTransport, Transport};

use super::ResilientClient;

/// Default capacity of the in-memory queue a client gets when none is supplied.
const DEFAULT_DLQ_CAPACITY: usize = 10_000;

/// Per-integration resilience settings. One client is built per integration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub integration_name: String,
    pub retry: RetryPolicy,
    pub breaker: BreakerConfig,
}

impl ClientConfig {
    pub fn new(integration_name: impl Into<String>) -> Self {
        Self {
            integration_name: integration_name.into(),
            retry: RetryPolicy::default(),
            breaker: BreakerConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_breaker(mut self, breaker: BreakerConfig) -> Self {
        self.breaker = breaker;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.integration_name.trim().is_empty() {
            return Err(ConfigError::EmptyIntegrationName);
        }
        self.retry.validate()?;
        self.breaker.validate()
    }
}

/// Assembles a [`ResilientClient`]. Unset collaborators default to
/// [`CurlTransport`], an in-memory dead-letter queue and [`SystemClock`].
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    dlq: Option<DeadLetterQueue>,
    clock: Option<Arc<dyn Clock>>,
}

impl ClientBuilder {
    pub(super) fn new(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            dlq: None,
            clock: None,
        }
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Share a dead-letter queue (typically one per application).
    pub fn dlq(mut self, dlq: DeadLetterQueue) -> Self {
        self.dlq = Some(dlq);
        self
    }

    /// Time source for backoff waits and breaker cooldowns. Also stamps DLQ
    /// entries when no queue is supplied.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<ResilientClient, ConfigError> {
        self.config.validate()?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(CurlTransport::default()));
        let dlq = self.dlq.unwrap_or_else(|| {
            DeadLetterQueue::in_memory(Some(DEFAULT_DLQ_CAPACITY)).with_clock(clock.clone())
        });
        Ok(ResilientClient::assemble(self.config, transport, dlq, clock))
    }
}
