use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::breaker::BreakerConfig;
use crate::retry::RetryPolicy;
use crate::transport::TransportOptions;

/// `[retry]`: backoff schedule applied to every integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total tries per request, the first one included.
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub max_backoff_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 1000,
            backoff_multiplier: 2.0,
            max_backoff_ms: 10_000,
        }
    }
}

impl RetrySettings {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.initial_backoff_ms),
            self.backoff_multiplier,
            Duration::from_millis(self.max_backoff_ms),
        )
    }

    pub(crate) fn merged(&self, o: &RetryOverrides) -> Self {
        Self {
            max_attempts: o.max_attempts.unwrap_or(self.max_attempts),
            initial_backoff_ms: o.initial_backoff_ms.unwrap_or(self.initial_backoff_ms),
            backoff_multiplier: o.backoff_multiplier.unwrap_or(self.backoff_multiplier),
            max_backoff_ms: o.max_backoff_ms.unwrap_or(self.max_backoff_ms),
        }
    }
}

/// `[breaker]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerSettings {
    pub failure_threshold: u32,
    pub open_duration_ms: u64,
    pub half_open_max_probes: u32,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_duration_ms: 60_000,
            half_open_max_probes: 2,
        }
    }
}

impl BreakerSettings {
    pub fn to_config(&self) -> BreakerConfig {
        BreakerConfig {
            failure_threshold: self.failure_threshold,
            open_duration: Duration::from_millis(self.open_duration_ms),
            half_open_max_probes: self.half_open_max_probes,
        }
    }

    pub(crate) fn merged(&self, o: &BreakerOverrides) -> Self {
        Self {
            failure_threshold: o.failure_threshold.unwrap_or(self.failure_threshold),
            open_duration_ms: o.open_duration_ms.unwrap_or(self.open_duration_ms),
            half_open_max_probes: o.half_open_max_probes.unwrap_or(self.half_open_max_probes),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_backoff_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backoff_multiplier: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_backoff_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BreakerOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_threshold: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub half_open_max_probes: Option<u32>,
}

/// `[integrations.<name>]`: per-integration overrides of the global sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntegrationSettings {
    pub retry: RetryOverrides,
    pub breaker: BreakerOverrides,
}

/// Dead-letter storage: process-local or a SQLite file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DlqBackend {
    Memory,
    #[default]
    Sqlite,
}

/// `[dlq]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DlqSettings {
    pub backend: DlqBackend,
    /// Maximum retained entries; oldest are evicted first. 0 = unbounded.
    pub capacity: u64,
    /// SQLite file; defaults to `$XDG_STATE_HOME/resilink/dlq.db`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for DlqSettings {
    fn default() -> Self {
        Self {
            backend: DlqBackend::Sqlite,
            capacity: 10_000,
            path: None,
        }
    }
}

/// `[transport]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            request_timeout_secs: 30,
        }
    }
}

impl TransportSettings {
    pub fn to_options(&self) -> TransportOptions {
        TransportOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}
