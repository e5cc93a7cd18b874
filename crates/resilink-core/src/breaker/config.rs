use std::time::Duration;

use crate::config::ConfigError;

/// Thresholds for one circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerConfig {
    /// Consecutive failures in Closed that open the breaker.
    pub failure_threshold: u32,
    /// How long the breaker stays Open before admitting a probe.
    pub open_duration: Duration,
    /// Successful probes in HalfOpen needed to close again.
    pub half_open_max_probes: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_duration: Duration::from_millis(60_000),
            half_open_max_probes: 2,
        }
    }
}

impl BreakerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.failure_threshold < 1 {
            return Err(ConfigError::invalid(
                "breaker.failure_threshold",
                ">= 1",
                self.failure_threshold,
            ));
        }
        if self.open_duration.is_zero() {
            return Err(ConfigError::invalid(
                "breaker.open_duration_ms",
                "> 0",
                self.open_duration.as_millis(),
            ));
        }
        if self.half_open_max_probes < 1 {
            return Err(ConfigError::invalid(
                "breaker.half_open_max_probes",
                ">= 1",
                self.half_open_max_probes,
            ));
        }
        Ok(())
    }
}
