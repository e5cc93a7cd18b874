//! Breaker state and its pure transition rules.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::config::BreakerConfig;

/// Operational mode of a breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreakerStatus {
    Closed,
    Open,
    HalfOpen,
}

impl BreakerStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BreakerStatus::Closed => "closed",
            BreakerStatus::Open => "open",
            BreakerStatus::HalfOpen => "half-open",
        }
    }
}

impl fmt::Display for BreakerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable breaker bookkeeping.
///
/// `consecutive_failures` is only reset on entry into Closed;
/// `half_open_successes` is reset on entry into HalfOpen or Open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerState {
    pub status: BreakerStatus,
    pub consecutive_failures: u32,
    pub last_failure_at: Option<Instant>,
    pub half_open_successes: u32,
}

impl Default for BreakerState {
    fn default() -> Self {
        Self {
            status: BreakerStatus::Closed,
            consecutive_failures: 0,
            last_failure_at: None,
            half_open_successes: 0,
        }
    }
}

/// Result of asking the breaker whether a call may proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Invoke the operation; the state to store is attached.
    Admitted(BreakerState),
    /// Fail fast; `remaining` is the cooldown left.
    Rejected { remaining: Duration },
}

impl BreakerState {
    /// A call arrives at `now`.
    pub fn on_call(&self, config: &BreakerConfig, now: Instant) -> Admission {
        match self.status {
            BreakerStatus::Closed | BreakerStatus::HalfOpen => Admission::Admitted(*self),
            BreakerStatus::Open => {
                // Open without a timestamp cannot happen through the rules
                // below; treat it as an expired cooldown.
                let elapsed = self
                    .last_failure_at
                    .map(|at| now.saturating_duration_since(at))
                    .unwrap_or(Duration::MAX);
                if elapsed >= config.open_duration {
                    Admission::Admitted(self.enter_half_open())
                } else {
                    Admission::Rejected {
                        remaining: config.open_duration - elapsed,
                    }
                }
            }
        }
    }

    /// An admitted call succeeded.
    pub fn on_success(&self, config: &BreakerConfig) -> BreakerState {
        match self.status {
            BreakerStatus::Closed => BreakerState {
                consecutive_failures: 0,
                ..*self
            },
            BreakerStatus::HalfOpen => {
                let successes = self.half_open_successes.saturating_add(1);
                if successes >= config.half_open_max_probes {
                    self.enter_closed()
                } else {
                    BreakerState {
                        half_open_successes: successes,
                        ..*self
                    }
                }
            }
            // Admitted before another call tripped the breaker.
            BreakerStatus::Open => *self,
        }
    }

    /// An admitted call failed at `now`.
    pub fn on_failure(&self, config: &BreakerConfig, now: Instant) -> BreakerState {
        match self.status {
            BreakerStatus::Closed => {
                let failures = self.consecutive_failures.saturating_add(1);
                let next = BreakerState {
                    consecutive_failures: failures,
                    ..*self
                };
                if failures >= config.failure_threshold {
                    next.enter_open(now)
                } else {
                    next
                }
            }
            BreakerStatus::HalfOpen => self.enter_open(now),
            BreakerStatus::Open => *self,
        }
    }

    fn enter_open(&self, now: Instant) -> BreakerState {
        BreakerState {
            status: BreakerStatus::Open,
            last_failure_at: Some(now),
            half_open_successes: 0,
            ..*self
        }
    }

    fn enter_half_open(&self) -> BreakerState {
        BreakerState {
            status: BreakerStatus::HalfOpen,
            half_open_successes: 0,
            ..*self
        }
    }

    fn enter_closed(&self) -> BreakerState {
        BreakerState {
            status: BreakerStatus::Closed,
            consecutive_failures: 0,
            half_open_successes: 0,
            ..*self
        }
    }

    /// Force the Open state as if a failure happened at `now`.
    pub(super) fn forced_open(&self, now: Instant) -> BreakerState {
        self.enter_open(now)
    }
}
