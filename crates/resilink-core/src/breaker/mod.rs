//! Per-integration circuit breaker.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: integration assumed unhealthy, calls fail fast
//! - HalfOpen: cooldown elapsed, calls probe for recovery
//!
//! # Transitions
//! ```text
//! Closed   -> Open:     consecutive failures reach failure_threshold
//! Open     -> HalfOpen: a call arrives after open_duration has elapsed
//! HalfOpen -> Closed:   half_open_max_probes probe calls succeed
//! HalfOpen -> Open:     any probe call fails
//! ```
//!
//! Transitions are evaluated lazily when calls arrive; there is no background
//! timer. [`BreakerState`] holds the transition rules as pure functions of an
//! explicit `now`, and [`CircuitBreaker`] guards one state behind a mutex so
//! the check-then-act sequences stay atomic under concurrent callers.

mod circuit;
mod config;
mod state;

pub use circuit::{BreakerError, CircuitBreaker};
pub use config::BreakerConfig;
pub use state::{Admission, BreakerState, BreakerStatus};
