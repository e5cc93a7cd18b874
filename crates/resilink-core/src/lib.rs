//! Resilience harness for outbound integration calls.
//!
//! A [`client::ResilientClient`] wraps a transport call in a circuit breaker
//! around a bounded retry loop, and records requests that exhaust both in a
//! dead-letter queue.

pub mod breaker;
pub mod client;
pub mod clock;
pub mod config;
pub mod dlq;
pub mod failure;
pub mod logging;
pub mod request;
pub mod retry;
pub mod transport;

pub use client::{ClientConfig, RequestError, ResilientClient};
pub use failure::{FailureClassification, FailureKind};
