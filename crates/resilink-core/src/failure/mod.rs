//! Failure taxonomy and classification.
//!
//! Raw outcomes of a transport call (a non-success HTTP status or a transport
//! error) are turned into a [`FailureClassification`] carrying retry
//! eligibility and timing hints, so that the retry loop, the circuit breaker
//! and the client only ever reason about one error shape.

mod classify;
mod error;
mod kind;

pub use classify::{
    classify, classify_http_status, classify_transport, parse_retry_after, MAX_RETRY_AFTER_SECS,
};
pub use error::{RawFailure, TransportError, TransportErrorKind};
pub use kind::{FailureClassification, FailureKind};
