//! Retry and backoff policy.
//!
//! This module encapsulates the bounded exponential-backoff loop so the
//! resilient client (and anything else that wants it) shares one policy:
//! how many attempts, how long to wait between them, and which classified
//! failures are worth another try.

mod error;
mod policy;
mod run;

pub use error::RetryError;
pub use policy::{RetryDecision, RetryPolicy, RetryPredicate};
pub use run::run_with_retry;
