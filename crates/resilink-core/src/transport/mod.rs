//! The raw HTTP call underneath the resilience layers.
//!
//! A [`Transport`] performs exactly one attempt and reports either a response
//! (any status) or a [`TransportError`]. Status interpretation, retries and
//! breaker accounting happen above it.

mod curl;
mod parse;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::failure::TransportError;
use crate::request::{RequestDescriptor, Response};

pub use self::curl::CurlTransport;

/// Timeouts for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportOptions {
    pub connect_timeout: Duration,
    /// Whole-transfer limit, connect included.
    pub request_timeout: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request. Implementations stop as soon as they can once `abort`
    /// is set and report [`crate::failure::TransportErrorKind::Aborted`].
    async fn send(
        &self,
        request: &RequestDescriptor,
        abort: Arc<AtomicBool>,
    ) -> Result<Response, TransportError>;
}
