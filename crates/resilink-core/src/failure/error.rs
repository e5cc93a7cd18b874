//! Raw, unclassified failures produced by a single transport call.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse category of a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportErrorKind {
    /// Could not establish a connection (refused, unreachable).
    Connect,
    /// Connection dropped mid-exchange (reset, empty reply, read/send error).
    Reset,
    /// Connect or overall request deadline exceeded.
    Timeout,
    /// Host or proxy name could not be resolved.
    Dns,
    /// The transfer was stopped because the caller cancelled it.
    Aborted,
    /// Anything else (malformed URL, TLS setup, protocol errors).
    Other,
}

impl TransportErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::Reset => "reset",
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Dns => "dns",
            TransportErrorKind::Aborted => "aborted",
            TransportErrorKind::Other => "other",
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by a [`crate::transport::Transport`] when no HTTP response was obtained.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("transport {kind} error: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Outcome of one call that did not succeed, before classification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RawFailure {
    /// The integration answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Http {
        status: u16,
        /// Raw `Retry-After` header value, if the response carried one.
        retry_after: Option<String>,
        body: String,
        url: String,
    },
    /// No response was obtained.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
