//! Classify HTTP statuses and transport errors into failure kinds.

use super::error::{RawFailure, TransportError, TransportErrorKind};
use super::kind::{FailureClassification, FailureKind};

/// Map an HTTP status to its failure kind.
///
/// 429 is rate limiting, any 5xx is a transient server failure and every
/// other status is a client failure.
pub fn classify_http_status(status: u16) -> FailureKind {
    match status {
        429 => FailureKind::RateLimited,
        500..=599 => FailureKind::TransientServer,
        _ => FailureKind::Client,
    }
}

/// Longest retry-after hint honoured, in seconds (one day). Larger values are clamped.
pub const MAX_RETRY_AFTER_SECS: f64 = 86_400.0;

/// Parse a `Retry-After` header value given in (possibly fractional) seconds,
/// clamped to [`MAX_RETRY_AFTER_SECS`]. HTTP-date values and garbage yield `None`.
pub fn parse_retry_after(value: &str) -> Option<f64> {
    let secs: f64 = value.trim().parse().ok()?;
    if secs.is_finite() && secs >= 0.0 {
        Some(secs.min(MAX_RETRY_AFTER_SECS))
    } else {
        None
    }
}

/// Classify a transport error. Connection, reset, timeout and DNS failures are
/// retryable; aborted and unknown transport failures are not.
pub fn classify_transport(e: &TransportError) -> FailureClassification {
    let retryable = matches!(
        e.kind,
        TransportErrorKind::Connect
            | TransportErrorKind::Reset
            | TransportErrorKind::Timeout
            | TransportErrorKind::Dns
    );
    FailureClassification::network(format!("Network error: {}", e.message), retryable)
        .with_context("transport_error", e.kind.as_str())
}

/// Classify a raw failure. Never fails and has no side effects.
pub fn classify(raw: &RawFailure) -> FailureClassification {
    match raw {
        RawFailure::Http {
            status,
            retry_after,
            body,
            url,
        } => {
            let status = *status;
            let classification = match classify_http_status(status) {
                FailureKind::RateLimited => FailureClassification::rate_limited(
                    format!("Rate limit exceeded: {body}"),
                    retry_after.as_deref().and_then(parse_retry_after),
                ),
                FailureKind::TransientServer => {
                    FailureClassification::transient_server(status, format!("Server error {status}: {body}"))
                }
                _ => FailureClassification::client(status, format!("Client error {status}: {body}")),
            };
            classification
                .with_context("url", url.as_str())
                .with_context("status", status.to_string())
        }
        RawFailure::Transport(e) => classify_transport(e),
    }
}

impl From<RawFailure> for FailureClassification {
    fn from(raw: RawFailure) -> Self {
        classify(&raw)
    }
}

impl From<TransportError> for FailureClassification {
    fn from(e: TransportError) -> Self {
        classify_transport(&e)
    }
}
