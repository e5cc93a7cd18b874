use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// High-level kind of an integration failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// Upstream answered with a 5xx status.
    TransientServer,
    /// Upstream answered 429; may carry a retry-after hint.
    RateLimited,
    /// Any other non-success status (4xx except 429). Never retried.
    Client,
    /// Transport-level failure: connection reset, timeout, DNS.
    Network,
    /// The circuit breaker refused the call; nothing was sent.
    BreakerOpen,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::TransientServer => "transient-server",
            FailureKind::RateLimited => "rate-limited",
            FailureKind::Client => "client",
            FailureKind::Network => "network",
            FailureKind::BreakerOpen => "breaker-open",
        }
    }

    /// True for kinds produced from an HTTP status. Only these are
    /// dead-lettered: network failures and breaker rejections never got an
    /// answer from the integration.
    pub fn is_status_bearing(self) -> bool {
        matches!(
            self,
            FailureKind::TransientServer | FailureKind::RateLimited | FailureKind::Client
        )
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed description of why a call failed and whether it is worth retrying.
///
/// This is the single error value flowing through the retry loop, the
/// circuit breaker and the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FailureClassification {
    pub kind: FailureKind,
    pub retryable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<f64>,
    pub message: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,
}

impl FailureClassification {
    fn new(kind: FailureKind, retryable: bool, message: impl Into<String>) -> Self {
        Self {
            kind,
            retryable,
            status_code: None,
            retry_after_seconds: None,
            message: message.into(),
            context: BTreeMap::new(),
        }
    }

    pub fn transient_server(status: u16, message: impl Into<String>) -> Self {
        let mut c = Self::new(FailureKind::TransientServer, true, message);
        c.status_code = Some(status);
        c
    }

    pub fn rate_limited(message: impl Into<String>, retry_after_seconds: Option<f64>) -> Self {
        let mut c = Self::new(FailureKind::RateLimited, true, message);
        c.status_code = Some(429);
        c.retry_after_seconds = retry_after_seconds;
        c
    }

    pub fn client(status: u16, message: impl Into<String>) -> Self {
        let mut c = Self::new(FailureKind::Client, false, message);
        c.status_code = Some(status);
        c
    }

    pub fn network(message: impl Into<String>, retryable: bool) -> Self {
        Self::new(FailureKind::Network, retryable, message)
    }

    /// Fail-fast error synthesized by the circuit breaker. `remaining` is the
    /// cooldown left before the breaker will admit a probe.
    pub fn breaker_open(integration: &str, remaining: Duration) -> Self {
        let mut c = Self::new(
            FailureKind::BreakerOpen,
            false,
            format!(
                "circuit breaker open for {integration}; next probe in {}ms",
                remaining.as_millis()
            ),
        );
        c.retry_after_seconds = Some(remaining.as_secs_f64());
        c.context
            .insert("integration".to_string(), integration.to_string());
        c
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Retry-after hint as a duration, if present and usable.
    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after_seconds
            .and_then(|s| Duration::try_from_secs_f64(s).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breaker_open_is_never_retryable_and_carries_cooldown() {
        let c = FailureClassification::breaker_open("hubspot", Duration::from_millis(1500));
        assert_eq!(c.kind, FailureKind::BreakerOpen);
        assert!(!c.retryable);
        assert_eq!(c.retry_after(), Some(Duration::from_millis(1500)));
        assert_eq!(c.context.get("integration").map(String::as_str), Some("hubspot"));
        assert!(!c.kind.is_status_bearing());
    }

    #[test]
    fn display_includes_kind_and_message() {
        let c = FailureClassification::client(404, "Client error 404: missing");
        assert_eq!(c.to_string(), "client: Client error 404: missing");
    }

    #[test]
    fn negative_retry_after_is_ignored() {
        let c = FailureClassification::rate_limited("slow down", Some(-3.0));
        assert_eq!(c.retry_after(), None);
    }

    #[test]
    fn unrepresentable_retry_after_is_ignored() {
        let c = FailureClassification::rate_limited("slow down", Some(1e30));
        assert_eq!(c.retry_after(), None);
        let c = FailureClassification::rate_limited("slow down", Some(f64::NAN));
        assert_eq!(c.retry_after(), None);
    }

    #[test]
    fn status_bearing_kinds() {
        assert!(FailureKind::TransientServer.is_status_bearing());
        assert!(FailureKind::RateLimited.is_status_bearing());
        assert!(FailureKind::Client.is_status_bearing());
        assert!(!FailureKind::Network.is_status_bearing());
        assert!(!FailureKind::BreakerOpen.is_status_bearing());
    }
}
