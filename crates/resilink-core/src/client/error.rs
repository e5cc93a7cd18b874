use crate::failure::{FailureClassification, FailureKind};

/// Terminal outcome of a resilient request that did not succeed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RequestError {
    /// The integration failed (or the breaker refused the call). `attempts`
    /// is 0 when the breaker failed fast.
    #[error("{failure}")]
    Failed {
        failure: FailureClassification,
        attempts: u32,
    },
    /// The caller cancelled; not counted against the integration.
    #[error("request cancelled after {attempts} attempt(s)")]
    Cancelled { attempts: u32 },
}

impl RequestError {
    pub fn attempts(&self) -> u32 {
        match self {
            RequestError::Failed { attempts, .. } | RequestError::Cancelled { attempts } => *attempts,
        }
    }

    pub fn failure(&self) -> Option<&FailureClassification> {
        match self {
            RequestError::Failed { failure, .. } => Some(failure),
            RequestError::Cancelled { .. } => None,
        }
    }

    pub fn kind(&self) -> Option<FailureKind> {
        self.failure().map(|f| f.kind)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RequestError::Cancelled { .. })
    }
}
