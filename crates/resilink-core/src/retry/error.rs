//! Terminal outcome of a retry loop that did not succeed.

use crate::failure::FailureClassification;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RetryError {
    /// The last classified failure, after `attempts` tries. Either the policy
    /// ran out of attempts or the failure was not retryable.
    #[error("{failure} (after {attempts} attempt(s))")]
    Failed {
        failure: FailureClassification,
        attempts: u32,
    },
    /// The caller cancelled the loop; `attempts` counts completed tries.
    #[error("cancelled after {attempts} attempt(s)")]
    Cancelled { attempts: u32 },
}

impl RetryError {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Failed { attempts, .. } | RetryError::Cancelled { attempts } => *attempts,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetryError::Cancelled { .. })
    }

    pub fn failure(&self) -> Option<&FailureClassification> {
        match self {
            RetryError::Failed { failure, .. } => Some(failure),
            RetryError::Cancelled { .. } => None,
        }
    }
}
