//! Dead-letter entry types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::request::RequestDescriptor;

/// A request whose resilience budget was exhausted. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DlqEntry {
    pub id: String,
    pub url: String,
    pub method: String,
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub error_description: String,
    /// Attempts actually made before giving up.
    pub retry_count: u32,
    pub integration_name: String,
    /// Unix milliseconds.
    pub enqueued_at: i64,
}

impl DlqEntry {
    /// Rebuild the original request, e.g. for manual reprocessing.
    pub fn to_request(&self) -> RequestDescriptor {
        RequestDescriptor {
            url: self.url.clone(),
            method: self.method.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }
}

/// What a caller hands to [`super::DeadLetterQueue::add_entry`]; the queue
/// assigns the id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDlqEntry {
    pub request: RequestDescriptor,
    pub error_description: String,
    pub retry_count: u32,
    pub integration_name: String,
}

impl NewDlqEntry {
    pub fn new(
        request: RequestDescriptor,
        error_description: impl Into<String>,
        retry_count: u32,
        integration_name: impl Into<String>,
    ) -> Self {
        Self {
            request,
            error_description: error_description.into(),
            retry_count,
            integration_name: integration_name.into(),
        }
    }

    pub(super) fn into_entry(self, id: String, enqueued_at: i64) -> DlqEntry {
        let RequestDescriptor {
            url,
            method,
            headers,
            body,
        } = self.request;
        DlqEntry {
            id,
            url,
            method,
            headers,
            body,
            error_description: self.error_description,
            retry_count: self.retry_count,
            integration_name: self.integration_name,
            enqueued_at,
        }
    }
}
