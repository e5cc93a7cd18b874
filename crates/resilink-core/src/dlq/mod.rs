//! Dead-letter queue for requests whose retries and breaker budget are exhausted.
//!
//! [`DeadLetterQueue`] is an explicit, cloneable handle owned by the
//! application (no global state). It assigns ids and timestamps and delegates
//! storage to a [`DlqStore`]: [`MemoryDlqStore`] for process-local holding or
//! [`SqliteDlqStore`] for durable storage. Both support a capacity with
//! drop-oldest eviction so a sustained outage cannot grow the queue without
//! bound.

mod entry;
mod memory;
mod sqlite;
mod store;

use std::sync::Arc;

use anyhow::Result;

use crate::clock::{Clock, SystemClock};
use crate::config::{DlqBackend, DlqSettings};

pub use entry::{DlqEntry, NewDlqEntry};
pub use memory::MemoryDlqStore;
pub use sqlite::SqliteDlqStore;
pub use store::DlqStore;

#[derive(Clone)]
pub struct DeadLetterQueue {
    store: Arc<dyn DlqStore>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for DeadLetterQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeadLetterQueue").finish_non_exhaustive()
    }
}

impl DeadLetterQueue {
    pub fn new(store: Arc<dyn DlqStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
        }
    }

    /// Process-local queue. `None` or `Some(0)` capacity means unbounded.
    pub fn in_memory(capacity: Option<usize>) -> Self {
        Self::new(Arc::new(MemoryDlqStore::with_capacity(capacity)))
    }

    /// Open the backend described by the `[dlq]` config section.
    pub async fn from_settings(settings: &DlqSettings) -> Result<Self> {
        let capacity = Some(settings.capacity).filter(|c| *c > 0);
        match settings.backend {
            DlqBackend::Memory => Ok(Self::in_memory(capacity.map(|c| c as usize))),
            DlqBackend::Sqlite => {
                let store = match &settings.path {
                    Some(path) => SqliteDlqStore::open_at(path, capacity).await?,
                    None => SqliteDlqStore::open_default(capacity).await?,
                };
                Ok(Self::new(Arc::new(store)))
            }
        }
    }

    /// Use `clock` for `enqueued_at` timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Append an entry; returns its new id. Entries are never deduplicated.
    pub async fn add_entry(&self, new: NewDlqEntry) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let entry = new.into_entry(id.clone(), self.clock.unix_millis());
        let integration = entry.integration_name.clone();
        let evicted = self.store.push(entry).await?;
        if evicted > 0 {
            tracing::warn!(
                integration = %integration,
                evicted,
                "dead-letter queue at capacity, dropped oldest entries"
            );
        }
        Ok(id)
    }

    /// Snapshot of entries in FIFO order, optionally for one integration only.
    pub async fn list_entries(&self, integration: Option<&str>) -> Result<Vec<DlqEntry>> {
        self.store.list(integration).await
    }

    pub async fn get_entry(&self, id: &str) -> Result<Option<DlqEntry>> {
        self.store.get(id).await
    }

    /// Remove and return the entry; `None` if it does not exist (or was already removed).
    pub async fn remove_entry(&self, id: &str) -> Result<Option<DlqEntry>> {
        self.store.remove(id).await
    }

    pub async fn clear(&self) -> Result<u64> {
        self.store.clear().await
    }

    pub async fn len(&self) -> Result<u64> {
        self.store.len().await
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}

#[cfg(test)]
mod tests;
