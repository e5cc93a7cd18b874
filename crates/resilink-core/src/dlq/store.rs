//! Storage backend seam for the dead-letter queue.

use anyhow::Result;
use async_trait::async_trait;

use super::entry::DlqEntry;

/// Backing storage for dead-letter entries. Implementations keep FIFO order
/// and must be safe to use from concurrent tasks.
#[async_trait]
pub trait DlqStore: Send + Sync {
    /// Append an entry. Returns how many of the oldest entries were evicted to
    /// stay within capacity.
    async fn push(&self, entry: DlqEntry) -> Result<u64>;

    /// Snapshot in insertion order, optionally limited to one integration.
    async fn list(&self, integration: Option<&str>) -> Result<Vec<DlqEntry>>;

    async fn get(&self, id: &str) -> Result<Option<DlqEntry>>;

    /// Remove and return the entry; `None` when no such id exists.
    async fn remove(&self, id: &str) -> Result<Option<DlqEntry>>;

    /// Remove everything; returns the number of entries removed.
    async fn clear(&self) -> Result<u64>;

    async fn len(&self) -> Result<u64>;
}
