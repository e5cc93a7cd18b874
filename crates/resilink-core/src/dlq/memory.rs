//! In-memory dead-letter store.

use std::collections::VecDeque;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;

use super::entry::DlqEntry;
use super::store::DlqStore;

/// Process-local FIFO with an optional capacity (oldest entries are evicted).
#[derive(Debug, Default)]
pub struct MemoryDlqStore {
    entries: Mutex<VecDeque<DlqEntry>>,
    capacity: Option<usize>,
}

impl MemoryDlqStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` or `Some(0)` means unbounded.
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            capacity: capacity.filter(|c| *c > 0),
        }
    }
}

#[async_trait]
impl DlqStore for MemoryDlqStore {
    async fn push(&self, entry: DlqEntry) -> Result<u64> {
        let mut entries = self.entries.lock();
        entries.push_back(entry);
        let mut evicted = 0;
        if let Some(cap) = self.capacity {
            while entries.len() > cap {
                entries.pop_front();
                evicted += 1;
            }
        }
        Ok(evicted)
    }

    async fn list(&self, integration: Option<&str>) -> Result<Vec<DlqEntry>> {
        let entries = self.entries.lock();
        Ok(entries
            .iter()
            .filter(|e| integration.map_or(true, |name| e.integration_name == name))
            .cloned()
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<DlqEntry>> {
        Ok(self.entries.lock().iter().find(|e| e.id == id).cloned())
    }

    async fn remove(&self, id: &str) -> Result<Option<DlqEntry>> {
        let mut entries = self.entries.lock();
        Ok(entries
            .iter()
            .position(|e| e.id == id)
            .and_then(|idx| entries.remove(idx)))
    }

    async fn clear(&self) -> Result<u64> {
        let mut entries = self.entries.lock();
        let n = entries.len() as u64;
        entries.clear();
        Ok(n)
    }

    async fn len(&self) -> Result<u64> {
        Ok(self.entries.lock().len() as u64)
    }
}
