//! Shared fixtures: a scripted in-process transport, dead-letter stores whose
//! writes fail, and a minimal HTTP server (see `http_server`).
#![allow(dead_code)]

pub mod http_server;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use resilink_core::dlq::{DlqEntry, DlqStore, MemoryDlqStore};
use resilink_core::failure::{TransportError, TransportErrorKind};
use resilink_core::request::{RequestDescriptor, Response};
use resilink_core::transport::Transport;

/// What the scripted transport does for one call.
#[derive(Debug, Clone)]
pub enum Step {
    Status(u16),
    RetryAfter(u16, &'static str),
    Fail(TransportErrorKind),
    /// Never answers; returns `Aborted` once the abort flag is set.
    Hang,
}

/// Plays back `steps` in order, then repeats `fallback` forever.
pub struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
    fallback: Step,
    calls: AtomicU32,
    seen: Mutex<Vec<RequestDescriptor>>,
    aborts: Mutex<Vec<Arc<AtomicBool>>>,
}

impl ScriptedTransport {
    pub fn new(steps: Vec<Step>, fallback: Step) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            fallback,
            calls: AtomicU32::new(0),
            seen: Mutex::new(Vec::new()),
            aborts: Mutex::new(Vec::new()),
        })
    }

    pub fn always(step: Step) -> Arc<Self> {
        Self::new(Vec::new(), step)
    }

    pub fn push(&self, step: Step) {
        self.steps.lock().push_back(step);
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<RequestDescriptor> {
        self.seen.lock().clone()
    }

    pub fn last_abort_flag(&self) -> Option<bool> {
        self.aborts.lock().last().map(|a| a.load(Ordering::SeqCst))
    }
}

fn response(status: u16, headers: Vec<(String, String)>) -> Response {
    Response {
        status,
        headers,
        body: format!("status {status}").into_bytes(),
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        request: &RequestDescriptor,
        abort: Arc<AtomicBool>,
    ) -> Result<Response, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().push(request.clone());
        self.aborts.lock().push(abort.clone());
        let step = self
            .steps
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match step {
            Step::Status(status) => Ok(response(status, Vec::new())),
            Step::RetryAfter(status, value) => Ok(response(
                status,
                vec![("Retry-After".to_string(), value.to_string())],
            )),
            Step::Fail(kind) => Err(TransportError::new(kind, "scripted transport failure")),
            Step::Hang => loop {
                if abort.load(Ordering::SeqCst) {
                    return Err(TransportError::new(TransportErrorKind::Aborted, "aborted"));
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            },
        }
    }
}

/// Dead-letter store whose writes always fail.
pub struct FailingStore;

#[async_trait]
impl DlqStore for FailingStore {
    async fn push(&self, _entry: DlqEntry) -> anyhow::Result<u64> {
        anyhow::bail!("disk full")
    }

    async fn list(&self, _integration: Option<&str>) -> anyhow::Result<Vec<DlqEntry>> {
        Ok(Vec::new())
    }

    async fn get(&self, _id: &str) -> anyhow::Result<Option<DlqEntry>> {
        Ok(None)
    }

    async fn remove(&self, _id: &str) -> anyhow::Result<Option<DlqEntry>> {
        Ok(None)
    }

    async fn clear(&self) -> anyhow::Result<u64> {
        Ok(0)
    }

    async fn len(&self) -> anyhow::Result<u64> {
        Ok(0)
    }
}

/// In-memory store whose writes start failing once `fail_writes` is called.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryDlqStore,
    failing: AtomicBool,
}

impl FlakyStore {
    pub fn fail_writes(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl DlqStore for FlakyStore {
    async fn push(&self, entry: DlqEntry) -> anyhow::Result<u64> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("disk full");
        }
        self.inner.push(entry).await
    }

    async fn list(&self, integration: Option<&str>) -> anyhow::Result<Vec<DlqEntry>> {
        self.inner.list(integration).await
    }

    async fn get(&self, id: &str) -> anyhow::Result<Option<DlqEntry>> {
        self.inner.get(id).await
    }

    async fn remove(&self, id: &str) -> anyhow::Result<Option<DlqEntry>> {
        self.inner.remove(id).await
    }

    async fn clear(&self) -> anyhow::Result<u64> {
        self.inner.clear().await
    }

    async fn len(&self) -> anyhow::Result<u64> {
        self.inner.len().await
    }
}
