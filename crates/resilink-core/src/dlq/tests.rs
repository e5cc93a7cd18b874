//! Dead-letter queue tests, run against both stores.

use std::sync::Arc;
use std::time::Duration;

use tempfile::tempdir;

use super::sqlite::open_memory;
use super::*;
use crate::clock::ManualClock;
use crate::config::{DlqBackend, DlqSettings};
use crate::request::RequestDescriptor;

fn new_entry(integration: &str, url: &str) -> NewDlqEntry {
    NewDlqEntry::new(
        RequestDescriptor::post(url, r#"{"email":"a@b.c"}"#).header("Authorization", "Bearer t"),
        "transient-server: Server error 503: unavailable",
        3,
        integration,
    )
}

async fn memory_queue() -> DeadLetterQueue {
    DeadLetterQueue::in_memory(None)
}

async fn sqlite_queue() -> DeadLetterQueue {
    DeadLetterQueue::new(Arc::new(open_memory(None).await.unwrap()))
}

async fn filter_by_integration(q: DeadLetterQueue) {
    q.add_entry(new_entry("hubspot", "https://api.hubapi.com/1")).await.unwrap();
    q.add_entry(new_entry("stripe", "https://api.stripe.com/1")).await.unwrap();
    q.add_entry(new_entry("hubspot", "https://api.hubapi.com/2")).await.unwrap();

    let hubspot = q.list_entries(Some("hubspot")).await.unwrap();
    assert_eq!(hubspot.len(), 2);
    assert!(hubspot.iter().all(|e| e.integration_name == "hubspot"));
    assert_eq!(hubspot[0].url, "https://api.hubapi.com/1");
    assert_eq!(hubspot[1].url, "https://api.hubapi.com/2");

    let all = q.list_entries(None).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[1].integration_name, "stripe");
}

async fn remove_twice(q: DeadLetterQueue) {
    let id = q.add_entry(new_entry("hubspot", "https://api.hubapi.com/1")).await.unwrap();
    let removed = q.remove_entry(&id).await.unwrap().expect("first remove returns entry");
    assert_eq!(removed.id, id);
    assert_eq!(removed.retry_count, 3);
    assert_eq!(removed.method, "POST");
    assert_eq!(removed.headers.get("Authorization").map(String::as_str), Some("Bearer t"));
    assert_eq!(removed.body.as_deref(), Some(r#"{"email":"a@b.c"}"#));
    assert!(q.remove_entry(&id).await.unwrap().is_none());
    assert!(q.is_empty().await.unwrap());
}

async fn no_dedup_and_clear(q: DeadLetterQueue) {
    let a = q.add_entry(new_entry("hubspot", "https://api.hubapi.com/1")).await.unwrap();
    let b = q.add_entry(new_entry("hubspot", "https://api.hubapi.com/1")).await.unwrap();
    assert_ne!(a, b);
    assert_eq!(q.len().await.unwrap(), 2);
    assert_eq!(q.clear().await.unwrap(), 2);
    assert!(q.list_entries(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn memory_lists_filtered_by_integration() {
    filter_by_integration(memory_queue().await).await;
}

#[tokio::test]
async fn sqlite_lists_filtered_by_integration() {
    filter_by_integration(sqlite_queue().await).await;
}

#[tokio::test]
async fn memory_remove_twice_returns_not_found() {
    remove_twice(memory_queue().await).await;
}

#[tokio::test]
async fn sqlite_remove_twice_returns_not_found() {
    remove_twice(sqlite_queue().await).await;
}

#[tokio::test]
async fn memory_keeps_duplicates_and_clears() {
    no_dedup_and_clear(memory_queue().await).await;
}

#[tokio::test]
async fn sqlite_keeps_duplicates_and_clears() {
    no_dedup_and_clear(sqlite_queue().await).await;
}

#[tokio::test]
async fn capacity_evicts_oldest_first() {
    for q in [
        DeadLetterQueue::in_memory(Some(2)),
        DeadLetterQueue::new(Arc::new(open_memory(Some(2)).await.unwrap())),
    ] {
        q.add_entry(new_entry("hubspot", "https://a/1")).await.unwrap();
        q.add_entry(new_entry("hubspot", "https://a/2")).await.unwrap();
        q.add_entry(new_entry("hubspot", "https://a/3")).await.unwrap();
        let urls: Vec<String> = q
            .list_entries(None)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.url)
            .collect();
        assert_eq!(urls, vec!["https://a/2", "https://a/3"]);
    }
}

#[tokio::test]
async fn timestamps_come_from_the_clock() {
    let clock = ManualClock::new();
    let q = DeadLetterQueue::in_memory(None).with_clock(Arc::new(clock.clone()));
    let first = q.add_entry(new_entry("stripe", "https://s/1")).await.unwrap();
    clock.advance(Duration::from_millis(1500));
    let second = q.add_entry(new_entry("stripe", "https://s/2")).await.unwrap();
    let a = q.get_entry(&first).await.unwrap().unwrap();
    let b = q.get_entry(&second).await.unwrap().unwrap();
    assert_eq!(b.enqueued_at - a.enqueued_at, 1500);
}

#[tokio::test]
async fn sqlite_file_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state").join("dlq.db");
    let settings = DlqSettings {
        backend: DlqBackend::Sqlite,
        capacity: 0,
        path: Some(path.clone()),
    };
    let id = {
        let q = DeadLetterQueue::from_settings(&settings).await.unwrap();
        q.add_entry(new_entry("calendly", "https://api.calendly.com/x")).await.unwrap()
    };
    let reopened = DeadLetterQueue::from_settings(&settings).await.unwrap();
    let entry = reopened.get_entry(&id).await.unwrap().expect("persisted");
    assert_eq!(entry.integration_name, "calendly");
    assert_eq!(entry.to_request().url, "https://api.calendly.com/x");
}
