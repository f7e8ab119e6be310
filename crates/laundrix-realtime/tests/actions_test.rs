//! Integration tests for operator actions: read, read-all, clear, acknowledge.

mod helpers;

use std::sync::atomic::Ordering;

use serde_json::json;

use laundrix_core::types::NotificationId;
use laundrix_realtime::gateway::CLEAR_FAILED_MESSAGE;
use laundrix_realtime::notification::presenter::ToastStyle;

use helpers::{FakeApi, MockTransport, TestClient, eventually};

async fn seeded(api: std::sync::Arc<FakeApi>, count: usize) -> TestClient {
    let t = TestClient::new(MockTransport::new(), api);
    t.connect().await;
    for i in 0..count {
        t.transport
            .push("notification", json!({"id": format!("n-{i}"), "priority": "P2"}))
            .await;
    }
    let client = t.client.clone();
    assert!(eventually(|| client.notifications().len() == count).await);
    t
}

#[tokio::test]
async fn test_mark_all_read_is_optimistic() {
    let api = FakeApi::new();
    api.hold_mark_all.store(true, Ordering::SeqCst);
    let t = seeded(api.clone(), 3).await;
    assert_eq!(t.client.stats().unread, 3);

    assert_eq!(t.client.mark_all_as_read(), 3);
    // local state changes before the server answers
    assert_eq!(t.client.stats().unread, 0);
    assert!(eventually(|| api.calls().contains(&"mark_all_read:start".to_string())).await);
    assert!(!api.calls().contains(&"mark_all_read:done".to_string()));
    assert_eq!(t.client.stats().unread, 0);

    api.release.notify_one();
    assert!(eventually(|| api.calls().contains(&"mark_all_read:done".to_string())).await);
    assert_eq!(t.client.stats().unread, 0);
}

#[tokio::test]
async fn test_mark_all_read_failure_is_not_rolled_back() {
    let api = FakeApi::new();
    api.fail_mark_all.store(true, Ordering::SeqCst);
    let t = seeded(api.clone(), 2).await;

    t.client.mark_all_as_read();
    assert!(eventually(|| api.calls().contains(&"mark_all_read:done".to_string())).await);
    assert_eq!(t.client.stats().unread, 0);
    assert!(t.sink.toasts().iter().all(|toast| toast.style != ToastStyle::Error));
}

#[tokio::test]
async fn test_mark_read_updates_store_and_persists() {
    let api = FakeApi::new();
    let t = seeded(api.clone(), 2).await;

    assert!(t.client.mark_as_read(&NotificationId::new("n-0")));
    assert_eq!(t.client.stats().unread, 1);
    assert!(eventually(|| api.calls().contains(&"mark_read:n-0".to_string())).await);
}

#[tokio::test]
async fn test_clear_all_failure_shows_error_toast() {
    let api = FakeApi::new();
    api.fail_clear.store(true, Ordering::SeqCst);
    let t = seeded(api.clone(), 2).await;

    t.client.clear_notifications();
    assert!(t.client.notifications().is_empty());
    assert_eq!(t.client.stats().total, 0);

    let sink = t.sink.clone();
    assert!(
        eventually(|| sink
            .toasts()
            .iter()
            .any(|toast| toast.style == ToastStyle::Error && toast.message == CLEAR_FAILED_MESSAGE))
        .await
    );
    // the local store stays empty
    assert!(t.client.notifications().is_empty());
}

#[tokio::test]
async fn test_clear_all_success_is_quiet() {
    let api = FakeApi::new();
    let t = seeded(api.clone(), 1).await;

    t.client.clear_notifications();
    assert!(eventually(|| api.calls().contains(&"clear_all".to_string())).await);
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    assert!(t.sink.toasts().iter().all(|toast| toast.style != ToastStyle::Error));
}

#[tokio::test]
async fn test_acknowledge_requires_open_link() {
    let t = TestClient::connected_defaults();
    let id = NotificationId::new("p0-1");
    assert!(!t.client.acknowledge_notification(&id));

    t.connect().await;
    assert!(t.client.acknowledge_notification(&id));
    assert_eq!(t.transport.sent()[0].data["notificationId"], "p0-1");

    t.client.disconnect();
    assert!(!t.client.acknowledge_notification(&id));
}

#[tokio::test]
async fn test_refresh_rehydrates() {
    let api = FakeApi::new();
    let t = seeded(api.clone(), 0).await;
    *api.history.lock().unwrap() = vec![json!({"id": "late-1"}), json!({"id": "late-2"})];

    assert!(t.client.refresh().await);
    assert_eq!(t.client.notifications().len(), 2);
}
