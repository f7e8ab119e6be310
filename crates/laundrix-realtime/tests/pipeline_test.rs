//! Integration tests for the inbound pipeline: normalize, store, alert.

mod helpers;

use std::sync::atomic::Ordering;

use serde_json::json;

use laundrix_core::types::NotificationId;
use laundrix_realtime::notification::presenter::{ToastAction, ToastDuration, ToastStyle};
use laundrix_realtime::{ClientEvent, Priority};

use helpers::{FakeApi, MockTransport, TestClient, eventually};

#[tokio::test]
async fn test_security_breach_p0_alert_and_acknowledgment() {
    let t = TestClient::connected_defaults();
    t.connect().await;
    assert_eq!(t.sink.permission_requests.load(Ordering::SeqCst), 1);

    t.transport
        .push(
            "security_alert",
            json!({
                "id": "sec-1",
                "title": "Security Breach",
                "message": "Suspicious admin login from new country",
                "priority": "P0",
                "category": "security",
                "requiresAck": true
            }),
        )
        .await;

    let client = t.client.clone();
    assert!(eventually(|| client.notifications().len() == 1).await);

    let stored = &t.client.notifications()[0];
    assert_eq!(stored.priority, Priority::P0);
    assert!(stored.awaiting_ack());

    let sounds = t.sink.sounds.lock().unwrap().clone();
    assert_eq!(sounds.len(), 1);
    assert_eq!(sounds[0].name, "critical-alert");
    assert!((sounds[0].volume - 0.8).abs() < f32::EPSILON);

    let toasts = t.sink.toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].style, ToastStyle::Critical);
    assert_eq!(toasts[0].duration, ToastDuration::Indefinite);
    assert_eq!(
        toasts[0].action,
        Some(ToastAction::Acknowledge(NotificationId::new("sec-1")))
    );
    assert_eq!(t.sink.os.lock().unwrap().len(), 1);

    // operator clicks "Acknowledge"
    assert!(t.client.acknowledge_from_toast(toasts[0].id));
    let sent = t.transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].event, "acknowledge_notification");
    assert_eq!(sent[0].data["notificationId"], "sec-1");
    assert!(t.sink.dismissed.lock().unwrap().contains(&toasts[0].id));

    t.transport
        .push(
            "notification_acknowledged",
            json!({"notificationId": "sec-1", "success": true}),
        )
        .await;
    let client = t.client.clone();
    assert!(eventually(|| client.notifications()[0].acknowledged).await);
    assert!(t.client.notifications()[0].is_read);
}

#[tokio::test]
async fn test_same_id_on_two_channels_is_stored_once() {
    let t = TestClient::connected_defaults();
    t.connect().await;
    let mut events = t.client.subscribe();

    let payload = json!({"id": "dup-1", "title": "Disk usage high", "priority": "P1"});
    t.transport.push("notification", payload.clone()).await;
    t.transport.push("platform_alert", payload).await;
    t.transport
        .push("system_alert", json!({"id": "other", "priority": "P2"}))
        .await;

    let client = t.client.clone();
    assert!(eventually(|| client.notifications().len() == 2).await);
    // let any trailing frame be processed
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert_eq!(t.client.notifications().len(), 2);
    assert_eq!(t.sink.toasts().len(), 2);

    let mut ingested = 0;
    while let Ok(event) = events.try_recv() {
        if matches!(event, ClientEvent::Ingested(_)) {
            ingested += 1;
        }
    }
    assert_eq!(ingested, 2);
}

#[tokio::test]
async fn test_missing_priority_defaults_to_p3() {
    let t = TestClient::connected_defaults();
    t.connect().await;

    t.transport
        .push("notification", json!({"_id": "m-1", "title": "Weekly digest"}))
        .await;
    let client = t.client.clone();
    assert!(eventually(|| client.stats().total == 1).await);

    let stats = t.client.stats();
    assert_eq!(stats.count(Priority::P3), 1);
    assert!(t.sink.sounds.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_hydration_then_live_frames_newest_first() {
    let api = FakeApi::with_history(vec![
        json!({"id": "h-1", "createdAt": "2026-01-01T00:00:00Z", "isRead": true}),
        json!({"id": "h-2", "createdAt": "2026-01-02T00:00:00Z"}),
        json!({"id": "h-1", "createdAt": "2026-01-03T00:00:00Z"}),
    ]);
    let t = TestClient::new(MockTransport::new(), api);
    t.connect().await;

    t.transport
        .push("notification", json!({"id": "live-1", "priority": "P2"}))
        .await;
    t.transport
        .push("notification", json!({"id": "h-2", "priority": "P0"}))
        .await;

    let client = t.client.clone();
    assert!(eventually(|| client.notifications().len() == 3).await);
    let ids: Vec<String> = t
        .client
        .notifications()
        .iter()
        .map(|n| n.id.to_string())
        .collect();
    assert_eq!(ids, vec!["live-1", "h-2", "h-1"]);

    let stats = t.client.stats();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.unread, 2);
    // the duplicate live frame did not alert
    assert_eq!(t.sink.toasts().len(), 1);
}

#[tokio::test]
async fn test_platform_occurrence_becomes_notification() {
    let t = TestClient::connected_defaults();
    t.connect().await;

    t.transport
        .push(
            "payment_failure_spike",
            json!({"id": "spike-9", "failureCount": 40, "affectedTenants": 6}),
        )
        .await;
    let client = t.client.clone();
    assert!(eventually(|| client.notifications().len() == 1).await);

    let n = &t.client.notifications()[0];
    assert_eq!(n.id.as_str(), "payment_failure_spike:spike-9");
    assert_eq!(n.priority, Priority::P1);
    assert_eq!(n.category, "financial");
    assert!(n.requires_ack);
    assert_eq!(t.sink.toasts()[0].style, ToastStyle::Warning);
}

#[tokio::test]
async fn test_failed_ack_confirmation_shows_error_toast() {
    let t = TestClient::connected_defaults();
    t.connect().await;
    t.transport
        .push(
            "critical_alert",
            json!({"id": "c-1", "priority": "P0", "requiresAck": true}),
        )
        .await;
    t.transport
        .push(
            "notification_acknowledged",
            json!({"notificationId": "c-1", "success": false, "error": "already acknowledged"}),
        )
        .await;

    let sink = t.sink.clone();
    assert!(
        eventually(|| sink
            .toasts()
            .iter()
            .any(|toast| toast.style == ToastStyle::Error
                && toast.message == "Failed to acknowledge alert"))
        .await
    );
    assert!(!t.client.notifications()[0].acknowledged);
}

#[tokio::test]
async fn test_malformed_payload_is_dropped_silently() {
    let t = TestClient::connected_defaults();
    t.connect().await;

    t.transport.push("notification", json!("not an object")).await;
    t.transport
        .push("notification", json!({"id": "ok-1"}))
        .await;

    let client = t.client.clone();
    assert!(eventually(|| client.notifications().len() == 1).await);
    assert!(t.client.status().is_connected);
    assert!(t.sink.toasts().iter().all(|toast| toast.style != ToastStyle::Error));
}

#[tokio::test]
async fn test_history_fetch_failure_keeps_live_feed() {
    let api = FakeApi::new();
    api.fail_fetch.store(true, Ordering::SeqCst);
    let t = TestClient::new(MockTransport::new(), api.clone());
    t.connect().await;

    t.transport
        .push("notification", json!({"id": "live-1", "priority": "P2"}))
        .await;
    let client = t.client.clone();
    assert!(eventually(|| client.notifications().len() == 1).await);
    assert_eq!(t.client.notifications()[0].id.as_str(), "live-1");
    assert!(t.client.status().is_connected);
    assert!(t.sink.toasts().iter().all(|toast| toast.style != ToastStyle::Error));

    // a failed refresh leaves the store as it was
    *api.history.lock().unwrap() = vec![json!({"id": "h-1"})];
    assert!(!t.client.refresh().await);
    let ids: Vec<String> = t
        .client
        .notifications()
        .iter()
        .map(|n| n.id.to_string())
        .collect();
    assert_eq!(ids, vec!["live-1"]);
}

#[tokio::test]
async fn test_low_priority_ack_request_keeps_action() {
    let t = TestClient::connected_defaults();
    t.connect().await;

    t.transport
        .push(
            "notification",
            json!({"id": "p2-ack", "priority": "P2", "requiresAck": true}),
        )
        .await;
    let client = t.client.clone();
    assert!(eventually(|| client.notifications().len() == 1).await);

    assert!(t.client.notifications()[0].awaiting_ack());
    let toasts = t.sink.toasts();
    assert_eq!(toasts[0].style, ToastStyle::Info);
    assert_eq!(
        toasts[0].action,
        Some(ToastAction::Acknowledge(NotificationId::new("p2-ack")))
    );
}
