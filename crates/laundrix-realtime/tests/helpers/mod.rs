//! Shared in-memory fakes for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Notify;

use laundrix_core::config::AppConfig;
use laundrix_core::error::AppError;
use laundrix_core::result::AppResult;
use laundrix_core::types::{ConsoleRole, NotificationId, UserId};
use laundrix_realtime::connection::transport::{LinkPeer, TransportEvent, TransportLink};
use laundrix_realtime::message::envelope::Envelope;
use laundrix_realtime::notification::presenter::{
    AlertSink, OsNotificationSpec, PermissionState, SoundSpec, ToastId, ToastSpec,
};
use laundrix_realtime::{NotificationApi, NotificationClient, SessionIdentity, Transport, TransportMode};

/// Transport whose links are driven by the test.
#[derive(Debug)]
pub struct MockTransport {
    opened: AtomicUsize,
    failing: AtomicBool,
    peers: Mutex<Vec<LinkPeer>>,
    identities: Mutex<Vec<SessionIdentity>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            opened: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            peers: Mutex::new(Vec::new()),
            identities: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        let transport = Self::new();
        transport.set_failing(true);
        transport
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `open` calls, successful or not.
    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn last_identity(&self) -> Option<SessionIdentity> {
        self.identities.lock().unwrap().last().cloned()
    }

    /// Deliver a frame on the most recent link.
    pub async fn push(&self, event: &str, data: Value) {
        self.deliver(TransportEvent::Frame(Envelope::new(event, data)))
            .await;
    }

    /// End the most recent link as if the network dropped.
    pub async fn drop_link(&self, reason: &str) {
        self.deliver(TransportEvent::Closed {
            reason: reason.to_string(),
        })
        .await;
    }

    /// Frames the client has sent on the most recent link.
    pub fn sent(&self) -> Vec<Envelope> {
        let mut peers = self.peers.lock().unwrap();
        let mut frames = Vec::new();
        if let Some(peer) = peers.last_mut() {
            while let Ok(envelope) = peer.outbound.try_recv() {
                frames.push(envelope);
            }
        }
        frames
    }

    /// Whether the most recent link was torn down locally.
    pub fn last_link_cancelled(&self) -> bool {
        self.peers
            .lock()
            .unwrap()
            .last()
            .is_some_and(|p| p.cancel.is_cancelled())
    }

    async fn deliver(&self, event: TransportEvent) {
        let sender = self
            .peers
            .lock()
            .unwrap()
            .last()
            .map(|p| p.inbound.clone())
            .expect("no link has been opened");
        sender.send(event).await.expect("client dropped the link");
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn mode(&self) -> TransportMode {
        TransportMode::WebSocket
    }

    async fn open(&self, identity: &SessionIdentity) -> AppResult<TransportLink> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.identities.lock().unwrap().push(identity.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::connection("connection refused"));
        }
        let (link, peer) = TransportLink::channel(TransportMode::WebSocket, 64);
        self.peers.lock().unwrap().push(peer);
        Ok(link)
    }
}

/// REST API backed by memory, recording every call.
#[derive(Debug, Default)]
pub struct FakeApi {
    pub history: Mutex<Vec<Value>>,
    calls: Mutex<Vec<String>>,
    pub fail_fetch: AtomicBool,
    pub fail_clear: AtomicBool,
    pub fail_mark_all: AtomicBool,
    pub hold_mark_all: AtomicBool,
    pub release: Notify,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_history(history: Vec<Value>) -> Arc<Self> {
        let api = Self::default();
        *api.history.lock().unwrap() = history;
        Arc::new(api)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl NotificationApi for FakeApi {
    async fn fetch_notifications(&self, _token: &str, limit: u32) -> AppResult<Vec<Value>> {
        self.record(format!("fetch:{limit}"));
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(AppError::external_service("GET notifications failed with status 503"));
        }
        Ok(self.history.lock().unwrap().clone())
    }

    async fn mark_read(&self, _token: &str, id: &NotificationId) -> AppResult<()> {
        self.record(format!("mark_read:{id}"));
        Ok(())
    }

    async fn mark_all_read(&self, _token: &str) -> AppResult<()> {
        self.record("mark_all_read:start");
        if self.hold_mark_all.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
        self.record("mark_all_read:done");
        if self.fail_mark_all.load(Ordering::SeqCst) {
            return Err(AppError::external_service("read-all failed with status 500"));
        }
        Ok(())
    }

    async fn clear_all(&self, _token: &str) -> AppResult<()> {
        self.record("clear_all");
        if self.fail_clear.load(Ordering::SeqCst) {
            return Err(AppError::external_service("DELETE notifications failed with status 500"));
        }
        Ok(())
    }
}

/// Alert sink that records every side effect.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub sounds: Mutex<Vec<SoundSpec>>,
    pub toasts: Mutex<Vec<ToastSpec>>,
    pub dismissed: Mutex<Vec<ToastId>>,
    pub os: Mutex<Vec<OsNotificationSpec>>,
    pub permission_requests: AtomicUsize,
    granted: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn toasts(&self) -> Vec<ToastSpec> {
        self.toasts.lock().unwrap().clone()
    }
}

impl AlertSink for RecordingSink {
    fn play_sound(&self, sound: &SoundSpec) -> AppResult<()> {
        self.sounds.lock().unwrap().push(sound.clone());
        Ok(())
    }

    fn show_toast(&self, toast: &ToastSpec) -> AppResult<()> {
        self.toasts.lock().unwrap().push(toast.clone());
        Ok(())
    }

    fn dismiss_toast(&self, id: ToastId) {
        self.dismissed.lock().unwrap().push(id);
    }

    fn permission(&self) -> PermissionState {
        if self.granted.load(Ordering::SeqCst) {
            PermissionState::Granted
        } else {
            PermissionState::Undecided
        }
    }

    fn request_permission(&self) -> PermissionState {
        self.permission_requests.fetch_add(1, Ordering::SeqCst);
        self.granted.store(true, Ordering::SeqCst);
        PermissionState::Granted
    }

    fn show_os_notification(&self, notification: &OsNotificationSpec) -> AppResult<()> {
        self.os.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// Everything a scenario needs.
pub struct TestClient {
    pub client: NotificationClient,
    pub transport: Arc<MockTransport>,
    pub api: Arc<FakeApi>,
    pub sink: Arc<RecordingSink>,
}

impl TestClient {
    pub fn new(transport: Arc<MockTransport>, api: Arc<FakeApi>) -> Self {
        let sink = RecordingSink::new();
        let client = NotificationClient::builder(&AppConfig::default())
            .transport(transport.clone())
            .api(api.clone())
            .sink(sink.clone())
            .build()
            .expect("client builds");
        Self {
            client,
            transport,
            api,
            sink,
        }
    }

    pub fn connected_defaults() -> Self {
        Self::new(MockTransport::new(), FakeApi::new())
    }

    /// Connect and wait until hydration has run.
    pub async fn connect(&self) {
        self.client.connect(identity()).await;
        let api = self.api.clone();
        assert!(
            eventually(|| api.calls().iter().any(|c| c.starts_with("fetch:"))).await,
            "hydration never ran"
        );
    }
}

pub fn identity() -> SessionIdentity {
    SessionIdentity::new(UserId::new("admin-1"), ConsoleRole::Superadmin, "test-token")
}

/// Poll `check` until it holds, yielding to spawned tasks in between.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    check()
}
