//! The notification client: owns the link, the store, and the alerting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use laundrix_core::config::AppConfig;
use laundrix_core::result::AppResult;
use laundrix_core::types::NotificationId;

use crate::api::{NotificationApi, RestNotificationApi};
use crate::auth::{AuthContext, SessionIdentity};
use crate::connection::reconnect::ReconnectScheduler;
use crate::connection::status::ConnectionStatus;
use crate::connection::transport::{Transport, TransportEvent, TransportLink};
use crate::connection::default_transport;
use crate::event::ClientEvent;
use crate::gateway::AcknowledgmentGateway;
use crate::message::envelope::Envelope;
use crate::message::types::InboundEvent;
use crate::notification::model::Notification;
use crate::notification::normalizer::{normalize, normalize_batch};
use crate::notification::presenter::{AlertPresenter, AlertSink, ToastId};
use crate::notification::store::NotificationStats;
use crate::notification::synthetic;
use crate::notification::terminal::TerminalSink;
use crate::state::FeedState;

/// Builder for [`NotificationClient`].
#[derive(Debug)]
pub struct NotificationClientBuilder {
    config: AppConfig,
    transport: Option<Arc<dyn Transport>>,
    api: Option<Arc<dyn NotificationApi>>,
    sink: Option<Arc<dyn AlertSink>>,
}

impl NotificationClientBuilder {
    /// Use a specific transport instead of WebSocket with polling fallback.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a specific REST API implementation.
    pub fn api(mut self, api: Arc<dyn NotificationApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// Use a specific alert sink instead of the terminal.
    pub fn sink(mut self, sink: Arc<dyn AlertSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Build the client. Nothing connects until [`NotificationClient::connect`].
    pub fn build(self) -> AppResult<NotificationClient> {
        let transport = match self.transport {
            Some(t) => t,
            None => default_transport(&self.config.realtime)?,
        };
        let api: Arc<dyn NotificationApi> = match self.api {
            Some(a) => a,
            None => Arc::new(RestNotificationApi::new(&self.config.api)?),
        };
        let sink = self.sink.unwrap_or_else(|| Arc::new(TerminalSink::new()));

        let presenter = AlertPresenter::new(sink, self.config.alerts.clone());
        let state = Arc::new(FeedState::new(
            presenter,
            api,
            self.config.realtime.event_buffer,
        ));

        Ok(NotificationClient {
            inner: Arc::new(ClientInner {
                gateway: AcknowledgmentGateway::new(Arc::clone(&state)),
                state,
                transport,
                reconnect: ReconnectScheduler::new(Duration::from_millis(
                    self.config.realtime.reconnect_delay_ms,
                )),
                epoch: AtomicU64::new(0),
                link: Mutex::new(None),
                hydrate_limit: self.config.api.hydrate_limit,
                shutdown: CancellationToken::new(),
            }),
        })
    }
}

/// Realtime notification client for one console session.
///
/// Cloning is cheap; clones share the same connection and store.
#[derive(Debug, Clone)]
pub struct NotificationClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    state: Arc<FeedState>,
    gateway: AcknowledgmentGateway,
    transport: Arc<dyn Transport>,
    reconnect: ReconnectScheduler,
    /// Bumped by every local disconnect; work started under an older epoch
    /// is discarded.
    epoch: AtomicU64,
    link: Mutex<Option<ActiveLink>>,
    hydrate_limit: u32,
    shutdown: CancellationToken,
}

#[derive(Debug)]
struct ActiveLink {
    cancel: CancellationToken,
    reader: JoinHandle<()>,
}

impl NotificationClient {
    /// Start building a client from configuration.
    pub fn builder(config: &AppConfig) -> NotificationClientBuilder {
        NotificationClientBuilder {
            config: config.clone(),
            transport: None,
            api: None,
            sink: None,
        }
    }

    /// Open a link for `identity`.
    ///
    /// No-op while a link is open or being opened. Failures are recorded in
    /// the status and a retry is scheduled; nothing is returned to the
    /// caller.
    pub async fn connect(&self, identity: SessionIdentity) {
        ClientInner::connect(&self.inner, identity).await;
    }

    /// Close the link, cancel any pending retry, and reset the status.
    ///
    /// Safe to call repeatedly. The notification list is kept.
    pub fn disconnect(&self) {
        self.inner.disconnect();
    }

    /// Disconnect and connect again with the last identity.
    ///
    /// Returns `false` if no identity has been used yet.
    pub async fn reconnect(&self) -> bool {
        let Some(identity) = self.inner.state.identity() else {
            tracing::warn!("Reconnect requested without a session");
            return false;
        };
        self.inner.disconnect();
        ClientInner::connect(&self.inner, identity).await;
        true
    }

    /// Re-fetch the notification list from REST.
    pub async fn refresh(&self) -> bool {
        self.inner.hydrate().await
    }

    /// Disconnect and stop any auth binding.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
        self.inner.disconnect();
        tracing::info!("Notification client shut down");
    }

    /// Follow sign-in state: connect on sign-in, disconnect on sign-out.
    ///
    /// Dropping the returned binding stops following and disconnects.
    pub fn bind_auth(&self, auth: &AuthContext) -> AuthBinding {
        let mut rx = auth.subscribe();
        let weak = Arc::downgrade(&self.inner);
        let shutdown = self.inner.shutdown.clone();

        let task = tokio::spawn(async move {
            loop {
                let current = rx.borrow_and_update().clone();
                {
                    let Some(inner) = weak.upgrade() else { return };
                    match current {
                        Some(identity) => {
                            let switched = inner
                                .state
                                .identity()
                                .is_some_and(|prev| prev != identity);
                            if switched {
                                inner.disconnect();
                            }
                            ClientInner::connect(&inner, identity).await;
                        }
                        None => {
                            inner.disconnect();
                            inner.state.set_identity(None);
                        }
                    }
                }

                tokio::select! {
                    _ = shutdown.cancelled() => return,
                    changed = rx.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                }
            }
        });

        AuthBinding {
            task,
            client: Arc::downgrade(&self.inner),
        }
    }

    /// Send an acknowledgment for a notification that requires one.
    pub fn acknowledge_notification(&self, id: &NotificationId) -> bool {
        self.inner.gateway.acknowledge(id)
    }

    /// Invoke the acknowledge action of a toast and dismiss it.
    pub fn acknowledge_from_toast(&self, toast_id: ToastId) -> bool {
        let presenter = &self.inner.state.presenter;
        let Some(id) = presenter.take_ack_toast(toast_id) else {
            tracing::debug!(%toast_id, "Toast has no pending acknowledgment");
            return false;
        };
        let sent = self.inner.gateway.acknowledge(&id);
        presenter.dismiss(toast_id);
        sent
    }

    /// Mark one notification read.
    pub fn mark_as_read(&self, id: &NotificationId) -> bool {
        self.inner.gateway.mark_read(id)
    }

    /// Mark every notification read.
    pub fn mark_all_as_read(&self) -> usize {
        self.inner.gateway.mark_all_read()
    }

    /// Remove every notification.
    pub fn clear_notifications(&self) {
        self.inner.gateway.clear_all();
    }

    /// Snapshot of the notification list, most recent first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.inner.state.store().items().to_vec()
    }

    /// Current statistics.
    pub fn stats(&self) -> NotificationStats {
        self.inner.state.store().stats().clone()
    }

    /// Current connection status.
    pub fn status(&self) -> ConnectionStatus {
        self.inner.state.status()
    }

    /// Subscribe to change events.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.inner.state.subscribe()
    }

    /// Watch connection status.
    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.inner.state.watch_status()
    }

    /// The acknowledgment gateway.
    pub fn gateway(&self) -> &AcknowledgmentGateway {
        &self.inner.gateway
    }

    /// Whether a reconnection attempt is waiting.
    pub fn reconnect_pending(&self) -> bool {
        self.inner.reconnect.is_pending()
    }

    /// Number of reconnection attempts scheduled so far.
    pub fn reconnect_attempts(&self) -> u64 {
        self.inner.reconnect.scheduled_count()
    }
}

/// Keeps a client following an [`AuthContext`].
#[derive(Debug)]
pub struct AuthBinding {
    task: JoinHandle<()>,
    client: Weak<ClientInner>,
}

impl Drop for AuthBinding {
    fn drop(&mut self) {
        self.task.abort();
        if let Some(inner) = self.client.upgrade() {
            inner.disconnect();
        }
    }
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        self.shutdown.cancel();
        let active = self.link.get_mut().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(active) = active {
            active.cancel.cancel();
            active.reader.abort();
        }
    }
}

impl ClientInner {
    async fn connect(this: &Arc<Self>, identity: SessionIdentity) {
        if !this.state.begin_connecting() {
            tracing::debug!("Connect skipped: link already open or opening");
            return;
        }
        let epoch = this.epoch.load(Ordering::SeqCst);
        this.state.set_identity(Some(identity.clone()));

        tracing::info!(user_id = %identity.user_id, role = %identity.role, "Connecting to realtime server");

        match this.transport.open(&identity).await {
            Ok(link) => {
                if this.epoch.load(Ordering::SeqCst) != epoch {
                    tracing::debug!("Link opened after disconnect; discarding");
                    link.cancel.cancel();
                    return;
                }
                Self::attach(this, link, epoch);
            }
            Err(e) => {
                if this.epoch.load(Ordering::SeqCst) != epoch {
                    return;
                }
                tracing::warn!(error = %e, "Realtime connection failed");
                let message = e.to_string();
                this.state.update_status(|s| {
                    s.is_connecting = false;
                    s.is_connected = false;
                    s.transport_mode = None;
                    s.last_error = Some(message);
                });
                Self::schedule_reconnect(this, epoch);
            }
        }
    }

    fn attach(this: &Arc<Self>, link: TransportLink, epoch: u64) {
        let TransportLink {
            mode,
            outbound,
            inbound,
            cancel,
        } = link;

        this.state.set_outbound(Some(outbound));
        this.state.update_status(|s| {
            s.is_connected = true;
            s.is_connecting = false;
            s.last_error = None;
            s.transport_mode = Some(mode);
        });
        tracing::info!(transport = %mode, "Realtime connection established");

        this.state.presenter.request_permission_if_needed();

        let reader = tokio::spawn(run_reader(
            Arc::downgrade(this),
            inbound,
            cancel.clone(),
            epoch,
        ));

        let previous = this
            .link
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(ActiveLink { cancel, reader });
        if let Some(previous) = previous {
            previous.cancel.cancel();
            previous.reader.abort();
        }
    }

    fn schedule_reconnect(this: &Arc<Self>, epoch: u64) {
        let weak = Arc::downgrade(this);
        this.reconnect.schedule(move || async move {
            let Some(inner) = weak.upgrade() else { return };
            if inner.epoch.load(Ordering::SeqCst) != epoch {
                return;
            }
            let Some(identity) = inner.state.identity() else {
                return;
            };
            tracing::info!("Attempting reconnection");
            Box::pin(Self::connect(&inner, identity)).await;
        });
    }

    /// The link ended without a local disconnect.
    fn link_lost(this: &Arc<Self>, epoch: u64, reason: String) {
        if this.epoch.load(Ordering::SeqCst) != epoch {
            return;
        }
        tracing::warn!(reason = %reason, "Realtime connection lost");
        this.teardown_link();
        this.state.update_status(|s| {
            s.is_connected = false;
            s.is_connecting = false;
            s.transport_mode = None;
            s.last_error = Some(reason);
        });
        Self::schedule_reconnect(this, epoch);
    }

    fn disconnect(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let had_timer = self.reconnect.cancel();
        let had_link = self.teardown_link();

        self.state.update_status(|s| *s = ConnectionStatus::default());
        if had_link || had_timer {
            tracing::info!("Disconnected from realtime server");
        }
    }

    fn teardown_link(&self) -> bool {
        self.state.set_outbound(None);
        let active = self.link.lock().unwrap_or_else(|e| e.into_inner()).take();
        match active {
            Some(active) => {
                // the reader exits on its own when cancelled
                active.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Replace the store with the REST list. Returns `true` on success.
    async fn hydrate(&self) -> bool {
        let Some(token) = self.state.token() else {
            tracing::debug!("Hydration skipped: no session");
            return false;
        };

        match self
            .state
            .api
            .fetch_notifications(&token, self.hydrate_limit)
            .await
        {
            Ok(raw) => {
                let list = normalize_batch(&raw);
                let count = {
                    let mut store = self.state.store();
                    store.hydrate(list);
                    store.len()
                };
                tracing::info!(count, "Notifications hydrated");
                self.state.publish(ClientEvent::Hydrated(count));
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch notification history");
                false
            }
        }
    }

    /// Handle one inbound frame. Returns a reason if the link must be
    /// considered lost.
    fn dispatch(&self, envelope: Envelope) -> Option<String> {
        let event_name = envelope.event.clone();
        match InboundEvent::from_envelope(envelope) {
            InboundEvent::Connected => {
                tracing::debug!("Server confirmed connection");
            }
            InboundEvent::Disconnected { reason } => {
                return Some(format!("server disconnect: {reason}"));
            }
            InboundEvent::ConnectError { message } => {
                return Some(message);
            }
            InboundEvent::Alert { payload, .. } => self.ingest(&event_name, &payload),
            InboundEvent::Occurrence { kind, payload } => {
                self.ingest(&event_name, &synthetic::from_occurrence(kind, &payload));
            }
            InboundEvent::AckConfirmed(confirmation) => {
                self.gateway.handle_confirmation(confirmation);
            }
            InboundEvent::Unknown { event } => {
                tracing::debug!(event = %event, "Ignoring unknown event");
            }
        }
        None
    }

    fn ingest(&self, event: &str, payload: &serde_json::Value) {
        let notification = match normalize(payload) {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(event, error = %e, "Dropping notification payload");
                return;
            }
        };

        let added = self.state.store().ingest(notification.clone());
        if !added {
            return;
        }
        tracing::info!(
            event,
            notification_id = %notification.id,
            priority = %notification.priority,
            "Notification received"
        );
        self.state.presenter.present(&notification);
        self.state.publish(ClientEvent::Ingested(notification));
    }
}

async fn run_reader(
    weak: Weak<ClientInner>,
    mut inbound: mpsc::Receiver<TransportEvent>,
    cancel: CancellationToken,
    epoch: u64,
) {
    // Live frames queue in the channel until hydration finishes, so they
    // are applied on top of the REST snapshot in delivery order.
    if let Some(inner) = weak.upgrade() {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = inner.hydrate() => {}
        }
    }

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => return,
            next = inbound.recv() => next,
        };
        let Some(inner) = weak.upgrade() else { return };
        if inner.epoch.load(Ordering::SeqCst) != epoch {
            return;
        }

        let lost = match next {
            Some(TransportEvent::Frame(envelope)) => inner.dispatch(envelope),
            Some(TransportEvent::Closed { reason }) => Some(reason),
            None => Some("link closed".to_string()),
        };
        if let Some(reason) = lost {
            ClientInner::link_lost(&inner, epoch, reason);
            return;
        }
    }
}
