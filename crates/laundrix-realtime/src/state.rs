//! State shared by the client, its reader task, and the gateway.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{broadcast, mpsc, watch};

use crate::api::NotificationApi;
use crate::auth::SessionIdentity;
use crate::connection::status::ConnectionStatus;
use crate::event::ClientEvent;
use crate::message::envelope::Envelope;
use crate::notification::presenter::AlertPresenter;
use crate::notification::store::NotificationStore;

#[derive(Debug)]
pub(crate) struct FeedState {
    store: Mutex<NotificationStore>,
    events: broadcast::Sender<ClientEvent>,
    pub(crate) presenter: AlertPresenter,
    pub(crate) api: Arc<dyn NotificationApi>,
    status: watch::Sender<ConnectionStatus>,
    outbound: Mutex<Option<mpsc::Sender<Envelope>>>,
    identity: Mutex<Option<SessionIdentity>>,
}

impl FeedState {
    pub(crate) fn new(
        presenter: AlertPresenter,
        api: Arc<dyn NotificationApi>,
        event_buffer: usize,
    ) -> Self {
        let (events, _) = broadcast::channel(event_buffer.max(1));
        let (status, _) = watch::channel(ConnectionStatus::default());
        Self {
            store: Mutex::new(NotificationStore::new()),
            events,
            presenter,
            api,
            status,
            outbound: Mutex::new(None),
            identity: Mutex::new(None),
        }
    }

    /// Store access; never hold the guard across an `.await`.
    pub(crate) fn store(&self) -> MutexGuard<'_, NotificationStore> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn publish(&self, event: ClientEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub(crate) fn status(&self) -> ConnectionStatus {
        self.status.borrow().clone()
    }

    pub(crate) fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    /// Apply `f` to the status, publishing a change event if it changed.
    pub(crate) fn update_status(&self, f: impl FnOnce(&mut ConnectionStatus)) {
        let modified = self.status.send_if_modified(|status| {
            let before = status.clone();
            f(status);
            *status != before
        });
        if modified {
            self.publish(ClientEvent::StatusChanged(self.status()));
        }
    }

    /// Claim the connecting slot. Returns `false` if a link is open or
    /// being opened.
    pub(crate) fn begin_connecting(&self) -> bool {
        let mut claimed = false;
        self.update_status(|status| {
            if !status.is_busy() {
                status.is_connecting = true;
                claimed = true;
            }
        });
        claimed
    }

    pub(crate) fn set_outbound(&self, sender: Option<mpsc::Sender<Envelope>>) {
        *self.outbound.lock().unwrap_or_else(|e| e.into_inner()) = sender;
    }

    pub(crate) fn outbound(&self) -> Option<mpsc::Sender<Envelope>> {
        self.outbound
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub(crate) fn set_identity(&self, identity: Option<SessionIdentity>) {
        *self.identity.lock().unwrap_or_else(|e| e.into_inner()) = identity;
    }

    pub(crate) fn identity(&self) -> Option<SessionIdentity> {
        self.identity
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub(crate) fn token(&self) -> Option<String> {
        self.identity
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|i| i.token.clone())
    }
}
