//! Operator actions that change notification state.
//!
//! Read and clear actions update the local store first and then persist
//! through REST in a background task. REST failures are logged and never
//! rolled back; a failed clear is reported with an error toast because the
//! alerts will reappear on the next hydration. Acknowledgments travel over
//! the realtime link only.

use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;

use laundrix_core::types::NotificationId;

use crate::event::ClientEvent;
use crate::message::types::{AckConfirmation, OutboundMessage};
use crate::state::FeedState;

/// Toast shown when the server refuses to clear notifications.
pub const CLEAR_FAILED_MESSAGE: &str = "Failed to clear alerts from server";

/// Toast shown when the server reports a failed acknowledgment.
pub const ACK_FAILED_MESSAGE: &str = "Failed to acknowledge alert";

/// Routes operator actions to the store, the link, and the REST API.
#[derive(Debug, Clone)]
pub struct AcknowledgmentGateway {
    state: Arc<FeedState>,
}

impl AcknowledgmentGateway {
    pub(crate) fn new(state: Arc<FeedState>) -> Self {
        Self { state }
    }

    /// Emit `acknowledge_notification` over the open link.
    ///
    /// Returns `false` (and logs) when there is no open link; there is no
    /// REST fallback.
    pub fn acknowledge(&self, id: &NotificationId) -> bool {
        let connected = self.state.status().is_connected;
        let outbound = self.state.outbound().filter(|_| connected);
        let Some(outbound) = outbound else {
            tracing::warn!(notification_id = %id, "Cannot acknowledge while disconnected");
            return false;
        };

        let envelope = OutboundMessage::AcknowledgeNotification {
            notification_id: id.clone(),
        }
        .into_envelope();

        match outbound.try_send(envelope) {
            Ok(()) => {
                tracing::info!(notification_id = %id, "Acknowledgment sent");
                true
            }
            Err(TrySendError::Full(_)) => {
                tracing::warn!(notification_id = %id, "Outbound buffer full, acknowledgment dropped");
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!(notification_id = %id, "Link closed, acknowledgment dropped");
                false
            }
        }
    }

    /// Mark one notification read locally, then persist it.
    ///
    /// Returns `true` if the notification was held locally.
    pub fn mark_read(&self, id: &NotificationId) -> bool {
        let found = self.state.store().mark_read(id);
        if found {
            self.state.publish(ClientEvent::Updated {
                id: Some(id.clone()),
            });
        }

        let Some(token) = self.rest_token("mark_read") else {
            return found;
        };
        let api = Arc::clone(&self.state.api);
        let id = id.clone();
        tokio::spawn(async move {
            if let Err(e) = api.mark_read(&token, &id).await {
                tracing::warn!(notification_id = %id, error = %e, "Failed to persist read state");
            }
        });
        found
    }

    /// Mark every notification read locally, then persist it.
    ///
    /// Returns how many notifications changed state.
    pub fn mark_all_read(&self) -> usize {
        let changed = self.state.store().mark_all_read();
        self.state.publish(ClientEvent::Updated { id: None });

        if let Some(token) = self.rest_token("mark_all_read") {
            let api = Arc::clone(&self.state.api);
            tokio::spawn(async move {
                if let Err(e) = api.mark_all_read(&token).await {
                    tracing::warn!(error = %e, "Failed to persist read-all");
                }
            });
        }
        changed
    }

    /// Empty the store, then delete server-side.
    pub fn clear_all(&self) {
        self.state.store().clear();
        self.state.presenter.dismiss_all();
        self.state.publish(ClientEvent::Cleared);

        let Some(token) = self.rest_token("clear_all") else {
            return;
        };
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            if let Err(e) = state.api.clear_all(&token).await {
                tracing::error!(error = %e, "Failed to clear notifications on server");
                state.presenter.show_error(CLEAR_FAILED_MESSAGE);
            }
        });
    }

    /// Apply a server acknowledgment confirmation.
    pub fn handle_confirmation(&self, confirmation: AckConfirmation) {
        let id = confirmation.notification_id;
        if !confirmation.success {
            tracing::warn!(
                notification_id = %id,
                error = confirmation.error.as_deref().unwrap_or("unknown"),
                "Server rejected acknowledgment"
            );
            self.state.presenter.show_error(ACK_FAILED_MESSAGE);
            return;
        }

        if self.state.store().mark_acknowledged(&id) {
            self.state.presenter.dismiss_for(&id);
            self.state.publish(ClientEvent::Updated { id: Some(id.clone()) });
            tracing::info!(notification_id = %id, "Acknowledgment confirmed");
        } else {
            tracing::debug!(notification_id = %id, "Confirmation for unknown notification");
        }
    }

    fn rest_token(&self, op: &str) -> Option<String> {
        let token = self.state.token();
        if token.is_none() {
            tracing::warn!(op, "No signed-in session; skipping REST call");
        }
        token
    }
}
