//! Change notifications broadcast to UI subscribers.

use laundrix_core::types::NotificationId;

use crate::connection::status::ConnectionStatus;
use crate::notification::model::Notification;

/// Something observable changed in the client.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// A new notification was stored.
    Ingested(Notification),
    /// Read or acknowledgment state changed; `None` means every record.
    Updated {
        /// Affected notification.
        id: Option<NotificationId>,
    },
    /// The store was emptied.
    Cleared,
    /// The store was replaced from REST; carries the new size.
    Hydrated(usize),
    /// Connection status changed.
    StatusChanged(ConnectionStatus),
}
