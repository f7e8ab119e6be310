//! Inbound and outbound event definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use laundrix_core::types::NotificationId;

use super::envelope::Envelope;

/// Lifecycle event names emitted by the realtime server.
pub mod events {
    /// Server accepted the connection.
    pub const CONNECT: &str = "connect";
    /// Server is closing the connection (data: reason string).
    pub const DISCONNECT: &str = "disconnect";
    /// Server rejected the connection (data: message or `{message}`).
    pub const CONNECT_ERROR: &str = "connect_error";
    /// Confirmation of an `acknowledge_notification` frame.
    pub const NOTIFICATION_ACKNOWLEDGED: &str = "notification_acknowledged";
}

/// Inbound event names that carry a notification payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertChannel {
    /// Generic `notification` event.
    Notification,
    /// Platform-wide `platform_alert` event.
    PlatformAlert,
    /// `critical_alert` event.
    CriticalAlert,
    /// `security_alert` event.
    SecurityAlert,
    /// `system_alert` event.
    SystemAlert,
    /// `high_priority_alert` event.
    HighPriorityAlert,
}

impl AlertChannel {
    /// All channels the client subscribes to.
    pub const ALL: [AlertChannel; 6] = [
        Self::Notification,
        Self::PlatformAlert,
        Self::CriticalAlert,
        Self::SecurityAlert,
        Self::SystemAlert,
        Self::HighPriorityAlert,
    ];

    /// Wire name of the event.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Notification => "notification",
            Self::PlatformAlert => "platform_alert",
            Self::CriticalAlert => "critical_alert",
            Self::SecurityAlert => "security_alert",
            Self::SystemAlert => "system_alert",
            Self::HighPriorityAlert => "high_priority_alert",
        }
    }

    /// Resolve a wire event name.
    pub fn from_event(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

/// Platform occurrences that the client turns into synthetic notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformOccurrence {
    /// A new tenant signed up.
    TenantCreated,
    /// A tenant was suspended.
    TenantSuspended,
    /// Payment failures spiked above the alerting threshold.
    PaymentFailureSpike,
    /// A platform service is down.
    ServiceOutage,
}

impl PlatformOccurrence {
    /// All occurrences the client listens for.
    pub const ALL: [PlatformOccurrence; 4] = [
        Self::TenantCreated,
        Self::TenantSuspended,
        Self::PaymentFailureSpike,
        Self::ServiceOutage,
    ];

    /// Wire name of the event.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TenantCreated => "tenant_created",
            Self::TenantSuspended => "tenant_suspended",
            Self::PaymentFailureSpike => "payment_failure_spike",
            Self::ServiceOutage => "service_outage",
        }
    }

    /// Resolve a wire event name.
    pub fn from_event(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.as_str() == name)
    }
}

/// Server confirmation of an acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckConfirmation {
    /// Notification that was acknowledged.
    pub notification_id: NotificationId,
    /// Whether the server recorded the acknowledgment.
    #[serde(default = "default_success")]
    pub success: bool,
    /// Server-side error description on failure.
    #[serde(default)]
    pub error: Option<String>,
}

fn default_success() -> bool {
    true
}

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// Server accepted the connection.
    Connected,
    /// Server is closing the connection.
    Disconnected {
        /// Reason given by the server.
        reason: String,
    },
    /// Server rejected the connection or authentication.
    ConnectError {
        /// Error description.
        message: String,
    },
    /// A notification payload arrived on one of the alert channels.
    Alert {
        /// Channel it arrived on.
        channel: AlertChannel,
        /// Raw payload, to be normalized.
        payload: Value,
    },
    /// A platform occurrence that becomes a synthetic notification.
    Occurrence {
        /// Kind of occurrence.
        kind: PlatformOccurrence,
        /// Raw occurrence payload.
        payload: Value,
    },
    /// Acknowledgment confirmation.
    AckConfirmed(AckConfirmation),
    /// Anything else.
    Unknown {
        /// Event name.
        event: String,
    },
}

impl InboundEvent {
    /// Classify an envelope by its event name.
    pub fn from_envelope(envelope: Envelope) -> Self {
        let Envelope { event, data } = envelope;

        if let Some(channel) = AlertChannel::from_event(&event) {
            return Self::Alert {
                channel,
                payload: data,
            };
        }
        if let Some(kind) = PlatformOccurrence::from_event(&event) {
            return Self::Occurrence {
                kind,
                payload: data,
            };
        }

        match event.as_str() {
            events::CONNECT => Self::Connected,
            events::DISCONNECT => Self::Disconnected {
                reason: text_or_message(&data).unwrap_or_else(|| "server disconnect".to_string()),
            },
            events::CONNECT_ERROR => Self::ConnectError {
                message: text_or_message(&data)
                    .unwrap_or_else(|| "connection rejected".to_string()),
            },
            events::NOTIFICATION_ACKNOWLEDGED => {
                match serde_json::from_value::<AckConfirmation>(data) {
                    Ok(confirmation) => Self::AckConfirmed(confirmation),
                    Err(e) => {
                        tracing::warn!(error = %e, "Malformed acknowledgment confirmation");
                        Self::Unknown { event }
                    }
                }
            }
            _ => Self::Unknown { event },
        }
    }
}

/// Accepts either a bare string or an object with a `message`/`reason` field.
fn text_or_message(data: &Value) -> Option<String> {
    match data {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("message")
            .or_else(|| map.get("reason"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

/// Frames sent by the client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Connection-time authentication payload.
    Authenticate {
        /// Bearer credential.
        token: String,
        /// Console role tag.
        role: String,
        /// Console user id.
        #[serde(rename = "userId")]
        user_id: String,
    },
    /// Acknowledge a notification that requires it.
    AcknowledgeNotification {
        /// Notification being acknowledged.
        #[serde(rename = "notificationId")]
        notification_id: NotificationId,
    },
}

impl OutboundMessage {
    /// Convert into a wire envelope.
    pub fn into_envelope(self) -> Envelope {
        match serde_json::to_value(&self) {
            Ok(Value::Object(mut map)) => {
                let event = map
                    .remove("event")
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_default();
                let data = map.remove("data").unwrap_or(Value::Null);
                Envelope::new(event, data)
            }
            _ => Envelope::new(self.event_name(), Value::Null),
        }
    }

    /// Wire event name.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Authenticate { .. } => "authenticate",
            Self::AcknowledgeNotification { .. } => "acknowledge_notification",
        }
    }
}
