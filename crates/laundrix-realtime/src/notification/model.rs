//! Canonical notification record held by the store.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use laundrix_core::types::NotificationId;

use super::priority::Priority;

/// A normalized notification.
///
/// Built only by [`super::normalizer::normalize`]; every field here is the
/// single authoritative value. Legacy mirrors (`type`, `metadata.isRead`)
/// are written at serialization time and never read back.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// Stable identity used for de-duplication.
    pub id: NotificationId,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Severity.
    pub priority: Priority,
    /// Free-form grouping label (`security`, `financial`, ...).
    pub category: String,
    /// Semantic event name.
    pub event_type: String,
    /// Read state.
    pub is_read: bool,
    /// Creation time reported by the producer.
    pub created_at: DateTime<Utc>,
    /// Display-only passthrough fields.
    pub metadata: Map<String, Value>,
    /// Whether the operator must explicitly acknowledge this notification.
    pub requires_ack: bool,
    /// Whether the server confirmed an acknowledgment.
    pub acknowledged: bool,
}

impl Notification {
    /// Whether an acknowledgment is still outstanding.
    pub fn awaiting_ack(&self) -> bool {
        self.requires_ack && !self.acknowledged
    }
}

/// Wire shape with legacy compatibility mirrors.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NotificationWire<'a> {
    id: &'a NotificationId,
    title: &'a str,
    message: &'a str,
    priority: Priority,
    category: &'a str,
    event_type: &'a str,
    #[serde(rename = "type")]
    legacy_type: &'a str,
    is_read: bool,
    created_at: DateTime<Utc>,
    metadata: Map<String, Value>,
    requires_ack: bool,
    acknowledged: bool,
}

impl Serialize for Notification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut metadata = self.metadata.clone();
        metadata.insert("isRead".to_string(), Value::Bool(self.is_read));

        NotificationWire {
            id: &self.id,
            title: &self.title,
            message: &self.message,
            priority: self.priority,
            category: &self.category,
            event_type: &self.event_type,
            legacy_type: &self.event_type,
            is_read: self.is_read,
            created_at: self.created_at,
            metadata,
            requires_ack: self.requires_ack,
            acknowledged: self.acknowledged,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Notification {
        Notification {
            id: NotificationId::new("n-1"),
            title: "Payment failures".to_string(),
            message: "12 failed charges".to_string(),
            priority: Priority::P1,
            category: "financial".to_string(),
            event_type: "payment_failure_spike".to_string(),
            is_read: true,
            created_at: Utc::now(),
            metadata: Map::new(),
            requires_ack: true,
            acknowledged: false,
        }
    }

    #[test]
    fn test_serialization_writes_legacy_mirrors() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["eventType"], "payment_failure_spike");
        assert_eq!(value["type"], value["eventType"]);
        assert_eq!(value["isRead"], true);
        assert_eq!(value["metadata"]["isRead"], true);
        assert_eq!(value["priority"], "P1");
    }

    #[test]
    fn test_awaiting_ack() {
        let mut n = sample();
        assert!(n.awaiting_ack());
        n.acknowledged = true;
        assert!(!n.awaiting_ack());
    }
}
