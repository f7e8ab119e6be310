//! Maps heterogeneous inbound payloads to the canonical [`Notification`].
//!
//! The same pass is applied to live transport events and to REST
//! hydration, so store invariants hold regardless of where a record
//! came from.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};

use laundrix_core::error::AppError;
use laundrix_core::result::AppResult;
use laundrix_core::types::NotificationId;

use super::model::Notification;
use super::priority::Priority;

/// Category applied when the payload carries none.
pub const DEFAULT_CATEGORY: &str = "system";

/// Event type applied when neither `eventType` nor `type` is present.
pub const DEFAULT_EVENT_TYPE: &str = "notification";

/// Id aliases, in precedence order.
const ID_FIELDS: [&str; 3] = ["id", "_id", "notificationId"];

/// Normalize one raw payload.
///
/// Only non-object payloads are rejected; every missing field resolves to
/// its documented default.
pub fn normalize(payload: &Value) -> AppResult<Notification> {
    let obj = payload.as_object().ok_or_else(|| {
        AppError::validation(format!(
            "Notification payload must be a JSON object, got {}",
            json_kind(payload)
        ))
    })?;

    let metadata = obj
        .get("metadata")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let priority = Priority::from_json(obj.get("priority"));

    let event_type = non_empty_str(obj, "eventType")
        .or_else(|| non_empty_str(obj, "type"))
        .unwrap_or(DEFAULT_EVENT_TYPE)
        .to_string();

    let is_read = bool_field(obj, &["isRead", "read"])
        .or_else(|| bool_field(&metadata, &["isRead", "read"]))
        .unwrap_or(false);

    Ok(Notification {
        id: extract_id(obj),
        title: non_empty_str(obj, "title").unwrap_or_default().to_string(),
        message: non_empty_str(obj, "message").unwrap_or_default().to_string(),
        priority,
        category: non_empty_str(obj, "category")
            .unwrap_or(DEFAULT_CATEGORY)
            .to_string(),
        event_type,
        is_read,
        created_at: extract_timestamp(obj).unwrap_or_else(Utc::now),
        metadata,
        requires_ack: bool_field(obj, &["requiresAck"]).unwrap_or(false),
        acknowledged: bool_field(obj, &["acknowledged"]).unwrap_or(false),
    })
}

/// Normalize a batch, skipping (and logging) payloads that cannot be
/// normalized.
pub fn normalize_batch(payloads: &[Value]) -> Vec<Notification> {
    payloads
        .iter()
        .filter_map(|payload| match normalize(payload) {
            Ok(n) => Some(n),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping notification that could not be normalized");
                None
            }
        })
        .collect()
}

fn extract_id(obj: &Map<String, Value>) -> NotificationId {
    for field in ID_FIELDS {
        match obj.get(field) {
            Some(Value::String(s)) if !s.trim().is_empty() => {
                return NotificationId::new(s.trim());
            }
            Some(Value::Number(n)) => return NotificationId::new(n.to_string()),
            _ => {}
        }
    }
    let generated = NotificationId::generate();
    tracing::debug!(id = %generated, "Payload carried no id; generated one");
    generated
}

fn extract_timestamp(obj: &Map<String, Value>) -> Option<DateTime<Utc>> {
    let raw = obj.get("createdAt").or_else(|| obj.get("timestamp"))?;
    match raw {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

fn non_empty_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn bool_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<bool> {
    keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_bool))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
