//! Synthetic notifications built from platform occurrences.
//!
//! The realtime server emits bare occurrence events (a tenant signed up,
//! payment failures spiked) that carry facts but no user-facing text. They
//! are turned into raw notification payloads here and then pass through
//! the normalizer like any other payload.

use serde_json::{Map, Value, json};

use crate::message::types::PlatformOccurrence;

/// Build a raw notification payload for an occurrence.
pub fn from_occurrence(kind: PlatformOccurrence, payload: &Value) -> Value {
    let empty = Map::new();
    let facts = payload.as_object().unwrap_or(&empty);

    let (priority, category, requires_ack, title, message) = match kind {
        PlatformOccurrence::TenantCreated => (
            "P2",
            "tenant_management",
            false,
            "New tenant registered".to_string(),
            format!(
                "{} joined the platform",
                text(facts, &["tenantName", "name"]).unwrap_or("A new tenant")
            ),
        ),
        PlatformOccurrence::TenantSuspended => (
            "P1",
            "tenant_management",
            true,
            "Tenant suspended".to_string(),
            format!(
                "{} was suspended{}",
                text(facts, &["tenantName", "name"]).unwrap_or("A tenant"),
                text(facts, &["reason"])
                    .map(|r| format!(": {r}"))
                    .unwrap_or_default()
            ),
        ),
        PlatformOccurrence::PaymentFailureSpike => {
            let failures = number(facts, "failureCount");
            let tenants = number(facts, "affectedTenants");
            (
                "P1",
                "financial",
                true,
                "Payment failure spike".to_string(),
                match (failures, tenants) {
                    (Some(f), Some(t)) => {
                        format!("{f} failed payments across {t} tenants")
                    }
                    (Some(f), None) => format!("{f} failed payments detected"),
                    _ => "Payment failures are above the alerting threshold".to_string(),
                },
            )
        }
        PlatformOccurrence::ServiceOutage => (
            "P0",
            "system",
            true,
            format!(
                "Service outage: {}",
                text(facts, &["service", "component"]).unwrap_or("platform")
            ),
            text(facts, &["message", "details"])
                .unwrap_or("A platform service is unavailable")
                .to_string(),
        ),
    };

    let mut raw = json!({
        "title": title,
        "message": message,
        "priority": priority,
        "category": category,
        "eventType": kind.as_str(),
        "requiresAck": requires_ack,
        "metadata": Value::Object(facts.clone()),
    });

    if let Some(id) = text(facts, &["id", "_id", "occurrenceId"]) {
        raw["id"] = Value::String(format!("{}:{id}", kind.as_str()));
    }
    if let Some(ts) = facts.get("timestamp").or_else(|| facts.get("createdAt")) {
        raw["createdAt"] = ts.clone();
    }

    raw
}

fn text<'a>(facts: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|k| facts.get(*k).and_then(Value::as_str))
        .filter(|s| !s.trim().is_empty())
}

fn number(facts: &Map<String, Value>, key: &str) -> Option<u64> {
    facts.get(key).and_then(Value::as_u64)
}
