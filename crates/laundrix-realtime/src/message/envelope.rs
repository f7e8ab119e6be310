//! Frame envelope shared by the WebSocket and long-polling transports.
//!
//! Every frame on the wire is a JSON text message of the form
//! `{"event": "<name>", "data": <payload>}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use laundrix_core::error::AppError;
use laundrix_core::result::AppResult;

/// Maximum accepted size of a single inbound frame in bytes.
const MAX_FRAME_SIZE: usize = 262_144;

/// A named event with an arbitrary JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Event name.
    pub event: String,
    /// Event payload (`null` when the event carries none).
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    /// Create a new envelope.
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Serialize the envelope to its JSON wire form.
    pub fn encode(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and validate an inbound text frame.
    pub fn decode(raw: &str) -> AppResult<Self> {
        if raw.len() > MAX_FRAME_SIZE {
            return Err(AppError::validation(format!(
                "Frame exceeds maximum size of {MAX_FRAME_SIZE} bytes"
            )));
        }
        if raw.trim().is_empty() {
            return Err(AppError::validation("Empty frame"));
        }

        let envelope: Self = serde_json::from_str(raw)?;
        if envelope.event.trim().is_empty() {
            return Err(AppError::validation("Frame has an empty event name"));
        }
        Ok(envelope)
    }
}
