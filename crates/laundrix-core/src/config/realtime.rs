//! Realtime notification connection configuration.

use serde::{Deserialize, Serialize};

/// Settings for the persistent notification connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// WebSocket endpoint of the realtime server.
    #[serde(default = "default_url")]
    pub url: String,
    /// HTTP base URL used by the long-polling fallback.
    #[serde(default = "default_http_url")]
    pub http_url: String,
    /// Fixed delay before a reconnection attempt, in milliseconds.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
    /// Handshake timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Pause between long-poll requests when the server answers immediately.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Buffer size of the inbound/outbound frame channels.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
    /// Whether to fall back to HTTP long-polling when WebSocket is unavailable.
    #[serde(default = "default_true")]
    pub enable_polling_fallback: bool,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            http_url: default_http_url(),
            reconnect_delay_ms: default_reconnect_delay(),
            connect_timeout_seconds: default_connect_timeout(),
            poll_interval_ms: default_poll_interval(),
            event_buffer: default_event_buffer(),
            enable_polling_fallback: true,
        }
    }
}

fn default_url() -> String {
    "ws://localhost:4000/realtime".to_string()
}

fn default_http_url() -> String {
    "http://localhost:4000".to_string()
}

fn default_reconnect_delay() -> u64 {
    5000
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_poll_interval() -> u64 {
    2000
}

fn default_event_buffer() -> usize {
    256
}

fn default_true() -> bool {
    true
}
