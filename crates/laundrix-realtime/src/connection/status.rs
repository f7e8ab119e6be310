//! Observable connection state.

use serde::Serialize;

use super::transport::TransportMode;

/// Connection state published to the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    /// A link is open.
    pub is_connected: bool,
    /// A link is being opened.
    pub is_connecting: bool,
    /// Most recent connection error, cleared on successful connect.
    pub last_error: Option<String>,
    /// Mode of the open link.
    pub transport_mode: Option<TransportMode>,
}

impl ConnectionStatus {
    /// Whether a new connect attempt must be skipped.
    pub fn is_busy(&self) -> bool {
        self.is_connected || self.is_connecting
    }

    /// One-word summary for status lines.
    pub fn label(&self) -> &'static str {
        match (self.is_connected, self.is_connecting, self.last_error.is_some()) {
            (true, _, _) => "connected",
            (false, true, _) => "connecting",
            (false, false, true) => "error",
            (false, false, false) => "disconnected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label() {
        let mut status = ConnectionStatus::default();
        assert_eq!(status.label(), "disconnected");
        status.last_error = Some("refused".to_string());
        assert_eq!(status.label(), "error");
        status.is_connecting = true;
        assert!(status.is_busy());
        assert_eq!(status.label(), "connecting");
    }
}
