//! Realtime link management: transports, status, and reconnection.

pub mod polling;
pub mod reconnect;
pub mod status;
pub mod transport;
pub mod websocket;

pub use polling::PollingTransport;
pub use reconnect::ReconnectScheduler;
pub use status::ConnectionStatus;
pub use transport::{FallbackTransport, Transport, TransportEvent, TransportLink, TransportMode};
pub use websocket::WebSocketTransport;

use std::sync::Arc;

use laundrix_core::config::RealtimeConfig;
use laundrix_core::result::AppResult;

/// Build the configured transport chain: WebSocket first, then long polling
/// when enabled.
pub fn default_transport(config: &RealtimeConfig) -> AppResult<Arc<dyn Transport>> {
    let primary: Arc<dyn Transport> = Arc::new(WebSocketTransport::new(config));
    let fallback: Option<Arc<dyn Transport>> = if config.enable_polling_fallback {
        Some(Arc::new(PollingTransport::new(config)?))
    } else {
        None
    };
    Ok(Arc::new(FallbackTransport::new(primary, fallback)))
}
