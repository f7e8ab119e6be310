//! Transport abstraction: one authenticated, bidirectional frame link.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use laundrix_core::result::AppResult;

use crate::auth::SessionIdentity;
use crate::message::envelope::Envelope;

/// How a link talks to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    /// Persistent WebSocket stream.
    WebSocket,
    /// HTTP long polling.
    Polling,
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WebSocket => write!(f, "websocket"),
            Self::Polling => write!(f, "polling"),
        }
    }
}

/// Something the link observed.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// A decoded frame, in delivery order.
    Frame(Envelope),
    /// The link ended without a local request.
    Closed {
        /// Why the link ended.
        reason: String,
    },
}

/// An open link owned by the client.
///
/// Frames are read from `inbound` by a single task, so delivery order is
/// processing order. Cancelling `cancel` tears down the link's I/O tasks.
#[derive(Debug)]
pub struct TransportLink {
    /// Mode of this link.
    pub mode: TransportMode,
    /// Frames to send to the server.
    pub outbound: mpsc::Sender<Envelope>,
    /// Frames and close notices from the server.
    pub inbound: mpsc::Receiver<TransportEvent>,
    /// Teardown signal.
    pub cancel: CancellationToken,
}

/// The I/O side of a [`TransportLink`], held by the transport's tasks.
#[derive(Debug)]
pub struct LinkPeer {
    /// Frames the client wants sent.
    pub outbound: mpsc::Receiver<Envelope>,
    /// Where received frames go.
    pub inbound: mpsc::Sender<TransportEvent>,
    /// Teardown signal shared with the link.
    pub cancel: CancellationToken,
}

impl TransportLink {
    /// Create a link and the peer its I/O tasks drive.
    pub fn channel(mode: TransportMode, buffer: usize) -> (Self, LinkPeer) {
        let (out_tx, out_rx) = mpsc::channel(buffer.max(1));
        let (in_tx, in_rx) = mpsc::channel(buffer.max(1));
        let cancel = CancellationToken::new();
        (
            Self {
                mode,
                outbound: out_tx,
                inbound: in_rx,
                cancel: cancel.clone(),
            },
            LinkPeer {
                outbound: out_rx,
                inbound: in_tx,
                cancel,
            },
        )
    }
}

/// Opens authenticated links to the realtime server.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug + 'static {
    /// Mode of the links this transport opens.
    fn mode(&self) -> TransportMode;

    /// Open one link for `identity`.
    ///
    /// The `authenticate` frame is the first frame sent on the link.
    async fn open(&self, identity: &SessionIdentity) -> AppResult<TransportLink>;
}

/// Tries a primary transport and falls back to a secondary one.
#[derive(Debug)]
pub struct FallbackTransport {
    primary: Arc<dyn Transport>,
    fallback: Option<Arc<dyn Transport>>,
}

impl FallbackTransport {
    /// Create a fallback chain
    pub fn new(primary: Arc<dyn Transport>, fallback: Option<Arc<dyn Transport>>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl Transport for FallbackTransport {
    fn mode(&self) -> TransportMode {
        self.primary.mode()
    }

    async fn open(&self, identity: &SessionIdentity) -> AppResult<TransportLink> {
        let primary_err = match self.primary.open(identity).await {
            Ok(link) => return Ok(link),
            Err(e) => e,
        };

        let Some(fallback) = &self.fallback else {
            return Err(primary_err);
        };

        tracing::warn!(
            error = %primary_err,
            primary = %self.primary.mode(),
            fallback = %fallback.mode(),
            "Primary transport unavailable, falling back"
        );
        fallback.open(identity).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laundrix_core::error::AppError;
    use laundrix_core::types::{ConsoleRole, UserId};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Fixed {
        mode: TransportMode,
        fail: bool,
        opened: AtomicUsize,
    }

    impl Fixed {
        fn new(mode: TransportMode, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                mode,
                fail,
                opened: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Transport for Fixed {
        fn mode(&self) -> TransportMode {
            self.mode
        }

        async fn open(&self, _identity: &SessionIdentity) -> AppResult<TransportLink> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::connection("refused"));
            }
            Ok(TransportLink::channel(self.mode, 4).0)
        }
    }

    fn identity() -> SessionIdentity {
        SessionIdentity::new(UserId::new("u"), ConsoleRole::Auditor, "t")
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let primary = Fixed::new(TransportMode::WebSocket, false);
        let polling = Fixed::new(TransportMode::Polling, false);
        let chain = FallbackTransport::new(primary.clone(), Some(polling.clone()));

        let link = chain.open(&identity()).await.unwrap();
        assert_eq!(link.mode, TransportMode::WebSocket);
        assert_eq!(polling.opened.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_back_on_primary_failure() {
        let primary = Fixed::new(TransportMode::WebSocket, true);
        let polling = Fixed::new(TransportMode::Polling, false);
        let chain = FallbackTransport::new(primary, Some(polling));

        let link = chain.open(&identity()).await.unwrap();
        assert_eq!(link.mode, TransportMode::Polling);
    }

    #[tokio::test]
    async fn test_without_fallback_returns_primary_error() {
        let chain = FallbackTransport::new(Fixed::new(TransportMode::WebSocket, true), None);
        let err = chain.open(&identity()).await.unwrap_err();
        assert_eq!(err.message, "refused");
    }

    #[tokio::test]
    async fn test_link_channel_is_wired() {
        let (mut link, mut peer) = TransportLink::channel(TransportMode::WebSocket, 2);
        link.outbound
            .send(Envelope::new("ping", serde_json::Value::Null))
            .await
            .unwrap();
        assert_eq!(peer.outbound.recv().await.unwrap().event, "ping");

        peer.inbound
            .send(TransportEvent::Closed {
                reason: "bye".to_string(),
            })
            .await
            .unwrap();
        assert!(matches!(
            link.inbound.recv().await,
            Some(TransportEvent::Closed { .. })
        ));

        link.cancel.cancel();
        assert!(peer.cancel.is_cancelled());
    }
}
