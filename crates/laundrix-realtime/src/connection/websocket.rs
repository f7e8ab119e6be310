//! WebSocket transport over tokio-tungstenite.

use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;

use laundrix_core::config::RealtimeConfig;
use laundrix_core::error::AppError;
use laundrix_core::result::AppResult;

use super::transport::{LinkPeer, Transport, TransportEvent, TransportLink, TransportMode};
use crate::auth::SessionIdentity;
use crate::message::envelope::Envelope;

/// Streams frames over a persistent WebSocket.
#[derive(Debug, Clone)]
pub struct WebSocketTransport {
    url: String,
    connect_timeout: Duration,
    buffer: usize,
}

impl WebSocketTransport {
    /// Create a WebSocket transport from the realtime settings
    pub fn new(config: &RealtimeConfig) -> Self {
        Self {
            url: config.url.clone(),
            connect_timeout: Duration::from_secs(config.connect_timeout_seconds),
            buffer: config.event_buffer,
        }
    }

    /// Handshake URL with the credential in the query string.
    pub fn endpoint(&self, identity: &SessionIdentity) -> AppResult<reqwest::Url> {
        reqwest::Url::parse_with_params(&self.url, identity.query_pairs()).map_err(|e| {
            AppError::configuration(format!("Invalid realtime URL '{}': {e}", self.url))
        })
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    fn mode(&self) -> TransportMode {
        TransportMode::WebSocket
    }

    async fn open(&self, identity: &SessionIdentity) -> AppResult<TransportLink> {
        let url = self.endpoint(identity)?;
        let mut request = url.as_str().into_client_request()?;
        let bearer = HeaderValue::from_str(&identity.bearer())
            .map_err(|_| AppError::authentication("Credential is not a valid header value"))?;
        request.headers_mut().insert(AUTHORIZATION, bearer);

        tracing::debug!(url = %self.url, "Opening WebSocket");
        let (stream, _response) = tokio::time::timeout(self.connect_timeout, connect_async(request))
            .await
            .map_err(|_| {
                AppError::timeout(format!(
                    "WebSocket handshake timed out after {}s",
                    self.connect_timeout.as_secs()
                ))
            })??;

        let (mut sink, source) = stream.split();

        let auth = identity.authenticate_message().into_envelope().encode()?;
        sink.send(Message::text(auth)).await?;

        let (link, peer) = TransportLink::channel(TransportMode::WebSocket, self.buffer);
        let LinkPeer {
            mut outbound,
            inbound,
            cancel,
        } = peer;

        let writer_cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = writer_cancel.cancelled() => {
                        let _ = sink.close().await;
                        break;
                    }
                    next = outbound.recv() => {
                        let Some(envelope) = next else { break };
                        let text = match envelope.encode() {
                            Ok(text) => text,
                            Err(e) => {
                                tracing::warn!(event = %envelope.event, error = %e, "Dropping unencodable frame");
                                continue;
                            }
                        };
                        if let Err(e) = sink.send(Message::text(text)).await {
                            tracing::warn!(error = %e, "WebSocket send failed");
                            break;
                        }
                    }
                }
            }
            tracing::debug!("WebSocket writer stopped");
        });

        tokio::spawn(read_loop(source, inbound, cancel));

        tracing::info!(url = %self.url, "WebSocket connected");
        Ok(link)
    }
}

async fn read_loop<S>(
    mut source: S,
    inbound: tokio::sync::mpsc::Sender<TransportEvent>,
    cancel: tokio_util::sync::CancellationToken,
) where
    S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    let reason = loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            msg = source.next() => match msg {
                Some(Ok(Message::Text(text))) => match Envelope::decode(text.as_str()) {
                    Ok(envelope) => {
                        if inbound.send(TransportEvent::Frame(envelope)).await.is_err() {
                            return;
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "Discarding malformed frame"),
                },
                Some(Ok(Message::Close(frame))) => {
                    break frame
                        .map(|f| f.reason.as_str().to_string())
                        .filter(|r| !r.is_empty())
                        .unwrap_or_else(|| "closed by server".to_string());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => break e.to_string(),
                None => break "stream ended".to_string(),
            }
        }
    };

    if !cancel.is_cancelled() {
        tracing::warn!(reason = %reason, "WebSocket closed");
        let _ = inbound.send(TransportEvent::Closed { reason }).await;
    }
}
