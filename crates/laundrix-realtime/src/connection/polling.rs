//! HTTP long-polling fallback transport.
//!
//! Inbound frames are fetched with `GET {http_url}/realtime/poll`, which
//! answers with a JSON array of envelopes. Outbound frames are posted one
//! at a time to `POST {http_url}/realtime/emit`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use laundrix_core::config::RealtimeConfig;
use laundrix_core::error::AppError;
use laundrix_core::result::AppResult;

use super::transport::{LinkPeer, Transport, TransportEvent, TransportLink, TransportMode};
use crate::auth::SessionIdentity;
use crate::message::envelope::Envelope;

/// Long-polling transport.
#[derive(Debug, Clone)]
pub struct PollingTransport {
    http: reqwest::Client,
    base: String,
    poll_interval: Duration,
    buffer: usize,
}

impl PollingTransport {
    /// Create a polling transport from the realtime settings
    pub fn new(config: &RealtimeConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            base: config.http_url.trim_end_matches('/').to_string(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            buffer: config.event_buffer,
        })
    }

    fn url(&self, path: &str, identity: &SessionIdentity, sid: &str) -> AppResult<reqwest::Url> {
        let raw = format!("{}/realtime/{path}", self.base);
        let mut url = reqwest::Url::parse_with_params(&raw, identity.query_pairs())
            .map_err(|e| AppError::configuration(format!("Invalid realtime URL '{raw}': {e}")))?;
        url.query_pairs_mut()
            .append_pair("transport", "polling")
            .append_pair("sid", sid);
        Ok(url)
    }
}

/// One polling session's request context.
#[derive(Debug, Clone)]
struct PollSession {
    http: reqwest::Client,
    poll_url: reqwest::Url,
    emit_url: reqwest::Url,
    bearer: String,
}

impl PollSession {
    async fn emit(&self, envelope: &Envelope) -> AppResult<()> {
        let response = self
            .http
            .post(self.emit_url.clone())
            .header(reqwest::header::AUTHORIZATION, &self.bearer)
            .json(envelope)
            .send()
            .await?;
        check_status(response.status(), "emit")
    }

    async fn poll(&self) -> AppResult<Vec<Envelope>> {
        let response = self
            .http
            .get(self.poll_url.clone())
            .header(reqwest::header::AUTHORIZATION, &self.bearer)
            .send()
            .await?;
        check_status(response.status(), "poll")?;

        let frames: Vec<Value> = response.json().await?;
        Ok(frames
            .into_iter()
            .filter_map(|frame| match serde_json::from_value::<Envelope>(frame) {
                Ok(envelope) if !envelope.event.trim().is_empty() => Some(envelope),
                Ok(_) => None,
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding malformed polled frame");
                    None
                }
            })
            .collect())
    }
}

fn check_status(status: StatusCode, op: &str) -> AppResult<()> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AppError::authentication(
            format!("Realtime {op} rejected the credential ({status})"),
        )),
        _ => Err(AppError::connection(format!(
            "Realtime {op} failed with status {status}"
        ))),
    }
}

#[async_trait]
impl Transport for PollingTransport {
    fn mode(&self) -> TransportMode {
        TransportMode::Polling
    }

    async fn open(&self, identity: &SessionIdentity) -> AppResult<TransportLink> {
        let sid = Uuid::new_v4().simple().to_string();
        let session = PollSession {
            http: self.http.clone(),
            poll_url: self.url("poll", identity, &sid)?,
            emit_url: self.url("emit", identity, &sid)?,
            bearer: identity.bearer(),
        };

        // The authenticate frame doubles as the reachability check.
        session
            .emit(&identity.authenticate_message().into_envelope())
            .await?;

        let (link, peer) = TransportLink::channel(TransportMode::Polling, self.buffer);
        let LinkPeer {
            outbound,
            inbound,
            cancel,
        } = peer;

        tokio::spawn(emit_loop(session.clone(), outbound, cancel.clone()));
        tokio::spawn(poll_loop(session, inbound, cancel, self.poll_interval));

        tracing::info!(base = %self.base, "Long-polling connected");
        Ok(link)
    }
}

async fn emit_loop(
    session: PollSession,
    mut outbound: mpsc::Receiver<Envelope>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            next = outbound.recv() => {
                let Some(envelope) = next else { break };
                if let Err(e) = session.emit(&envelope).await {
                    tracing::warn!(event = %envelope.event, error = %e, "Polling emit failed");
                }
            }
        }
    }
}

async fn poll_loop(
    session: PollSession,
    inbound: mpsc::Sender<TransportEvent>,
    cancel: CancellationToken,
    interval: Duration,
) {
    let reason = loop {
        let frames = tokio::select! {
            _ = cancel.cancelled() => return,
            result = session.poll() => match result {
                Ok(frames) => frames,
                Err(e) => break e.to_string(),
            }
        };

        for envelope in frames {
            if inbound.send(TransportEvent::Frame(envelope)).await.is_err() {
                return;
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(interval) => {}
        }
    };

    if !cancel.is_cancelled() {
        tracing::warn!(reason = %reason, "Long-polling session ended");
        let _ = inbound.send(TransportEvent::Closed { reason }).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laundrix_core::types::{ConsoleRole, UserId};

    #[test]
    fn test_poll_url_shape() {
        let transport = PollingTransport::new(&RealtimeConfig {
            http_url: "http://api.example.test/".to_string(),
            ..RealtimeConfig::default()
        })
        .unwrap();
        let identity = SessionIdentity::new(UserId::new("u-2"), ConsoleRole::Support, "tok");
        let url = transport.url("poll", &identity, "abc").unwrap();

        assert_eq!(url.path(), "/realtime/poll");
        let query = url.query().unwrap_or_default();
        assert!(query.contains("transport=polling"));
        assert!(query.contains("role=support"));
        assert!(query.contains("sid=abc"));
    }

    #[test]
    fn test_status_mapping() {
        assert!(check_status(StatusCode::OK, "poll").is_ok());
        assert_eq!(
            check_status(StatusCode::UNAUTHORIZED, "poll").unwrap_err().kind,
            laundrix_core::error::ErrorKind::Authentication
        );
        assert_eq!(
            check_status(StatusCode::BAD_GATEWAY, "emit").unwrap_err().kind,
            laundrix_core::error::ErrorKind::Connection
        );
    }
}
