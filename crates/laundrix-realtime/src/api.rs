//! REST endpoints for notification history and bulk state changes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;

use laundrix_core::config::ApiConfig;
use laundrix_core::error::AppError;
use laundrix_core::result::AppResult;
use laundrix_core::types::NotificationId;

/// Notification REST API.
///
/// Every call carries the operator's bearer credential. Implementations
/// return raw payloads; normalization happens in the client.
#[async_trait]
pub trait NotificationApi: Send + Sync + std::fmt::Debug + 'static {
    /// Most recent notifications, newest first, as raw payloads.
    async fn fetch_notifications(&self, token: &str, limit: u32) -> AppResult<Vec<Value>>;

    /// Persist the read flag for one notification.
    async fn mark_read(&self, token: &str, id: &NotificationId) -> AppResult<()>;

    /// Persist the read flag for every notification.
    async fn mark_all_read(&self, token: &str) -> AppResult<()>;

    /// Delete every notification.
    async fn clear_all(&self, token: &str) -> AppResult<()>;
}

/// [`NotificationApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct RestNotificationApi {
    http: reqwest::Client,
    base_url: Url,
}

impl RestNotificationApi {
    /// Create a client for the configured API
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            AppError::configuration(format!("Invalid API base URL '{}': {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::configuration(format!(
                "API base URL '{}' cannot carry a path",
                config.base_url
            )));
        }
        Ok(Self { http, base_url })
    }

    /// Append path segments to the base URL. Each segment is percent-encoded,
    /// so ids containing `/`, `?` or `#` stay within their segment.
    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| AppError::configuration("API base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, method: Method, url: Url, token: &str) -> AppResult<reqwest::Response> {
        let path = url.path().to_string();
        let response = self
            .http
            .request(method.clone(), url.clone())
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(%method, url = %url, %status, body = %body, "Notification API error");
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                AppError::authentication(format!("{method} {path} rejected the credential"))
            }
            _ => AppError::external_service(format!("{method} {path} failed with status {status}")),
        })
    }
}

#[async_trait]
impl NotificationApi for RestNotificationApi {
    async fn fetch_notifications(&self, token: &str, limit: u32) -> AppResult<Vec<Value>> {
        let mut url = self.endpoint(&["notifications"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        let response = self.send(Method::GET, url, token).await?;
        let body: Value = response.json().await?;
        extract_list(body)
    }

    async fn mark_read(&self, token: &str, id: &NotificationId) -> AppResult<()> {
        let url = self.endpoint(&["notifications", id.as_str(), "read"])?;
        self.send(Method::PATCH, url, token).await?;
        Ok(())
    }

    async fn mark_all_read(&self, token: &str) -> AppResult<()> {
        let url = self.endpoint(&["notifications", "read-all"])?;
        self.send(Method::PATCH, url, token).await?;
        Ok(())
    }

    async fn clear_all(&self, token: &str) -> AppResult<()> {
        let url = self.endpoint(&["notifications"])?;
        self.send(Method::DELETE, url, token).await?;
        Ok(())
    }
}

/// Accepts a bare array or an object wrapping it in `notifications` or
/// `data`.
pub fn extract_list(body: Value) -> AppResult<Vec<Value>> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => {
            for key in ["notifications", "data"] {
                if let Some(Value::Array(items)) = map.remove(key) {
                    return Ok(items);
                }
            }
            Err(AppError::external_service(
                "Notification list response has no 'notifications' or 'data' array",
            ))
        }
        _ => Err(AppError::external_service(
            "Notification list response is not a JSON array or object",
        )),
    }
}
