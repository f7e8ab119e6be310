//! REST API client configuration.

use serde::{Deserialize, Serialize};

/// Settings for the platform REST API used to hydrate and persist
/// notification state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST API (without trailing slash).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Number of notifications fetched when hydrating after connect.
    #[serde(default = "default_hydrate_limit")]
    pub hydrate_limit: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            hydrate_limit: default_hydrate_limit(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:4000/api".to_string()
}

fn default_timeout() -> u64 {
    15
}

fn default_hydrate_limit() -> u32 {
    50
}
