//! Signed-in session configuration for the command-line binaries.

use serde::{Deserialize, Serialize};

/// Identity and bearer credential used by `laundrix-feed` and `laundrix-cli`.
///
/// The token is normally injected through `LAUNDRIX__SESSION__TOKEN`
/// rather than written to a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Console user id.
    #[serde(default)]
    pub user_id: String,
    /// Console role (`superadmin`, `auditor`, `sales`, `support`).
    #[serde(default)]
    pub role: String,
    /// Bearer token issued by the auth service.
    #[serde(default, skip_serializing)]
    pub token: String,
}

impl SessionConfig {
    /// Whether enough fields are present to open a session.
    pub fn is_complete(&self) -> bool {
        !self.user_id.trim().is_empty()
            && !self.role.trim().is_empty()
            && !self.token.trim().is_empty()
    }
}
