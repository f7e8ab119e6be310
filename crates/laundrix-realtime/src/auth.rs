//! Signed-in identity and the auth context the client follows.

use std::fmt;

use tokio::sync::watch;

use laundrix_core::config::SessionConfig;
use laundrix_core::error::AppError;
use laundrix_core::result::AppResult;
use laundrix_core::types::{ConsoleRole, UserId};

use crate::message::types::OutboundMessage;

/// The authenticated operator a connection is opened for.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    /// Console user id.
    pub user_id: UserId,
    /// Console role, sent to the server as a scoping tag.
    pub role: ConsoleRole,
    /// Bearer credential.
    pub token: String,
}

impl SessionIdentity {
    /// Create an identity
    pub fn new(user_id: UserId, role: ConsoleRole, token: impl Into<String>) -> Self {
        Self {
            user_id,
            role,
            token: token.into(),
        }
    }

    /// Build an identity from the `session` configuration section.
    pub fn from_config(config: &SessionConfig) -> AppResult<Self> {
        if !config.is_complete() {
            return Err(AppError::authentication(
                "No signed-in session configured (session.user_id, session.role and session.token are required)",
            ));
        }
        Ok(Self {
            user_id: config.user_id.parse()?,
            role: config.role.parse()?,
            token: config.token.trim().to_string(),
        })
    }

    /// Connection-time authentication frame.
    pub fn authenticate_message(&self) -> OutboundMessage {
        OutboundMessage::Authenticate {
            token: self.token.clone(),
            role: self.role.as_str().to_string(),
            user_id: self.user_id.to_string(),
        }
    }

    /// Query parameters carrying the same credential for the handshake.
    pub fn query_pairs(&self) -> [(&'static str, &str); 3] {
        [
            ("token", self.token.as_str()),
            ("role", self.role.as_str()),
            ("userId", self.user_id.as_str()),
        ]
    }

    /// `Authorization` header value.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl fmt::Debug for SessionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionIdentity")
            .field("user_id", &self.user_id)
            .field("role", &self.role)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Observable sign-in state.
///
/// `Some` while an operator is signed in. The notification client binds to
/// this through [`crate::NotificationClient::bind_auth`].
#[derive(Debug, Clone)]
pub struct AuthContext {
    tx: watch::Sender<Option<SessionIdentity>>,
}

impl AuthContext {
    /// Signed-out context
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Context that starts signed in
    pub fn signed_in(identity: SessionIdentity) -> Self {
        let (tx, _rx) = watch::channel(Some(identity));
        Self { tx }
    }

    /// Sign in (or switch identity).
    pub fn login(&self, identity: SessionIdentity) {
        tracing::info!(user_id = %identity.user_id, role = %identity.role, "Operator signed in");
        self.tx.send_replace(Some(identity));
    }

    /// Sign out.
    pub fn logout(&self) {
        if self.tx.send_replace(None).is_some() {
            tracing::info!("Operator signed out");
        }
    }

    /// Current identity, if signed in.
    pub fn current(&self) -> Option<SessionIdentity> {
        self.tx.borrow().clone()
    }

    /// Watch sign-in changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionIdentity>> {
        self.tx.subscribe()
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> SessionIdentity {
        SessionIdentity::new(UserId::new("u-1"), ConsoleRole::Superadmin, "secret-token")
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", identity());
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("u-1"));
    }

    #[test]
    fn test_from_config_requires_complete_session() {
        let err = SessionIdentity::from_config(&SessionConfig::default()).unwrap_err();
        assert_eq!(err.kind, laundrix_core::error::ErrorKind::Authentication);

        let config = SessionConfig {
            user_id: "u-9".to_string(),
            role: "support".to_string(),
            token: " t ".to_string(),
        };
        let id = SessionIdentity::from_config(&config).unwrap();
        assert_eq!(id.role, ConsoleRole::Support);
        assert_eq!(id.token, "t");
    }

    #[test]
    fn test_from_config_rejects_unknown_role() {
        let config = SessionConfig {
            user_id: "u-9".to_string(),
            role: "janitor".to_string(),
            token: "t".to_string(),
        };
        assert!(SessionIdentity::from_config(&config).is_err());
    }

    #[test]
    fn test_authenticate_message_carries_role_tag() {
        let envelope = identity().authenticate_message().into_envelope();
        assert_eq!(envelope.event, "authenticate");
        assert_eq!(envelope.data["role"], "superadmin");
        assert_eq!(envelope.data["userId"], "u-1");
        assert_eq!(envelope.data["token"], "secret-token");
    }

    #[test]
    fn test_login_logout_roundtrip() {
        let ctx = AuthContext::new();
        let rx = ctx.subscribe();
        ctx.login(identity());
        assert_eq!(rx.borrow().as_ref().map(|i| i.user_id.as_str()), Some("u-1"));
        ctx.logout();
        assert!(ctx.current().is_none());
    }
}
