//! # laundrix-realtime
//!
//! Real-time notification client for the Laundrix admin console. Provides:
//!
//! - An authenticated link to the realtime server (WebSocket, with HTTP
//!   long-polling fallback) and fixed-delay reconnection
//! - Normalization of heterogeneous alert payloads into one record shape
//! - A de-duplicating, ordered notification store with derived statistics
//! - Priority-based alerting (sound, toast, OS notification)
//! - Acknowledgment and read/clear actions backed by the REST API

pub mod api;
pub mod auth;
pub mod client;
pub mod connection;
pub mod event;
pub mod gateway;
pub mod message;
pub mod notification;

mod state;

pub use api::{NotificationApi, RestNotificationApi};
pub use auth::{AuthContext, SessionIdentity};
pub use client::{AuthBinding, NotificationClient, NotificationClientBuilder};
pub use connection::{ConnectionStatus, Transport, TransportMode};
pub use event::ClientEvent;
pub use gateway::AcknowledgmentGateway;
pub use notification::{Notification, NotificationStats, Priority};
