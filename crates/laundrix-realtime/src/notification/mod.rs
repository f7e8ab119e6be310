//! Notification model, normalization, storage, and alert presentation.

pub mod model;
pub mod normalizer;
pub mod presenter;
pub mod priority;
pub mod store;
pub mod synthetic;
pub mod terminal;

pub use model::Notification;
pub use presenter::{AlertPresenter, AlertSink};
pub use priority::Priority;
pub use store::{NotificationStats, NotificationStore};
pub use terminal::TerminalSink;
