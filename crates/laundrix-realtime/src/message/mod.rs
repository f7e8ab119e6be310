//! Transport frame types, event names, and frame validation.

pub mod envelope;
pub mod types;

pub use envelope::Envelope;
pub use types::{AckConfirmation, AlertChannel, InboundEvent, OutboundMessage, PlatformOccurrence};
