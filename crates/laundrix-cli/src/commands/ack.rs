//! `ack` command: acknowledge a notification over the realtime link.

use std::time::Duration;

use clap::Args;
use serde::Serialize;

use super::CommandContext;
use crate::output::{self, OutputFormat};
use laundrix_core::error::AppError;
use laundrix_core::types::NotificationId;
use laundrix_realtime::connection::default_transport;
use laundrix_realtime::connection::transport::TransportEvent;
use laundrix_realtime::message::types::{InboundEvent, OutboundMessage};

/// Arguments for the ack command
#[derive(Debug, Args)]
pub struct AckArgs {
    /// Notification ID
    pub id: NotificationId,
    /// Seconds to wait for the server confirmation
    #[arg(short, long, default_value = "5")]
    pub wait: u64,
}

/// Outcome of an acknowledgment
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AckOutcome {
    notification_id: NotificationId,
    confirmed: Option<bool>,
    error: Option<String>,
}

/// Execute the ack command
pub async fn execute(
    args: &AckArgs,
    ctx: &CommandContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let transport = default_transport(&ctx.config.realtime)?;
    let mut link = transport.open(&ctx.identity).await?;

    let envelope = OutboundMessage::AcknowledgeNotification {
        notification_id: args.id.clone(),
    }
    .into_envelope();
    link.outbound
        .send(envelope)
        .await
        .map_err(|_| AppError::transport("Link closed before the acknowledgment was sent"))?;

    let wait = tokio::time::timeout(Duration::from_secs(args.wait), async {
        while let Some(event) = link.inbound.recv().await {
            match event {
                TransportEvent::Frame(envelope) => {
                    if let InboundEvent::AckConfirmed(c) = InboundEvent::from_envelope(envelope) {
                        if c.notification_id == args.id {
                            return Some(c);
                        }
                    }
                }
                TransportEvent::Closed { reason } => {
                    tracing::warn!(reason = %reason, "Link closed while waiting for confirmation");
                    return None;
                }
            }
        }
        None
    })
    .await;
    link.cancel.cancel();

    let confirmation = wait.ok().flatten();
    let outcome = AckOutcome {
        notification_id: args.id.clone(),
        confirmed: confirmation.as_ref().map(|c| c.success),
        error: confirmation.and_then(|c| c.error),
    };

    match format {
        OutputFormat::Json => output::print_json(&outcome),
        OutputFormat::Table => match outcome.confirmed {
            Some(true) => output::print_success(&format!("Notification {} acknowledged", args.id)),
            Some(false) => {}
            None => output::print_warning(&format!(
                "Acknowledgment for {} sent; no confirmation within {}s",
                args.id, args.wait
            )),
        },
    }

    if outcome.confirmed == Some(false) {
        return Err(AppError::external_service(format!(
            "Failed to acknowledge alert: {}",
            outcome.error.as_deref().unwrap_or("rejected by server")
        )));
    }
    Ok(())
}
