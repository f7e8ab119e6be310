//! `read` and `read-all` commands.

use clap::Args;

use super::CommandContext;
use crate::output;
use laundrix_core::error::AppError;
use laundrix_core::types::NotificationId;
use laundrix_realtime::NotificationApi;

/// Arguments for the read command
#[derive(Debug, Args)]
pub struct ReadArgs {
    /// Notification ID
    pub id: NotificationId,
}

/// Mark one notification read
pub async fn execute(args: &ReadArgs, ctx: &CommandContext) -> Result<(), AppError> {
    ctx.api.mark_read(ctx.token(), &args.id).await?;
    output::print_success(&format!("Notification {} marked as read", args.id));
    Ok(())
}

/// Mark every notification read
pub async fn execute_all(ctx: &CommandContext) -> Result<(), AppError> {
    ctx.api.mark_all_read(ctx.token()).await?;
    output::print_success("All notifications marked as read");
    Ok(())
}
