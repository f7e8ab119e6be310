//! `clear` command.

use clap::Args;

use super::CommandContext;
use crate::output;
use laundrix_core::error::AppError;
use laundrix_realtime::NotificationApi;

/// Arguments for the clear command
#[derive(Debug, Args)]
pub struct ClearArgs {
    /// Confirm deletion of every notification
    #[arg(long)]
    pub yes: bool,
}

/// Delete every notification
pub async fn execute(args: &ClearArgs, ctx: &CommandContext) -> Result<(), AppError> {
    if !args.yes {
        output::print_warning("This deletes every notification. Re-run with --yes to confirm.");
        return Ok(());
    }
    ctx.api.clear_all(ctx.token()).await?;
    output::print_success("All notifications cleared");
    Ok(())
}
