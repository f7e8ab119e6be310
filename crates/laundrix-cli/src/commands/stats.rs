//! `stats` command: totals by read state and priority.

use clap::Args;

use super::CommandContext;
use crate::output::{self, OutputFormat};
use laundrix_core::error::AppError;
use laundrix_realtime::Priority;

/// Arguments for the stats command
#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Number of notifications to include (defaults to `api.hydrate_limit`)
    #[arg(short, long)]
    pub limit: Option<u32>,
}

/// Execute the stats command
pub async fn execute(
    args: &StatsArgs,
    ctx: &CommandContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let limit = args.limit.unwrap_or(ctx.config.api.hydrate_limit);
    let store = super::list::fetch_store(ctx, limit).await?;
    let stats = store.stats();

    match format {
        OutputFormat::Json => output::print_json(stats),
        OutputFormat::Table => {
            println!("Notifications");
            output::print_kv("Total", &stats.total.to_string());
            output::print_kv("Unread", &stats.unread.to_string());
            for priority in Priority::ALL {
                output::print_kv(priority.as_str(), &stats.count(priority).to_string());
            }
        }
    }
    Ok(())
}
