//! `list` command: recent notifications.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use super::CommandContext;
use crate::output::{self, OutputFormat};
use laundrix_core::error::AppError;
use laundrix_realtime::NotificationApi;
use laundrix_realtime::notification::model::Notification;
use laundrix_realtime::notification::normalizer::normalize_batch;
use laundrix_realtime::notification::store::NotificationStore;

/// Arguments for the list command
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Number of notifications to fetch (defaults to `api.hydrate_limit`)
    #[arg(short, long)]
    pub limit: Option<u32>,
    /// Only show unread notifications
    #[arg(short, long)]
    pub unread: bool,
}

/// Notification display row
#[derive(Debug, Serialize, Tabled)]
struct NotificationRow {
    /// ID
    id: String,
    /// Priority
    priority: String,
    /// Category
    category: String,
    /// Title
    title: String,
    /// Read
    read: String,
    /// Ack
    ack: String,
    /// Created
    created: String,
}

impl From<&Notification> for NotificationRow {
    fn from(n: &Notification) -> Self {
        let ack = match (n.requires_ack, n.acknowledged) {
            (false, _) => "",
            (true, true) => "✓",
            (true, false) => "pending",
        };
        Self {
            id: n.id.to_string(),
            priority: n.priority.to_string(),
            category: n.category.clone(),
            title: n.title.clone(),
            read: if n.is_read { "✓" } else { "✗" }.to_string(),
            ack: ack.to_string(),
            created: n.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Fetch, normalize, and order the notification list.
pub async fn fetch_store(ctx: &CommandContext, limit: u32) -> Result<NotificationStore, AppError> {
    let raw = ctx.api.fetch_notifications(ctx.token(), limit).await?;
    let mut store = NotificationStore::new();
    store.hydrate(normalize_batch(&raw));
    Ok(store)
}

/// Execute the list command
pub async fn execute(
    args: &ListArgs,
    ctx: &CommandContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let limit = args.limit.unwrap_or(ctx.config.api.hydrate_limit);
    let store = fetch_store(ctx, limit).await?;

    let items: Vec<&Notification> = store
        .items()
        .iter()
        .filter(|n| !args.unread || !n.is_read)
        .collect();

    match format {
        OutputFormat::Json => output::print_json(&items),
        OutputFormat::Table => {
            let rows: Vec<NotificationRow> = items.iter().map(|n| NotificationRow::from(*n)).collect();
            output::print_list(&rows, format);
        }
    }
    Ok(())
}
