//! CLI command definitions and dispatch.

pub mod ack;
pub mod clear;
pub mod list;
pub mod read;
pub mod stats;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use laundrix_core::config::AppConfig;
use laundrix_core::error::AppError;
use laundrix_realtime::{RestNotificationApi, SessionIdentity};

/// Laundrix admin console notification tools
#[derive(Debug, Parser)]
#[command(name = "laundrix", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Environment overlay loaded from `config/{env}`
    #[arg(short, long, env = "LAUNDRIX_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List recent notifications
    List(list::ListArgs),
    /// Show notification statistics
    Stats(stats::StatsArgs),
    /// Mark one notification as read
    Read(read::ReadArgs),
    /// Mark every notification as read
    ReadAll,
    /// Delete every notification
    Clear(clear::ClearArgs),
    /// Acknowledge a notification over the realtime link
    Ack(ack::AckArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let ctx = CommandContext::load(&self.config, &self.env)?;
        match &self.command {
            Commands::List(args) => list::execute(args, &ctx, self.format).await,
            Commands::Stats(args) => stats::execute(args, &ctx, self.format).await,
            Commands::Read(args) => read::execute(args, &ctx).await,
            Commands::ReadAll => read::execute_all(&ctx).await,
            Commands::Clear(args) => clear::execute(args, &ctx).await,
            Commands::Ack(args) => ack::execute(args, &ctx, self.format).await,
        }
    }
}

/// Configuration, REST client, and signed-in identity shared by commands.
pub struct CommandContext {
    /// Loaded configuration
    pub config: AppConfig,
    /// REST client
    pub api: RestNotificationApi,
    /// Session from `[session]` / `LAUNDRIX__SESSION__*`
    pub identity: SessionIdentity,
}

impl CommandContext {
    /// Load configuration and build the REST client
    pub fn load(config_path: &str, env: &str) -> Result<Self, AppError> {
        let config = AppConfig::load(config_path, env)?;
        let identity = SessionIdentity::from_config(&config.session)?;
        let api = RestNotificationApi::new(&config.api)?;
        tracing::debug!(user_id = %identity.user_id, api = %config.api.base_url, "CLI context ready");
        Ok(Self {
            config,
            api,
            identity,
        })
    }

    /// Bearer credential
    pub fn token(&self) -> &str {
        &self.identity.token
    }
}
