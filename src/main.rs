//! Laundrix Feed: live notification console for platform operators
//!
//! Connects to the realtime server with the configured session, renders
//! alerts in the terminal, and accepts simple commands on stdin.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{EnvFilter, fmt};

use laundrix_core::config::AppConfig;
use laundrix_core::error::AppError;
use laundrix_core::types::NotificationId;
use laundrix_realtime::{AuthContext, ClientEvent, NotificationClient, SessionIdentity};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Feed error");
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("LAUNDRIX_CONFIG").unwrap_or_else(|_| "config/default".to_string());
    let env = std::env::var("LAUNDRIX_ENV").unwrap_or_else(|_| "development".to_string());

    AppConfig::load(&config_path, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Laundrix feed v{}", env!("CARGO_PKG_VERSION"));

    let identity = SessionIdentity::from_config(&config.session)?;
    let client = NotificationClient::builder(&config).build()?;

    let auth = AuthContext::new();
    let binding = client.bind_auth(&auth);
    auth.login(identity);

    let mut events = client.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Type 'help' for commands.");

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received");
                break;
            }
            event = events.recv() => match event {
                Ok(ClientEvent::StatusChanged(status)) => {
                    println!("-- {}", status.label());
                }
                Ok(ClientEvent::Hydrated(count)) => {
                    println!("-- loaded {count} notifications");
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Event listener lagged");
                }
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if !handle_command(&client, line.trim()).await {
                        break;
                    }
                }
                Ok(None) => {
                    // stdin closed; keep streaming until a signal
                    (&mut shutdown).await;
                    break;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read stdin");
                    break;
                }
            },
        }
    }

    auth.logout();
    drop(binding);
    client.shutdown();
    Ok(())
}

/// Run one stdin command. Returns `false` to quit.
async fn handle_command(client: &NotificationClient, line: &str) -> bool {
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let arg = parts.next();

    match (command, arg) {
        ("", _) => {}
        ("list", _) => {
            for n in client.notifications() {
                let read = if n.is_read { " " } else { "*" };
                let ack = if n.awaiting_ack() { " [ack required]" } else { "" };
                println!("{read} {} {:<8} {}{ack}", n.priority, n.id, n.title);
            }
        }
        ("stats", _) => {
            let stats = client.stats();
            let by_priority: Vec<String> = stats
                .by_priority
                .iter()
                .map(|(p, c)| format!("{p}={c}"))
                .collect();
            println!(
                "total={} unread={} {}",
                stats.total,
                stats.unread,
                by_priority.join(" ")
            );
        }
        ("status", _) => {
            let status = client.status();
            println!(
                "{} via {} (last error: {})",
                status.label(),
                status
                    .transport_mode
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                status.last_error.as_deref().unwrap_or("none")
            );
        }
        ("read", Some(id)) => {
            client.mark_as_read(&NotificationId::new(id));
        }
        ("read-all", _) => {
            let changed = client.mark_all_as_read();
            println!("{changed} marked as read");
        }
        ("clear", _) => client.clear_notifications(),
        ("ack", Some(id)) => {
            if !client.acknowledge_notification(&NotificationId::new(id)) {
                println!("not connected; acknowledgment not sent");
            }
        }
        ("refresh", _) => {
            client.refresh().await;
        }
        ("reconnect", _) => {
            client.reconnect().await;
        }
        ("quit" | "exit", _) => return false,
        _ => {
            println!(
                "commands: list, stats, status, read <id>, read-all, clear, ack <id>, refresh, reconnect, quit"
            );
        }
    }
    true
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
