//! Alert sink that renders to a terminal.

use std::io::{self, Write};

use uuid::Uuid;

use laundrix_core::error::AppError;
use laundrix_core::result::AppResult;

use super::presenter::{
    AlertSink, OsNotificationSpec, PermissionState, SoundSpec, ToastAction, ToastDuration,
    ToastId, ToastSpec, ToastStyle,
};

/// Writes toasts to stdout and rings the terminal bell for sounds.
///
/// A terminal has no permission prompt, so OS notifications are always
/// granted and rendered as a boxed banner.
#[derive(Debug, Default)]
pub struct TerminalSink;

impl TerminalSink {
    /// Create a terminal sink
    pub fn new() -> Self {
        Self
    }

    fn write_line(line: &str) -> AppResult<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{line}").map_err(|e| {
            AppError::internal(format!("stdout write failed: {e}"))
        })?;
        out.flush().map_err(|e| {
            AppError::internal(format!("stdout flush failed: {e}"))
        })
    }
}

impl AlertSink for TerminalSink {
    fn play_sound(&self, sound: &SoundSpec) -> AppResult<()> {
        tracing::trace!(sound = %sound.name, volume = sound.volume, "Ringing bell");
        let mut out = io::stdout().lock();
        out.write_all(b"\x07")
            .and_then(|_| out.flush())
            .map_err(|e| AppError::internal(format!("bell failed: {e}")))
    }

    fn show_toast(&self, toast: &ToastSpec) -> AppResult<()> {
        let tag = match toast.style {
            ToastStyle::Critical => "!!",
            ToastStyle::Warning => "! ",
            ToastStyle::Info => "  ",
            ToastStyle::Error => "xx",
        };
        let sticky = match toast.duration {
            ToastDuration::Indefinite => " (sticky)",
            ToastDuration::Timed(_) => "",
        };
        let mut line = format!("[{tag}] {}{sticky}", toast.title);
        if !toast.message.is_empty() {
            line.push_str(&format!(" - {}", toast.message));
        }
        if let Some(ToastAction::Acknowledge(id)) = &toast.action {
            line.push_str(&format!("\n     ack with: ack {} (toast {})", id, short(toast.id)));
        }
        Self::write_line(&line)
    }

    fn dismiss_toast(&self, id: ToastId) {
        tracing::debug!(toast_id = %id, "Toast dismissed");
    }

    fn permission(&self) -> PermissionState {
        PermissionState::Granted
    }

    fn request_permission(&self) -> PermissionState {
        PermissionState::Granted
    }

    fn show_os_notification(&self, notification: &OsNotificationSpec) -> AppResult<()> {
        let rule = "=".repeat(notification.title.chars().count().clamp(20, 72));
        Self::write_line(&format!(
            "{rule}\n{}\n{}\n{rule}",
            notification.title, notification.body
        ))
    }
}

fn short(id: Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}
