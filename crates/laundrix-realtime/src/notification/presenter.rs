//! Priority-based alerting: sound, toast, and OS-level notification.
//!
//! [`AlertPolicy::for_priority`] is a pure table; [`AlertPresenter`] turns a
//! freshly ingested notification into an [`AlertPlan`] and hands it to an
//! [`AlertSink`]. Sink failures never propagate to the caller.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use uuid::Uuid;

use laundrix_core::config::AlertsConfig;
use laundrix_core::result::AppResult;
use laundrix_core::types::NotificationId;

use super::model::Notification;
use super::priority::Priority;

/// Identifier of a toast shown by a sink.
pub type ToastId = Uuid;

/// Sound asset for P0 alerts.
pub const CRITICAL_SOUND: &str = "critical-alert";
/// Sound asset for P1 alerts.
pub const WARNING_SOUND: &str = "warning-alert";
/// Fallback sound asset.
pub const DEFAULT_SOUND: &str = "default";

/// Visual framing of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastStyle {
    /// Red, "critical" framing, visually distinguished.
    Critical,
    /// Orange, "warning" framing.
    Warning,
    /// Blue/neutral framing.
    Info,
    /// Failure notice for an operator action.
    Error,
}

/// How long a toast stays on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastDuration {
    /// Until dismissed.
    Indefinite,
    /// Auto-dismissed after the given time.
    Timed(Duration),
}

/// Action button attached to a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToastAction {
    /// Acknowledge the notification and dismiss the toast.
    Acknowledge(NotificationId),
}

/// A toast to display.
#[derive(Debug, Clone, PartialEq)]
pub struct ToastSpec {
    /// Toast identifier.
    pub id: ToastId,
    /// Framing.
    pub style: ToastStyle,
    /// Heading line.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Display duration.
    pub duration: ToastDuration,
    /// Optional action button.
    pub action: Option<ToastAction>,
}

/// A sound to play.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundSpec {
    /// Sound asset name.
    pub name: String,
    /// Playback volume (0.0 - 1.0).
    pub volume: f32,
}

/// An OS-level notification to raise.
#[derive(Debug, Clone, PartialEq)]
pub struct OsNotificationSpec {
    /// Heading.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Replaces earlier OS notifications with the same tag.
    pub tag: NotificationId,
    /// Stays on screen until the operator interacts with it.
    pub require_interaction: bool,
}

/// OS notification permission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    /// Not asked yet.
    Undecided,
    /// Allowed.
    Granted,
    /// Refused.
    Denied,
}

/// Per-priority presentation rules.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertPolicy {
    /// Sound to play, if any.
    pub sound: Option<SoundSpec>,
    /// Toast duration.
    pub duration: ToastDuration,
    /// Toast framing.
    pub style: ToastStyle,
    /// Whether to raise an OS-level notification.
    pub os_notification: bool,
}

impl AlertPolicy {
    /// Policy table keyed by priority.
    pub fn for_priority(priority: Priority, config: &AlertsConfig) -> Self {
        let sound = |name: &str, volume: f32| {
            config.sound_enabled.then(|| SoundSpec {
                name: name.to_string(),
                volume,
            })
        };

        match priority {
            Priority::P0 => Self {
                sound: sound(CRITICAL_SOUND, config.p0_volume),
                duration: ToastDuration::Indefinite,
                style: ToastStyle::Critical,
                os_notification: config.os_notifications,
            },
            Priority::P1 => Self {
                sound: sound(WARNING_SOUND, config.p1_volume),
                duration: ToastDuration::Timed(Duration::from_secs(config.p1_toast_seconds)),
                style: ToastStyle::Warning,
                os_notification: false,
            },
            Priority::P2 | Priority::P3 | Priority::P4 => Self {
                sound: None,
                duration: ToastDuration::Timed(Duration::from_secs(config.default_toast_seconds)),
                style: ToastStyle::Info,
                os_notification: false,
            },
        }
    }
}

/// Everything the presenter will do for one notification.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertPlan {
    /// Sound to play.
    pub sound: Option<SoundSpec>,
    /// Toast to show.
    pub toast: ToastSpec,
    /// OS notification to raise (still subject to permission).
    pub os_notification: Option<OsNotificationSpec>,
}

/// UI surface that performs alert side effects.
///
/// Implementations may fail; the presenter degrades silently.
pub trait AlertSink: Send + Sync + fmt::Debug + 'static {
    /// Play a sound.
    fn play_sound(&self, sound: &SoundSpec) -> AppResult<()>;

    /// Show a toast.
    fn show_toast(&self, toast: &ToastSpec) -> AppResult<()>;

    /// Remove a toast from the screen.
    fn dismiss_toast(&self, id: ToastId);

    /// Current OS notification permission.
    fn permission(&self) -> PermissionState;

    /// Ask the operator for OS notification permission.
    fn request_permission(&self) -> PermissionState;

    /// Raise an OS-level notification.
    fn show_os_notification(&self, notification: &OsNotificationSpec) -> AppResult<()>;
}

/// An on-screen toast that carries an acknowledge action.
#[derive(Debug, Clone)]
struct AckToast {
    notification: NotificationId,
    /// `None` for toasts that stay until dismissed.
    expires_at: Option<Instant>,
}

impl AckToast {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// Decides and performs alert side effects for ingested notifications.
#[derive(Debug)]
pub struct AlertPresenter {
    sink: Arc<dyn AlertSink>,
    config: AlertsConfig,
    /// Toasts that carry an acknowledge action. Timed entries are pruned
    /// once their toast has expired.
    ack_toasts: Mutex<HashMap<ToastId, AckToast>>,
}

impl AlertPresenter {
    /// Create a presenter that drives `sink`.
    pub fn new(sink: Arc<dyn AlertSink>, config: AlertsConfig) -> Self {
        Self {
            sink,
            config,
            ack_toasts: Mutex::new(HashMap::new()),
        }
    }

    /// Build the plan for a notification without side effects.
    pub fn plan(&self, notification: &Notification) -> AlertPlan {
        let policy = AlertPolicy::for_priority(notification.priority, &self.config);

        let title = match policy.style {
            ToastStyle::Critical => format!("CRITICAL: {}", notification.title),
            ToastStyle::Warning => format!("WARNING: {}", notification.title),
            ToastStyle::Info | ToastStyle::Error => notification.title.clone(),
        };

        let action = notification
            .requires_ack
            .then(|| ToastAction::Acknowledge(notification.id.clone()));

        let os_notification = policy.os_notification.then(|| OsNotificationSpec {
            title: format!("[{}] {}", notification.priority, notification.title),
            body: notification.message.clone(),
            tag: notification.id.clone(),
            require_interaction: true,
        });

        AlertPlan {
            sound: policy.sound,
            toast: ToastSpec {
                id: Uuid::new_v4(),
                style: policy.style,
                title,
                message: notification.message.clone(),
                duration: policy.duration,
                action,
            },
            os_notification,
        }
    }

    /// Alert the operator about a newly ingested notification.
    ///
    /// Returns the id of the toast that was shown.
    pub fn present(&self, notification: &Notification) -> ToastId {
        let plan = self.plan(notification);

        if let Some(sound) = &plan.sound {
            self.play_with_fallback(sound);
        }

        if let Some(ToastAction::Acknowledge(id)) = &plan.toast.action {
            let expires_at = match plan.toast.duration {
                ToastDuration::Indefinite => None,
                ToastDuration::Timed(after) => Some(Instant::now() + after),
            };
            self.lock_ack_toasts().insert(
                plan.toast.id,
                AckToast {
                    notification: id.clone(),
                    expires_at,
                },
            );
        }
        if let Err(e) = self.sink.show_toast(&plan.toast) {
            tracing::debug!(error = %e, notification_id = %notification.id, "Toast display failed");
        }

        if let Some(os) = &plan.os_notification {
            if self.sink.permission() == PermissionState::Granted {
                if let Err(e) = self.sink.show_os_notification(os) {
                    tracing::debug!(error = %e, "OS notification failed");
                }
            }
        }

        plan.toast.id
    }

    /// Show an error toast for a failed operator action.
    pub fn show_error(&self, message: &str) -> ToastId {
        let toast = ToastSpec {
            id: Uuid::new_v4(),
            style: ToastStyle::Error,
            title: "Error".to_string(),
            message: message.to_string(),
            duration: ToastDuration::Timed(Duration::from_secs(self.config.default_toast_seconds)),
            action: None,
        };
        if let Err(e) = self.sink.show_toast(&toast) {
            tracing::debug!(error = %e, "Error toast display failed");
        }
        toast.id
    }

    /// Ask for OS notification permission if the operator has not decided.
    pub fn request_permission_if_needed(&self) -> PermissionState {
        if !self.config.os_notifications {
            return self.sink.permission();
        }
        match self.sink.permission() {
            PermissionState::Undecided => {
                let state = self.sink.request_permission();
                tracing::info!(?state, "OS notification permission requested");
                state
            }
            decided => decided,
        }
    }

    /// Resolve the notification behind an acknowledge toast, forgetting it.
    pub fn take_ack_toast(&self, toast_id: ToastId) -> Option<NotificationId> {
        self.lock_ack_toasts()
            .remove(&toast_id)
            .map(|toast| toast.notification)
    }

    /// Number of acknowledge toasts still on screen.
    pub fn pending_ack_toasts(&self) -> usize {
        self.lock_ack_toasts().len()
    }

    /// Dismiss a toast.
    pub fn dismiss(&self, toast_id: ToastId) {
        self.lock_ack_toasts().remove(&toast_id);
        self.sink.dismiss_toast(toast_id);
    }

    /// Dismiss the acknowledge toast(s) shown for a notification.
    pub fn dismiss_for(&self, id: &NotificationId) -> usize {
        let toasts: Vec<ToastId> = {
            let mut map = self.lock_ack_toasts();
            let matching: Vec<ToastId> = map
                .iter()
                .filter(|(_, toast)| toast.notification == *id)
                .map(|(t, _)| *t)
                .collect();
            for t in &matching {
                map.remove(t);
            }
            matching
        };
        for t in &toasts {
            self.sink.dismiss_toast(*t);
        }
        toasts.len()
    }

    /// Dismiss every outstanding acknowledge toast.
    pub fn dismiss_all(&self) {
        let toasts: Vec<ToastId> = self.lock_ack_toasts().drain().map(|(t, _)| t).collect();
        for t in toasts {
            self.sink.dismiss_toast(t);
        }
    }

    fn play_with_fallback(&self, sound: &SoundSpec) {
        let Err(e) = self.sink.play_sound(sound) else {
            return;
        };
        tracing::debug!(error = %e, sound = %sound.name, "Alert sound failed, trying default");

        let fallback = SoundSpec {
            name: DEFAULT_SOUND.to_string(),
            volume: sound.volume,
        };
        if let Err(e) = self.sink.play_sound(&fallback) {
            tracing::debug!(error = %e, "Default sound failed");
        }
    }

    /// Lock the acknowledge-toast map, dropping entries whose toast expired.
    fn lock_ack_toasts(&self) -> std::sync::MutexGuard<'_, HashMap<ToastId, AckToast>> {
        let mut map = self.ack_toasts.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        map.retain(|_, toast| toast.is_live(now));
        map
    }
}
