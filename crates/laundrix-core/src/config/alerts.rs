//! Alert presentation configuration.

use serde::{Deserialize, Serialize};

/// Controls how incoming notifications are surfaced to the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsConfig {
    /// Whether alert sounds are played for P0/P1 notifications.
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    /// Whether OS-level notifications are raised for P0 notifications.
    #[serde(default = "default_true")]
    pub os_notifications: bool,
    /// Playback volume for P0 alerts (0.0 - 1.0).
    #[serde(default = "default_p0_volume")]
    pub p0_volume: f32,
    /// Playback volume for P1 alerts (0.0 - 1.0).
    #[serde(default = "default_p1_volume")]
    pub p1_volume: f32,
    /// Toast duration for P1 alerts, in seconds.
    #[serde(default = "default_p1_toast")]
    pub p1_toast_seconds: u64,
    /// Toast duration for P2-P4 alerts, in seconds.
    #[serde(default = "default_toast")]
    pub default_toast_seconds: u64,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            os_notifications: true,
            p0_volume: default_p0_volume(),
            p1_volume: default_p1_volume(),
            p1_toast_seconds: default_p1_toast(),
            default_toast_seconds: default_toast(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_p0_volume() -> f32 {
    0.8
}

fn default_p1_volume() -> f32 {
    0.5
}

fn default_p1_toast() -> u64 {
    15
}

fn default_toast() -> u64 {
    8
}
