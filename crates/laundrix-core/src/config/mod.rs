//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod alerts;
pub mod api;
pub mod logging;
pub mod realtime;
pub mod session;

use serde::{Deserialize, Serialize};

pub use self::alerts::AlertsConfig;
pub use self::api::ApiConfig;
pub use self::logging::LoggingConfig;
pub use self::realtime::RealtimeConfig;
pub use self::session::SessionConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (base file + environment overlay) and
/// `LAUNDRIX__*` environment variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// REST API settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Realtime notification connection settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Alert presentation settings.
    #[serde(default)]
    pub alerts: AlertsConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Signed-in session used by the command-line binaries.
    #[serde(default)]
    pub session: SessionConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config_path` with the `config/{env}` overlay and environment
    /// variables prefixed with `LAUNDRIX_` (nested keys separated by `__`,
    /// e.g. `LAUNDRIX__SESSION__TOKEN`). Missing files are skipped.
    pub fn load(config_path: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("LAUNDRIX")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        parsed.validate()?;
        Ok(parsed)
    }

    /// Check cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.realtime.reconnect_delay_ms == 0 {
            return Err(AppError::configuration(
                "realtime.reconnect_delay_ms must be greater than zero",
            ));
        }
        if self.realtime.event_buffer == 0 {
            return Err(AppError::configuration(
                "realtime.event_buffer must be greater than zero",
            ));
        }
        for (name, volume) in [
            ("alerts.p0_volume", self.alerts.p0_volume),
            ("alerts.p1_volume", self.alerts.p1_volume),
        ] {
            if !(0.0..=1.0).contains(&volume) {
                return Err(AppError::configuration(format!(
                    "{name} must be between 0.0 and 1.0, got {volume}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.realtime.reconnect_delay_ms, 5000);
        assert_eq!(config.api.hydrate_limit, 50);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_rejects_out_of_range_volume() {
        let mut config = AppConfig::default();
        config.alerts.p0_volume = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_files_fall_back_to_defaults() {
        let config = AppConfig::load("config/does-not-exist", "no-such-env")
            .expect("defaults should load");
        assert_eq!(config.realtime.url, "ws://localhost:4000/realtime");
    }
}
