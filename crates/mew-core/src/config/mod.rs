//! Application configuration schemas and persistence.
//!
//! The configuration is read through the `config` crate (file source chosen
//! by extension, overlaid with `MEW__`-prefixed environment variables) and
//! written back as pretty-printed JSON. Every field has a default so that a
//! partial or missing file still produces a complete configuration.

pub mod account;
pub mod console;
pub mod evolve;
pub mod logging;
pub mod plugin;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use self::account::{AccountConfig, LocationConfig};
pub use self::console::ConsoleConfig;
pub use self::evolve::EvolveConfig;
pub use self::logging::LoggingConfig;
pub use self::plugin::{HookConfig, PluginConfig};

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Operator console settings.
    #[serde(default)]
    pub console: ConsoleConfig,
    /// Hook bus settings.
    #[serde(default)]
    pub hooks: HookConfig,
    /// Extension module settings.
    #[serde(default)]
    pub plugins: PluginConfig,
    /// Stored account credentials.
    #[serde(default)]
    pub account: AccountConfig,
    /// Stored player location.
    #[serde(default)]
    pub location: LocationConfig,
    /// Evolution filter.
    #[serde(default)]
    pub evolve: EvolveConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from `path`.
    ///
    /// A missing file yields the defaults (still overlaid with the
    /// environment).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading configuration");

        let config = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("MEW")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Write configuration to `path` as pretty JSON, creating parent
    /// directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AppError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;

        info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Read the configuration if the file exists, then write it back so that
    /// keys missing from the file are filled in with their defaults.
    pub fn setup(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let config = if path.exists() {
            Self::load(path)?
        } else {
            info!(path = %path.display(), "No configuration found, writing defaults");
            Self::default()
        };
        config.save(path)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.plugins.directory, "Plugin");
        assert!(config.plugins.auto_load);
        assert_eq!(config.console.help_page_size, 4);
        assert_eq!(config.hooks.handler_timeout_seconds, 30);
        assert!(config.account.refresh_token().is_none());
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = AppConfig::load(temp.path().join("absent.json")).expect("load");
        assert_eq!(config.plugins.directory, "Plugin");
    }

    #[test]
    fn test_setup_fills_missing_keys() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("Config").join("config.json");
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(&path, r#"{ "account": { "ptc_username": "ash" } }"#).expect("write");

        let config = AppConfig::setup(&path).expect("setup");
        assert_eq!(config.account.ptc_username.as_deref(), Some("ash"));

        let written = std::fs::read_to_string(&path).expect("read back");
        let value: serde_json::Value = serde_json::from_str(&written).expect("json");
        assert_eq!(value["plugins"]["directory"], "Plugin");
        assert_eq!(value["account"]["ptc_username"], "ash");
    }

    #[test]
    fn test_setup_creates_file_when_absent() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("config.json");
        AppConfig::setup(&path).expect("setup");
        assert!(path.exists());
    }
}
