//! Extension module and hook bus configuration.

use serde::{Deserialize, Serialize};

/// Extension module configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Directory scanned (non-recursively) for extension modules.
    #[serde(default = "default_plugin_directory")]
    pub directory: String,
    /// Whether to scan the module directory on startup.
    #[serde(default = "default_true")]
    pub auto_load: bool,
    /// Extension names that are instantiated but never initialized.
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl PluginConfig {
    /// Returns whether the extension named `name` may be initialized.
    pub fn is_enabled(&self, name: &str) -> bool {
        !self.disabled.iter().any(|d| d.eq_ignore_ascii_case(name))
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            directory: default_plugin_directory(),
            auto_load: true,
            disabled: Vec::new(),
        }
    }
}

/// Hook bus configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookConfig {
    /// Per-subscriber time budget in seconds (0 = unbounded).
    #[serde(default = "default_handler_timeout")]
    pub handler_timeout_seconds: u64,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            handler_timeout_seconds: default_handler_timeout(),
        }
    }
}

fn default_plugin_directory() -> String {
    "Plugin".to_string()
}

fn default_handler_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}
