//! Operator console configuration.

use serde::{Deserialize, Serialize};

/// Operator console and command dispatch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Time budget for a single command handler in seconds (0 = unbounded).
    #[serde(default = "default_command_timeout")]
    pub command_timeout_seconds: u64,
    /// Lines shown per page by paginated commands.
    #[serde(default = "default_page_size")]
    pub help_page_size: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            command_timeout_seconds: default_command_timeout(),
            help_page_size: default_page_size(),
        }
    }
}

fn default_command_timeout() -> u64 {
    120
}

fn default_page_size() -> usize {
    4
}
