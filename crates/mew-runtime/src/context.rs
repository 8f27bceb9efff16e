//! Host context: the services handed to commands and extensions.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use mew_core::config::AppConfig;
use mew_core::result::AppResult;
use mew_core::traits::{ConsoleSink, Session};

use crate::command::CommandRegistry;
use crate::extension::ExtensionSummary;
use crate::hooks::{ConfigReadEvent, HookBus};

/// Shared host services.
///
/// Cloning is cheap; every field is reference counted.
#[derive(Clone)]
pub struct HostContext {
    /// Live configuration.
    pub config: Arc<RwLock<AppConfig>>,
    /// Hook bus.
    pub hooks: Arc<HookBus>,
    /// Command registry.
    pub commands: Arc<CommandRegistry>,
    /// The acting session.
    pub session: Arc<dyn Session>,
    /// Operator console.
    pub console: Arc<dyn ConsoleSink>,
    /// Summaries of the loaded extensions, filled in by the manager.
    pub extensions: Arc<RwLock<Vec<ExtensionSummary>>>,
    config_path: Arc<PathBuf>,
}

impl HostContext {
    /// Creates a context with an empty command registry.
    pub fn new(
        config: Arc<RwLock<AppConfig>>,
        config_path: impl Into<PathBuf>,
        hooks: Arc<HookBus>,
        session: Arc<dyn Session>,
        console: Arc<dyn ConsoleSink>,
    ) -> Self {
        Self {
            config,
            hooks,
            commands: Arc::new(CommandRegistry::new()),
            session,
            console,
            extensions: Arc::new(RwLock::new(Vec::new())),
            config_path: Arc::new(config_path.into()),
        }
    }

    /// Returns the path the configuration is read from and saved to.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Reads the configuration file (writing back missing keys), lets
    /// `config_read` subscribers edit it, then makes it the live
    /// configuration.
    pub async fn reload_config(&self) -> AppResult<()> {
        let config = AppConfig::setup(self.config_path.as_path())?;
        let mut event = ConfigReadEvent {
            path: self.config_path.to_path_buf(),
            config,
        };
        self.hooks.fire(&mut event).await;

        *self.config.write().await = event.config;
        info!(path = %self.config_path.display(), "Configuration loaded");
        Ok(())
    }

    /// Saves the live configuration.
    pub async fn save_config(&self) -> AppResult<()> {
        self.config.read().await.save(self.config_path.as_path())
    }

    /// Returns a copy of the loaded extension summaries.
    pub async fn extension_summaries(&self) -> Vec<ExtensionSummary> {
        self.extensions.read().await.clone()
    }
}

impl fmt::Debug for HostContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostContext")
            .field("config_path", &self.config_path)
            .field("session", &self.session.display_name())
            .finish()
    }
}
