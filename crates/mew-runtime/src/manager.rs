//! Extension manager: discovery, ordered initialization, and teardown.
//!
//! Loading is fail-fast. Every extension is constructed before any is
//! initialized; the first construction or initialization error tears down
//! whatever already started and is returned to the host, which must treat
//! it as fatal. Unloading is fail-soft: every extension is deinitialized,
//! then every extension is disposed, both in reverse initialization order,
//! and errors are collected instead of stopping the pass.

use std::sync::Arc;

use tracing::{error, info, warn};

use mew_core::config::PluginConfig;
use mew_core::error::AppError;
use mew_core::result::AppResult;

use crate::container::ExtensionContainer;
use crate::context::HostContext;
use crate::extension::{Extension, ExtensionSummary};
use crate::hooks::ExtensionsLoadedEvent;
use crate::loader::{ExportedExtension, ModuleBackend, ModuleCache, default_backend};

/// Owns every extension container for the life of the host.
#[derive(Debug)]
pub struct ExtensionManager {
    config: PluginConfig,
    cache: ModuleCache,
    builtins: Vec<ExportedExtension>,
    containers: Vec<ExtensionContainer>,
    loaded: bool,
}

impl ExtensionManager {
    /// Creates a manager opening modules through `backend`.
    pub fn new(config: PluginConfig, backend: Arc<dyn ModuleBackend>) -> Self {
        let cache = ModuleCache::new(&config.directory, backend);
        Self {
            config,
            cache,
            builtins: Vec::new(),
            containers: Vec::new(),
            loaded: false,
        }
    }

    /// Creates a manager with the backend matching the enabled features.
    pub fn from_config(config: &PluginConfig) -> Self {
        Self::new(config.clone(), default_backend())
    }

    /// Adds an extension compiled into the host.
    pub fn register_builtin(&mut self, export: ExportedExtension) {
        self.builtins.push(export);
    }

    /// Adds an extension compiled into the host, constructed through
    /// `Default`.
    pub fn register_builtin_default<T: Extension + Default + 'static>(&mut self) {
        self.register_builtin(ExportedExtension::of::<T>());
    }

    /// Discovers, constructs, orders, and initializes every extension, then
    /// fires `extensions_loaded`.
    pub async fn load_all(&mut self, ctx: &HostContext) -> AppResult<()> {
        if self.loaded {
            return Err(AppError::internal("Extensions are already loaded"));
        }
        self.loaded = true;

        if let Err(e) = self.start(ctx).await {
            error!(error = %e, "Extension loading failed; unloading what started");
            self.unload_all(ctx).await;
            return Err(e);
        }

        let summaries = self.summaries();
        *ctx.extensions.write().await = summaries.clone();
        info!(count = summaries.len(), "Extensions loaded");

        let mut event = ExtensionsLoadedEvent {
            extensions: summaries,
        };
        ctx.hooks.fire(&mut event).await;
        Ok(())
    }

    async fn start(&mut self, ctx: &HostContext) -> AppResult<()> {
        self.containers = self
            .builtins
            .iter()
            .map(|export| ExtensionContainer::new(*export, None))
            .collect();

        if self.config.auto_load {
            for module in self.cache.scan()? {
                for export in module.declaration().exports() {
                    self.containers
                        .push(ExtensionContainer::new(export, Some(module.clone())));
                }
            }
        } else {
            info!("Module auto-load is disabled");
        }

        for container in &mut self.containers {
            container.instantiate()?;
            if !self.config.is_enabled(container.name()) {
                container.set_enabled(false);
            }
        }

        self.containers
            .sort_by(|a, b| a.order().cmp(&b.order()).then_with(|| a.name().cmp(b.name())));

        for container in &mut self.containers {
            if !container.enabled() {
                info!(extension = %container.name(), "Extension is disabled; not initializing");
                continue;
            }
            container.initialize(ctx).await?;
        }
        Ok(())
    }

    /// Deinitializes, then disposes every extension. Never stops early;
    /// returns every error encountered.
    pub async fn unload_all(&mut self, ctx: &HostContext) -> Vec<AppError> {
        let mut errors = Vec::new();

        for container in self.containers.iter_mut().rev() {
            if let Err(e) = container.deinitialize(ctx).await {
                error!(extension = %container.name(), error = %e, "Extension deinitialization failed");
                errors.push(e);
            }
        }

        for container in self.containers.iter_mut().rev() {
            if let Err(e) = container.dispose() {
                error!(extension = %container.name(), error = %e, "Extension disposal failed");
                errors.push(e);
            }
        }

        *ctx.extensions.write().await = self.summaries();
        if errors.is_empty() {
            info!("All extensions unloaded");
        } else {
            warn!(errors = errors.len(), "Extensions unloaded with errors");
        }
        errors
    }

    /// Returns the containers in initialization order.
    pub fn containers(&self) -> &[ExtensionContainer] {
        &self.containers
    }

    /// Returns summaries in initialization order.
    pub fn summaries(&self) -> Vec<ExtensionSummary> {
        self.containers.iter().map(ExtensionContainer::summary).collect()
    }

    /// Returns the module cache.
    pub fn module_cache(&self) -> &ModuleCache {
        &self.cache
    }
}
