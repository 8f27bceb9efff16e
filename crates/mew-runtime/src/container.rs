//! Extension containers: one extension instance plus its lifecycle state.

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use mew_core::error::AppError;
use mew_core::result::AppResult;

use crate::command::definition::panic_message;
use crate::context::HostContext;
use crate::extension::{Extension, ExtensionInfo, ExtensionSummary};
use crate::loader::{ExportedExtension, LoadedModule};

/// Lifecycle state of a container.
///
/// `Discovered → Instantiated → Initialized → Deinitialized → Disposed`,
/// where initialization may be skipped and disposal may happen from any
/// state. A deinitialized extension is never initialized again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionState {
    /// The type is known; no instance exists.
    Discovered,
    /// The instance exists.
    Instantiated,
    /// `initialize` succeeded.
    Initialized,
    /// `deinitialize` was called.
    Deinitialized,
    /// `release` was called and the instance dropped.
    Disposed,
}

impl fmt::Display for ExtensionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Discovered => "discovered",
            Self::Instantiated => "instantiated",
            Self::Initialized => "initialized",
            Self::Deinitialized => "deinitialized",
            Self::Disposed => "disposed",
        })
    }
}

async fn contained<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(format!("panicked: {}", panic_message(panic.as_ref()))),
    }
}

/// Wraps one extension.
///
/// The instance field is declared before the module handle so that the
/// instance is dropped while the module's code is still mapped.
pub struct ExtensionContainer {
    export: ExportedExtension,
    extension: Option<Box<dyn Extension>>,
    info: Option<ExtensionInfo>,
    order: i32,
    enabled: bool,
    state: ExtensionState,
    module: Option<Arc<LoadedModule>>,
}

impl ExtensionContainer {
    /// Creates a container for an exported type. `module` is `None` for
    /// extensions compiled into the host.
    pub fn new(export: ExportedExtension, module: Option<Arc<LoadedModule>>) -> Self {
        Self {
            export,
            extension: None,
            info: None,
            order: 1,
            enabled: true,
            state: ExtensionState::Discovered,
            module,
        }
    }

    /// Returns the extension name, or the type name before instantiation.
    pub fn name(&self) -> &str {
        self.info
            .as_ref()
            .map(|info| info.name.as_str())
            .unwrap_or(self.export.type_name)
    }

    /// Returns the exported type name.
    pub fn type_name(&self) -> &'static str {
        self.export.type_name
    }

    /// Returns the metadata captured at instantiation.
    pub fn info(&self) -> Option<&ExtensionInfo> {
        self.info.as_ref()
    }

    /// Returns the initialization rank.
    pub fn order(&self) -> i32 {
        self.order
    }

    /// Overrides the initialization rank.
    pub fn set_order(&mut self, order: i32) {
        self.order = order;
    }

    /// Returns whether the extension may be initialized.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Allows or prevents initialization.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> ExtensionState {
        self.state
    }

    /// Returns whether the extension came from a dynamically loaded module.
    pub fn from_module(&self) -> bool {
        self.module.is_some()
    }

    /// Returns the base name of the originating module.
    pub fn module_name(&self) -> Option<&str> {
        self.module.as_ref().map(|m| m.name())
    }

    /// Constructs the instance and captures its metadata and rank.
    pub fn instantiate(&mut self) -> AppResult<()> {
        if self.state != ExtensionState::Discovered {
            return Err(AppError::internal(format!(
                "Extension \"{}\" cannot be instantiated from state {}",
                self.name(),
                self.state
            )));
        }

        let created = std::panic::catch_unwind(self.export.factory)
            .unwrap_or_else(|panic| Err(format!("panicked: {}", panic_message(panic.as_ref()))));
        let extension = created.map_err(|e| {
            AppError::module_load(format!(
                "Could not create an instance of extension type \"{}\": {e}",
                self.export.type_name
            ))
        })?;

        let info = extension.info();
        debug!(
            extension = %info.name,
            version = %info.version,
            order = extension.order(),
            "Extension instantiated"
        );

        self.order = extension.order();
        self.info = Some(info);
        self.extension = Some(extension);
        self.state = ExtensionState::Instantiated;
        Ok(())
    }

    /// Initializes the instance. Only valid from `Instantiated`; a failure
    /// leaves the state unchanged.
    pub async fn initialize(&mut self, ctx: &HostContext) -> AppResult<()> {
        let name = self.name().to_string();
        let Some(extension) = self
            .extension
            .as_mut()
            .filter(|_| self.state == ExtensionState::Instantiated)
        else {
            return Err(AppError::extension_init(format!(
                "Extension \"{name}\" cannot be initialized from state {}",
                self.state
            )));
        };

        contained(extension.initialize(ctx)).await.map_err(|e| {
            AppError::extension_init(format!(
                "Extension \"{name}\" has thrown an exception during initialization: {e}"
            ))
        })?;

        self.state = ExtensionState::Initialized;
        info!(extension = %name, "Extension initialized");
        Ok(())
    }

    /// Deinitializes the instance if it is initialized; otherwise does
    /// nothing. The state becomes `Deinitialized` even when the extension
    /// reports an error.
    pub async fn deinitialize(&mut self, ctx: &HostContext) -> AppResult<()> {
        if self.state != ExtensionState::Initialized {
            return Ok(());
        }
        let name = self.name().to_string();
        let Some(extension) = self.extension.as_mut() else {
            return Ok(());
        };

        let result = contained(extension.deinitialize(ctx)).await;
        self.state = ExtensionState::Deinitialized;
        result.map_err(|e| {
            AppError::extension_shutdown(format!(
                "Extension \"{name}\" failed to deinitialize: {e}"
            ))
        })?;

        debug!(extension = %name, "Extension deinitialized");
        Ok(())
    }

    /// Releases and drops the instance. Idempotent; the state becomes
    /// `Disposed` even when the extension reports an error.
    pub fn dispose(&mut self) -> AppResult<()> {
        self.state = ExtensionState::Disposed;
        let Some(mut extension) = self.extension.take() else {
            return Ok(());
        };

        let name = self.name().to_string();
        let result = std::panic::catch_unwind(AssertUnwindSafe(|| extension.release()))
            .unwrap_or_else(|panic| Err(format!("panicked: {}", panic_message(panic.as_ref()))));
        drop(extension);

        result.map_err(|e| {
            AppError::extension_shutdown(format!("Extension \"{name}\" failed to release: {e}"))
        })?;
        debug!(extension = %name, "Extension disposed");
        Ok(())
    }

    /// Returns a snapshot for listings.
    pub fn summary(&self) -> ExtensionSummary {
        let info = self.info.clone().unwrap_or_else(|| ExtensionInfo {
            name: self.export.type_name.to_string(),
            ..Default::default()
        });
        ExtensionSummary {
            name: info.name,
            version: info.version,
            author: info.author,
            description: info.description,
            order: self.order,
            enabled: self.enabled,
            module: self.module_name().map(str::to_string),
            state: self.state,
        }
    }
}

impl Drop for ExtensionContainer {
    fn drop(&mut self) {
        if self.extension.is_some() {
            warn!(extension = %self.name(), "Extension dropped without being disposed");
            if let Err(e) = self.dispose() {
                warn!(error = %e, "Release during drop failed");
            }
        }
    }
}

impl fmt::Debug for ExtensionContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionContainer")
            .field("name", &self.name())
            .field("order", &self.order)
            .field("enabled", &self.enabled)
            .field("state", &self.state)
            .field("module", &self.module_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::test_support::fixture;

    static EVENTS: Mutex<Vec<String>> = Mutex::new(Vec::new());

    #[derive(Debug, Default)]
    struct Tracked;

    #[async_trait]
    impl Extension for Tracked {
        fn info(&self) -> ExtensionInfo {
            ExtensionInfo {
                name: "Tracked".into(),
                ..Default::default()
            }
        }

        fn order(&self) -> i32 {
            7
        }

        async fn initialize(&mut self, _ctx: &HostContext) -> Result<(), String> {
            EVENTS.lock().unwrap().push("init".into());
            Ok(())
        }

        async fn deinitialize(&mut self, _ctx: &HostContext) -> Result<(), String> {
            EVENTS.lock().unwrap().push("deinit".into());
            Err("still busy".into())
        }

        fn release(&mut self) -> Result<(), String> {
            EVENTS.lock().unwrap().push("release".into());
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct Quiet;

    #[async_trait]
    impl Extension for Quiet {
        fn info(&self) -> ExtensionInfo {
            ExtensionInfo {
                name: "Quiet".into(),
                ..Default::default()
            }
        }

        async fn initialize(&mut self, _ctx: &HostContext) -> Result<(), String> {
            Ok(())
        }
    }

    fn failing_factory() -> Result<Box<dyn Extension>, String> {
        Err("no licence".into())
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        EVENTS.lock().unwrap().clear();
        let f = fixture();
        let mut container = ExtensionContainer::new(ExportedExtension::of::<Tracked>(), None);
        assert_eq!(container.state(), ExtensionState::Discovered);
        assert!(container.name().ends_with("Tracked"));

        container.instantiate().expect("instantiate");
        assert_eq!(container.state(), ExtensionState::Instantiated);
        assert_eq!(container.order(), 7);
        assert_eq!(container.name(), "Tracked");
        assert!(!container.from_module());

        container.initialize(&f.ctx).await.expect("initialize");
        assert_eq!(container.state(), ExtensionState::Initialized);

        let err = container.deinitialize(&f.ctx).await.expect_err("deinit fails");
        assert_eq!(err.kind, mew_core::ErrorKind::ExtensionShutdown);
        assert_eq!(container.state(), ExtensionState::Deinitialized);

        let err = container.initialize(&f.ctx).await.expect_err("no re-init");
        assert_eq!(err.kind, mew_core::ErrorKind::ExtensionInit);

        container.dispose().expect("dispose");
        container.dispose().expect("dispose twice");
        assert_eq!(container.state(), ExtensionState::Disposed);
        assert_eq!(*EVENTS.lock().unwrap(), ["init", "deinit", "release"]);
    }

    #[tokio::test]
    async fn test_deinitialize_skips_uninitialized() {
        let f = fixture();
        let mut container = ExtensionContainer::new(ExportedExtension::of::<Quiet>(), None);
        container.instantiate().expect("instantiate");
        container.deinitialize(&f.ctx).await.expect("no-op");
        assert_eq!(container.state(), ExtensionState::Instantiated);
        container.dispose().expect("dispose");
    }

    #[test]
    fn test_factory_failure_is_module_load_error() {
        let export = ExportedExtension {
            type_name: "demo::Broken",
            factory: failing_factory,
        };
        let mut container = ExtensionContainer::new(export, None);
        let err = container.instantiate().expect_err("factory fails");
        assert_eq!(err.kind, mew_core::ErrorKind::ModuleLoad);
        assert!(err.message.contains("demo::Broken"));
        assert_eq!(container.state(), ExtensionState::Discovered);
    }

    #[test]
    fn test_summary_before_instantiation() {
        let container = ExtensionContainer::new(ExportedExtension::of::<Quiet>(), None);
        let summary = container.summary();
        assert!(summary.name.ends_with("Quiet"));
        assert_eq!(summary.state, ExtensionState::Discovered);
        assert!(summary.module.is_none());
    }
}
