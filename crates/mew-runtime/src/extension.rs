//! The extension contract and its metadata.

use std::fmt;

use async_trait::async_trait;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::container::ExtensionState;
use crate::context::HostContext;

/// Metadata describing an extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionInfo {
    /// Human-readable name; also the tie-breaker for initialization order.
    pub name: String,
    /// Extension version.
    pub version: Version,
    /// Author or maintainer.
    pub author: String,
    /// One-line description.
    pub description: String,
    /// Where updates are published, if anywhere.
    pub update_url: Option<String>,
}

impl Default for ExtensionInfo {
    fn default() -> Self {
        Self {
            name: "None".to_string(),
            version: Version::new(1, 0, 0),
            author: "None".to_string(),
            description: "None".to_string(),
            update_url: None,
        }
    }
}

/// Trait that every extension implements.
///
/// The host drives the lifecycle: an extension is constructed by its
/// factory, initialized at most once, deinitialized at most once (and only
/// if initialization succeeded), and released exactly once.
#[async_trait]
pub trait Extension: Send + Sync + fmt::Debug {
    /// Returns extension metadata.
    fn info(&self) -> ExtensionInfo;

    /// Initialization rank; lower ranks initialize first.
    fn order(&self) -> i32 {
        1
    }

    /// Called once, in order, after every extension was constructed.
    /// Subscribe hooks and register commands here.
    async fn initialize(&mut self, ctx: &HostContext) -> Result<(), String>;

    /// Called once at shutdown if [`initialize`](Self::initialize)
    /// succeeded.
    async fn deinitialize(&mut self, _ctx: &HostContext) -> Result<(), String> {
        Ok(())
    }

    /// Releases resources. Called exactly once, after every extension was
    /// deinitialized.
    fn release(&mut self) -> Result<(), String> {
        Ok(())
    }
}

/// Snapshot of one extension for listings and the `extensions_loaded` hook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionSummary {
    /// Extension name.
    pub name: String,
    /// Extension version.
    pub version: Version,
    /// Author.
    pub author: String,
    /// Description.
    pub description: String,
    /// Initialization rank.
    pub order: i32,
    /// Whether the extension was allowed to initialize.
    pub enabled: bool,
    /// Base name of the module it came from; `None` for built-ins.
    pub module: Option<String>,
    /// Lifecycle state at the time of the snapshot.
    pub state: ExtensionState,
}
