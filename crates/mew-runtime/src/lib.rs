//! # mew-runtime
//!
//! Extensibility runtime for Project Mew. Provides:
//!
//! - A typed hook bus with cooperative veto and per-handler isolation
//! - Operator command tokenizing, registration, and dispatch
//! - Extension lifecycle management with ordered initialization
//! - Module discovery and a process-wide module cache, with dynamic
//!   loading via `libloading` behind the `dynamic` feature

pub mod command;
pub mod container;
pub mod context;
pub mod extension;
pub mod hooks;
pub mod loader;
pub mod macros;
pub mod manager;
pub mod prelude;

#[cfg(test)]
pub(crate) mod test_support;

pub use semver;

pub use command::{Command, CommandDispatcher, CommandRegistry};
pub use container::{ExtensionContainer, ExtensionState};
pub use context::HostContext;
pub use extension::{Extension, ExtensionInfo, ExtensionSummary};
pub use hooks::{HookBus, HookPoint};
pub use manager::ExtensionManager;

/// Version of this runtime, recorded in every module declaration.
pub const RUNTIME_VERSION: &str = env!("CARGO_PKG_VERSION");
