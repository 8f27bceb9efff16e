//! # mew-plugin-sdk
//!
//! SDK for writing Project Mew extensions.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mew_plugin_sdk::prelude::*;
//!
//! #[derive(Debug, Default)]
//! struct Greeter;
//!
//! #[async_trait]
//! impl Extension for Greeter {
//!     fn info(&self) -> ExtensionInfo {
//!         extension_info!(
//!             name: "Greeter",
//!             version: env!("CARGO_PKG_VERSION"),
//!             author: "Developer",
//!             description: "Says hello after login"
//!         )
//!     }
//!
//!     async fn initialize(&mut self, ctx: &HostContext) -> Result<(), String> {
//!         let console = ctx.console.clone();
//!         ctx.hooks
//!             .subscribe_fn("Greeter", move |_: &mut PostLoginEvent| {
//!                 console.info("Hello!");
//!                 Ok(())
//!             })
//!             .await;
//!         Ok(())
//!     }
//! }
//!
//! declare_module! {
//!     name: "greeter",
//!     extensions: [Greeter],
//! }
//! ```
//!
//! Build the crate as a `cdylib` and drop the library into the host's
//! plugin directory.

pub mod testing;

pub use mew_core;
pub use mew_runtime;

/// Prelude for convenient imports.
pub mod prelude {
    pub use mew_runtime::prelude::*;

    pub use crate::testing::TestHost;
}
