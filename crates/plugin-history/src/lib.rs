//! Command history extension for Project Mew.
//!
//! Records every command line the operator enters and exposes it through
//! the `history` command. Built as a `cdylib`, it is picked up from the
//! host's plugin directory.

pub mod extension;
pub mod store;

pub use extension::HistoryExtension;
pub use store::{HistoryEntry, HistoryStore};

mew_plugin_sdk::mew_runtime::declare_module! {
    name: "history",
    extensions: [HistoryExtension],
}
