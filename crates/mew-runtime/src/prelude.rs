//! Prelude for convenient imports.

pub use async_trait::async_trait;

pub use mew_core::config::AppConfig;
pub use mew_core::error::{AppError, ErrorKind};
pub use mew_core::result::AppResult;
pub use mew_core::traits::{AuthProvider, ConsoleColor, ConsoleSink, Session};
pub use mew_core::types::{EvolveTarget, Species};

pub use crate::command::{Command, CommandArgs, CommandHandler, CommandRegistry};
pub use crate::command::pagination::{
    PaginationSettings, build_lines_from_terms, send_page, try_parse_page_number,
};
pub use crate::context::HostContext;
pub use crate::extension::{Extension, ExtensionInfo, ExtensionSummary};
pub use crate::hooks::{
    CommandEvent, ConfigReadEvent, ExtensionsLoadedEvent, HookBus, HookEvent, HookHandler,
    HookPoint, LogoutEvent, PostLoginEvent, PreLoginEvent,
};
pub use crate::loader::ExtensionExports;

pub use crate::{declare_module, extension_info};
