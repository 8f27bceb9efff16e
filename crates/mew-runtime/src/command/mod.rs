//! Operator commands: tokenizer, definitions, registry, dispatcher,
//! pagination helpers, and the built-in command set.

pub mod builtin;
pub mod definition;
pub mod dispatcher;
pub mod pagination;
pub mod registry;
pub mod tokenizer;

pub use builtin::register_builtins;
pub use definition::{Command, CommandArgs, CommandHandler, CommandOutcome};
pub use dispatcher::CommandDispatcher;
pub use pagination::PaginationSettings;
pub use registry::CommandRegistry;
pub use tokenizer::tokenize;
