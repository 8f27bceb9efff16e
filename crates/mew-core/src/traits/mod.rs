//! Collaborator traits the extensibility runtime depends on.
//!
//! Concrete implementations live outside the runtime (session in
//! `mew-session`, sinks in [`crate::console`]) so that the dispatcher and
//! the lifecycle manager only ever see these interfaces.

pub mod console;
pub mod session;

pub use console::{ConsoleColor, ConsoleSink};
pub use session::{AuthProvider, Session};
