//! Console sinks.
//!
//! - [`TerminalConsole`] writes styled lines to stdout/stderr and mirrors
//!   them into `tracing`.
//! - [`BufferConsole`] keeps every line in memory, for embedding the host
//!   and for asserting operator diagnostics in tests.

pub mod buffer;
pub mod terminal;

pub use buffer::{BufferConsole, ConsoleLevel, ConsoleLine};
pub use terminal::TerminalConsole;
