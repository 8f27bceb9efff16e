//! Console/log sink collaborator interface.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Colors available to colored console output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsoleColor {
    /// Default terminal color.
    Default,
    /// Green.
    Green,
    /// Yellow.
    Yellow,
    /// Red.
    Red,
    /// Cyan.
    Cyan,
    /// White.
    White,
}

/// Leveled operator output.
///
/// Core code only calls these methods; formatting of persistent logs is the
/// tracing subscriber's concern.
pub trait ConsoleSink: Send + Sync + fmt::Debug {
    /// Writes an informative line.
    fn info(&self, message: &str);

    /// Writes an error line.
    fn error(&self, message: &str);

    /// Writes a warning line.
    fn warn(&self, message: &str);

    /// Writes a debug line.
    fn debug(&self, message: &str);

    /// Writes an informative line in the given color.
    fn colored(&self, message: &str, color: ConsoleColor);
}
