//! In-memory console sink.

use std::sync::Mutex;

use crate::traits::console::{ConsoleColor, ConsoleSink};

/// Severity of a recorded line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    /// Informative output.
    Info,
    /// Error output.
    Error,
    /// Warning output.
    Warn,
    /// Debug output.
    Debug,
}

/// One recorded console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    /// Severity.
    pub level: ConsoleLevel,
    /// Text as written.
    pub message: String,
    /// Color, for colored info output.
    pub color: ConsoleColor,
}

/// Console sink that records every line.
#[derive(Debug, Default)]
pub struct BufferConsole {
    lines: Mutex<Vec<ConsoleLine>>,
}

impl BufferConsole {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: ConsoleLevel, message: &str, color: ConsoleColor) {
        let mut lines = self.lines.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        lines.push(ConsoleLine {
            level,
            message: message.to_string(),
            color,
        });
    }

    /// Returns a copy of every recorded line.
    pub fn lines(&self) -> Vec<ConsoleLine> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Returns the messages recorded at `level`.
    pub fn messages(&self, level: ConsoleLevel) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.level == level)
            .map(|line| line.message)
            .collect()
    }

    /// Returns whether any line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.message.contains(needle))
    }

    /// Discards every recorded line.
    pub fn clear(&self) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl ConsoleSink for BufferConsole {
    fn info(&self, message: &str) {
        self.push(ConsoleLevel::Info, message, ConsoleColor::Default);
    }

    fn error(&self, message: &str) {
        self.push(ConsoleLevel::Error, message, ConsoleColor::Red);
    }

    fn warn(&self, message: &str) {
        self.push(ConsoleLevel::Warn, message, ConsoleColor::Yellow);
    }

    fn debug(&self, message: &str) {
        self.push(ConsoleLevel::Debug, message, ConsoleColor::Default);
    }

    fn colored(&self, message: &str, color: ConsoleColor) {
        self.push(ConsoleLevel::Info, message, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_levels_and_colors() {
        let console = BufferConsole::new();
        console.info("hello");
        console.error("boom");
        console.colored("Page 1 of 2", ConsoleColor::Green);

        assert_eq!(console.messages(ConsoleLevel::Info), vec!["hello", "Page 1 of 2"]);
        assert_eq!(console.messages(ConsoleLevel::Error), vec!["boom"]);
        assert_eq!(console.lines()[2].color, ConsoleColor::Green);
        assert!(console.contains("boo"));

        console.clear();
        assert!(console.lines().is_empty());
    }
}
