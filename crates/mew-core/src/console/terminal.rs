//! Styled terminal output.

use console::{Style, Term};
use tracing::{debug, error, info, warn};

use crate::traits::console::{ConsoleColor, ConsoleSink};

/// Operator console backed by the process terminal.
#[derive(Debug)]
pub struct TerminalConsole {
    /// Standard output.
    out: Term,
    /// Standard error.
    err: Term,
}

impl TerminalConsole {
    /// Creates a console bound to stdout/stderr.
    pub fn new() -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
        }
    }

    fn style_for(color: ConsoleColor) -> Style {
        match color {
            ConsoleColor::Default => Style::new(),
            ConsoleColor::Green => Style::new().green(),
            ConsoleColor::Yellow => Style::new().yellow(),
            ConsoleColor::Red => Style::new().red(),
            ConsoleColor::Cyan => Style::new().cyan(),
            ConsoleColor::White => Style::new().white(),
        }
    }

    fn write_out(&self, message: &str, color: ConsoleColor) {
        let styled = Self::style_for(color).apply_to(message);
        // Write failures on a closed stdout are ignored.
        let _ = self.out.write_line(&styled.to_string());
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleSink for TerminalConsole {
    fn info(&self, message: &str) {
        info!(target: "console", "{}", message);
        self.write_out(message, ConsoleColor::Default);
    }

    fn error(&self, message: &str) {
        error!(target: "console", "{}", message);
        let styled = Self::style_for(ConsoleColor::Red).apply_to(message);
        let _ = self.err.write_line(&styled.to_string());
    }

    fn warn(&self, message: &str) {
        warn!(target: "console", "{}", message);
        self.write_out(message, ConsoleColor::Yellow);
    }

    fn debug(&self, message: &str) {
        debug!(target: "console", "{}", message);
    }

    fn colored(&self, message: &str, color: ConsoleColor) {
        info!(target: "console", "{}", message);
        self.write_out(message, color);
    }
}
