//! Unified application error types for Project Mew.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. The [`ErrorKind`] decides whether an
//! error is fatal to startup or is reported to the operator and swallowed at
//! the closest dispatch/lifecycle boundary.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Operator input could not be parsed (bad syntax, bad argument).
    Parse,
    /// A command handler failed.
    CommandExecution,
    /// A module could not be loaded, resolved, or instantiated.
    ModuleLoad,
    /// An extension failed during initialization.
    ExtensionInit,
    /// An extension failed while being deinitialized or disposed.
    ExtensionShutdown,
    /// The remote service did not return a continuation ticket.
    AuthExpired,
    /// Authentication failed (bad credentials, vetoed login, not logged in).
    Authentication,
    /// Input validation failed against the domain.
    Validation,
    /// The requested resource was not found.
    NotFound,
    /// A configuration error occurred.
    Configuration,
    /// A filesystem I/O error occurred.
    Io,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An operation exceeded its time budget.
    Timeout,
    /// The requested feature or operation is not implemented.
    NotImplemented,
    /// A collaborator is temporarily unavailable.
    ServiceUnavailable,
    /// An internal error occurred.
    Internal,
}

impl ErrorKind {
    /// Returns whether errors of this kind abort host startup.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ModuleLoad | Self::ExtensionInit)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse => write!(f, "PARSE"),
            Self::CommandExecution => write!(f, "COMMAND_EXECUTION"),
            Self::ModuleLoad => write!(f, "MODULE_LOAD"),
            Self::ExtensionInit => write!(f, "EXTENSION_INIT"),
            Self::ExtensionShutdown => write!(f, "EXTENSION_SHUTDOWN"),
            Self::AuthExpired => write!(f, "AUTH_EXPIRED"),
            Self::Authentication => write!(f, "AUTHENTICATION"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Io => write!(f, "IO"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::NotImplemented => write!(f, "NOT_IMPLEMENTED"),
            Self::ServiceUnavailable => write!(f, "SERVICE_UNAVAILABLE"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout Project Mew.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    /// Create a command execution error.
    pub fn command_execution(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CommandExecution, message)
    }

    /// Create a module load error.
    pub fn module_load(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ModuleLoad, message)
    }

    /// Create an extension initialization error.
    pub fn extension_init(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExtensionInit, message)
    }

    /// Create an extension shutdown error.
    pub fn extension_shutdown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExtensionShutdown, message)
    }

    /// Create an auth-expired error.
    pub fn auth_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthExpired, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a not-implemented error.
    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotImplemented, message)
    }

    /// Create a service-unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    /// Returns whether this error aborts host startup.
    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Io, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_kinds() {
        assert!(AppError::module_load("bad").is_fatal());
        assert!(AppError::extension_init("bad").is_fatal());
        assert!(!AppError::extension_shutdown("bad").is_fatal());
        assert!(!AppError::command_execution("bad").is_fatal());
        assert!(!AppError::parse("bad").is_fatal());
    }

    #[test]
    fn test_display_includes_kind() {
        let err = AppError::auth_expired("no ticket");
        assert_eq!(err.to_string(), "AUTH_EXPIRED: no ticket");
    }

    #[test]
    fn test_io_error_conversion_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AppError = io.into();
        assert_eq!(err.kind, ErrorKind::Io);
        assert!(err.source.is_some());
        assert!(err.clone().source.is_none());
    }
}
