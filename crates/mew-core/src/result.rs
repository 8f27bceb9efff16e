//! Convenience result type alias for Project Mew.

use crate::error::AppError;

/// A specialized `Result` type for Mew operations.
pub type AppResult<T> = Result<T, AppError>;
