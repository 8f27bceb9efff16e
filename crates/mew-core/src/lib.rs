//! # mew-core
//!
//! Core crate for Project Mew. Contains the unified error system,
//! configuration schemas and persistence, the collaborator traits the
//! extensibility runtime talks to (session, console), the console sinks,
//! and the species domain enum.
//!
//! This crate has **no** internal dependencies on other Mew crates.

pub mod config;
pub mod console;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
