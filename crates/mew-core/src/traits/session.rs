//! Session/player collaborator interface.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::species::EvolveTarget;

/// Which identity provider a login went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthProvider {
    /// Google device-code / refresh-token flow.
    Google,
    /// Username and password flow.
    Ptc,
}

impl AuthProvider {
    /// Returns the string name used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Ptc => "ptc",
        }
    }
}

impl fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The acting player session.
///
/// Login operations are asynchronous and may suspend on network I/O; the
/// dispatcher awaits them without blocking the runtime thread.
#[async_trait]
pub trait Session: Send + Sync + fmt::Debug {
    /// Returns whether a login has completed and not been logged out.
    fn is_authenticated(&self) -> bool;

    /// Returns a display name for diagnostics (login name or `"anonymous"`).
    fn display_name(&self) -> String;

    /// Starts the Google login flow.
    async fn begin_google_login(&self) -> AppResult<()>;

    /// Starts the username/password login flow.
    async fn begin_password_login(&self, username: &str, password: &str) -> AppResult<()>;

    /// Ends the current login, if any.
    async fn logout(&self) -> AppResult<()>;

    /// Requests evolutions for `target` and returns how many were submitted.
    ///
    /// `amount` caps the number of evolutions per species; `None` means
    /// every eligible individual. Fails with a validation error when an
    /// explicitly named species cannot evolve.
    async fn evolve(&self, target: EvolveTarget, amount: Option<u32>) -> AppResult<u32>;
}
