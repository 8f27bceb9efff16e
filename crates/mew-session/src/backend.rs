//! The remote service the session authenticates against.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use mew_core::result::AppResult;
use mew_core::traits::AuthProvider;
use mew_core::types::Species;

/// Tokens returned by a Google login.
#[derive(Clone)]
pub struct GoogleGrant {
    /// Token exchanged for a session ticket.
    pub id_token: String,
    /// Refresh token to store for the next login, if one was issued.
    pub refresh_token: Option<String>,
}

impl fmt::Debug for GoogleGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleGrant")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "***"))
            .finish_non_exhaustive()
    }
}

/// Continuation ticket authorizing further requests.
#[derive(Debug, Clone)]
pub struct SessionTicket {
    /// Ticket identifier.
    pub id: Uuid,
    /// Provider the login went through.
    pub provider: AuthProvider,
    /// Issue time.
    pub issued_at: DateTime<Utc>,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
}

impl SessionTicket {
    /// Returns whether the ticket is no longer valid.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Remote operations behind a session.
#[async_trait]
pub trait AuthBackend: Send + Sync + fmt::Debug {
    /// Exchanges a stored refresh token (or a fresh device-code
    /// authorization when there is none) for an id token.
    async fn google_login(&self, refresh_token: Option<&str>) -> AppResult<GoogleGrant>;

    /// Exchanges a username and password for an access token.
    async fn password_login(&self, username: &str, password: &str) -> AppResult<String>;

    /// Opens a session. Fails with an auth-expired error when the server
    /// returns no ticket.
    async fn open_session(&self, provider: AuthProvider, access_token: &str) -> AppResult<SessionTicket>;

    /// Submits evolutions of one species; returns how many were submitted.
    async fn evolve(&self, ticket: &SessionTicket, species: Species, amount: Option<u32>) -> AppResult<u32>;
}
