//! Offline backend serving the credentials stored in the configuration.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use mew_core::config::AppConfig;
use mew_core::error::AppError;
use mew_core::result::AppResult;
use mew_core::traits::AuthProvider;
use mew_core::types::Species;

use crate::backend::{AuthBackend, GoogleGrant, SessionTicket};

/// Backend that authenticates against the `account` configuration section
/// and accepts every evolution request.
#[derive(Debug)]
pub struct LocalAuthBackend {
    config: Arc<RwLock<AppConfig>>,
    ticket_lifetime: Duration,
}

impl LocalAuthBackend {
    /// Creates a backend issuing tickets valid for thirty minutes.
    pub fn new(config: Arc<RwLock<AppConfig>>) -> Self {
        Self {
            config,
            ticket_lifetime: Duration::minutes(30),
        }
    }

    /// Overrides how long issued tickets stay valid.
    pub fn with_ticket_lifetime(mut self, lifetime: Duration) -> Self {
        self.ticket_lifetime = lifetime;
        self
    }
}

#[async_trait]
impl AuthBackend for LocalAuthBackend {
    async fn google_login(&self, refresh_token: Option<&str>) -> AppResult<GoogleGrant> {
        let Some(refresh_token) = refresh_token else {
            return Err(AppError::service_unavailable(
                "Device-code authorization needs a remote identity provider; store a refresh token in the account configuration",
            ));
        };

        Ok(GoogleGrant {
            id_token: format!("local-google-{}", Uuid::new_v4()),
            refresh_token: Some(refresh_token.to_string()),
        })
    }

    async fn password_login(&self, username: &str, password: &str) -> AppResult<String> {
        let config = self.config.read().await;
        match (&config.account.ptc_username, &config.account.ptc_password) {
            (Some(expected_user), Some(expected_password))
                if expected_user == username && expected_password == password =>
            {
                Ok(format!("local-ptc-{}", Uuid::new_v4()))
            }
            (Some(_), Some(_)) => Err(AppError::authentication("Invalid username or password")),
            _ => Err(AppError::authentication("No PTC account is configured")),
        }
    }

    async fn open_session(&self, provider: AuthProvider, access_token: &str) -> AppResult<SessionTicket> {
        if access_token.is_empty() {
            return Err(AppError::auth_expired(
                "The server did not return a session ticket",
            ));
        }

        let issued_at = Utc::now();
        Ok(SessionTicket {
            id: Uuid::new_v4(),
            provider,
            issued_at,
            expires_at: issued_at + self.ticket_lifetime,
        })
    }

    async fn evolve(&self, ticket: &SessionTicket, species: Species, amount: Option<u32>) -> AppResult<u32> {
        let submitted = amount.unwrap_or(1);
        info!(ticket = %ticket.id, species = %species, submitted, "Evolution submitted");
        Ok(submitted)
    }
}
