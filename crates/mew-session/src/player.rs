//! The player session.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock as StdRwLock};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use mew_core::config::AppConfig;
use mew_core::error::AppError;
use mew_core::result::AppResult;
use mew_core::traits::{AuthProvider, Session};
use mew_core::types::{EvolveTarget, Species};
use mew_runtime::hooks::{HookBus, LogoutEvent, PostLoginEvent, PreLoginEvent};

use crate::backend::{AuthBackend, SessionTicket};

#[derive(Debug, Clone)]
struct LoginState {
    provider: AuthProvider,
    login_name: Option<String>,
    ticket: SessionTicket,
}

/// Session of the operator's player.
///
/// Login flows publish `pre_login` (which may veto), open a ticket through
/// the backend, then publish `post_login`. The state lock is never held
/// across an await.
pub struct Player {
    hooks: Arc<HookBus>,
    config: Arc<RwLock<AppConfig>>,
    backend: Arc<dyn AuthBackend>,
    state: StdRwLock<Option<LoginState>>,
}

impl Player {
    /// Creates a logged-out player.
    pub fn new(
        hooks: Arc<HookBus>,
        config: Arc<RwLock<AppConfig>>,
        backend: Arc<dyn AuthBackend>,
    ) -> Self {
        Self {
            hooks,
            config,
            backend,
            state: StdRwLock::new(None),
        }
    }

    /// Returns the provider of the current login.
    pub fn provider(&self) -> Option<AuthProvider> {
        self.current().map(|s| s.provider)
    }

    fn current(&self) -> Option<LoginState> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace(&self, state: Option<LoginState>) -> Option<LoginState> {
        std::mem::replace(
            &mut *self.state.write().unwrap_or_else(PoisonError::into_inner),
            state,
        )
    }

    async fn pre_login(
        &self,
        provider: AuthProvider,
        login_name: Option<String>,
        password: Option<String>,
    ) -> AppResult<PreLoginEvent> {
        let mut event = PreLoginEvent::new(provider, login_name, password);
        let report = self.hooks.fire(&mut event).await;
        if report.handled {
            info!(provider = %provider, "Login vetoed by a pre-login hook");
            return Err(AppError::authentication("Login was cancelled by an extension"));
        }
        Ok(event)
    }

    async fn complete_login(
        &self,
        provider: AuthProvider,
        login_name: Option<String>,
        ticket: SessionTicket,
    ) {
        info!(
            provider = %provider,
            login = login_name.as_deref().unwrap_or("-"),
            ticket = %ticket.id,
            "Logged in"
        );
        self.replace(Some(LoginState {
            provider,
            login_name: login_name.clone(),
            ticket,
        }));

        let mut event = PostLoginEvent {
            provider,
            login_name,
        };
        self.hooks.fire(&mut event).await;
    }

    fn ticket(&self) -> AppResult<SessionTicket> {
        let Some(state) = self.current() else {
            return Err(AppError::authentication("You are not logged in"));
        };
        if state.ticket.is_expired() {
            warn!(ticket = %state.ticket.id, "Session ticket expired");
            self.replace(None);
            return Err(AppError::auth_expired(
                "Session ticket expired; log in again",
            ));
        }
        Ok(state.ticket)
    }
}

#[async_trait]
impl Session for Player {
    fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    fn display_name(&self) -> String {
        match self.current() {
            Some(LoginState {
                login_name: Some(name),
                ..
            }) => name,
            Some(state) => format!("{} account", state.provider),
            None => "anonymous".to_string(),
        }
    }

    async fn begin_google_login(&self) -> AppResult<()> {
        self.pre_login(AuthProvider::Google, None, None).await?;

        let stored = self
            .config
            .read()
            .await
            .account
            .refresh_token()
            .map(str::to_string);
        let grant = self.backend.google_login(stored.as_deref()).await?;

        if grant.refresh_token.is_some() && grant.refresh_token != stored {
            debug!("Storing new refresh token");
            self.config.write().await.account.refresh_token = grant.refresh_token.clone();
        }

        let ticket = self
            .backend
            .open_session(AuthProvider::Google, &grant.id_token)
            .await?;
        self.complete_login(AuthProvider::Google, None, ticket).await;
        Ok(())
    }

    async fn begin_password_login(&self, username: &str, password: &str) -> AppResult<()> {
        let event = self
            .pre_login(
                AuthProvider::Ptc,
                Some(username.to_string()),
                Some(password.to_string()),
            )
            .await?;
        let username = event.login_name.unwrap_or_else(|| username.to_string());
        let password = event.password.unwrap_or_else(|| password.to_string());

        let access_token = self.backend.password_login(&username, &password).await?;
        let ticket = self
            .backend
            .open_session(AuthProvider::Ptc, &access_token)
            .await?;
        self.complete_login(AuthProvider::Ptc, Some(username), ticket)
            .await;
        Ok(())
    }

    async fn logout(&self) -> AppResult<()> {
        let Some(state) = self.replace(None) else {
            return Err(AppError::authentication("You are not logged in"));
        };

        info!(provider = %state.provider, "Logged out");
        let mut event = LogoutEvent {
            provider: state.provider,
            login_name: state.login_name,
        };
        self.hooks.fire(&mut event).await;
        Ok(())
    }

    async fn evolve(&self, target: EvolveTarget, amount: Option<u32>) -> AppResult<u32> {
        let ticket = self.ticket()?;

        let species: Vec<Species> = match target {
            EvolveTarget::Species(species) if !species.can_evolve() => {
                return Err(AppError::validation(format!("{species} cannot evolve")));
            }
            EvolveTarget::Species(species) => vec![species],
            EvolveTarget::All => {
                let config = self.config.read().await;
                Species::ALL
                    .iter()
                    .copied()
                    .filter(|s| s.can_evolve() && config.evolve.permits(*s))
                    .collect()
            }
        };

        let mut submitted = 0;
        for s in species {
            submitted += self.backend.evolve(&ticket, s, amount).await?;
        }
        info!(target = %target, submitted, "Evolutions submitted");
        Ok(submitted)
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("display_name", &self.display_name())
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
