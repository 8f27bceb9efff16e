//! Hook point definitions and their typed event payloads.
//!
//! Every hook point has exactly one event type. Cancellable events carry a
//! `handled` flag that subscribers may set; the publisher reads it once all
//! subscribers have run. Observational events have no such flag.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use mew_core::config::AppConfig;
use mew_core::traits::{AuthProvider, Session};

use super::bus::HookBus;
use super::registry::HookChannel;
use crate::command::Command;
use crate::extension::ExtensionSummary;

/// All hook points published by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookPoint {
    /// Before a login request leaves the session. Cancellable.
    PreLogin,
    /// After a login completed and the session holds a ticket.
    PostLogin,
    /// After the session dropped its login.
    Logout,
    /// Before a command line is executed. Cancellable, and subscribers may
    /// replace the resolved command list.
    PreCommand,
    /// After the configuration file was read; subscribers may edit it.
    ConfigRead,
    /// After every extension initialized successfully.
    ExtensionsLoaded,
}

impl HookPoint {
    /// Every hook point.
    pub const ALL: [HookPoint; 6] = [
        Self::PreLogin,
        Self::PostLogin,
        Self::Logout,
        Self::PreCommand,
        Self::ConfigRead,
        Self::ExtensionsLoaded,
    ];

    /// Returns the string name of the hook point.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreLogin => "pre_login",
            Self::PostLogin => "post_login",
            Self::Logout => "logout",
            Self::PreCommand => "pre_command",
            Self::ConfigRead => "config_read",
            Self::ExtensionsLoaded => "extensions_loaded",
        }
    }

    /// Returns whether subscribers can veto the operation behind this hook.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, Self::PreLogin | Self::PreCommand)
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event payload published on exactly one hook point.
pub trait HookEvent: Send + fmt::Debug + Sized + 'static {
    /// The hook point this event is published on.
    const POINT: HookPoint;

    /// Returns the channel carrying this event on `bus`.
    fn channel(bus: &HookBus) -> &HookChannel<Self>;

    /// Returns whether a subscriber vetoed the operation.
    fn handled(&self) -> bool {
        false
    }
}

/// Published before a login request is sent.
#[derive(Clone)]
pub struct PreLoginEvent {
    /// Provider the login goes through.
    pub provider: AuthProvider,
    /// Login name, when the provider takes one.
    pub login_name: Option<String>,
    /// Password, when the provider takes one.
    pub password: Option<String>,
    /// Set to veto the login.
    pub handled: bool,
}

impl PreLoginEvent {
    /// Creates an unhandled pre-login event.
    pub fn new(provider: AuthProvider, login_name: Option<String>, password: Option<String>) -> Self {
        Self {
            provider,
            login_name,
            password,
            handled: false,
        }
    }
}

impl fmt::Debug for PreLoginEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreLoginEvent")
            .field("provider", &self.provider)
            .field("login_name", &self.login_name)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("handled", &self.handled)
            .finish()
    }
}

impl HookEvent for PreLoginEvent {
    const POINT: HookPoint = HookPoint::PreLogin;

    fn channel(bus: &HookBus) -> &HookChannel<Self> {
        &bus.pre_login
    }

    fn handled(&self) -> bool {
        self.handled
    }
}

/// Published after a login completed.
#[derive(Debug, Clone)]
pub struct PostLoginEvent {
    /// Provider the login went through.
    pub provider: AuthProvider,
    /// Login name, when known.
    pub login_name: Option<String>,
}

impl HookEvent for PostLoginEvent {
    const POINT: HookPoint = HookPoint::PostLogin;

    fn channel(bus: &HookBus) -> &HookChannel<Self> {
        &bus.post_login
    }
}

/// Published after the session logged out.
#[derive(Debug, Clone)]
pub struct LogoutEvent {
    /// Provider of the login that ended.
    pub provider: AuthProvider,
    /// Login name of the session that ended, when known.
    pub login_name: Option<String>,
}

impl HookEvent for LogoutEvent {
    const POINT: HookPoint = HookPoint::Logout;

    fn channel(bus: &HookBus) -> &HookChannel<Self> {
        &bus.logout
    }
}

/// Published before a command line executes.
///
/// `commands` holds every registered command matching `command_name`, in
/// registration order. Subscribers may replace it; the dispatcher executes
/// whatever list is present after the hook returns.
#[derive(Clone)]
pub struct CommandEvent {
    /// Acting session.
    pub session: Arc<dyn Session>,
    /// Lower-cased first token of the line.
    pub command_name: String,
    /// The full raw line.
    pub command_text: String,
    /// Remaining tokens.
    pub parameters: Vec<String>,
    /// Commands that will run.
    pub commands: Vec<Arc<Command>>,
    /// Set to skip execution entirely.
    pub handled: bool,
}

impl fmt::Debug for CommandEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEvent")
            .field("session", &self.session.display_name())
            .field("command_name", &self.command_name)
            .field("parameters", &self.parameters)
            .field("commands", &self.commands.len())
            .field("handled", &self.handled)
            .finish()
    }
}

impl HookEvent for CommandEvent {
    const POINT: HookPoint = HookPoint::PreCommand;

    fn channel(bus: &HookBus) -> &HookChannel<Self> {
        &bus.pre_command
    }

    fn handled(&self) -> bool {
        self.handled
    }
}

/// Published after the configuration file was read, before it is stored.
#[derive(Debug, Clone)]
pub struct ConfigReadEvent {
    /// File the configuration came from.
    pub path: PathBuf,
    /// The configuration as read; edits are adopted by the host.
    pub config: AppConfig,
}

impl HookEvent for ConfigReadEvent {
    const POINT: HookPoint = HookPoint::ConfigRead;

    fn channel(bus: &HookBus) -> &HookChannel<Self> {
        &bus.config_read
    }
}

/// Published once every extension has initialized.
#[derive(Debug, Clone)]
pub struct ExtensionsLoadedEvent {
    /// Every extension in initialization order.
    pub extensions: Vec<ExtensionSummary>,
}

impl HookEvent for ExtensionsLoadedEvent {
    const POINT: HookPoint = HookPoint::ExtensionsLoaded;

    fn channel(bus: &HookBus) -> &HookChannel<Self> {
        &bus.extensions_loaded
    }
}
