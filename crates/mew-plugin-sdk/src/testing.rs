//! In-process host for exercising extensions in unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use mew_core::config::AppConfig;
use mew_core::console::BufferConsole;
use mew_core::result::AppResult;
use mew_core::traits::Session;
use mew_core::types::EvolveTarget;
use mew_runtime::command::CommandDispatcher;
use mew_runtime::context::HostContext;
use mew_runtime::extension::Extension;
use mew_runtime::hooks::{HookBus, PostLoginEvent};

/// Session that accepts every login without contacting anything.
#[derive(Debug)]
pub struct StubSession {
    name: String,
    authenticated: AtomicBool,
}

impl StubSession {
    /// Creates a logged-out session displayed as `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            authenticated: AtomicBool::new(false),
        }
    }

    /// Forces the login state.
    pub fn set_authenticated(&self, value: bool) {
        self.authenticated.store(value, Ordering::SeqCst);
    }
}

#[async_trait]
impl Session for StubSession {
    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    fn display_name(&self) -> String {
        if self.is_authenticated() {
            self.name.clone()
        } else {
            "anonymous".to_string()
        }
    }

    async fn begin_google_login(&self) -> AppResult<()> {
        self.set_authenticated(true);
        Ok(())
    }

    async fn begin_password_login(&self, _username: &str, _password: &str) -> AppResult<()> {
        self.set_authenticated(true);
        Ok(())
    }

    async fn logout(&self) -> AppResult<()> {
        self.set_authenticated(false);
        Ok(())
    }

    async fn evolve(&self, _target: EvolveTarget, amount: Option<u32>) -> AppResult<u32> {
        Ok(amount.unwrap_or(1))
    }
}

/// A host with a recording console, a stub session, and no hook timeout.
pub struct TestHost {
    /// Host services handed to extensions and commands.
    pub ctx: HostContext,
    /// Everything written to the operator console.
    pub console: Arc<BufferConsole>,
    /// The acting session.
    pub session: Arc<StubSession>,
    dispatcher: CommandDispatcher,
}

impl TestHost {
    /// Creates a host around the default configuration.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Creates a host around `config`.
    pub fn with_config(config: AppConfig) -> Self {
        let console = Arc::new(BufferConsole::new());
        let session = Arc::new(StubSession::new("tester"));
        let hooks = Arc::new(HookBus::from_config(&config.hooks));
        let dispatcher = CommandDispatcher::from_config(&config.console);
        let ctx = HostContext::new(
            Arc::new(RwLock::new(config)),
            "config.json",
            hooks,
            session.clone(),
            console.clone(),
        );
        Self {
            ctx,
            console,
            session,
            dispatcher,
        }
    }

    /// Initializes `extension` against this host.
    pub async fn initialize<E: Extension>(&self, extension: &mut E) -> Result<(), String> {
        extension.initialize(&self.ctx).await
    }

    /// Dispatches one command line. Returns `false` for a blank line.
    pub async fn run(&self, line: &str) -> bool {
        self.dispatcher
            .dispatch(&self.ctx, self.session.clone(), line)
            .await
    }

    /// Marks the session logged in and publishes `post_login`.
    pub async fn login(&self) {
        self.session.set_authenticated(true);
        let mut event = PostLoginEvent {
            provider: mew_core::traits::AuthProvider::Ptc,
            login_name: Some(self.session.display_name()),
        };
        self.ctx.hooks.fire(&mut event).await;
    }
}

impl Default for TestHost {
    fn default() -> Self {
        Self::new()
    }
}
