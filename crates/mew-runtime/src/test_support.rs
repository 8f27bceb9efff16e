//! Shared fixtures for unit tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::RwLock;

use mew_core::config::AppConfig;
use mew_core::console::BufferConsole;
use mew_core::error::AppError;
use mew_core::result::AppResult;
use mew_core::traits::Session;
use mew_core::types::EvolveTarget;

use crate::context::HostContext;
use crate::hooks::HookBus;

/// Session double recording every call.
#[derive(Debug, Default)]
pub(crate) struct TestSession {
    pub authenticated: AtomicBool,
    pub calls: Mutex<Vec<String>>,
}

impl TestSession {
    pub fn set_authenticated(&self, value: bool) {
        self.authenticated.store(value, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Session for TestSession {
    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    fn display_name(&self) -> String {
        "tester".to_string()
    }

    async fn begin_google_login(&self) -> AppResult<()> {
        self.record("google".to_string());
        self.set_authenticated(true);
        Ok(())
    }

    async fn begin_password_login(&self, username: &str, password: &str) -> AppResult<()> {
        self.record(format!("ptc {username} {password}"));
        if password == "wrong" {
            return Err(AppError::authentication("Invalid username or password"));
        }
        self.set_authenticated(true);
        Ok(())
    }

    async fn logout(&self) -> AppResult<()> {
        self.record("logout".to_string());
        self.set_authenticated(false);
        Ok(())
    }

    async fn evolve(&self, target: EvolveTarget, amount: Option<u32>) -> AppResult<u32> {
        self.record(format!("evolve {target} {amount:?}"));
        Ok(amount.unwrap_or(1))
    }
}

pub(crate) struct Fixture {
    pub ctx: HostContext,
    pub console: Arc<BufferConsole>,
    pub session: Arc<TestSession>,
}

pub(crate) fn fixture() -> Fixture {
    let console = Arc::new(BufferConsole::new());
    let session = Arc::new(TestSession::default());
    let ctx = HostContext::new(
        Arc::new(RwLock::new(AppConfig::default())),
        "config/config.json",
        Arc::new(HookBus::default()),
        session.clone(),
        console.clone(),
    );
    Fixture {
        ctx,
        console,
        session,
    }
}
