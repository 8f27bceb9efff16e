//! Command registry: insertion-ordered list of registered commands.
//!
//! Several commands may share an alias; lookups return all of them in
//! registration order.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::definition::Command;

/// Registry of operator commands.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: RwLock<Vec<Arc<Command>>>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a command and returns the shared handle.
    pub async fn register(&self, command: Command) -> Arc<Command> {
        let command = Arc::new(command);
        let mut commands = self.commands.write().await;

        if let Some(clash) = command
            .names()
            .iter()
            .find(|name| commands.iter().any(|c| c.has_alias(name)))
        {
            warn!(alias = %clash, "Command alias is already registered; both commands will run");
        }

        commands.push(command.clone());
        debug!(command = %command.name(), aliases = ?command.names(), "Command registered");
        command
    }

    /// Returns every command answering to `name`, in registration order.
    pub async fn resolve(&self, name: &str) -> Vec<Arc<Command>> {
        let name = name.to_lowercase();
        self.commands
            .read()
            .await
            .iter()
            .filter(|c| c.has_alias(&name))
            .cloned()
            .collect()
    }

    /// Returns the first command answering to `name`.
    pub async fn find(&self, name: &str) -> Option<Arc<Command>> {
        let name = name.to_lowercase();
        self.commands
            .read()
            .await
            .iter()
            .find(|c| c.has_alias(&name))
            .cloned()
    }

    /// Returns every command in registration order.
    pub async fn list(&self) -> Vec<Arc<Command>> {
        self.commands.read().await.clone()
    }

    /// Returns the number of registered commands.
    pub async fn len(&self) -> usize {
        self.commands.read().await.len()
    }

    /// Returns whether no command is registered.
    pub async fn is_empty(&self) -> bool {
        self.commands.read().await.is_empty()
    }
}
