//! Hook channels: per-event ordered subscriber lists.
//!
//! Subscription is append-only for the life of the process. Handlers run in
//! the order they subscribed; there is no priority.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use super::definitions::HookEvent;

/// Trait for hook handler implementations.
#[async_trait]
pub trait HookHandler<E: HookEvent>: Send + Sync + fmt::Debug {
    /// Handles one event. The handler may mutate the event.
    async fn handle(&self, event: &mut E) -> Result<(), String>;

    /// Returns the name of the extension (or host component) owning this
    /// handler.
    fn owner(&self) -> &str;
}

/// Adapts a synchronous closure into a [`HookHandler`].
pub struct FnHandler<E, F>
where
    F: Fn(&mut E) -> Result<(), String> + Send + Sync + 'static,
{
    owner: String,
    handler: F,
    _event: std::marker::PhantomData<fn(&mut E)>,
}

impl<E, F> FnHandler<E, F>
where
    E: HookEvent,
    F: Fn(&mut E) -> Result<(), String> + Send + Sync + 'static,
{
    /// Creates a closure-backed handler.
    pub fn new(owner: impl Into<String>, handler: F) -> Self {
        Self {
            owner: owner.into(),
            handler,
            _event: std::marker::PhantomData,
        }
    }
}

impl<E, F> fmt::Debug for FnHandler<E, F>
where
    F: Fn(&mut E) -> Result<(), String> + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler")
            .field("owner", &self.owner)
            .finish()
    }
}

#[async_trait]
impl<E, F> HookHandler<E> for FnHandler<E, F>
where
    E: HookEvent,
    F: Fn(&mut E) -> Result<(), String> + Send + Sync + 'static,
{
    async fn handle(&self, event: &mut E) -> Result<(), String> {
        (self.handler)(event)
    }

    fn owner(&self) -> &str {
        &self.owner
    }
}

/// Ordered subscriber list for one event type.
#[derive(Debug)]
pub struct HookChannel<E: HookEvent> {
    handlers: RwLock<Vec<Arc<dyn HookHandler<E>>>>,
}

impl<E: HookEvent> HookChannel<E> {
    /// Creates an empty channel.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
        }
    }

    /// Appends a handler to the subscriber list.
    pub async fn subscribe(&self, handler: Arc<dyn HookHandler<E>>) {
        let owner = handler.owner().to_string();
        let mut handlers = self.handlers.write().await;
        handlers.push(handler);

        info!(
            hook = %E::POINT,
            owner = %owner,
            position = handlers.len(),
            "Hook handler subscribed"
        );
    }

    /// Returns a snapshot of the subscribers in subscription order.
    ///
    /// Firing iterates the snapshot, so a handler may subscribe further
    /// handlers without deadlocking; those join from the next fire on.
    pub async fn handlers(&self) -> Vec<Arc<dyn HookHandler<E>>> {
        self.handlers.read().await.clone()
    }

    /// Returns the number of subscribers.
    pub async fn len(&self) -> usize {
        self.handlers.read().await.len()
    }

    /// Returns whether the channel has no subscribers.
    pub async fn is_empty(&self) -> bool {
        self.handlers.read().await.is_empty()
    }
}

impl<E: HookEvent> Default for HookChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}
