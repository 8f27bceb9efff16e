//! Hook dispatcher: fires an event through every subscriber of its channel.
//!
//! - Handlers are called in subscription order.
//! - Every handler runs, even after one sets `handled`; the veto is
//!   cooperative and read once all handlers have returned.
//! - A handler error, panic or timeout is logged and skipped. It never
//!   aborts the fire and never reaches the publisher.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tracing::{debug, error, warn};

use super::definitions::{HookEvent, HookPoint};
use super::registry::{HookChannel, HookHandler};
use crate::command::definition::panic_message;

async fn contained<E: HookEvent>(handler: &dyn HookHandler<E>, event: &mut E) -> Result<(), String> {
    match AssertUnwindSafe(handler.handle(event)).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(format!("panicked: {}", panic_message(panic.as_ref()))),
    }
}

/// Outcome of firing one event.
#[derive(Debug, Clone)]
pub struct FireReport {
    /// Hook point that was fired.
    pub point: HookPoint,
    /// Number of handlers invoked.
    pub invoked: usize,
    /// Owners of handlers that returned an error or panicked.
    pub failed: Vec<String>,
    /// Owners of handlers that exceeded the timeout.
    pub timed_out: Vec<String>,
    /// Whether the event was vetoed. Always `false` for observational hooks.
    pub handled: bool,
}

impl FireReport {
    /// Returns whether every handler completed without error.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.timed_out.is_empty()
    }
}

/// Fires events with an optional per-handler time budget.
#[derive(Debug, Clone)]
pub struct HookDispatcher {
    timeout: Option<Duration>,
}

impl HookDispatcher {
    /// Creates a dispatcher. `None` disables the per-handler timeout.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Creates a dispatcher from a timeout in seconds, where `0` disables it.
    pub fn from_secs(seconds: u64) -> Self {
        Self::new((seconds > 0).then(|| Duration::from_secs(seconds)))
    }

    /// Returns the per-handler timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Fires `event` through every handler subscribed to `channel`.
    pub async fn fire<E: HookEvent>(&self, channel: &HookChannel<E>, event: &mut E) -> FireReport {
        let handlers = channel.handlers().await;
        let mut report = FireReport {
            point: E::POINT,
            invoked: 0,
            failed: Vec::new(),
            timed_out: Vec::new(),
            handled: false,
        };

        if !handlers.is_empty() {
            debug!(
                hook = %E::POINT,
                handler_count = handlers.len(),
                "Firing hook"
            );
        }

        for handler in &handlers {
            report.invoked += 1;

            let outcome = match self.timeout {
                Some(limit) => match tokio::time::timeout(limit, contained(handler.as_ref(), event)).await {
                    Ok(result) => result,
                    Err(_) => {
                        error!(
                            hook = %E::POINT,
                            owner = %handler.owner(),
                            timeout_ms = limit.as_millis() as u64,
                            "Hook handler timed out"
                        );
                        report.timed_out.push(handler.owner().to_string());
                        continue;
                    }
                },
                None => contained(handler.as_ref(), event).await,
            };

            if let Err(e) = outcome {
                warn!(
                    hook = %E::POINT,
                    owner = %handler.owner(),
                    error = %e,
                    "Hook handler failed"
                );
                report.failed.push(handler.owner().to_string());
            }
        }

        report.handled = E::POINT.is_cancellable() && event.handled();
        if report.handled {
            debug!(hook = %E::POINT, "Hook vetoed the operation");
        }
        report
    }
}

impl Default for HookDispatcher {
    fn default() -> Self {
        Self::from_secs(30)
    }
}
