//! The hook bus: one channel per hook point plus the dispatcher firing them.

use std::sync::Arc;

use mew_core::config::HookConfig;

use super::definitions::{
    CommandEvent, ConfigReadEvent, ExtensionsLoadedEvent, HookEvent, LogoutEvent,
    PostLoginEvent, PreLoginEvent,
};
use super::dispatcher::{FireReport, HookDispatcher};
use super::registry::{FnHandler, HookChannel, HookHandler};

/// Typed publish/subscribe bus shared by the host and every extension.
///
/// The event type selects the channel:
///
/// ```ignore
/// bus.subscribe_fn("audit", |event: &mut CommandEvent| {
///     tracing::info!(line = %event.command_text, "command");
///     Ok(())
/// })
/// .await;
/// ```
#[derive(Debug, Default)]
pub struct HookBus {
    dispatcher: HookDispatcher,
    pub(crate) pre_login: HookChannel<PreLoginEvent>,
    pub(crate) post_login: HookChannel<PostLoginEvent>,
    pub(crate) logout: HookChannel<LogoutEvent>,
    pub(crate) pre_command: HookChannel<CommandEvent>,
    pub(crate) config_read: HookChannel<ConfigReadEvent>,
    pub(crate) extensions_loaded: HookChannel<ExtensionsLoadedEvent>,
}

impl HookBus {
    /// Creates a bus whose dispatcher uses `dispatcher`'s timeout.
    pub fn new(dispatcher: HookDispatcher) -> Self {
        Self {
            dispatcher,
            pre_login: HookChannel::new(),
            post_login: HookChannel::new(),
            logout: HookChannel::new(),
            pre_command: HookChannel::new(),
            config_read: HookChannel::new(),
            extensions_loaded: HookChannel::new(),
        }
    }

    /// Creates a bus from the `hooks` configuration section.
    pub fn from_config(config: &HookConfig) -> Self {
        Self::new(HookDispatcher::from_secs(config.handler_timeout_seconds))
    }

    /// Subscribes a handler to the channel of `E`.
    pub async fn subscribe<E: HookEvent>(&self, handler: Arc<dyn HookHandler<E>>) {
        E::channel(self).subscribe(handler).await;
    }

    /// Subscribes a synchronous closure to the channel of `E`.
    pub async fn subscribe_fn<E, F>(&self, owner: impl Into<String>, handler: F)
    where
        E: HookEvent,
        F: Fn(&mut E) -> Result<(), String> + Send + Sync + 'static,
    {
        self.subscribe::<E>(Arc::new(FnHandler::new(owner, handler)))
            .await;
    }

    /// Fires `event` on its channel.
    pub async fn fire<E: HookEvent>(&self, event: &mut E) -> FireReport {
        self.dispatcher.fire(E::channel(self), event).await
    }

    /// Returns the number of subscribers on the channel of `E`.
    pub async fn subscriber_count<E: HookEvent>(&self) -> usize {
        E::channel(self).len().await
    }

    /// Returns the dispatcher.
    pub fn dispatcher(&self) -> &HookDispatcher {
        &self.dispatcher
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use mew_core::traits::AuthProvider;

    use super::*;
    use crate::hooks::definitions::HookPoint;

    fn pre_login() -> PreLoginEvent {
        PreLoginEvent::new(AuthProvider::Ptc, Some("ash".into()), Some("pw".into()))
    }

    #[tokio::test]
    async fn test_handlers_run_in_subscription_order() {
        let bus = HookBus::default();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let seen = seen.clone();
            bus.subscribe_fn(name, move |_: &mut PostLoginEvent| {
                seen.lock().unwrap().push(name);
                Ok(())
            })
            .await;
        }

        let mut event = PostLoginEvent {
            provider: AuthProvider::Google,
            login_name: None,
        };
        let report = bus.fire(&mut event).await;

        assert_eq!(report.invoked, 3);
        assert_eq!(*seen.lock().unwrap(), ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_veto_does_not_stop_later_handlers() {
        let bus = HookBus::default();
        let later_ran = Arc::new(Mutex::new(false));

        bus.subscribe_fn("veto", |event: &mut PreLoginEvent| {
            event.handled = true;
            Ok(())
        })
        .await;
        let flag = later_ran.clone();
        bus.subscribe_fn("observer", move |event: &mut PreLoginEvent| {
            assert!(event.handled);
            *flag.lock().unwrap() = true;
            Ok(())
        })
        .await;

        let mut event = pre_login();
        let report = bus.fire(&mut event).await;

        assert!(report.handled);
        assert!(*later_ran.lock().unwrap());
    }

    #[tokio::test]
    async fn test_failing_handler_is_isolated() {
        let bus = HookBus::default();
        bus.subscribe_fn("broken", |_: &mut PreLoginEvent| Err("boom".to_string()))
            .await;
        bus.subscribe_fn("rewrite", |event: &mut PreLoginEvent| {
            event.login_name = Some("misty".into());
            Ok(())
        })
        .await;

        let mut event = pre_login();
        let report = bus.fire(&mut event).await;

        assert_eq!(report.failed, ["broken"]);
        assert!(!report.handled);
        assert_eq!(event.login_name.as_deref(), Some("misty"));
    }

    #[tokio::test]
    async fn test_panicking_handler_is_isolated() {
        let bus = HookBus::default();
        bus.subscribe_fn("crashes", |event: &mut PreLoginEvent| {
            if event.login_name.is_some() {
                panic!("subscriber bug");
            }
            Ok(())
        })
        .await;
        bus.subscribe_fn("veto", |event: &mut PreLoginEvent| {
            event.handled = true;
            Ok(())
        })
        .await;

        let mut event = pre_login();
        let report = bus.fire(&mut event).await;

        assert_eq!(report.invoked, 2);
        assert_eq!(report.failed, ["crashes"]);
        assert!(report.handled);
    }

    #[tokio::test]
    async fn test_fire_without_subscribers() {
        let bus = HookBus::default();
        let mut event = pre_login();
        let report = bus.fire(&mut event).await;
        assert_eq!(report.point, HookPoint::PreLogin);
        assert_eq!(report.invoked, 0);
        assert!(report.is_clean());
        assert!(!report.handled);
    }

    #[derive(Debug)]
    struct Sleeper;

    #[async_trait]
    impl HookHandler<PreLoginEvent> for Sleeper {
        async fn handle(&self, event: &mut PreLoginEvent) -> Result<(), String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            event.handled = true;
            Ok(())
        }

        fn owner(&self) -> &str {
            "sleeper"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_handler_times_out() {
        let bus = HookBus::new(HookDispatcher::new(Some(Duration::from_secs(1))));
        bus.subscribe::<PreLoginEvent>(Arc::new(Sleeper)).await;
        bus.subscribe_fn("after", |_: &mut PreLoginEvent| Ok(())).await;

        let mut event = pre_login();
        let report = bus.fire(&mut event).await;

        assert_eq!(report.timed_out, ["sleeper"]);
        assert_eq!(report.invoked, 2);
        assert!(!report.handled);
    }

    #[tokio::test]
    async fn test_subscriber_count_per_channel() {
        let bus = HookBus::default();
        bus.subscribe_fn("a", |_: &mut LogoutEvent| Ok(())).await;
        bus.subscribe_fn("b", |_: &mut LogoutEvent| Ok(())).await;
        assert_eq!(bus.subscriber_count::<LogoutEvent>().await, 2);
        assert_eq!(bus.subscriber_count::<PreLoginEvent>().await, 0);
    }
}
