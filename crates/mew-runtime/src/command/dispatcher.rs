//! Command dispatcher: turns an operator line into command executions.
//!
//! 1. Tokenize; an empty line is not dispatched.
//! 2. Lower-case the first token and resolve every matching command.
//! 3. Fire `pre_command`; a veto ends dispatch, otherwise the (possibly
//!    replaced) command list runs in order.
//! 4. Each command runs behind its login gate; one failing does not stop
//!    the rest.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use mew_core::config::ConsoleConfig;
use mew_core::traits::Session;

use super::definition::{CommandArgs, CommandOutcome};
use super::tokenizer::tokenize;
use crate::context::HostContext;
use crate::hooks::CommandEvent;

/// Shown when no command answers to the entered name.
pub const INVALID_COMMAND_MESSAGE: &str =
    "Invalid command entered. Type help for a list of valid commands.";

/// Dispatches operator input lines.
#[derive(Debug, Clone, Default)]
pub struct CommandDispatcher {
    timeout: Option<Duration>,
}

impl CommandDispatcher {
    /// Creates a dispatcher. `None` disables the per-command timeout.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Creates a dispatcher from the `console` configuration section.
    pub fn from_config(config: &ConsoleConfig) -> Self {
        let seconds = config.command_timeout_seconds;
        Self::new((seconds > 0).then(|| Duration::from_secs(seconds)))
    }

    /// Dispatches `line` on behalf of `session`.
    ///
    /// Returns `false` only when the line held no tokens; every other line
    /// counts as dispatched, including unknown and vetoed commands.
    pub async fn dispatch(&self, ctx: &HostContext, session: Arc<dyn Session>, line: &str) -> bool {
        self.dispatch_with_outcomes(ctx, session, line).await.is_some()
    }

    /// Like [`dispatch`](Self::dispatch), but returns the outcome of every
    /// command that was run.
    pub async fn dispatch_with_outcomes(
        &self,
        ctx: &HostContext,
        session: Arc<dyn Session>,
        line: &str,
    ) -> Option<Vec<CommandOutcome>> {
        let mut tokens = tokenize(line);
        if tokens.is_empty() {
            return None;
        }

        let command_name = tokens.remove(0).to_lowercase();
        let commands = ctx.commands.resolve(&command_name).await;

        let mut event = CommandEvent {
            session: session.clone(),
            command_name,
            command_text: line.to_string(),
            parameters: tokens,
            commands,
            handled: false,
        };

        let report = ctx.hooks.fire(&mut event).await;
        if report.handled {
            info!(command = %event.command_name, "Command handled by a pre-command hook");
            return Some(Vec::new());
        }

        if event.commands.is_empty() {
            ctx.console.error(INVALID_COMMAND_MESSAGE);
            return Some(Vec::new());
        }

        debug!(
            command = %event.command_name,
            session = %session.display_name(),
            matches = event.commands.len(),
            "Dispatching command"
        );

        let mut outcomes = Vec::with_capacity(event.commands.len());
        for command in &event.commands {
            let args = CommandArgs {
                message: event.command_text.clone(),
                session: session.clone(),
                parameters: event.parameters.clone(),
                context: ctx.clone(),
            };
            outcomes.push(command.run(args, self.timeout).await);
        }
        Some(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use mew_core::console::ConsoleLevel;
    use mew_core::error::AppError;

    use super::*;
    use crate::command::definition::{COMMAND_FAILED_MESSAGE, Command, LOGIN_REQUIRED_MESSAGE};
    use crate::test_support::fixture;

    type Log = Arc<Mutex<Vec<String>>>;

    fn recording(name: &str, tag: &'static str, log: &Log) -> Command {
        let log = log.clone();
        Command::from_fn(name, move |args: CommandArgs| {
            let log = log.clone();
            async move {
                log.lock().unwrap().push(format!("{tag}:{}", args.parameters.join(",")));
                Ok(())
            }
        })
    }

    #[tokio::test]
    async fn test_empty_line_is_not_dispatched() {
        let f = fixture();
        let dispatcher = CommandDispatcher::default();
        assert!(!dispatcher.dispatch(&f.ctx, f.session.clone(), "").await);
        assert!(!dispatcher.dispatch(&f.ctx, f.session.clone(), "   ").await);
        assert!(f.console.lines().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_command_reports_invalid() {
        let f = fixture();
        let dispatcher = CommandDispatcher::default();
        assert!(dispatcher.dispatch(&f.ctx, f.session.clone(), "fly home").await);
        assert_eq!(
            f.console.messages(ConsoleLevel::Error),
            [INVALID_COMMAND_MESSAGE]
        );
    }

    #[tokio::test]
    async fn test_name_is_lowercased_and_parameters_passed() {
        let f = fixture();
        let log: Log = Arc::default();
        f.ctx.commands.register(recording("find", "find", &log)).await;

        let dispatcher = CommandDispatcher::default();
        assert!(dispatcher.dispatch(&f.ctx, f.session.clone(), r#"FIND "poke stop" 5"#).await);
        assert_eq!(*log.lock().unwrap(), ["find:poke stop,5"]);
    }

    #[tokio::test]
    async fn test_all_matches_run_even_when_first_fails() {
        let f = fixture();
        let log: Log = Arc::default();
        f.ctx
            .commands
            .register(Command::from_fn("stats", |_| async {
                Err(AppError::internal("backend down"))
            }))
            .await;
        f.ctx
            .commands
            .register(recording("status", "second", &log).alias("stats"))
            .await;

        let outcomes = CommandDispatcher::default()
            .dispatch_with_outcomes(&f.ctx, f.session.clone(), "stats")
            .await
            .expect("dispatched");

        assert_eq!(outcomes.len(), 2);
        assert!(matches!(outcomes[0], CommandOutcome::Failed(_)));
        assert!(outcomes[1].is_completed());
        assert_eq!(*log.lock().unwrap(), ["second:"]);
        assert_eq!(
            f.console.messages(ConsoleLevel::Error),
            [COMMAND_FAILED_MESSAGE]
        );
    }

    #[tokio::test]
    async fn test_login_gate_blocks_handler() {
        let f = fixture();
        let log: Log = Arc::default();
        f.ctx
            .commands
            .register(recording("evolve", "evolve", &log).require_login())
            .await;
        let dispatcher = CommandDispatcher::default();

        let outcomes = dispatcher
            .dispatch_with_outcomes(&f.ctx, f.session.clone(), "evolve all")
            .await
            .expect("dispatched");
        assert!(matches!(outcomes[0], CommandOutcome::LoginRequired));
        assert!(log.lock().unwrap().is_empty());
        assert!(f.console.contains(LOGIN_REQUIRED_MESSAGE));

        f.session.set_authenticated(true);
        dispatcher.dispatch(&f.ctx, f.session.clone(), "evolve all").await;
        assert_eq!(*log.lock().unwrap(), ["evolve:all"]);
    }

    #[tokio::test]
    async fn test_parse_errors_are_shown_verbatim() {
        let f = fixture();
        f.ctx
            .commands
            .register(Command::from_fn("login", |_| async {
                Err(AppError::parse("Invalid syntax! Proper syntax: login <google/ptc>"))
            }))
            .await;

        CommandDispatcher::default()
            .dispatch(&f.ctx, f.session.clone(), "login")
            .await;
        assert_eq!(
            f.console.messages(ConsoleLevel::Error),
            ["Invalid syntax! Proper syntax: login <google/ptc>"]
        );
    }

    #[tokio::test]
    async fn test_panicking_handler_is_contained() {
        let f = fixture();
        let log: Log = Arc::default();
        f.ctx
            .commands
            .register(Command::from_fn("crash", |args: CommandArgs| async move {
                if args.parameters.is_empty() {
                    panic!("kaboom");
                }
                Ok(())
            }))
            .await;
        f.ctx.commands.register(recording("crash", "after", &log)).await;

        let outcomes = CommandDispatcher::default()
            .dispatch_with_outcomes(&f.ctx, f.session.clone(), "crash")
            .await
            .expect("dispatched");

        match &outcomes[0] {
            CommandOutcome::Failed(err) => assert!(err.message.contains("kaboom")),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(outcomes[1].is_completed());
    }

    #[tokio::test]
    async fn test_panicking_pre_command_subscriber_is_contained() {
        let f = fixture();
        let log: Log = Arc::default();
        f.ctx.commands.register(recording("help", "help", &log)).await;
        f.ctx
            .hooks
            .subscribe_fn("buggy", |event: &mut CommandEvent| {
                if event.command_name == "help" {
                    panic!("subscriber bug");
                }
                Ok(())
            })
            .await;

        assert!(CommandDispatcher::default().dispatch(&f.ctx, f.session.clone(), "help").await);
        assert_eq!(*log.lock().unwrap(), ["help:"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_command_times_out() {
        let f = fixture();
        f.ctx
            .commands
            .register(Command::from_fn("wait", |_| async {
                tokio::time::sleep(Duration::from_secs(600)).await;
                Ok(())
            }))
            .await;

        let outcomes = CommandDispatcher::new(Some(Duration::from_secs(5)))
            .dispatch_with_outcomes(&f.ctx, f.session.clone(), "wait")
            .await
            .expect("dispatched");
        assert!(matches!(outcomes[0], CommandOutcome::TimedOut));
        assert!(f.console.contains(COMMAND_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_pre_command_veto_skips_execution() {
        let f = fixture();
        let log: Log = Arc::default();
        f.ctx.commands.register(recording("help", "help", &log)).await;
        f.ctx
            .hooks
            .subscribe_fn("gate", |event: &mut CommandEvent| {
                event.handled = event.command_name == "help";
                Ok(())
            })
            .await;

        assert!(CommandDispatcher::default().dispatch(&f.ctx, f.session.clone(), "help").await);
        assert!(log.lock().unwrap().is_empty());
        assert!(f.console.lines().is_empty());
    }

    #[tokio::test]
    async fn test_pre_command_can_replace_commands() {
        let f = fixture();
        let log: Log = Arc::default();
        f.ctx.commands.register(recording("help", "original", &log)).await;
        let replacement = Arc::new(recording("help", "replacement", &log));

        f.ctx
            .hooks
            .subscribe_fn("override", move |event: &mut CommandEvent| {
                event.commands = vec![replacement.clone()];
                Ok(())
            })
            .await;

        CommandDispatcher::default()
            .dispatch(&f.ctx, f.session.clone(), "help 2")
            .await;
        assert_eq!(*log.lock().unwrap(), ["replacement:2"]);
    }

    #[tokio::test]
    async fn test_pre_command_sees_unknown_commands() {
        let f = fixture();
        let seen: Log = Arc::default();
        let sink = seen.clone();
        f.ctx
            .hooks
            .subscribe_fn("audit", move |event: &mut CommandEvent| {
                sink.lock().unwrap().push(event.command_text.clone());
                Ok(())
            })
            .await;

        CommandDispatcher::default()
            .dispatch(&f.ctx, f.session.clone(), "Teleport  now")
            .await;
        assert_eq!(*seen.lock().unwrap(), ["Teleport  now"]);
        assert!(f.console.contains(INVALID_COMMAND_MESSAGE));
    }
}
