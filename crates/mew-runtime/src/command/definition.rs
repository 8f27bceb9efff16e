//! Command definitions and per-invocation arguments.

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use tracing::{error, warn};

use mew_core::error::{AppError, ErrorKind};
use mew_core::result::AppResult;
use mew_core::traits::{ConsoleSink, Session};

use crate::context::HostContext;

/// Help text of a command that did not set one.
pub const DEFAULT_HELP_TEXT: &str = "No help available.";

/// Shown when a login-gated command runs without a login.
pub const LOGIN_REQUIRED_MESSAGE: &str = "Cannot run this command unless you are logged in.";

/// Shown when a handler fails with an error that is not operator-facing.
pub const COMMAND_FAILED_MESSAGE: &str = "Command failed, check logs for more details.";

/// Arguments passed to a command handler.
#[derive(Clone)]
pub struct CommandArgs {
    /// The full raw line.
    pub message: String,
    /// The acting session.
    pub session: Arc<dyn Session>,
    /// Tokens following the command name.
    pub parameters: Vec<String>,
    /// Host services.
    pub context: HostContext,
}

impl CommandArgs {
    /// Returns the operator console.
    pub fn console(&self) -> &dyn ConsoleSink {
        self.context.console.as_ref()
    }

    /// Returns the parameter at `index`, if present.
    pub fn param(&self, index: usize) -> Option<&str> {
        self.parameters.get(index).map(String::as_str)
    }
}

impl fmt::Debug for CommandArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandArgs")
            .field("message", &self.message)
            .field("session", &self.session.display_name())
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// Trait implemented by command handlers.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Executes the command.
    async fn execute(&self, args: CommandArgs) -> AppResult<()>;
}

struct FnCommandHandler<F>(F);

#[async_trait]
impl<F, Fut> CommandHandler for FnCommandHandler<F>
where
    F: Fn(CommandArgs) -> Fut + Send + Sync,
    Fut: Future<Output = AppResult<()>> + Send + 'static,
{
    async fn execute(&self, args: CommandArgs) -> AppResult<()> {
        (self.0)(args).await
    }
}

/// What happened when a command was run.
#[derive(Debug, Clone)]
pub enum CommandOutcome {
    /// The handler returned successfully.
    Completed,
    /// The login gate rejected the invocation; the handler did not run.
    LoginRequired,
    /// The handler returned an error or panicked.
    Failed(AppError),
    /// The handler exceeded the command timeout.
    TimedOut,
}

impl CommandOutcome {
    /// Returns whether the handler ran to completion.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// A named operator command.
///
/// Names are stored lower-cased; the first name is the primary name shown
/// by `help`.
pub struct Command {
    names: Vec<String>,
    help_text: String,
    help_desc: Option<Vec<String>>,
    require_login: bool,
    handler: Arc<dyn CommandHandler>,
}

impl Command {
    /// Creates a command from a handler object.
    pub fn new(name: impl Into<String>, handler: Arc<dyn CommandHandler>) -> Self {
        Self {
            names: vec![name.into().to_lowercase()],
            help_text: DEFAULT_HELP_TEXT.to_string(),
            help_desc: None,
            require_login: false,
            handler,
        }
    }

    /// Creates a command from an async closure.
    pub fn from_fn<F, Fut>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(CommandArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        Self::new(name, Arc::new(FnCommandHandler(handler)))
    }

    /// Adds an alias.
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        let name = name.into().to_lowercase();
        if !self.names.contains(&name) {
            self.names.push(name);
        }
        self
    }

    /// Sets the one-line help text.
    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help_text = text.into();
        self
    }

    /// Sets the multi-line help description, which `help <name>` prefers
    /// over the help text.
    pub fn help_desc<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.help_desc = Some(lines.into_iter().map(Into::into).collect());
        self
    }

    /// Requires an authenticated session.
    pub fn require_login(mut self) -> Self {
        self.require_login = true;
        self
    }

    /// Returns the primary name.
    pub fn name(&self) -> &str {
        &self.names[0]
    }

    /// Returns every name, primary first.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns whether `name` is one of this command's names. `name` must
    /// already be lower-cased.
    pub fn has_alias(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Returns the one-line help text.
    pub fn help_text(&self) -> &str {
        &self.help_text
    }

    /// Returns the multi-line help description, if set.
    pub fn help_lines(&self) -> Option<&[String]> {
        self.help_desc.as_deref()
    }

    /// Returns whether the command is login-gated.
    pub fn requires_login(&self) -> bool {
        self.require_login
    }

    /// Runs the handler behind the login gate, isolating its failures.
    ///
    /// Argument and authentication errors are shown to the operator
    /// verbatim. Any other error or panic is logged and the console only
    /// gets a generic line.
    pub async fn run(&self, args: CommandArgs, timeout: Option<Duration>) -> CommandOutcome {
        let console = args.context.console.clone();

        if self.require_login && !args.session.is_authenticated() {
            console.error(LOGIN_REQUIRED_MESSAGE);
            return CommandOutcome::LoginRequired;
        }

        let execution = AssertUnwindSafe(self.handler.execute(args)).catch_unwind();
        let result = match timeout {
            Some(limit) => match tokio::time::timeout(limit, execution).await {
                Ok(result) => result,
                Err(_) => {
                    error!(
                        command = %self.name(),
                        timeout_ms = limit.as_millis() as u64,
                        "Command timed out"
                    );
                    console.error(COMMAND_FAILED_MESSAGE);
                    return CommandOutcome::TimedOut;
                }
            },
            None => execution.await,
        };

        let err = match result {
            Ok(Ok(())) => return CommandOutcome::Completed,
            Ok(Err(e)) => e,
            Err(panic) => AppError::command_execution(format!(
                "Command handler panicked: {}",
                panic_message(panic.as_ref())
            )),
        };

        match err.kind {
            ErrorKind::Parse
            | ErrorKind::Validation
            | ErrorKind::Authentication
            | ErrorKind::AuthExpired => {
                warn!(command = %self.name(), error = %err, "Command rejected");
                console.error(&err.message);
            }
            _ => {
                error!(command = %self.name(), error = %err, "Command failed");
                console.error(COMMAND_FAILED_MESSAGE);
            }
        }
        CommandOutcome::Failed(err)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("names", &self.names)
            .field("help_text", &self.help_text)
            .field("require_login", &self.require_login)
            .finish()
    }
}

pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
