//! Project Mew: extensible game-client host
//!
//! Main entry point: wires configuration, the hook bus, the player session,
//! and the extension manager together, then reads operator commands from
//! stdin until end of input, `exit`, or Ctrl-C.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::{RwLock, watch};
use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use mew_core::config::AppConfig;
use mew_core::console::TerminalConsole;
use mew_core::error::AppError;
use mew_core::traits::{ConsoleColor, Session};
use mew_runtime::command::{Command, CommandArgs, CommandDispatcher, register_builtins};
use mew_runtime::context::HostContext;
use mew_runtime::hooks::{ConfigReadEvent, HookBus, PostLoginEvent};
use mew_runtime::manager::ExtensionManager;
use mew_session::{LocalAuthBackend, Player};

const DEFAULT_CONFIG_PATH: &str = "config/config.json";
const HOST: &str = "host";

#[tokio::main]
async fn main() {
    let config_path = PathBuf::from(
        std::env::var("MEW_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string()),
    );

    let config = match AppConfig::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    let input = BufReader::new(tokio::io::stdin());
    if let Err(e) = run(config, config_path, input).await {
        tracing::error!(kind = %e.kind, "Host error: {}", e.message);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// Builds the host, loads extensions, and runs the command loop over
/// `input`.
async fn run<R>(config: AppConfig, config_path: PathBuf, input: R) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
{
    tracing::info!("Starting Project Mew v{}", env!("CARGO_PKG_VERSION"));

    // Declared first so it drops last on every path: handlers and commands
    // held by the host services may point into module code.
    let mut modules: Option<ExtensionManager> = None;

    let hooks = Arc::new(HookBus::from_config(&config.hooks));
    let dispatcher = CommandDispatcher::from_config(&config.console);
    let config = Arc::new(RwLock::new(config));

    let backend = Arc::new(LocalAuthBackend::new(config.clone()));
    let player = Arc::new(Player::new(hooks.clone(), config.clone(), backend));
    let console = Arc::new(TerminalConsole::new());
    let ctx = HostContext::new(
        config,
        config_path,
        hooks.clone(),
        player.clone(),
        console,
    );

    ctx.console.info("Initializing One moment...");

    register_builtins(&ctx.commands).await;
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    ctx.commands.register(exit_command(shutdown_tx)).await;

    subscribe_host_hooks(&hooks).await;
    ctx.reload_config().await?;

    let plugins = ctx.config.read().await.plugins.clone();
    let manager = modules.insert(ExtensionManager::from_config(&plugins));
    manager.load_all(&ctx).await?;

    ctx.console.colored(
        "Initialization Completed. Awaiting Commands...",
        ConsoleColor::Green,
    );

    let session: Arc<dyn Session> = player;
    let mut lines = input.lines();
    let signal = shutdown_signal();
    tokio::pin!(signal);

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    dispatcher.dispatch(&ctx, session.clone(), &line).await;
                }
                Ok(None) => {
                    tracing::info!("End of input");
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read from stdin");
                    break;
                }
            },
            _ = shutdown_rx.changed() => break,
            _ = &mut signal => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    let failures = manager.unload_all(&ctx).await;
    if !failures.is_empty() {
        tracing::warn!(count = failures.len(), "Extensions failed to shut down cleanly");
    }

    ctx.save_config().await?;
    tracing::info!("Project Mew shutdown complete");
    Ok(())
}

/// Host-owned subscribers; registered before any extension.
async fn subscribe_host_hooks(hooks: &HookBus) {
    hooks
        .subscribe_fn(HOST, |event: &mut ConfigReadEvent| {
            tracing::debug!(path = %event.path.display(), "Configuration read");
            Ok(())
        })
        .await;

    hooks
        .subscribe_fn(HOST, |event: &mut PostLoginEvent| {
            tracing::info!(
                provider = %event.provider,
                login = event.login_name.as_deref().unwrap_or("-"),
                "Player logged in"
            );
            Ok(())
        })
        .await;
}

/// `exit` / `quit`: leaves the command loop.
fn exit_command(shutdown_tx: watch::Sender<bool>) -> Command {
    let shutdown_tx = Arc::new(shutdown_tx);
    Command::from_fn("exit", move |args: CommandArgs| {
        let shutdown_tx = shutdown_tx.clone();
        async move {
            args.console().info("Shutting down...");
            let _ = shutdown_tx.send(true);
            Ok(())
        }
    })
    .alias("quit")
    .help("Unloads extensions, saves the configuration, and exits.")
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use mew_core::ErrorKind;

    use super::*;

    fn config_in(dir: &std::path::Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.plugins.directory = dir.join("Plugin").to_string_lossy().into_owned();
        config
    }

    #[tokio::test]
    async fn test_exit_command_unloads_and_saves() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config_path = temp.path().join("config").join("config.json");
        std::fs::create_dir_all(config_path.parent().expect("parent")).expect("mkdir");
        config_in(temp.path()).save(&config_path).expect("seed config");

        let input: &[u8] = b"version\nexit\nversion\n";
        run(config_in(temp.path()), config_path.clone(), input)
            .await
            .expect("clean shutdown");

        assert!(config_path.exists());
        assert!(temp.path().join("Plugin").is_dir());
    }

    #[tokio::test]
    async fn test_broken_module_aborts_startup() {
        let temp = tempfile::tempdir().expect("tempdir");
        let plugin_dir = temp.path().join("Plugin");
        std::fs::create_dir_all(&plugin_dir).expect("mkdir");
        let module = plugin_dir.join(format!("broken.{}", std::env::consts::DLL_EXTENSION));
        std::fs::write(&module, b"\x7fELF not really a library").expect("write module");

        let config_path = temp.path().join("config.json");
        config_in(temp.path()).save(&config_path).expect("seed config");

        let input: &[u8] = b"";
        let err = run(config_in(temp.path()), config_path, input)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ModuleLoad);
        assert!(err.is_fatal());
    }
}
