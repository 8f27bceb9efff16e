//! Built-in operator commands.

use tracing::warn;

use mew_core::error::AppError;
use mew_core::result::AppResult;
use mew_core::traits::ConsoleColor;
use mew_core::types::EvolveTarget;

use super::definition::{Command, CommandArgs};
use super::pagination::{PaginationSettings, build_lines_from_terms, send_page, try_parse_page_number};
use super::registry::CommandRegistry;

/// Release codename printed by `version`.
pub const CODENAME: &str = "Alpha";

const LOGIN_SYNTAX: &str =
    "Invalid syntax! Proper syntax: login <google/ptc> [username] [password]";
const EVOLVE_SYNTAX: &str = "Invalid syntax! Proper syntax: evolve <pokemon/all> [amount]";
const HELP_SYNTAX: &str = "Invalid syntax! Proper syntax: help <command/page>";
const PLUGINS_SYNTAX: &str = "Invalid syntax! Proper syntax: plugins [page]";

/// Registers every built-in command.
pub async fn register_builtins(registry: &CommandRegistry) {
    for command in [
        login_command(),
        logout_command(),
        evolve_command(),
        help_command(),
        version_command(),
        plugins_command(),
        reload_command(),
    ] {
        registry.register(command).await;
    }
}

/// `login <google/ptc> [username] [password]`
pub fn login_command() -> Command {
    Command::from_fn("login", login)
        .help("Logs into the game servers.")
        .help_desc([
            "login google - logs in with the stored Google refresh token.",
            "login ptc <username> <password> - logs in with a PTC account.",
        ])
}

async fn login(args: CommandArgs) -> AppResult<()> {
    if args.parameters.is_empty() || args.parameters.len() > 3 {
        return Err(AppError::parse(LOGIN_SYNTAX));
    }

    let console = args.console();
    let result = match args.parameters[0].to_lowercase().as_str() {
        "google" => {
            console.info("Obtaining Device Code...");
            args.session.begin_google_login().await
        }
        "ptc" => {
            let (Some(username), Some(password)) = (args.param(1), args.param(2)) else {
                return Err(AppError::parse(LOGIN_SYNTAX));
            };
            console.info("Attempting to Login Via PTC...");
            args.session.begin_password_login(username, password).await
        }
        _ => return Err(AppError::parse(LOGIN_SYNTAX)),
    };

    match result {
        Ok(()) => console.colored(
            &format!("Logged in as {}.", args.session.display_name()),
            ConsoleColor::Green,
        ),
        Err(e) => {
            warn!(error = %e, "Login failed");
            console.error(&format!("Login failed: {}", e.message));
        }
    }
    Ok(())
}

/// `logout`
pub fn logout_command() -> Command {
    Command::from_fn("logout", |args: CommandArgs| async move {
        args.session.logout().await?;
        args.console().info("Logged out.");
        Ok(())
    })
    .help("Ends the current login.")
    .require_login()
}

/// `evolve <pokemon/all> [amount]`
pub fn evolve_command() -> Command {
    Command::from_fn("evolve", evolve)
        .help("Evolves a species, or every species the evolve filter permits.")
        .help_desc([
            "evolve <pokemon> [amount] - evolves up to amount of one species.",
            "evolve all [amount] - evolves every permitted species.",
        ])
        .require_login()
}

async fn evolve(args: CommandArgs) -> AppResult<()> {
    let Some(raw_target) = args.param(0).filter(|_| args.parameters.len() <= 2) else {
        return Err(AppError::parse(EVOLVE_SYNTAX));
    };

    let target: EvolveTarget = raw_target.parse()?;
    let amount = match args.param(1) {
        None => None,
        Some(raw) => Some(
            raw.parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| AppError::parse(format!("Error - {raw} is not a valid amount!")))?,
        ),
    };

    let console = args.console();
    console.info(&format!("Evolving {target}..."));
    let submitted = args.session.evolve(target, amount).await?;
    console.colored(
        &format!("Submitted {submitted} evolution request(s)."),
        ConsoleColor::Green,
    );
    Ok(())
}

/// `help [command/page]`
pub fn help_command() -> Command {
    Command::from_fn("help", help)
        .help("Lists commands or shows help for one command.")
        .help_desc([
            "help [page] - lists every command.",
            "help <command> - shows the help of a command.",
        ])
}

async fn help(args: CommandArgs) -> AppResult<()> {
    if args.parameters.len() > 1 {
        return Err(AppError::parse(HELP_SYNTAX));
    }

    let console = args.console();
    if let Some(name) = args.param(0).filter(|p| p.parse::<i64>().is_err()) {
        let Some(command) = args.context.commands.find(name).await else {
            return Err(AppError::parse("Invalid command."));
        };

        console.colored(&format!("{} help: ", command.name()), ConsoleColor::Yellow);
        match command.help_lines() {
            Some(lines) => lines.iter().for_each(|line| console.info(line)),
            None => console.info(command.help_text()),
        }
        return Ok(());
    }

    let Some(page) = try_parse_page_number(&args.parameters, 0, console) else {
        return Ok(());
    };

    let names: Vec<String> = args
        .context
        .commands
        .list()
        .await
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    let lines = build_lines_from_terms(names, ", ", 80);
    let settings = PaginationSettings {
        header_format: "Commands ({0}/{1}):".to_string(),
        footer_format: "Type help {0} for more.".to_string(),
        max_lines_per_page: args.context.config.read().await.console.help_page_size,
        ..Default::default()
    };
    send_page(console, page, &lines, &settings);
    Ok(())
}

/// `version`
pub fn version_command() -> Command {
    Command::from_fn("version", |args: CommandArgs| async move {
        args.console().info(&format!(
            "ProjectMew: {} ({CODENAME})",
            env!("CARGO_PKG_VERSION")
        ));
        Ok(())
    })
    .help("Shows the host version.")
}

/// `plugins [page]`
pub fn plugins_command() -> Command {
    Command::from_fn("plugins", plugins)
        .alias("extensions")
        .help("Lists the loaded extensions.")
}

async fn plugins(args: CommandArgs) -> AppResult<()> {
    if args.parameters.len() > 1 {
        return Err(AppError::parse(PLUGINS_SYNTAX));
    }

    let console = args.console();
    let Some(page) = try_parse_page_number(&args.parameters, 0, console) else {
        return Ok(());
    };

    let lines: Vec<String> = args
        .context
        .extension_summaries()
        .await
        .iter()
        .map(|s| {
            let origin = s.module.as_deref().unwrap_or("built-in");
            format!("{} v{} by {} ({origin}, {})", s.name, s.version, s.author, s.state)
        })
        .collect();
    let settings = PaginationSettings {
        header_format: "Extensions ({0}/{1}):".to_string(),
        footer_format: "Type plugins {0} for more.".to_string(),
        nothing_to_display: Some("No extensions loaded.".to_string()),
        ..Default::default()
    };
    send_page(console, page, &lines, &settings);
    Ok(())
}

/// `reload`
pub fn reload_command() -> Command {
    Command::from_fn("reload", |args: CommandArgs| async move {
        args.context.reload_config().await?;
        args.console().info("Configuration reloaded.");
        Ok(())
    })
    .help("Re-reads the configuration file.")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mew_core::console::ConsoleLevel;

    use super::*;
    use crate::command::definition::LOGIN_REQUIRED_MESSAGE;
    use crate::command::dispatcher::CommandDispatcher;
    use crate::test_support::{Fixture, fixture};

    async fn builtin_fixture() -> Fixture {
        let f = fixture();
        register_builtins(&f.ctx.commands).await;
        f
    }

    async fn run(f: &Fixture, line: &str) {
        CommandDispatcher::default()
            .dispatch(&f.ctx, f.session.clone(), line)
            .await;
    }

    #[tokio::test]
    async fn test_login_syntax_errors() {
        let f = builtin_fixture().await;
        run(&f, "login").await;
        run(&f, "login ptc ash").await;
        run(&f, "login myspace").await;
        run(&f, "login ptc a b c").await;

        let errors = f.console.messages(ConsoleLevel::Error);
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().all(|e| e == LOGIN_SYNTAX));
        assert!(f.session.calls().is_empty());
    }

    #[tokio::test]
    async fn test_login_ptc() {
        let f = builtin_fixture().await;
        run(&f, "login PTC ash pikachu").await;

        assert_eq!(f.session.calls(), ["ptc ash pikachu"]);
        assert!(f.console.contains("Attempting to Login Via PTC..."));
        assert!(f.console.contains("Logged in as tester."));
    }

    #[tokio::test]
    async fn test_login_failure_is_reported() {
        let f = builtin_fixture().await;
        run(&f, "login ptc ash wrong").await;
        assert!(f.console.contains("Login failed: Invalid username or password"));
    }

    #[tokio::test]
    async fn test_login_google() {
        let f = builtin_fixture().await;
        run(&f, "login google").await;
        assert_eq!(f.session.calls(), ["google"]);
        assert!(f.console.contains("Obtaining Device Code..."));
    }

    #[tokio::test]
    async fn test_evolve_requires_login() {
        let f = builtin_fixture().await;
        run(&f, "evolve pidgey").await;
        assert!(f.console.contains(LOGIN_REQUIRED_MESSAGE));
        assert!(f.session.calls().is_empty());
    }

    #[tokio::test]
    async fn test_evolve_arguments() {
        let f = builtin_fixture().await;
        f.session.set_authenticated(true);

        run(&f, "evolve pidgey 3").await;
        run(&f, "evolve ALL").await;
        run(&f, "evolve agumon").await;
        run(&f, "evolve pidgey zero").await;
        run(&f, "evolve").await;

        assert_eq!(f.session.calls(), ["evolve Pidgey Some(3)", "evolve all None"]);
        let errors = f.console.messages(ConsoleLevel::Error);
        assert_eq!(
            errors,
            [
                "Error - agumon is not a valid pokemon!",
                "Error - zero is not a valid amount!",
                EVOLVE_SYNTAX,
            ]
        );
    }

    #[tokio::test]
    async fn test_logout() {
        let f = builtin_fixture().await;
        f.session.set_authenticated(true);
        run(&f, "logout").await;
        assert_eq!(f.session.calls(), ["logout"]);
        assert!(f.console.contains("Logged out."));
    }

    #[tokio::test]
    async fn test_help_lists_commands() {
        let f = builtin_fixture().await;
        run(&f, "help").await;

        let info = f.console.messages(ConsoleLevel::Info);
        assert_eq!(info[0], "Commands (1/1):");
        assert_eq!(info[1], "login, logout, evolve, help, version, plugins, reload");
    }

    #[tokio::test]
    async fn test_help_paginates() {
        let f = builtin_fixture().await;
        f.ctx.config.write().await.console.help_page_size = 1;
        for i in 0..12 {
            f.ctx
                .commands
                .register(Command::from_fn(format!("extra-command-{i}"), |_| async { Ok(()) }))
                .await;
        }

        run(&f, "help").await;
        let info = f.console.messages(ConsoleLevel::Info);
        assert!(info[0].starts_with("Commands (1/"));
        assert_eq!(info.last().map(String::as_str), Some("Type help 2 for more."));

        f.console.clear();
        run(&f, "help x y").await;
        assert_eq!(f.console.messages(ConsoleLevel::Error), [HELP_SYNTAX]);

        f.console.clear();
        run(&f, "help -1").await;
        assert!(f.console.contains("\"-1\" is not a valid page number."));
    }

    #[tokio::test]
    async fn test_help_for_one_command() {
        let f = builtin_fixture().await;
        run(&f, "help EVOLVE").await;
        let info = f.console.messages(ConsoleLevel::Info);
        assert_eq!(info[0], "evolve help: ");
        assert_eq!(info.len(), 3);

        f.console.clear();
        run(&f, "help version").await;
        assert_eq!(
            f.console.messages(ConsoleLevel::Info),
            ["version help: ", "Shows the host version."]
        );

        f.console.clear();
        run(&f, "help nothing").await;
        assert_eq!(f.console.messages(ConsoleLevel::Error), ["Invalid command."]);
    }

    #[tokio::test]
    async fn test_version() {
        let f = builtin_fixture().await;
        run(&f, "version").await;
        assert!(f.console.contains("ProjectMew: "));
        assert!(f.console.contains("(Alpha)"));
    }

    #[tokio::test]
    async fn test_plugins_without_extensions() {
        let f = builtin_fixture().await;
        run(&f, "extensions").await;
        assert!(f.console.contains("No extensions loaded."));
    }

    #[tokio::test]
    async fn test_reload_reads_file_and_fires_hook() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.json");
        std::fs::write(&path, r#"{ "console": { "help_page_size": 9 } }"#).expect("write");

        let base = builtin_fixture().await;
        let ctx = crate::context::HostContext::new(
            base.ctx.config.clone(),
            &path,
            base.ctx.hooks.clone(),
            base.session.clone(),
            base.console.clone(),
        );
        ctx.hooks
            .subscribe_fn("edit", |event: &mut crate::hooks::ConfigReadEvent| {
                event.config.evolve.list_is_blacklist = true;
                Ok(())
            })
            .await;
        register_builtins(&ctx.commands).await;

        CommandDispatcher::default()
            .dispatch(&ctx, Arc::new(crate::test_support::TestSession::default()), "reload")
            .await;

        let config = ctx.config.read().await;
        assert_eq!(config.console.help_page_size, 9);
        assert!(config.evolve.list_is_blacklist);
        assert!(base.console.contains("Configuration reloaded."));
    }
}
