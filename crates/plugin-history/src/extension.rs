//! The history extension: a `pre_command` recorder plus the `history`
//! command.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use mew_plugin_sdk::prelude::*;

use crate::store::HistoryStore;

const OWNER: &str = "History";
const HISTORY_SYNTAX: &str = "Invalid syntax! Proper syntax: history [page/clear]";
const LINES_PER_PAGE: usize = 10;

/// Records command lines while initialized.
#[derive(Debug)]
pub struct HistoryExtension {
    store: Arc<HistoryStore>,
    active: Arc<AtomicBool>,
}

impl HistoryExtension {
    /// Creates an extension recording into `store`.
    pub fn new(store: Arc<HistoryStore>) -> Self {
        Self {
            store,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns the backing store.
    pub fn store(&self) -> &Arc<HistoryStore> {
        &self.store
    }
}

impl Default for HistoryExtension {
    fn default() -> Self {
        Self::new(Arc::new(HistoryStore::default()))
    }
}

/// Hook handlers stay subscribed for the life of the process, so they
/// check `active` and go quiet once the extension is deinitialized.
#[derive(Debug)]
struct RecordCommands {
    store: Arc<HistoryStore>,
    active: Arc<AtomicBool>,
}

#[async_trait]
impl HookHandler<CommandEvent> for RecordCommands {
    async fn handle(&self, event: &mut CommandEvent) -> Result<(), String> {
        if !self.active.load(Ordering::SeqCst) || event.command_name == "history" {
            return Ok(());
        }
        debug!(command = %event.command_name, "Recording command");
        self.store
            .push(event.session.display_name(), event.command_text.as_str());
        Ok(())
    }

    fn owner(&self) -> &str {
        OWNER
    }
}

#[async_trait]
impl Extension for HistoryExtension {
    fn info(&self) -> ExtensionInfo {
        extension_info!(
            name: OWNER,
            version: env!("CARGO_PKG_VERSION"),
            author: "Project Mew Team",
            description: "Records entered command lines"
        )
    }

    fn order(&self) -> i32 {
        10
    }

    async fn initialize(&mut self, ctx: &HostContext) -> Result<(), String> {
        self.active.store(true, Ordering::SeqCst);

        ctx.hooks
            .subscribe::<CommandEvent>(Arc::new(RecordCommands {
                store: self.store.clone(),
                active: self.active.clone(),
            }))
            .await;

        let console = ctx.console.clone();
        let active = self.active.clone();
        let store = self.store.clone();
        ctx.hooks
            .subscribe_fn(OWNER, move |event: &mut PostLoginEvent| {
                if active.load(Ordering::SeqCst) && !store.is_empty() {
                    let who = event.login_name.as_deref().unwrap_or("trainer");
                    console.colored(
                        &format!("Welcome back, {who}! {} commands recorded, type history to list them.", store.len()),
                        ConsoleColor::Cyan,
                    );
                }
                Ok(())
            })
            .await;

        let store = self.store.clone();
        ctx.commands
            .register(
                Command::from_fn("history", move |args: CommandArgs| {
                    let store = store.clone();
                    async move { show_history(&store, &args) }
                })
                .help("Lists recently entered commands.")
                .help_desc([
                    "history [page] - lists recent commands, newest first.",
                    "history clear - forgets every recorded command.",
                ]),
            )
            .await;

        info!(capacity = self.store.capacity(), "History extension initialized");
        Ok(())
    }

    async fn deinitialize(&mut self, _ctx: &HostContext) -> Result<(), String> {
        self.active.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn release(&mut self) -> Result<(), String> {
        self.store.clear();
        Ok(())
    }
}

fn show_history(store: &HistoryStore, args: &CommandArgs) -> AppResult<()> {
    if args.parameters.len() > 1 {
        return Err(AppError::parse(HISTORY_SYNTAX));
    }

    let console = args.console();
    if args.param(0).is_some_and(|p| p.eq_ignore_ascii_case("clear")) {
        store.clear();
        console.colored("History cleared.", ConsoleColor::Green);
        return Ok(());
    }

    let Some(page) = try_parse_page_number(&args.parameters, 0, console) else {
        return Ok(());
    };

    let lines: Vec<String> = store.newest_first().iter().map(|e| e.render()).collect();
    let settings = PaginationSettings {
        header_format: "History ({0}/{1}):".to_string(),
        footer_format: "Type history {0} for more.".to_string(),
        nothing_to_display: Some("No commands recorded yet.".to_string()),
        line_color: ConsoleColor::White,
        max_lines_per_page: LINES_PER_PAGE,
        ..Default::default()
    };
    send_page(console, page, &lines, &settings);
    Ok(())
}
