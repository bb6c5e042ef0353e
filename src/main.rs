use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mark_assistant::answering::{AnsweringService, HttpAnsweringService};
use mark_assistant::config::{self, Config};
use mark_assistant::core::{BranchScope, Role, SessionIdentity};
use mark_assistant::storage::ShortcutStore;
use mark_assistant::ui_backend::{
    format_message, AppEvent, AppService, MessageSegment, SharedState, CONNECTION_ERROR_TEXT,
};

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), env!("MARK_VERSION_SUFFIX"));

#[derive(Parser)]
#[command(name = "mark")]
#[command(author, version = VERSION, about = "Mark - ask business questions about your branches", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Answering service base URL (overrides config and MARK_SERVICE_URL)
    #[arg(long, global = true)]
    url: Option<String>,
}

#[derive(Args, Debug, Default, Clone)]
struct IdentityArgs {
    /// Demo username (admin, owner, manager_br1, staff_br2, ...)
    #[arg(short, long, conflicts_with_all = ["role", "branch"])]
    user: Option<String>,

    /// Role: STAFF, MANAGER, ADMIN or BUSINESS_OWNER
    #[arg(long, requires = "branch")]
    role: Option<Role>,

    /// Branch id, or ALL
    #[arg(long, requires = "role")]
    branch: Option<BranchScope>,
}

impl IdentityArgs {
    fn resolve(&self) -> Result<SessionIdentity> {
        match (&self.user, self.role, &self.branch) {
            (Some(user), _, _) => Ok(SessionIdentity::from_username(user)?),
            (None, Some(role), Some(branch)) => {
                Ok(SessionIdentity::new(role.display_name(), role, branch.clone()))
            }
            _ => bail!("Choose an identity with --user <name> or --role <role> --branch <id>"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive terminal session (default)
    Chat {
        #[command(flatten)]
        identity: IdentityArgs,
    },

    /// Ask one question and print the answer
    Ask {
        /// The question
        question: String,

        #[command(flatten)]
        identity: IdentityArgs,
    },

    /// Manage saved query shortcuts
    Shortcuts {
        #[command(subcommand)]
        action: ShortcutAction,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ShortcutAction {
    /// List saved shortcuts
    List,

    /// Delete a shortcut by id
    Delete { id: i64 },

    /// Run a shortcut and print the answer
    Run {
        id: i64,

        #[command(flatten)]
        identity: IdentityArgs,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the configuration file path
    Path,
}

fn log_filter(verbose: bool) -> &'static str {
    if verbose {
        "mark_assistant=debug,mark=debug"
    } else {
        "mark_assistant=info,mark=info"
    }
}

fn init_stderr_logging(verbose: bool) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter(verbose).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// The interactive session owns the screen, so logs go to a file
fn init_file_logging(verbose: bool) -> Result<std::path::PathBuf> {
    let path = config::state_dir()?.join("mark.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter(verbose).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(path)
}

fn load_config(url: Option<String>) -> Result<Config> {
    let mut config = Config::load()?;
    if let Some(url) = url {
        config.service.base_url = url;
    }
    Ok(config)
}

/// Build a session controller for `identity`
fn build_service(
    config: &Config,
    identity: SessionIdentity,
) -> Result<(AppService, mpsc::UnboundedReceiver<AppEvent>)> {
    let answering: Arc<dyn AnsweringService> = Arc::new(HttpAnsweringService::new(
        &config.service.base_url,
        config.service.timeout(),
    )?);
    let store = ShortcutStore::open(&config::data_dir()?)?;
    let state = SharedState::new(identity, &config.ui.welcome_message);
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let service = AppService::new(answering, state, store, &config.suggestions, event_tx);
    Ok((service, event_rx))
}

/// Print the bot replies appended after transcript entry `before`; fails on a
/// connection error
fn print_replies(service: &AppService, before: usize) -> Result<()> {
    let mut unreachable = false;
    service.state().with_messages(|messages| {
        for (index, message) in messages.iter().enumerate().skip(before) {
            if message.is_user() {
                continue;
            }
            unreachable |= message.text == CONNECTION_ERROR_TEXT;
            for segment in format_message(&message.text, index) {
                match segment {
                    MessageSegment::Text { content } => print!("{}", content),
                    MessageSegment::Code {
                        language,
                        code,
                        block_id,
                    } => print!("\n```{} [{}]\n{}\n```\n", language, block_id, code),
                }
            }
            println!();
        }
    });

    if unreachable {
        bail!("The answering service could not be reached");
    }
    Ok(())
}

async fn run_interactive(verbose: bool, url: Option<String>, identity: IdentityArgs) -> Result<()> {
    let identity = identity.resolve()?;
    let log_path = init_file_logging(verbose)?;
    let config = load_config(url)?;
    tracing::info!(
        "mark {} ({}) starting, service at {}, log at {}",
        VERSION,
        env!("MARK_GIT_HASH"),
        config.service.base_url,
        log_path.display()
    );

    let (service, event_rx) = build_service(&config, identity)?;
    mark_assistant::tui::run_chat(
        service,
        event_rx,
        &config.ui,
        config.suggestions.load_categories,
    )
    .await
}

/// Logging and config for the non-interactive subcommands
fn one_shot_setup(verbose: bool, url: Option<String>) -> Result<Config> {
    init_stderr_logging(verbose);
    load_config(url)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Chat {
        identity: IdentityArgs::default(),
    });

    match command {
        Commands::Chat { identity } => run_interactive(cli.verbose, cli.url, identity).await?,
        Commands::Ask { question, identity } => {
            let config = one_shot_setup(cli.verbose, cli.url)?;
            let (service, _events) = build_service(&config, identity.resolve()?)?;
            let before = service.state().message_count();
            service.send_message(Some(question)).await;
            print_replies(&service, before)?;
        }
        Commands::Shortcuts { action } => {
            let config = one_shot_setup(cli.verbose, cli.url)?;
            match action {
                ShortcutAction::List => {
                    let store = ShortcutStore::open(&config::data_dir()?)?;
                    if store.list().is_empty() {
                        println!("No saved shortcuts.");
                    }
                    for saved in store.list() {
                        println!("{}\t{}\t{}", saved.id, saved.label, saved.query);
                    }
                }
                ShortcutAction::Delete { id } => {
                    let mut store = ShortcutStore::open(&config::data_dir()?)?;
                    match store.delete(id)? {
                        Some(removed) => println!("Deleted shortcut \"{}\"", removed.label),
                        None => println!("No saved shortcut with id {}", id),
                    }
                }
                ShortcutAction::Run { id, identity } => {
                    let (service, _events) = build_service(&config, identity.resolve()?)?;
                    let before = service.state().message_count();
                    service.run_shortcut(id).await?;
                    print_replies(&service, before)?;
                }
            }
        }
        Commands::Config { action } => {
            let config = one_shot_setup(cli.verbose, cli.url)?;
            match action {
                ConfigAction::Show => print!("{}", toml::to_string_pretty(&config)?),
                ConfigAction::Path => println!("{}", Config::config_path()?.display()),
            }
        }
    }

    Ok(())
}
