use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use paper_search_core::{BackendClient, Config, Submitter, Variant};
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod tui;
mod ui;

use app::App;

const DEFAULT_LOG_FILTER: &str = "papers=info,paper_search_core=info";

#[derive(Parser)]
#[command(name = "papers", version)]
#[command(about = "Search research papers through a local agent backend")]
struct Cli {
    /// Exchange to use (defaults to the configured mode)
    #[arg(short, long, value_enum, global = true)]
    mode: Option<Mode>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit one query and print the results
    Ask {
        /// Query text (may be empty)
        #[arg(default_value = "")]
        query: String,
    },
    /// Print the effective configuration and where it lives
    Config,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Search,
    Papers,
    Chat,
}

impl From<Mode> for Variant {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Search => Variant::Search,
            Mode::Papers => Variant::Papers,
            Mode::Chat => Variant::Chat,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = Config::get_config_path()?;
    let config = Config::load_from(&config_path)
        .with_context(|| format!("reading {}", config_path.display()))?;
    let mode = cli.mode.map(Variant::from);

    match cli.command {
        None => run_tui(config, config_path, mode).await,
        Some(Commands::Ask { query }) => {
            init_stderr_logging();
            ask(&config, mode.unwrap_or_else(|| config.mode()), &query).await
        }
        Some(Commands::Config) => {
            println!("# {}", config_path.display());
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

async fn run_tui(config: Config, config_path: PathBuf, mode: Option<Variant>) -> Result<()> {
    init_file_logging()?;
    let mut events = tui::EventHandler::new();
    let mut app = App::new(config, Some(config_path), mode, events.sender())?;
    tracing::info!(mode = app.mode.as_str(), "starting TUI");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run_loop(
    terminal: &mut tui::Tui,
    app: &mut App,
    events: &mut tui::EventHandler,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}

async fn ask(config: &Config, variant: Variant, query: &str) -> Result<()> {
    let client = BackendClient::with_timeout(variant.base_url(), config.request_timeout())?;
    let mut submitter = Submitter::with_options(variant, config.submitter_options());

    let items = submitter.submit(&client, query).await;

    if variant.keeps_history() {
        // Only the reply; the history also holds the query itself
        if let Some(reply) = submitter.history().last() {
            println!("{}", reply.content);
        }
    } else {
        for item in items {
            println!("{}", item);
        }
    }
    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// The TUI owns the terminal, so logs go to a file under the data dir.
fn init_file_logging() -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow!("Could not determine data directory"))?
        .join("paper-search");
    fs::create_dir_all(&log_dir)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("paper-search.log"))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
