mod ask_cmd;
mod chat_cmd;
mod config_cmd;
mod host;
mod intents_cmd;
mod session;
mod terminal_output;
mod theme_store;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use folio_config::{config_dir, config_file_path, load_and_prepare, DEFAULT_LOG_LEVEL};
use folio_logging::init_logger;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Chat with a portfolio from the terminal")]
#[command(version)]
struct Cli {
    /// Config directory (defaults to $FOLIO_CONFIG_DIR or ~/.folio)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Mode flags shared by the chatting subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct ModeFlags {
    /// Page-style query string, e.g. "?nolocal=1&debug=1"
    #[arg(long)]
    pub query: Option<String>,
    /// Never load the local engine
    #[arg(long)]
    pub no_local: bool,
    /// Load the local engine even on devices that look incapable
    #[arg(long)]
    pub force_local: bool,
    /// Print device diagnostics after the greeting
    #[arg(long)]
    pub debug: bool,
    /// Seed for reproducible greetings and replies
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat {
        #[command(flatten)]
        flags: ModeFlags,
    },
    /// Ask one question and print the answer
    Ask {
        /// The question
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        #[command(flatten)]
        flags: ModeFlags,
    },
    /// List the intents the rule engine recognizes
    Intents,
    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let dir = cli.config_dir.clone().unwrap_or_else(config_dir);
    let path = config_file_path(&dir);
    let config = load_and_prepare(&path).await?;

    let logging = config.logging.clone().unwrap_or_default();
    let log_dir = logging.dir.as_deref().map(PathBuf::from);
    init_logger(
        log_dir.as_deref(),
        logging.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL),
    )?;
    debug!(path = %path.display(), "Configuration loaded");

    match cli.command {
        Commands::Chat { flags } => chat_cmd::run(&config, &dir, &flags).await,
        Commands::Ask { text, flags } => ask_cmd::run(&config, &dir, &flags, &text.join(" ")).await,
        Commands::Intents => intents_cmd::run(),
        Commands::Config { init } => config_cmd::run(&config, &path, init).await,
    }
}
