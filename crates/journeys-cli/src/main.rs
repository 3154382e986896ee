//! Journeys CLI - Navigation journeys from browsing history
//!
//! Rebuilds the trees of pages the user navigated through, using recorded
//! link clicks or the referring visits in a browser history export.
//!
//! # Usage
//!
//! ```bash
//! # Record a followed link
//! journeys record https://example.com https://example.com/docs
//!
//! # Show the journeys of the last week
//! journeys show
//!
//! # Visit-chain mode, newest journeys first, as JSON
//! journeys show --identity visit-chain --order recency --json
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use journeys_config::{LogFormat, LoggingConfig};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod commands;

/// Journeys - Navigation journey trees from browsing history
#[derive(Parser, Debug)]
#[command(name = "journeys")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Args, Debug, Clone)]
struct GlobalOptions {
    /// Directory holding the edge store and history export
    #[arg(long, global = true, env = "JOURNEYS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Path to configuration file (replaces global and local config)
    #[arg(long, short = 'c', global = true, env = "JOURNEYS_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
}

impl GlobalOptions {
    /// Convert global options to config overrides
    pub fn to_config_overrides(&self) -> journeys_config::ConfigOverrides {
        journeys_config::ConfigOverrides {
            data_dir: self.data_dir.clone(),
            ..Default::default()
        }
    }

    fn log_level<'a>(&self, logging: &'a LoggingConfig) -> &'a str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            &logging.level
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the journeys in the history window
    Show(commands::show::ShowArgs),

    /// Record a followed link from one page to another
    Record(commands::record::RecordArgs),

    /// List recorded links
    Edges(commands::edges::EdgesArgs),

    /// View and manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),
}

fn init_tracing(global: &GlobalOptions, logging: &LoggingConfig) -> Result<()> {
    let filter =
        EnvFilter::try_new(global.log_level(logging)).unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Text => {
            tracing::subscriber::set_global_default(builder.with_ansi(true).finish())?
        }
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // A broken config is reported by the command itself
    let logging = commands::load_config(&cli.global)
        .map(|config| config.logging)
        .unwrap_or_default();
    init_tracing(&cli.global, &logging)?;

    match cli.command {
        Commands::Show(args) => commands::show::execute(args, cli.global).await,
        Commands::Record(args) => commands::record::execute(args, cli.global).await,
        Commands::Edges(args) => commands::edges::execute(args, cli.global).await,
        Commands::Config(cmd) => commands::config::execute(cmd, cli.global).await,
    }
}
