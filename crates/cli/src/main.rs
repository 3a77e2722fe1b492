//! Lull CLI - lull command

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli_lib::{cmd, system_config};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Lull - debounce and rate limit line streams
#[derive(Parser)]
#[command(name = "lull")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: $LULL_CONFIG or <config dir>/lull/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the last stdin line of every burst once input goes quiet
    Debounce {
        /// Quiet period in milliseconds (default: from config)
        #[arg(long, allow_negative_numbers = true)]
        delay_ms: Option<i64>,
    },
    /// Answer each stdin key with allow/deny using a per-key token bucket
    Limit {
        /// Tokens refilled per second per key (default: from config)
        #[arg(long)]
        per_second: Option<f64>,
        /// Bucket capacity per key (default: from config)
        #[arg(long)]
        burst: Option<u32>,
    },
    /// View and edit configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List all configuration values
    List,
    /// Get a single value
    Get {
        /// Dotted key, e.g. debounce.delay_ms
        key: String,
    },
    /// Set a single value
    Set {
        /// Dotted key, e.g. rate_limit.burst
        key: String,
        /// New value
        value: String,
    },
    /// Show the config file path
    Path {
        /// Create the file with defaults if missing
        #[arg(long)]
        create: bool,
    },
    /// Print an example configuration
    Example,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries command output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = system_config::resolve_path(cli.config.as_deref())?;

    match cli.command {
        Commands::Debounce { delay_ms } => cmd::debounce::run(&config_path, delay_ms).await,
        Commands::Limit { per_second, burst } => {
            cmd::limit::run(&config_path, per_second, burst).await
        }
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::List => cmd::config::run_list(&config_path).await,
            ConfigCommands::Get { key } => cmd::config::run_get(&config_path, &key).await,
            ConfigCommands::Set { key, value } => {
                cmd::config::run_set(&config_path, &key, &value).await
            }
            ConfigCommands::Path { create } => cmd::config::run_path(&config_path, create).await,
            ConfigCommands::Example => cmd::config::run_example().await,
        },
    }
}
