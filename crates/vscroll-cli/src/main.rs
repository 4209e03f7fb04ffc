use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vscroll_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "vscroll")]
#[command(author, version, about = "Smooth virtual scrolling engine with a terminal demo")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Use this config file instead of ~/.config/vscroll/config.toml
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive terminal demo
    Run {
        /// Scroll through this file instead of generated lines
        #[arg(short = 'f', long)]
        file: Option<PathBuf>,
    },
    /// Replay a JSON input script headlessly
    Replay {
        /// Path to the script
        script: PathBuf,
        /// Pace frames in real time instead of running as fast as possible
        #[arg(long)]
        realtime: bool,
        /// Print a summary instead of one JSON record per line
        #[arg(long)]
        summary: bool,
    },
    /// Print the effective configuration
    Config {
        /// Write the default configuration to the config path
        #[arg(long)]
        write: bool,
        /// Overwrite an existing file when writing
        #[arg(long, requires = "write")]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::config_path);
    let config = AppConfig::load_from(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let command = cli.command.unwrap_or(Commands::Run { file: None });

    // The terminal UI owns the screen, so it logs to a file
    let log_to_file = matches!(command, Commands::Run { .. });
    init_logging(&config, log_to_file)?;

    match command {
        Commands::Run { file } => commands::run::run(config, file).await,
        Commands::Replay {
            script,
            realtime,
            summary,
        } => commands::replay::run(&script, realtime, summary).await,
        Commands::Config { write, force } => {
            commands::config::run(&config, &config_path, write, force)
        }
    }
}

/// Initialize logging from RUST_LOG, falling back to the configured level
fn init_logging(config: &AppConfig, to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    if to_file {
        let log_path = config.log_path();
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
    Ok(())
}
