//! catsync CLI - Command-line interface for catsync
//!
//! Provides commands for:
//! - Running a sheet-to-catalog sync batch (the default)
//! - Sweeping legacy image objects from storage
//! - Inspecting and validating configuration

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use catsync_core::config::Config;
use commands::{cleanup::CleanupImagesCommand, config::ConfigCommand, run::RunCommand};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "catsync", version, about = "Sync a product spreadsheet into a commerce catalog")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run one sync batch (default when no command is given)
    Run(RunCommand),
    /// Delete legacy timestamped product images from storage
    CleanupImages(CleanupImagesCommand),
    /// View and validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, config_path) = load_config(cli.config.as_deref())?;
    init_tracing(&config, cli.verbose);

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    match cli.command {
        None => RunCommand::default().execute(&config, format).await,
        Some(Commands::Run(cmd)) => cmd.execute(&config, format).await,
        Some(Commands::CleanupImages(cmd)) => cmd.execute(&config, format).await,
        Some(Commands::Config(cmd)) => cmd.execute(&config, &config_path, format).await,
    }
}

/// Loads the configuration and overlays environment variables
///
/// An explicitly given file must exist and parse; the default path falls back
/// to built-in defaults.
fn load_config(path: Option<&Path>) -> Result<(Config, PathBuf)> {
    let (config, path) = match path {
        Some(path) => {
            let config = Config::load(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            (config, path.to_path_buf())
        }
        None => {
            let path = Config::default_path();
            (Config::load_or_default(&path), path)
        }
    };
    Ok((config.apply_env(), path))
}

/// Installs the fmt subscriber; `RUST_LOG` wins over the configured level
fn init_tracing(config: &Config, verbose: u8) {
    let level = match verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}
