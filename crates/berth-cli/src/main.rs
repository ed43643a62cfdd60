//! Berth CLI - profile matching and node readiness for bare-metal deployments
//!
//! Operates on a JSON inventory snapshot:
//! - Verify and assign node profiles against requested flavors
//! - Check that enough nodes exist for the requested scale
//! - Normalise capability strings
//! - Make manageable nodes available

use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod input;
mod inventory;
mod output;

use commands::{caps, node_count, profiles, provide};
use config::{BerthConfig, LoggingConfig};

/// Berth CLI application
#[derive(Parser)]
#[command(name = "berth")]
#[command(about = "Berth - bare-metal profile matching and readiness checks", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "BERTH_CONFIG", global = true)]
    config: Option<String>,

    /// Log level (overrides the configuration file)
    #[arg(long, env = "BERTH_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, global = true)]
    json: bool,

    /// Output format (table, json, yaml)
    #[arg(short, long, default_value = "table", global = true)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Verify node profiles against flavors, optionally assigning them
    Profiles(profiles::ProfilesArgs),

    /// Check that the inventory holds enough nodes for the requested scale
    NodeCount(node_count::NodeCountArgs),

    /// Parse a capability string and print its canonical form
    Caps(caps::CapsArgs),

    /// Move manageable nodes to available
    Provide(provide::ProvideArgs),

    /// Show the effective configuration
    Config,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = BerthConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    init_tracing(&cli, &config.logging);

    let code = match cli.command {
        Commands::Profiles(args) => profiles::execute(args, &config, cli.output)?,
        Commands::NodeCount(args) => node_count::execute(args, cli.output)?,
        Commands::Caps(args) => caps::execute(args, cli.output)?,
        Commands::Provide(args) => provide::execute(args, &config, cli.output)?,
        Commands::Config => {
            output::print_single(&config, cli.output)?;
            ExitCode::SUCCESS
        }
    };
    Ok(code)
}

/// Initialize tracing; `RUST_LOG` wins over the flag and the configuration
fn init_tracing(cli: &Cli, logging: &LoggingConfig) {
    let level = cli.log_level.clone().unwrap_or_else(|| logging.level.clone());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.into());

    if cli.json || logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
