//! Command-line interface for the gateway adapter
//!
//! Resolves configuration from a file or the environment, applies flag
//! overrides, then runs route commands against the gateway.

pub mod output;
pub mod routes;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::{AdapterConfig, GatewayConfig, ObservabilityConfig};
use crate::gateway::KongClient;
use crate::observability::{init_logging, log_config_info};

#[derive(Parser)]
#[command(name = "gateway-adapter")]
#[command(about = "Publish function routes on an API gateway")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Gateway admin API URL override
    #[arg(long, global = true)]
    pub admin_url: Option<String>,

    /// Function backend host override
    #[arg(long, global = true)]
    pub upstream_host: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Route management commands
    Route {
        #[command(subcommand)]
        command: routes::RouteCommands,
    },
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = resolve_config(&cli)?;
    init_logging(&config.observability)?;
    log_config_info(&config);

    let client = KongClient::new(&config.gateway)?;

    match cli.command {
        Commands::Route { command } => routes::handle_route_command(command, &client).await?,
    }

    Ok(())
}

/// Load configuration and apply command-line overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<AdapterConfig> {
    let mut config = match &cli.config {
        Some(path) => AdapterConfig::from_file(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => AdapterConfig {
            gateway: GatewayConfig::from_env()?,
            observability: ObservabilityConfig::from_env(),
        },
    };

    if let Some(admin_url) = &cli.admin_url {
        config.gateway.admin_url = admin_url.clone();
    }
    if let Some(upstream_host) = &cli.upstream_host {
        config.gateway.upstream_host = upstream_host.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.gateway.timeout_seconds = timeout;
    }
    if cli.verbose {
        config.observability.log_level = "debug".to_string();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}
