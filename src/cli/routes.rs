//! Route CLI commands
//!
//! Drive the four route operations from JSON route files.

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::output::print_route;
use crate::domain::RouteEntity;
use crate::gateway::{KongClient, RouteGateway};

#[derive(Subcommand)]
pub enum RouteCommands {
    /// Get a route by name
    Get {
        /// Route name
        name: String,

        /// Output format (json, yaml, or table)
        #[arg(short, long, default_value = "json")]
        output: String,
    },

    /// Create a route and attach its plugins
    Add {
        /// Path to JSON file with the route entity
        #[arg(short, long)]
        file: PathBuf,

        /// Remove whatever was created if a later step fails
        #[arg(long)]
        rollback_on_failure: bool,

        /// Output format (json, yaml, or table)
        #[arg(short, long, default_value = "json")]
        output: String,
    },

    /// Replace a route and resync its plugins
    Update {
        /// Route name
        name: String,

        /// Path to JSON file with the route entity
        #[arg(short, long)]
        file: PathBuf,

        /// Output format (json, yaml, or table)
        #[arg(short, long, default_value = "json")]
        output: String,
    },

    /// Delete a route and its CORS plugin
    Delete {
        /// Path to JSON file with the route entity
        #[arg(short, long)]
        file: PathBuf,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Handle route commands
pub async fn handle_route_command(command: RouteCommands, client: &KongClient) -> Result<()> {
    match command {
        RouteCommands::Get { name, output } => get_route(client, &name, &output).await?,
        RouteCommands::Add { file, rollback_on_failure, output } => {
            add_route(client, &file, rollback_on_failure, &output).await?
        }
        RouteCommands::Update { name, file, output } => {
            update_route(client, &name, &file, &output).await?
        }
        RouteCommands::Delete { file, yes } => delete_route(client, &file, yes).await?,
    }

    Ok(())
}

/// Read and validate a route entity from a JSON file
pub fn read_route_file(file: &Path) -> Result<RouteEntity> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read file: {}", file.display()))?;

    let entity: RouteEntity =
        serde_json::from_str(&contents).context("Failed to parse route JSON from file")?;

    entity.validate().context("Invalid route definition")?;
    Ok(entity)
}

async fn get_route(client: &KongClient, name: &str, output: &str) -> Result<()> {
    let route = RouteGateway::get_route(client, name)
        .await
        .with_context(|| format!("Failed to get route '{}'", name))?;

    print_route(&route, output)
}

async fn add_route(
    client: &KongClient,
    file: &Path,
    rollback_on_failure: bool,
    output: &str,
) -> Result<()> {
    let entity = read_route_file(file)?;

    let mut result = client.add_route_with_compensation(&entity).await;
    if result.is_partial_failure() && rollback_on_failure {
        warn!(route = %entity.name, "route creation failed part-way, rolling back");
        let pending = std::mem::take(&mut result.compensations);
        if let Err(e) = client.compensate(pending).await {
            warn!(route = %entity.name, error = %e, "rollback incomplete");
        }
    }

    let created = result
        .into_result()
        .with_context(|| format!("Failed to add route '{}'", entity.name))?;

    info!(route = %created.name, id = %created.id, "route created");
    print_route(&created, output)
}

async fn update_route(client: &KongClient, name: &str, file: &Path, output: &str) -> Result<()> {
    let mut entity = read_route_file(file)?;

    // The gateway only accepts full replacements that carry id and created_at.
    if !entity.has_identity() {
        let current = RouteGateway::get_route(client, name)
            .await
            .with_context(|| format!("Failed to load current route '{}'", name))?;
        entity.id = current.id;
        entity.created_at = current.created_at;
    }

    let updated = RouteGateway::update_route(client, name, &entity)
        .await
        .with_context(|| format!("Failed to update route '{}'", name))?;

    info!(route = %updated.name, "route updated");
    print_route(&updated, output)
}

async fn delete_route(client: &KongClient, file: &Path, yes: bool) -> Result<()> {
    let entity = read_route_file(file)?;

    if !yes {
        println!("Are you sure you want to delete route '{}'? (y/N)", entity.name);
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled");
            return Ok(());
        }
    }

    RouteGateway::delete_route(client, &entity)
        .await
        .with_context(|| format!("Failed to delete route '{}'", entity.name))?;

    println!("Route '{}' deleted successfully", entity.name);
    Ok(())
}
