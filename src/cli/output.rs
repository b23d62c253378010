//! Shared output formatting utilities for CLI commands
//!
//! Supports JSON, YAML, and table output.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::RouteEntity;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Table,
}

impl OutputFormat {
    /// Parse output format from string
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            "table" => Ok(OutputFormat::Table),
            _ => anyhow::bail!(
                "Unsupported output format: '{}'. Use 'json', 'yaml', or 'table'.",
                s
            ),
        }
    }
}

/// Print a route in the requested format
pub fn print_route(route: &RouteEntity, format: &str) -> Result<()> {
    match OutputFormat::from_str(format)? {
        OutputFormat::Json => print_json(route),
        OutputFormat::Yaml => print_yaml(route),
        OutputFormat::Table => {
            print_routes_table(std::slice::from_ref(route));
            Ok(())
        }
    }
}

/// Print data as JSON
pub fn print_json<T: Serialize>(data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("Failed to serialize to JSON")?;
    println!("{}", json);
    Ok(())
}

/// Print data as YAML
pub fn print_yaml<T: Serialize>(data: &T) -> Result<()> {
    let yaml = serde_yaml::to_string(data).context("Failed to serialize to YAML")?;
    println!("{}", yaml);
    Ok(())
}

fn print_routes_table(routes: &[RouteEntity]) {
    let columns = [("Name", 24), ("ID", 36), ("URIs", 30), ("Methods", 20)];
    print_table_header(&columns);

    for route in routes {
        println!(
            "{:<24} {:<36} {:<30} {}",
            truncate(&route.name, 24),
            truncate(&route.id, 36),
            truncate(&route.uris.join(","), 30),
            truncate(&route.methods.join(","), 20),
        );
    }
    println!();
}

/// Truncate string to maximum length with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a table header
fn print_table_header(columns: &[(&str, usize)]) {
    println!();
    let mut header = String::new();
    for (name, width) in columns {
        header.push_str(&format!("{:<width$} ", name, width = width));
    }
    println!("{}", header.trim());

    let total_width: usize = columns.iter().map(|(_, w)| w + 1).sum();
    println!("{}", "-".repeat(total_width.saturating_sub(1)));
}
