//! # Configuration Settings
//!
//! Defines the configuration structure for the gateway adapter.

use crate::errors::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use validator::Validate;

/// Environment prefix used when layering overrides over a config file
pub const ENV_PREFIX: &str = "GATEWAY_ADAPTER";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AdapterConfig {
    /// Gateway admin API configuration
    #[validate(nested)]
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Logging configuration
    #[validate(nested)]
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl AdapterConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(GatewayError::from)?;

        self.gateway.validate_custom()?;

        Ok(())
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let config =
            Self { gateway: GatewayConfig::from_env()?, observability: ObservabilityConfig::from_env() };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file (TOML, YAML or JSON by extension),
    /// with `GATEWAY_ADAPTER__SECTION__KEY` environment variables taking precedence
    pub fn from_file(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let config: AdapterConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

/// Gateway admin API configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL of the gateway admin API (e.g., "http://localhost:8001")
    #[validate(length(min = 1, message = "Admin URL cannot be empty"))]
    pub admin_url: String,

    /// Host (and port) of the backend that runs functions; the upstream URL
    /// of every route points at `http://{upstream_host}/v1/runs`
    #[validate(length(min = 1, message = "Upstream host cannot be empty"))]
    pub upstream_host: String,

    /// Per-request timeout in seconds
    #[validate(range(
        min = 1,
        max = 300,
        message = "Timeout must be between 1 and 300 seconds"
    ))]
    pub timeout_seconds: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            admin_url: "http://localhost:8001".to_string(),
            upstream_host: "localhost:8080".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl GatewayConfig {
    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Create GatewayConfig from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let admin_url = std::env::var("GATEWAY_ADMIN_URL").unwrap_or(defaults.admin_url);

        let upstream_host =
            std::env::var("GATEWAY_UPSTREAM_HOST").unwrap_or(defaults.upstream_host);

        let timeout_seconds = match std::env::var("GATEWAY_TIMEOUT_SECONDS") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| {
                GatewayError::config(format!("Invalid GATEWAY_TIMEOUT_SECONDS: {}", e))
            })?,
            Err(_) => defaults.timeout_seconds,
        };

        Ok(Self { admin_url, upstream_host, timeout_seconds })
    }

    /// Checks the validator crate cannot express
    fn validate_custom(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.admin_url).map_err(|e| {
            GatewayError::validation_field(format!("Invalid admin URL: {}", e), "admin_url")
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(GatewayError::validation_field(
                "Admin URL must start with 'http://' or 'https://'",
                "admin_url",
            ));
        }

        if self.upstream_host.contains("://") {
            return Err(GatewayError::validation_field(
                "Upstream host must not include a scheme",
                "upstream_host",
            ));
        }

        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Tracing service name
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Log level (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "gateway-adapter".to_string(),
            log_level: "info".to_string(),
            json_logging: false,
        }
    }
}

impl ObservabilityConfig {
    /// Create ObservabilityConfig from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let log_level =
            std::env::var("GATEWAY_ADAPTER_LOG_LEVEL").unwrap_or(defaults.log_level);

        let json_logging = std::env::var("GATEWAY_ADAPTER_JSON_LOGS")
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(defaults.json_logging);

        Self { service_name: defaults.service_name, log_level, json_logging }
    }
}
