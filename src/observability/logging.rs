//! # Structured Logging
//!
//! Provides the logging subscriber setup and span macros used around every
//! gateway round-trip.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{AdapterConfig, ObservabilityConfig};
use crate::errors::{GatewayError, Result};

/// Create a tracing span for a single gateway admin API call.
///
/// ```rust,ignore
/// let span = gateway_span!("addAPI", "r1");
/// let span = gateway_span!("updatePlugin", "r1", plugin = "cors");
/// ```
#[macro_export]
macro_rules! gateway_span {
    ($operation:expr, $route:expr) => {
        tracing::debug_span!(
            "gateway_call",
            operation = %$operation,
            route = %$route,
            call_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $route:expr, $($field:tt)*) => {
        tracing::debug_span!(
            "gateway_call",
            operation = %$operation,
            route = %$route,
            call_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. An already-installed global
/// subscriber (e.g. in integration tests) is left in place.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| {
            GatewayError::config_with_source(
                format!("Invalid log level '{}'", config.log_level),
                Box::new(e),
            )
        })?;

    let installed = if config.json_logging {
        fmt().json().with_env_filter(filter).try_init()
    } else {
        fmt().with_env_filter(filter).try_init()
    };

    if let Err(e) = installed {
        tracing::debug!(error = %e, "tracing subscriber already installed");
    }

    Ok(())
}

/// Log configuration at startup
pub fn log_config_info(config: &AdapterConfig) {
    tracing::info!(
        service_name = %config.observability.service_name,
        admin_url = %config.gateway.admin_url,
        upstream_host = %config.gateway.upstream_host,
        timeout_seconds = config.gateway.timeout_seconds,
        json_logging = config.observability.json_logging,
        "Gateway adapter configuration"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macros_compile() {
        let _span = gateway_span!("getAPI", "r1");
        let _span = gateway_span!("updatePlugin", "r1", plugin = "cors");
    }

    #[test]
    fn test_init_logging_is_reentrant() {
        let config = ObservabilityConfig::default();
        assert!(init_logging(&config).is_ok());
        assert!(init_logging(&config).is_ok());
    }

    #[test]
    fn test_init_logging_rejects_bad_level() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config =
            ObservabilityConfig { log_level: "gateway_adapter=verbose".to_string(), ..Default::default() };
        assert!(init_logging(&config).is_err());
    }

    #[test]
    fn test_log_config_info() {
        let config = AdapterConfig::default();

        // This should not panic
        log_config_info(&config);
    }
}
