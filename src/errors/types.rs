//! # Error Types
//!
//! Typed errors for the gateway adapter using `thiserror`.
//!
//! The four route operations only ever produce [`GatewayError::NotFound`],
//! [`GatewayError::Marshal`] or [`GatewayError::Driver`]. Several call sites
//! classify any unexpected status as `NotFound` even when the gateway meant a
//! conflict or a validation failure; callers rely on that coarse mapping, so
//! it is kept as-is.

use std::fmt;

/// Result type for adapter operations
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Main error type for the gateway adapter
#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    /// Route or plugin is absent, or the gateway answered with a status the
    /// call site interprets as absence
    #[error("Resource not found: {message}")]
    NotFound { message: String },

    /// A request or response payload could not be (de)serialized
    #[error("Marshal error: {context}")]
    Marshal {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Transport failure, unexpected status code or anything unclassified
    #[error("Driver error: {message}")]
    Driver {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String, field: Option<String> },
}

/// Coarse classification of a [`GatewayError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Marshal,
    Driver,
    Config,
    Validation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "not_found"),
            ErrorKind::Marshal => write!(f, "marshal"),
            ErrorKind::Driver => write!(f, "driver"),
            ErrorKind::Config => write!(f, "config"),
            ErrorKind::Validation => write!(f, "validation"),
        }
    }
}

impl GatewayError {
    /// Create a not found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound { message: message.into() }
    }

    /// Create a marshal error wrapping a serde failure
    pub fn marshal<S: Into<String>>(context: S, source: serde_json::Error) -> Self {
        Self::Marshal { context: context.into(), source }
    }

    /// Create a driver error without an underlying cause
    pub fn driver<S: Into<String>>(message: S) -> Self {
        Self::Driver { message: message.into(), source: None }
    }

    /// Create a driver error with source
    pub fn driver_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Driver { message: message.into(), source: Some(source) }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), source: None }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Config { message: message.into(), source: Some(source) }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    /// Classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::NotFound { .. } => ErrorKind::NotFound,
            GatewayError::Marshal { .. } => ErrorKind::Marshal,
            GatewayError::Driver { .. } => ErrorKind::Driver,
            GatewayError::Config { .. } => ErrorKind::Config,
            GatewayError::Validation { .. } => ErrorKind::Validation,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            "gateway request timed out".to_string()
        } else if error.is_connect() {
            "failed to connect to gateway".to_string()
        } else {
            "gateway request failed".to_string()
        };
        Self::driver_with_source(message, Box::new(error))
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(error: serde_json::Error) -> Self {
        Self::marshal("JSON serialization failed", error)
    }
}

impl From<config::ConfigError> for GatewayError {
    fn from(error: config::ConfigError) -> Self {
        Self::config_with_source("Configuration loading failed", Box::new(error))
    }
}

impl From<validator::ValidationErrors> for GatewayError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string()))
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::validation(format!("Validation failed: {}", message))
    }
}
