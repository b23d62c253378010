//! # Observability Infrastructure
//!
//! Structured logging for the gateway adapter.

pub mod logging;

pub use logging::{init_logging, log_config_info};
