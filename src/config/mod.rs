//! # Configuration Management
//!
//! Configuration for the gateway adapter, loaded from environment variables
//! or from a file layered under environment overrides.

pub mod settings;

pub use settings::{AdapterConfig, GatewayConfig, ObservabilityConfig};
