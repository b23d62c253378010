//! # Gateway Adapter
//!
//! Reconciles published API routes against a remote API gateway's admin
//! REST interface, keeping each route's definition and its attached plugins
//! (request/response transformation, CORS) in line with the caller's intent.
//!
//! ## Architecture
//!
//! ```text
//! caller → RouteGateway::{get,add,update,delete}_route → KongClient → Kong admin API
//!                                 ↓
//!                    route + plugin round-trips (JSON / form)
//! ```
//!
//! ## Core Components
//!
//! - **Domain**: the route entity and the per-route plugin configurations
//! - **Gateway**: the [`RouteGateway`] seam, the Kong driver and the
//!   compensation records for non-transactional multi-step operations
//! - **Config / Observability**: environment and file configuration, tracing
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use gateway_adapter::{AdapterConfig, KongClient, Result, RouteEntity, RouteGateway};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AdapterConfig::from_env()?;
//!     let gateway = KongClient::new(&config.gateway)?;
//!
//!     let route = RouteEntity {
//!         name: "hello".to_string(),
//!         uris: vec!["/hello".to_string()],
//!         methods: vec!["GET".to_string()],
//!         function: "hello-py".to_string(),
//!         organization_id: "dispatch".to_string(),
//!         ..Default::default()
//!     };
//!     let created = gateway.add_route(&route).await?;
//!     println!("created route {}", created.id);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod gateway;
pub mod observability;

// Re-export commonly used types and traits
pub use config::{AdapterConfig, GatewayConfig, ObservabilityConfig};
pub use domain::{GatewayPlugin, PluginValue, RouteEntity};
pub use errors::{ErrorKind, GatewayError, Result};
pub use gateway::{Compensated, Compensation, KongClient, RouteGateway};
pub use observability::init_logging;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
