//! Domain layer
//!
//! Route and plugin entities with no transport dependencies.
//!
//! - `route`: the caller-visible route entity
//! - `plugin`: plugin instances and the per-route plugin configurations

pub mod plugin;
pub mod route;

pub use plugin::{
    cors_plugin, transformer_plugin, GatewayPlugin, PluginConfig, PluginValue, CORS_PLUGIN,
    ORGANIZATION_HEADER, TRANSFORMER_PLUGIN,
};
pub use route::RouteEntity;
