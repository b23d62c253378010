//! # Gateway Adapter
//!
//! Keeps published routes and their plugins in sync with a remote API
//! gateway. [`RouteGateway`] is the seam the surrounding system calls; the
//! [`kong`] module drives a Kong-style admin API.
//!
//! The adapter holds no state between calls. Operations on the same route
//! name are not atomic against the gateway and must be serialized by the
//! caller when they can overlap.

pub mod compensation;
pub mod kong;

use async_trait::async_trait;

use crate::domain::RouteEntity;
use crate::errors::Result;

pub use compensation::{Compensated, Compensation};
pub use kong::KongClient;

/// The four route operations exposed to the surrounding system
#[async_trait]
pub trait RouteGateway: Send + Sync {
    /// Read a route by name. Any non-200 answer is reported as `NotFound`.
    async fn get_route(&self, name: &str) -> Result<RouteEntity>;

    /// Create a route and attach its plugins
    async fn add_route(&self, entity: &RouteEntity) -> Result<RouteEntity>;

    /// Fully replace a route and resync its plugins. `entity` must carry the
    /// `id` and `created_at` returned by the gateway.
    async fn update_route(&self, name: &str, entity: &RouteEntity) -> Result<RouteEntity>;

    /// Remove a route and, for CORS-enabled routes, its CORS plugin
    async fn delete_route(&self, entity: &RouteEntity) -> Result<()>;
}
