//! Route domain types
//!
//! The caller-visible route entity. A route maps host, path and method
//! patterns onto a backend function for one tenant.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{GatewayError, Result};

/// Protocol value that makes a route HTTPS-only when it is the only one listed
pub const HTTPS_PROTOCOL: &str = "https";

/// Method the gateway adds for CORS preflight requests
pub const PREFLIGHT_METHOD: &str = "OPTIONS";

/// A published API route as the surrounding system sees it.
///
/// `id` and `created_at` are assigned by the gateway on creation and must be
/// carried unchanged into every later update; the gateway rejects full
/// replacements that lack them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RouteEntity {
    /// Gateway-assigned identifier, empty until first creation
    pub id: String,

    /// Gateway-assigned creation timestamp, zero until first creation
    pub created_at: i64,

    /// Unique route name within the gateway
    #[validate(length(min = 1, message = "Route name cannot be empty"))]
    pub name: String,

    /// Host patterns, in order
    pub hosts: Vec<String>,

    /// Path patterns, in order
    pub uris: Vec<String>,

    /// HTTP methods served by the route
    pub methods: Vec<String>,

    /// Accepted protocols, e.g. `["https"]`
    pub protocols: Vec<String>,

    /// Backend function invoked by the route
    pub function: String,

    /// Tenant owning the route
    pub organization_id: String,

    /// Whether a CORS plugin is attached
    pub cors: bool,
}

impl RouteEntity {
    /// Create an entity with only a name set
    pub fn named<S: Into<String>>(name: S) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// True when `https` is the one and only accepted protocol
    pub fn is_https_only(&self) -> bool {
        matches!(self.protocols.as_slice(), [only] if only == HTTPS_PROTOCOL)
    }

    /// True once the gateway has assigned identity fields
    pub fn has_identity(&self) -> bool {
        !self.id.is_empty()
    }

    /// Validate the entity before it is submitted
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(GatewayError::from)?;

        if self.hosts.is_empty() && self.uris.is_empty() {
            return Err(GatewayError::validation(
                "Route must define at least one host or one uri",
            ));
        }

        if self.methods.iter().any(|m| m.eq_ignore_ascii_case(PREFLIGHT_METHOD)) {
            return Err(GatewayError::validation_field(
                "OPTIONS is added automatically for CORS-enabled routes",
                "methods",
            ));
        }

        Ok(())
    }
}
