//! Plugin domain types
//!
//! Gateway plugins attached to a route, and the two plugin configurations
//! every published route needs. Both configurations are built fresh from the
//! route entity on each call.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::route::RouteEntity;

/// Name of the request/response transformation plugin
pub const TRANSFORMER_PLUGIN: &str = "dispatch-transformer";

/// Name of the CORS plugin
pub const CORS_PLUGIN: &str = "cors";

/// Internal header carrying the tenant to the backend
pub const ORGANIZATION_HEADER: &str = "X-Dispatch-Org";

/// A single plugin configuration value.
///
/// The gateway accepts multi-valued settings as one comma-separated field,
/// so a `List` is joined on encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginValue {
    Text(String),
    List(Vec<String>),
}

impl PluginValue {
    /// Encode as a single form field value
    pub fn to_form_value(&self) -> String {
        match self {
            PluginValue::Text(value) => value.clone(),
            PluginValue::List(values) => values.join(","),
        }
    }
}

impl From<&str> for PluginValue {
    fn from(value: &str) -> Self {
        PluginValue::Text(value.to_string())
    }
}

impl From<String> for PluginValue {
    fn from(value: String) -> Self {
        PluginValue::Text(value)
    }
}

impl From<bool> for PluginValue {
    fn from(value: bool) -> Self {
        PluginValue::Text(value.to_string())
    }
}

impl From<Vec<String>> for PluginValue {
    fn from(values: Vec<String>) -> Self {
        PluginValue::List(values)
    }
}

/// Plugin configuration keyed by the gateway's dotted field names
pub type PluginConfig = BTreeMap<String, PluginValue>;

/// A plugin instance attached to a route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayPlugin {
    /// Plugin type, e.g. "cors"
    pub name: String,

    /// Instance identifier; empty when the instance does not exist yet
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub config: PluginConfig,

    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl GatewayPlugin {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self { name: name.into(), id: String::new(), config: PluginConfig::new(), enabled: true }
    }

    /// Builder-style config setter
    pub fn with<K: Into<String>, V: Into<PluginValue>>(mut self, key: K, value: V) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// True when the instance has been created on the gateway
    pub fn exists(&self) -> bool {
        !self.id.is_empty()
    }

    /// Flatten into form fields: every config entry plus the plugin name
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields: Vec<(String, String)> =
            self.config.iter().map(|(key, value)| (key.clone(), value.to_form_value())).collect();
        fields.push(("name".to_string(), self.name.clone()));
        fields
    }
}

/// Transformation plugin for a route.
///
/// The gateway drops query parameters from upstream URLs, so the target
/// function is appended to the query string per route, and the tenant is
/// passed as an internal header.
pub fn transformer_plugin(entity: &RouteEntity) -> GatewayPlugin {
    GatewayPlugin::new(TRANSFORMER_PLUGIN)
        .with("config.substitute.input", "input")
        .with("config.substitute.output", "output")
        .with("config.substitute.http_context", "httpContext")
        .with("config.enable.input", true)
        .with("config.enable.output", true)
        .with("config.enable.http_context", true)
        .with("config.http_method", "POST")
        .with("config.add.header", vec!["cookie:cookie".to_string()])
        .with(
            "config.add.internal_header",
            vec![format!("{}:{}", ORGANIZATION_HEADER, entity.organization_id)],
        )
        .with("config.header_prefix_for_insertion", "x-dispatch-")
        .with("config.insert_to_body.header", "blocking:true")
        .with("config.append.querystring", format!("functionName:{}", entity.function))
}

/// CORS plugin for a route.
///
/// Allowed methods are the caller's methods only; the gateway's CORS plugin
/// refuses OPTIONS in its method list.
pub fn cors_plugin(entity: &RouteEntity) -> GatewayPlugin {
    // TODO: make allowed origins configurable per route instead of "*".
    GatewayPlugin::new(CORS_PLUGIN)
        .with("config.origins", "*")
        .with("config.methods", entity.methods.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(function: &str, org: &str) -> RouteEntity {
        RouteEntity {
            name: "r1".to_string(),
            uris: vec!["/r1".to_string()],
            methods: vec!["GET".to_string(), "POST".to_string()],
            function: function.to_string(),
            organization_id: org.to_string(),
            cors: true,
            ..Default::default()
        }
    }

    fn field<'a>(fields: &'a [(String, String)], key: &str) -> Option<&'a str> {
        fields.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_list_values_are_comma_joined() {
        let value = PluginValue::List(vec!["a:1".to_string(), "b:2".to_string()]);
        assert_eq!(value.to_form_value(), "a:1,b:2");
        assert_eq!(PluginValue::from(true).to_form_value(), "true");
    }

    #[test]
    fn test_form_fields_include_name() {
        let plugin = GatewayPlugin::new("cors").with("config.origins", "*");
        let fields = plugin.form_fields();
        assert_eq!(field(&fields, "name"), Some("cors"));
        assert_eq!(field(&fields, "config.origins"), Some("*"));
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_transformer_is_built_per_route() {
        let first = transformer_plugin(&entity("f1", "org1"));
        let second = transformer_plugin(&entity("f2", "org2"));

        let fields = first.form_fields();
        assert_eq!(field(&fields, "config.append.querystring"), Some("functionName:f1"));
        assert_eq!(field(&fields, "config.add.internal_header"), Some("X-Dispatch-Org:org1"));

        // Building one route's plugin must not leak into another's.
        let fields = second.form_fields();
        assert_eq!(field(&fields, "config.append.querystring"), Some("functionName:f2"));
        assert_eq!(field(&fields, "config.add.internal_header"), Some("X-Dispatch-Org:org2"));
        assert_eq!(field(&fields, "config.add.header"), Some("cookie:cookie"));
        assert_eq!(field(&fields, "config.enable.input"), Some("true"));
        assert_eq!(field(&fields, "name"), Some(TRANSFORMER_PLUGIN));
    }

    #[test]
    fn test_cors_plugin_excludes_preflight_method() {
        let plugin = cors_plugin(&entity("f1", "org1"));
        assert_eq!(plugin.name, CORS_PLUGIN);
        assert!(!plugin.exists());
        let fields = plugin.form_fields();
        assert_eq!(field(&fields, "config.methods"), Some("GET,POST"));
        assert_eq!(field(&fields, "config.origins"), Some("*"));
    }
}
