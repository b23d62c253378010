//! Wire representation of routes and plugins on the Kong admin API.
//!
//! Kong serializes empty arrays as `{}`, so every list field goes through a
//! lenient deserializer that accepts an empty object or `null` as no items.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

use crate::domain::route::PREFLIGHT_METHOD;
use crate::domain::{GatewayPlugin, PluginConfig, PluginValue, RouteEntity};

/// Backend path every route is proxied to
const RUNS_PATH: &str = "/v1/runs";

/// Upstream URL for routes served by the given backend host
pub fn upstream_url(upstream_host: &str) -> String {
    format!("http://{}{}", upstream_host, RUNS_PATH)
}

/// A route as the Kong admin API stores it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KongApi {
    /// Required together with `created_at` for a full replace
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub created_at: i64,

    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub upstream_url: String,

    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Vec::is_empty")]
    pub uris: Vec<String>,

    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,

    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub https_only: bool,
}

impl KongApi {
    /// Translate a route entity, deriving the upstream URL, HTTPS-only flag
    /// and the implicit preflight method
    pub fn from_entity(entity: &RouteEntity, upstream_url: &str) -> Self {
        let mut methods = entity.methods.clone();
        if entity.cors {
            methods.push(PREFLIGHT_METHOD.to_string());
        }

        Self {
            id: entity.id.clone(),
            created_at: entity.created_at,
            name: entity.name.clone(),
            upstream_url: upstream_url.to_string(),
            uris: entity.uris.clone(),
            hosts: entity.hosts.clone(),
            methods,
            https_only: entity.is_https_only(),
        }
    }

    /// Translate back to a route entity.
    ///
    /// Protocols, CORS, function and tenant cannot be recovered from the
    /// gateway's answer and are left at their defaults.
    pub fn into_entity(self) -> RouteEntity {
        RouteEntity {
            id: self.id,
            created_at: self.created_at,
            name: self.name,
            hosts: self.hosts,
            uris: self.uris,
            methods: self.methods,
            ..Default::default()
        }
    }
}

/// Envelope of a plugin listing
#[derive(Debug, Deserialize)]
pub struct PluginList {
    #[serde(default)]
    pub total: u64,

    #[serde(default, deserialize_with = "lenient_list")]
    pub data: Vec<PluginRecord>,
}

/// A plugin instance as returned by the listing endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct PluginRecord {
    #[serde(default)]
    pub id: String,

    pub name: String,

    #[serde(default = "enabled_by_default")]
    pub enabled: bool,

    /// Nested config object, e.g. `{"substitute": {"input": "input"}}`
    #[serde(default)]
    pub config: serde_json::Map<String, serde_json::Value>,
}

impl PluginRecord {
    /// Convert to a domain plugin, flattening nested config into the dotted
    /// `config.*` keys used when writing plugins
    pub fn into_plugin(self) -> GatewayPlugin {
        let mut config = PluginConfig::new();
        flatten_config("config", &serde_json::Value::Object(self.config), &mut config);

        GatewayPlugin { name: self.name, id: self.id, config, enabled: self.enabled }
    }
}

fn flatten_config(prefix: &str, value: &serde_json::Value, out: &mut PluginConfig) {
    use serde_json::Value;

    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_config(&format!("{}.{}", prefix, key), nested, out);
            }
        }
        Value::Array(items) => {
            let values = items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
            out.insert(prefix.to_string(), PluginValue::List(values));
        }
        Value::String(s) => {
            out.insert(prefix.to_string(), PluginValue::Text(s.clone()));
        }
        Value::Null => {}
        other => {
            out.insert(prefix.to_string(), PluginValue::Text(other.to_string()));
        }
    }
}

fn enabled_by_default() -> bool {
    true
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrEmpty<T> {
    List(Vec<T>),
    Object(serde_json::Map<String, serde_json::Value>),
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<ListOrEmpty<T>>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(ListOrEmpty::List(items)) => Ok(items),
        Some(ListOrEmpty::Object(map)) if map.is_empty() => Ok(Vec::new()),
        Some(ListOrEmpty::Object(_)) => Err(de::Error::custom("expected a list")),
    }
}
