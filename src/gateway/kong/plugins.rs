//! Plugin protocol on the Kong admin API
//!
//! Kong has no upsert-by-name, so every mutation first lists the route's
//! plugins of that name to learn the instance id. An empty listing is
//! reported by Kong as a not-found condition and means "no instances".

use reqwest::{Method, StatusCode};
use tracing::{debug, instrument};

use crate::domain::GatewayPlugin;
use crate::errors::{GatewayError, Result};
use crate::gateway::Compensation;

use super::wire::PluginList;
use super::{decode_response, status_message, KongClient};

impl KongClient {
    fn plugin_url(&self, route: &str, plugin_id: &str) -> String {
        let mut url = format!("{}/plugins", self.api_url(route));
        if !plugin_id.is_empty() {
            url = format!("{}/{}", url, plugin_id);
        }
        url
    }

    /// List the instances of one plugin attached to a route.
    ///
    /// An empty result is `NotFound`, as is a 404; any other failure status
    /// is `Driver`.
    #[instrument(skip(self))]
    pub(crate) async fn list_plugins(
        &self,
        route: &str,
        plugin_name: &str,
    ) -> Result<Vec<GatewayPlugin>> {
        let mut request = self.request(Method::GET, &self.plugin_url(route, ""));
        if !plugin_name.is_empty() {
            request = request.query(&[("name", plugin_name)]);
        }
        let response = self.send("getPlugins", route, request).await?;

        let status = response.status();
        debug!(route, status = status.as_u16(), "gateway.getPlugins");
        if status.is_success() {
            let listing: PluginList = decode_response("getPlugins", response).await?;
            if listing.total == 0 {
                return Err(GatewayError::not_found(format!(
                    "gateway.getPlugins: {}, no '{}' plugins on route '{}'",
                    status.as_u16(),
                    plugin_name,
                    route
                )));
            }
            return Ok(listing.data.into_iter().map(|record| record.into_plugin()).collect());
        }

        let message = status_message("getPlugins", response).await;
        if status == StatusCode::NOT_FOUND {
            return Err(GatewayError::not_found(message));
        }
        Err(GatewayError::driver(message))
    }

    /// Create the plugin on the route, or update every existing instance of
    /// it in place. Newly created instances are recorded in `compensations`.
    #[instrument(skip(self, plugin, compensations), fields(plugin = %plugin.name))]
    pub(crate) async fn upsert_plugin(
        &self,
        route: &str,
        plugin: &GatewayPlugin,
        compensations: &mut Vec<Compensation>,
    ) -> Result<()> {
        let existing = match self.list_plugins(route, &plugin.name).await {
            Ok(instances) => instances,
            Err(e) if e.is_not_found() => {
                debug!(route, plugin = %plugin.name, "no such plugins, try to add");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        if existing.is_empty() {
            self.save_plugin(route, "", plugin).await?;
            compensations.push(Compensation::DeletePlugin {
                route: route.to_string(),
                plugin: plugin.name.clone(),
            });
            return Ok(());
        }

        // At most one instance is expected, but update all of them.
        for instance in &existing {
            self.save_plugin(route, &instance.id, plugin).await?;
        }
        Ok(())
    }

    /// POST a new instance when `plugin_id` is empty, otherwise PATCH the
    /// existing one
    async fn save_plugin(&self, route: &str, plugin_id: &str, plugin: &GatewayPlugin) -> Result<()> {
        let method = if plugin_id.is_empty() { Method::POST } else { Method::PATCH };

        let request =
            self.request(method, &self.plugin_url(route, plugin_id)).form(&plugin.form_fields());
        let response = self.send("updatePlugin", route, request).await?;

        debug!(route, plugin_id, status = response.status().as_u16(), "gateway.updatePlugin");
        match response.status() {
            StatusCode::OK | StatusCode::CREATED => Ok(()),
            _ => Err(GatewayError::driver(status_message("updatePlugin", response).await)),
        }
    }

    /// Delete every instance of a plugin from a route. No instances is not an
    /// error.
    #[instrument(skip(self))]
    pub(crate) async fn delete_plugin(&self, route: &str, plugin_name: &str) -> Result<()> {
        let instances = match self.list_plugins(route, plugin_name).await {
            Ok(instances) => instances,
            Err(e) if e.is_not_found() => {
                debug!(route, plugin = plugin_name, "no such plugins, skip");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        for instance in &instances {
            self.delete_plugin_by_id(route, &instance.id).await?;
        }
        Ok(())
    }

    async fn delete_plugin_by_id(&self, route: &str, plugin_id: &str) -> Result<()> {
        let url = self.plugin_url(route, plugin_id);
        let response = self.send("deletePlugin", route, self.request(Method::DELETE, &url)).await?;

        debug!(url = %url, status = response.status().as_u16(), "gateway.deletePlugin");
        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            StatusCode::NOT_FOUND => {
                Err(GatewayError::not_found(status_message("deletePlugin", response).await))
            }
            _ => Err(GatewayError::driver(status_message("deletePlugin", response).await)),
        }
    }
}
