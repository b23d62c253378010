//! Kong admin API driver
//!
//! Routes travel as JSON, plugins as form-encoded bodies. Status codes are
//! mapped onto [`GatewayError`] kinds at each call site:
//!
//! | Call | Success | Otherwise |
//! |---|---|---|
//! | `GET /apis/{name}` | 200 | `NotFound` |
//! | `POST /apis/` | 201 | `NotFound` |
//! | `PUT /apis` | 200, 201 | `NotFound` |
//! | `DELETE /apis/{name}` | 204 | 404 `NotFound`, else `Driver` |
//!
//! Mapping every failed read/create/replace to `NotFound` hides conflicts and
//! validation failures reported by the gateway; callers depend on it.

pub mod plugins;
pub mod wire;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument, Instrument};

use crate::config::GatewayConfig;
use crate::domain::{cors_plugin, transformer_plugin, RouteEntity, CORS_PLUGIN};
use crate::errors::{GatewayError, Result};
use crate::gateway::{Compensated, Compensation, RouteGateway};
use crate::gateway_span;

use wire::KongApi;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Client for the Kong admin API
#[derive(Debug, Clone)]
pub struct KongClient {
    http: Client,
    admin_url: String,
    upstream_url: String,
}

impl KongClient {
    /// Create a client with its own connection pool
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout()).build().map_err(|e| {
            GatewayError::config_with_source("Failed to build HTTP client", Box::new(e))
        })?;

        Ok(Self::with_client(http, &config.admin_url, &config.upstream_host))
    }

    /// Create a client on top of an existing connection pool
    pub fn with_client(http: Client, admin_url: &str, upstream_host: &str) -> Self {
        Self {
            http,
            admin_url: admin_url.trim_end_matches('/').to_string(),
            upstream_url: wire::upstream_url(upstream_host),
        }
    }

    /// Base URL of the admin API
    pub fn admin_url(&self) -> &str {
        &self.admin_url
    }

    /// Upstream URL every route is proxied to
    pub fn upstream_url(&self) -> &str {
        &self.upstream_url
    }

    fn api_url(&self, name: &str) -> String {
        format!("{}/apis/{}", self.admin_url, name)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        debug!(%method, url, "gateway request");
        self.http.request(method, url)
    }

    /// Send a request inside a per-call span; transport failures, including
    /// timeouts, become `Driver` errors
    async fn send(&self, operation: &str, route: &str, request: RequestBuilder) -> Result<Response> {
        let span = gateway_span!(operation, route);
        async move {
            let response = request.send().await.map_err(|e| {
                error!(error = %e, "gateway request failed");
                GatewayError::from(e)
            })?;
            debug!(status = response.status().as_u16(), "gateway response");
            Ok(response)
        }
        .instrument(span)
        .await
    }

    // === Route operations ===

    /// Read a route by name
    #[instrument(skip(self))]
    pub async fn get_route(&self, name: &str) -> Result<RouteEntity> {
        let request = self
            .request(Method::GET, &self.api_url(name))
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE);
        let response = self.send("getAPI", name, request).await?;

        debug!(route = name, status = response.status().as_u16(), "gateway.getAPI");
        match response.status() {
            StatusCode::OK => api_from_response("getAPI", response).await,
            _ => Err(GatewayError::not_found(status_message("getAPI", response).await)),
        }
    }

    /// Create a route and attach its plugins, returning the undo actions for
    /// every step that completed
    #[instrument(skip(self, entity), fields(route = %entity.name, cors = entity.cors))]
    pub async fn add_route_with_compensation(
        &self,
        entity: &RouteEntity,
    ) -> Compensated<RouteEntity> {
        let mut compensations = Vec::new();
        let outcome = self.add_route_steps(entity, &mut compensations).await;
        Compensated::new(outcome, compensations)
    }

    async fn add_route_steps(
        &self,
        entity: &RouteEntity,
        compensations: &mut Vec<Compensation>,
    ) -> Result<RouteEntity> {
        let api = KongApi::from_entity(entity, &self.upstream_url);
        let body = serde_json::to_vec(&api)
            .map_err(|e| GatewayError::marshal("gateway.addAPI: error marshal request", e))?;

        let request = self
            .request(Method::POST, &format!("{}/apis/", self.admin_url))
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body);
        let response = self.send("addAPI", &api.name, request).await?;

        debug!(route = %api.name, status = response.status().as_u16(), "gateway.addAPI");
        if response.status() != StatusCode::CREATED {
            return Err(GatewayError::not_found(status_message("addAPI", response).await));
        }
        // The route exists from here on, even if its body fails to decode.
        compensations.push(Compensation::DeleteRoute { name: api.name.clone() });
        let created = api_from_response("addAPI", response).await?;

        self.upsert_plugin(&api.name, &transformer_plugin(entity), compensations).await?;

        if entity.cors {
            self.upsert_plugin(&api.name, &cors_plugin(entity), compensations).await?;
        }

        Ok(created)
    }

    /// Fully replace a route and resync its plugins, returning the undo
    /// actions for plugins created along the way
    #[instrument(skip(self, entity), fields(cors = entity.cors))]
    pub async fn update_route_with_compensation(
        &self,
        name: &str,
        entity: &RouteEntity,
    ) -> Compensated<RouteEntity> {
        let mut compensations = Vec::new();
        let outcome = self.update_route_steps(name, entity, &mut compensations).await;
        Compensated::new(outcome, compensations)
    }

    async fn update_route_steps(
        &self,
        name: &str,
        entity: &RouteEntity,
        compensations: &mut Vec<Compensation>,
    ) -> Result<RouteEntity> {
        if !entity.has_identity() {
            debug!(route = name, "updating route without id/created_at; gateway will reject it");
        }

        let api = KongApi::from_entity(entity, &self.upstream_url);
        let body = serde_json::to_vec(&api)
            .map_err(|e| GatewayError::marshal("gateway.updateAPI: error marshal request", e))?;

        let request = self
            .request(Method::PUT, &format!("{}/apis", self.admin_url))
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body);
        let response = self.send("updateAPI", name, request).await?;

        debug!(route = name, status = response.status().as_u16(), "gateway.updateAPI");
        let updated = match response.status() {
            StatusCode::OK | StatusCode::CREATED => api_from_response("updateAPI", response).await?,
            _ => {
                return Err(GatewayError::not_found(status_message("updateAPI", response).await))
            }
        };

        // Plugins hang off the route as replaced, which may carry a new name.
        self.upsert_plugin(&api.name, &transformer_plugin(entity), compensations).await?;

        if entity.cors {
            self.upsert_plugin(&api.name, &cors_plugin(entity), compensations).await?;
        } else {
            self.delete_plugin(&api.name, CORS_PLUGIN).await?;
        }

        Ok(updated)
    }

    /// Remove a route, dropping its CORS plugin first when it has one
    #[instrument(skip(self, entity), fields(route = %entity.name, cors = entity.cors))]
    pub async fn delete_route(&self, entity: &RouteEntity) -> Result<()> {
        if entity.cors {
            self.delete_plugin(&entity.name, CORS_PLUGIN).await?;
        }

        self.remove_route(&entity.name).await
    }

    async fn remove_route(&self, name: &str) -> Result<()> {
        let request = self
            .request(Method::DELETE, &self.api_url(name))
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE);
        let response = self.send("deleteAPI", name, request).await?;

        debug!(route = name, status = response.status().as_u16(), "gateway.deleteAPI");
        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            StatusCode::NOT_FOUND => {
                Err(GatewayError::not_found(status_message("deleteAPI", response).await))
            }
            _ => Err(GatewayError::driver(status_message("deleteAPI", response).await)),
        }
    }

    /// Replay undo actions, newest first.
    ///
    /// Targets that are already gone count as undone. Every action is
    /// attempted; the first failure is returned.
    #[instrument(skip(self, compensations), fields(count = compensations.len()))]
    pub async fn compensate(&self, compensations: Vec<Compensation>) -> Result<()> {
        let mut first_error = None;

        for compensation in compensations.into_iter().rev() {
            debug!(%compensation, "applying compensation");
            let result = match &compensation {
                Compensation::DeleteRoute { name } => self.remove_route(name).await,
                Compensation::DeletePlugin { route, plugin } => {
                    self.delete_plugin(route, plugin).await
                }
            };

            match result {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {
                    debug!(%compensation, "compensation target already absent");
                }
                Err(e) => {
                    error!(%compensation, error = %e, "compensation failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RouteGateway for KongClient {
    async fn get_route(&self, name: &str) -> Result<RouteEntity> {
        KongClient::get_route(self, name).await
    }

    async fn add_route(&self, entity: &RouteEntity) -> Result<RouteEntity> {
        self.add_route_with_compensation(entity).await.into_result()
    }

    async fn update_route(&self, name: &str, entity: &RouteEntity) -> Result<RouteEntity> {
        self.update_route_with_compensation(name, entity).await.into_result()
    }

    async fn delete_route(&self, entity: &RouteEntity) -> Result<()> {
        KongClient::delete_route(self, entity).await
    }
}

/// Error text for an unexpected status: `gateway.{operation}: {status}, {body}`,
/// without the body when it cannot be read
async fn status_message(operation: &str, response: Response) -> String {
    let status = response.status().as_u16();
    match response.text().await {
        Ok(body) => format!("gateway.{}: {}, {}", operation, status, body),
        Err(_) => {
            debug!("error reading response body");
            format!("gateway.{}: {}", operation, status)
        }
    }
}

/// Read and decode a JSON response body. Read failures are `Driver`, decode
/// failures `Marshal`.
async fn decode_response<T: DeserializeOwned>(operation: &str, response: Response) -> Result<T> {
    let body = response.bytes().await.map_err(|e| {
        error!(error = %e, operation, "error reading response");
        GatewayError::driver_with_source(
            format!("gateway.{}: error reading response", operation),
            Box::new(e),
        )
    })?;

    serde_json::from_slice(&body).map_err(|e| {
        error!(error = %e, operation, "error unmarshal response");
        GatewayError::marshal(format!("gateway.{}: error unmarshal response", operation), e)
    })
}

async fn api_from_response(operation: &str, response: Response) -> Result<RouteEntity> {
    let api: KongApi = decode_response(operation, response).await?;
    Ok(api.into_entity())
}
