//! Kong admin API stand-in built on wiremock.

use std::collections::HashMap;
use std::time::Duration;

use gateway_adapter::{KongClient, RouteEntity};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Backend host used for every test client
pub const UPSTREAM_HOST: &str = "functions.local";

/// A mock admin API and a client pointed at it
pub struct TestGateway {
    pub server: MockServer,
    pub client: KongClient,
}

impl TestGateway {
    pub async fn start() -> Self {
        Self::start_with_timeout(Duration::from_secs(5)).await
    }

    pub async fn start_with_timeout(timeout: Duration) -> Self {
        let server = MockServer::start().await;
        let http = reqwest::Client::builder().timeout(timeout).build().unwrap();
        let client = KongClient::with_client(http, &server.uri(), UPSTREAM_HOST);
        Self { server, client }
    }

    /// Answer route creation with 201 and the stored route
    pub async fn accept_create(&self, name: &str) {
        Mock::given(method("POST"))
            .and(path("/apis/"))
            .respond_with(ResponseTemplate::new(201).set_body_json(stored_api(name)))
            .mount(&self.server)
            .await;
    }

    /// Answer full replacement with 200 and the stored route
    pub async fn accept_replace(&self, name: &str) {
        Mock::given(method("PUT"))
            .and(path("/apis"))
            .respond_with(ResponseTemplate::new(200).set_body_json(stored_api(name)))
            .mount(&self.server)
            .await;
    }

    /// Report no instances of `plugin` on `route` (Kong answers 404)
    pub async fn no_plugins(&self, route: &str, plugin: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/apis/{}/plugins", route)))
            .and(query_param("name", plugin))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not found"})))
            .mount(&self.server)
            .await;
    }

    /// Report no instances once, then one instance with `id`
    pub async fn plugin_appears(&self, route: &str, plugin: &str, id: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/apis/{}/plugins", route)))
            .and(query_param("name", plugin))
            .respond_with(ResponseTemplate::new(404))
            .up_to_n_times(1)
            .mount(&self.server)
            .await;
        self.existing_plugin(route, plugin, id).await;
    }

    /// Report one instance of `plugin` on `route`
    pub async fn existing_plugin(&self, route: &str, plugin: &str, id: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/apis/{}/plugins", route)))
            .and(query_param("name", plugin))
            .respond_with(ResponseTemplate::new(200).set_body_json(plugin_listing(&[(id, plugin)])))
            .mount(&self.server)
            .await;
    }

    /// Accept plugin creation on `route`
    pub async fn accept_plugin_create(&self, route: &str) {
        Mock::given(method("POST"))
            .and(path(format!("/apis/{}/plugins", route)))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "new-plugin"})))
            .mount(&self.server)
            .await;
    }

    /// All recorded requests with the given method and path
    pub async fn requests_to(&self, http_method: &str, request_path: &str) -> Vec<Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.method.as_str() == http_method && r.url.path() == request_path)
            .collect()
    }
}

/// Route as Kong stores it after creation
pub fn stored_api(name: &str) -> Value {
    json!({
        "id": format!("{}-id", name),
        "created_at": 1511482921000i64,
        "name": name,
        "upstream_url": format!("http://{}/v1/runs", UPSTREAM_HOST),
        "uris": [format!("/{}", name)],
        "hosts": {},
        "methods": ["GET", "OPTIONS"],
        "strip_uri": true,
        "preserve_host": false
    })
}

/// Plugin listing envelope for `(id, name)` pairs
pub fn plugin_listing(plugins: &[(&str, &str)]) -> Value {
    let data: Vec<Value> = plugins
        .iter()
        .map(|(id, name)| json!({"id": id, "name": name, "enabled": true, "config": {}}))
        .collect();
    json!({"total": data.len(), "data": data})
}

/// Decode a form-encoded request body
pub fn form(request: &Request) -> HashMap<String, String> {
    url::form_urlencoded::parse(&request.body).into_owned().collect()
}

/// The route from the end-to-end scenario
pub fn route(name: &str) -> RouteEntity {
    RouteEntity {
        name: name.to_string(),
        uris: vec![format!("/{}", name)],
        methods: vec!["GET".to_string()],
        cors: true,
        function: "f1".to_string(),
        organization_id: "org1".to_string(),
        ..Default::default()
    }
}
