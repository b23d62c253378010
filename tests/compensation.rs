//! Partial failures of multi-step route operations and their undo actions

mod common;

use common::gateway::{route, TestGateway};
use gateway_adapter::{Compensation, ErrorKind};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

async fn reject_cors_create(gateway: &TestGateway, route: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/apis/{}/plugins", route)))
        .and(body_string_contains("name=cors"))
        .respond_with(ResponseTemplate::new(500).set_body_string("cors schema violation"))
        .mount(&gateway.server)
        .await;
}

#[tokio::test]
async fn test_failed_add_reports_completed_steps() {
    let gateway = TestGateway::start().await;
    gateway.accept_create("r1").await;
    gateway.no_plugins("r1", "dispatch-transformer").await;
    gateway.no_plugins("r1", "cors").await;
    reject_cors_create(&gateway, "r1").await;
    gateway.accept_plugin_create("r1").await;

    let result = gateway.client.add_route_with_compensation(&route("r1")).await;

    assert!(result.is_partial_failure());
    assert_eq!(
        result.compensations,
        vec![
            Compensation::DeleteRoute { name: "r1".to_string() },
            Compensation::DeletePlugin {
                route: "r1".to_string(),
                plugin: "dispatch-transformer".to_string(),
            },
        ]
    );
    let err = result.outcome.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Driver);
    assert!(err.to_string().contains("cors schema violation"));
}

#[tokio::test]
async fn test_compensate_undoes_in_reverse_order() {
    let gateway = TestGateway::start().await;
    gateway.accept_create("r1").await;
    gateway.plugin_appears("r1", "dispatch-transformer", "tp-1").await;
    gateway.no_plugins("r1", "cors").await;
    reject_cors_create(&gateway, "r1").await;
    gateway.accept_plugin_create("r1").await;

    Mock::given(method("DELETE"))
        .and(path("/apis/r1/plugins/tp-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&gateway.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/apis/r1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&gateway.server)
        .await;

    let mut result = gateway.client.add_route_with_compensation(&route("r1")).await;
    assert!(result.outcome.is_err());

    let compensations = std::mem::take(&mut result.compensations);
    gateway.client.compensate(compensations).await.unwrap();

    let requests = gateway.server.received_requests().await.unwrap();
    let deletes: Vec<&str> = requests
        .iter()
        .filter(|r| r.method.as_str() == "DELETE")
        .map(|r| r.url.path())
        .collect();
    assert_eq!(deletes, vec!["/apis/r1/plugins/tp-1", "/apis/r1"]);
}

#[tokio::test]
async fn test_compensate_treats_missing_targets_as_undone() {
    let gateway = TestGateway::start().await;
    gateway.no_plugins("r1", "cors").await;

    Mock::given(method("DELETE"))
        .and(path("/apis/r1"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&gateway.server)
        .await;

    let compensations = vec![
        Compensation::DeleteRoute { name: "r1".to_string() },
        Compensation::DeletePlugin { route: "r1".to_string(), plugin: "cors".to_string() },
    ];

    assert!(gateway.client.compensate(compensations).await.is_ok());
}

#[tokio::test]
async fn test_compensate_attempts_every_action_and_returns_first_failure() {
    let gateway = TestGateway::start().await;
    gateway.existing_plugin("r1", "cors", "c-1").await;

    Mock::given(method("DELETE"))
        .and(path("/apis/r1/plugins/c-1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("locked"))
        .expect(1)
        .mount(&gateway.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/apis/r1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&gateway.server)
        .await;

    let compensations = vec![
        Compensation::DeleteRoute { name: "r1".to_string() },
        Compensation::DeletePlugin { route: "r1".to_string(), plugin: "cors".to_string() },
    ];

    let err = gateway.client.compensate(compensations).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Driver);
    assert!(err.to_string().contains("gateway.deletePlugin: 500, locked"));
}

#[tokio::test]
async fn test_update_records_only_created_plugins() {
    let gateway = TestGateway::start().await;
    gateway.accept_replace("r1").await;
    gateway.existing_plugin("r1", "dispatch-transformer", "tp-1").await;
    gateway.no_plugins("r1", "cors").await;
    gateway.accept_plugin_create("r1").await;

    Mock::given(method("PATCH"))
        .and(path("/apis/r1/plugins/tp-1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&gateway.server)
        .await;

    let mut entity = route("r1");
    entity.id = "r1-id".to_string();
    entity.created_at = 1511482921000;

    let result = gateway.client.update_route_with_compensation("r1", &entity).await;
    assert!(result.outcome.is_ok());
    assert!(!result.is_partial_failure());
    assert_eq!(
        result.compensations,
        vec![Compensation::DeletePlugin { route: "r1".to_string(), plugin: "cors".to_string() }]
    );
}

#[tokio::test]
async fn test_created_route_with_unreadable_body_is_still_undoable() {
    let gateway = TestGateway::start().await;

    Mock::given(method("POST"))
        .and(path("/apis/"))
        .respond_with(ResponseTemplate::new(201).set_body_string("<html>created</html>"))
        .mount(&gateway.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/apis/r1/plugins"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&gateway.server)
        .await;

    let result = gateway.client.add_route_with_compensation(&route("r1")).await;

    assert!(result.is_partial_failure());
    assert_eq!(result.compensations, vec![Compensation::DeleteRoute { name: "r1".to_string() }]);
    assert_eq!(result.outcome.unwrap_err().kind(), ErrorKind::Marshal);
}

#[tokio::test]
async fn test_rejected_create_leaves_nothing_to_undo() {
    let gateway = TestGateway::start().await;

    Mock::given(method("POST"))
        .and(path("/apis/"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&gateway.server)
        .await;

    let result = gateway.client.add_route_with_compensation(&route("r1")).await;
    assert!(result.compensations.is_empty());
    assert!(!result.is_partial_failure());
    assert_eq!(result.outcome.unwrap_err().kind(), ErrorKind::NotFound);
}
