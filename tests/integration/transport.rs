//! Cancellation, error mapping and retry through the public services.

use std::time::{Duration, Instant};

use jamfpro_sdk::api::jamf_pro_api::Category;
use jamfpro_sdk::client::{BackoffStrategy, RetryConfig};
use jamfpro_sdk::{ClientConfig, ErrorKind, JamfProClient, RequestContext};
use serde_json::json;
use wiremock::matchers::{header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::common::{connected_client, json_body, mount_oauth, oauth_config};

fn fast_retry(max_attempts: u32) -> RetryConfig {
    RetryConfig::default()
        .with_max_attempts(max_attempts)
        .with_initial_delay(Duration::from_millis(5))
        .with_backoff(BackoffStrategy::Constant)
}

async fn client_with(server: &MockServer, config: ClientConfig) -> JamfProClient {
    mount_oauth(server, "token").await;
    JamfProClient::new(oauth_config(server), config).await.unwrap()
}

#[tokio::test]
async fn test_cancelled_context_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/buildings"))
        .respond_with(json_body(json!({ "totalCount": 0, "results": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let client = connected_client(&server, "token").await;
    let ctx = RequestContext::background();
    ctx.cancel();

    let err = client.buildings.list(&ctx, None).await.unwrap_err();
    assert!(err.is_cancelled());
    assert!(matches!(err.kind, ErrorKind::Cancelled));
}

#[tokio::test]
async fn test_deadline_cuts_a_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/jamf-pro-version"))
        .respond_with(json_body(json!({ "version": "11.9.1" })).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let client = connected_client(&server, "token").await;
    let ctx = RequestContext::with_timeout(Duration::from_millis(200));

    let started = Instant::now();
    let err = client.jamf_pro_version.get(&ctx).await.unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DeadlineExceeded));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_not_found_surfaces_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/buildings/404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "httpStatus": 404,
            "errors": [{ "code": "INVALID_ID", "description": "Building not found", "id": "404", "field": null }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connected_client(&server, "token").await;
    let err = client
        .buildings
        .get_by_id(&RequestContext::background(), "404")
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    let api = err.api_error().unwrap();
    assert_eq!(api.code.as_deref(), Some("INVALID_ID"));
    assert_eq!(api.message, "Building not found");
    assert_eq!(api.endpoint, "/api/v1/buildings/404");
    assert_eq!(err.response().map(|r| r.status_code), Some(404));
}

#[tokio::test]
async fn test_transient_get_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/categories/7"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/categories/7"))
        .respond_with(json_body(json!({ "id": "7", "name": "Utilities", "priority": 9 })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .with_base_url(server.uri())
        .with_retry(fast_retry(3))
        .build();
    let client = client_with(&server, config).await;

    let (category, _) = client
        .categories
        .get_by_id(&RequestContext::background(), "7")
        .await
        .unwrap();
    assert_eq!(category.name, "Utilities");
    assert_eq!(category.priority, 9);
}

#[tokio::test]
async fn test_create_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/categories"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .with_base_url(server.uri())
        .with_retry(fast_retry(3))
        .build();
    let client = client_with(&server, config).await;

    let category = Category::new("Utilities", 9);
    let err = client
        .categories
        .create(&RequestContext::background(), &category)
        .await
        .unwrap_err();
    assert!(err.is_server_error());
}

#[tokio::test]
async fn test_user_agent_and_global_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/jamf-pro-version"))
        .and(header_regex("User-Agent", r"^jamfpro-sdk-rust/\d+\.\d+\.\d+"))
        .and(header("X-Request-Source", "integration"))
        .respond_with(json_body(json!({ "version": "11.9.1" })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .with_base_url(server.uri())
        .without_retry()
        .with_global_header("X-Request-Source", "integration")
        .build();
    let client = client_with(&server, config).await;
    client
        .jamf_pro_version
        .get(&RequestContext::background())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_validation_happens_before_io() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let client = connected_client(&server, "token").await;
    let ctx = RequestContext::background();

    let err = client.buildings.delete_by_id(&ctx, "").await.unwrap_err();
    assert!(matches!(&err.kind, ErrorKind::Validation(m) if m == "building ID is required"));

    let err = client.sites.delete_by_id(&ctx, 0).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Validation error: site ID must be a positive integer"
    );
}
