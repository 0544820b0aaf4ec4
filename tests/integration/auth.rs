//! Token acquisition, single-flight refresh, invalidate and keep-alive.

use std::sync::Arc;

use base64::Engine;
use chrono::{Duration as ChronoDuration, Utc};
use jamfpro_sdk::{AuthConfig, ClientConfig, ErrorKind, JamfProClient, RequestContext};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::common::{
    client_config, connected_client, json_body, mount_oauth, oauth_config, CLIENT_ID, CLIENT_SECRET,
};

#[tokio::test]
async fn test_oauth_token_is_sent_as_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/jamf-pro-version"))
        .and(header("Authorization", "Bearer oauth-token"))
        .respond_with(json_body(json!({ "version": "11.9.1-t1725554055" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connected_client(&server, "oauth-token").await;
    let (version, response) = client
        .jamf_pro_version
        .get(&RequestContext::background())
        .await
        .unwrap();

    assert_eq!(version.version, "11.9.1-t1725554055");
    assert_eq!(response.status_code, 200);
}

#[tokio::test]
async fn test_basic_auth_exchanges_for_bearer() {
    let server = MockServer::start().await;
    let expected = format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode("admin:hunter2")
    );
    let expires = (Utc::now() + ChronoDuration::minutes(30)).to_rfc3339();
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/token"))
        .and(header("Authorization", expected.as_str()))
        .respond_with(json_body(json!({ "token": "basic-bearer", "expires": expires })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/departments"))
        .and(header("Authorization", "Bearer basic-bearer"))
        .respond_with(json_body(json!({ "totalCount": 0, "results": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = JamfProClient::new(
        AuthConfig::basic(server.uri(), "admin", "hunter2"),
        client_config(&server),
    )
    .await
    .unwrap();
    let (page, _) = client
        .departments
        .list(&RequestContext::background(), None)
        .await
        .unwrap();
    assert_eq!(page.total_count, 0);
}

#[tokio::test]
async fn test_rejected_credentials_fail_construction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid_client"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let err = JamfProClient::new(oauth_config(&server), client_config(&server))
        .await
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::Authentication(_)));
    assert!(err.to_string().contains("401"));
    assert!(!err.to_string().contains("integration-secret"));
}

#[tokio::test]
async fn test_incomplete_config_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = AuthConfig::oauth2(server.uri(), "client-only", "");
    let err = JamfProClient::new(config, client_config(&server))
        .await
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Config(_)));
}

#[tokio::test]
async fn test_concurrent_401s_refresh_once() {
    let server = MockServer::start().await;
    // First token is served once, then every later fetch gets the second.
    Mock::given(method("POST"))
        .and(path("/api/v1/oauth/token"))
        .respond_with(json_body(json!({ "access_token": "stale", "expires_in": 1199 })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/oauth/token"))
        .respond_with(json_body(json!({ "access_token": "fresh", "expires_in": 1199 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/buildings/1"))
        .and(header("Authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/buildings/1"))
        .and(header("Authorization", "Bearer fresh"))
        .respond_with(json_body(json!({ "id": "1", "name": "Apple Park" })))
        .expect(8)
        .mount(&server)
        .await;

    let client = Arc::new(
        JamfProClient::new(oauth_config(&server), client_config(&server))
            .await
            .unwrap(),
    );

    let mut handles = Vec::new();
    for _ in 0..8 {
        let client = Arc::clone(&client);
        handles.push(tokio::spawn(async move {
            client
                .buildings
                .get_by_id(&RequestContext::background(), "1")
                .await
        }));
    }
    for handle in handles {
        let (building, _) = handle.await.unwrap().unwrap();
        assert_eq!(building.name, "Apple Park");
    }
}

#[tokio::test]
async fn test_persistent_401_is_an_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/categories/3"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    let client = connected_client(&server, "never-accepted").await;
    let err = client
        .categories
        .get_by_id(&RequestContext::background(), "3")
        .await
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::Authentication(_)));
    assert_eq!(err.response().map(|r| r.status_code), Some(401));
}

#[tokio::test]
async fn test_invalidate_forces_a_new_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/oauth/token"))
        .respond_with(json_body(json!({ "access_token": "session", "expires_in": 1199 })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/invalidate-token"))
        .and(header("Authorization", "Bearer session"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/jamf-pro-version"))
        .respond_with(json_body(json!({ "version": "11.9.1" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = JamfProClient::new(oauth_config(&server), client_config(&server))
        .await
        .unwrap();
    let ctx = RequestContext::background();

    client.invalidate_token(&ctx).await.unwrap();
    // Nothing cached now, so a second invalidate is a no-op.
    client.invalidate_token(&ctx).await.unwrap();

    client.jamf_pro_version.get(&ctx).await.unwrap();
}

#[tokio::test]
async fn test_keep_alive_swaps_the_token() {
    let server = MockServer::start().await;
    let expires = (Utc::now() + ChronoDuration::minutes(30)).to_rfc3339();
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/keep-alive"))
        .and(header("Authorization", "Bearer original"))
        .respond_with(json_body(json!({ "token": "extended", "expires": expires })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/jamf-pro-version"))
        .and(header("Authorization", "Bearer extended"))
        .respond_with(json_body(json!({ "version": "11.9.1" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connected_client(&server, "original").await;
    let ctx = RequestContext::background();
    client.keep_alive_token(&ctx).await.unwrap();
    client.jamf_pro_version.get(&ctx).await.unwrap();
}

#[tokio::test]
async fn test_clones_share_the_token_cache() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/oauth/token"))
        .respond_with(json_body(json!({ "access_token": "shared", "expires_in": 1199 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/jamf-pro-version"))
        .and(header("Authorization", "Bearer shared"))
        .respond_with(json_body(json!({ "version": "11.9.1" })))
        .expect(2)
        .mount(&server)
        .await;

    let client = JamfProClient::new(oauth_config(&server), client_config(&server))
        .await
        .unwrap();
    let clone = client.clone();
    let ctx = RequestContext::background();
    client.jamf_pro_version.get(&ctx).await.unwrap();
    clone.jamf_pro_version.get(&ctx).await.unwrap();
}

#[tokio::test]
async fn test_token_exchange_goes_through_configured_proxy() {
    // The mock server stands in for a forward proxy; the instance host
    // itself does not resolve.
    let proxy = MockServer::start().await;
    mount_oauth(&proxy, "proxied").await;
    Mock::given(method("GET"))
        .and(path("/api/v1/jamf-pro-version"))
        .and(header("Authorization", "Bearer proxied"))
        .respond_with(json_body(json!({ "version": "11.9.1" })))
        .expect(1)
        .mount(&proxy)
        .await;

    let auth = AuthConfig::oauth2("http://jamf.invalid", CLIENT_ID, CLIENT_SECRET);
    let config = ClientConfig::builder()
        .with_proxy(proxy.uri())
        .without_retry()
        .build();
    let client = JamfProClient::new(auth, config).await.unwrap();

    let (version, _) = client
        .jamf_pro_version
        .get(&RequestContext::background())
        .await
        .unwrap();
    assert_eq!(version.version, "11.9.1");

    let token_requests = proxy
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/api/v1/oauth/token")
        .count();
    assert_eq!(token_requests, 1);
}
