use jamfpro_sdk::{AuthConfig, ClientConfig, JamfProClient};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CLIENT_ID: &str = "integration-client";
pub const CLIENT_SECRET: &str = "integration-secret";

/// OAuth2 credentials pointed at `server`.
pub fn oauth_config(server: &MockServer) -> AuthConfig {
    AuthConfig::oauth2(server.uri(), CLIENT_ID, CLIENT_SECRET)
}

/// Default transport settings with retries disabled.
pub fn client_config(server: &MockServer) -> ClientConfig {
    ClientConfig::builder()
        .with_base_url(server.uri())
        .without_retry()
        .build()
}

/// Serve `token` from the OAuth2 endpoint, valid for twenty minutes.
pub async fn mount_oauth(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/v1/oauth/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "scope": "api-role:2",
            "token_type": "Bearer",
            "expires_in": 1199
        })))
        .mount(server)
        .await;
}

/// An authenticated client whose token is `token`.
pub async fn connected_client(server: &MockServer, token: &str) -> JamfProClient {
    mount_oauth(server, token).await;
    JamfProClient::new(oauth_config(server), client_config(server))
        .await
        .expect("client should authenticate against the mock server")
}

pub fn json_body(value: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("Content-Type", "application/json")
        .set_body_json(value)
}

pub fn xml_body(status: u16, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(status)
        .insert_header("Content-Type", "application/xml")
        .set_body_string(body.to_string())
}
