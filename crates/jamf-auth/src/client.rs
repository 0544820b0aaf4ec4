//! HTTP calls against the Jamf Pro token endpoints.

use std::time::Duration;

use tracing::instrument;

use crate::config::{AuthConfig, Credentials};
use crate::error::{Error, ErrorKind, Result};
use crate::token::{BearerTokenResponse, CachedToken, OAuthTokenResponse};

pub const OAUTH_TOKEN_ENDPOINT: &str = "/api/v1/oauth/token";
pub const BEARER_TOKEN_ENDPOINT: &str = "/api/v1/auth/token";
pub const INVALIDATE_TOKEN_ENDPOINT: &str = "/api/v1/auth/invalidate-token";
pub const KEEP_ALIVE_TOKEN_ENDPOINT: &str = "/api/v1/auth/keep-alive";

/// Timeout for token endpoint calls.
pub const AUTH_TIMEOUT: Duration = Duration::from_secs(30);

/// Talks to the token endpoints with its own connection pool, separate from
/// the API transport.
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl AuthClient {
    /// Build a client for a validated config.
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let credentials = config.credentials()?;
        let http = reqwest::Client::builder()
            .timeout(AUTH_TIMEOUT)
            .user_agent(jamfpro_client::USER_AGENT)
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Http(e.to_string()), e))?;
        Ok(Self {
            http,
            base_url: jamfpro_client::normalize_base_url(&config.instance_domain),
            credentials,
        })
    }

    /// Send token calls through `http` instead of the default client, so they
    /// share the proxy and TLS settings of the API transport.
    pub fn with_http(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Point at another base URL, such as a mock server.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = jamfpro_client::normalize_base_url(base_url);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Obtain a new token with the configured credentials.
    pub async fn fetch_token(&self) -> Result<CachedToken> {
        match &self.credentials {
            Credentials::OAuth2 {
                client_id,
                client_secret,
            } => self.fetch_oauth2(client_id, client_secret).await,
            Credentials::Basic { username, password } => {
                self.fetch_basic(username, password).await
            }
        }
    }

    #[instrument(skip(self, client_secret))]
    async fn fetch_oauth2(&self, client_id: &str, client_secret: &str) -> Result<CachedToken> {
        let body = serde_urlencoded::to_string([
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("grant_type", "client_credentials"),
        ])?;

        let response = self
            .http
            .post(self.endpoint(OAUTH_TOKEN_ENDPOINT))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;
        let body = check_status(response, "oauth2 token request").await?;

        let parsed: OAuthTokenResponse = serde_json::from_slice(&body)?;
        if parsed.access_token.is_empty() {
            return Err(Error::new(ErrorKind::TokenRequest(
                "empty access_token in oauth2 response".to_string(),
            )));
        }
        Ok(parsed.into_token())
    }

    #[instrument(skip(self, password))]
    async fn fetch_basic(&self, username: &str, password: &str) -> Result<CachedToken> {
        let response = self
            .http
            .post(self.endpoint(BEARER_TOKEN_ENDPOINT))
            .basic_auth(username, Some(password))
            .send()
            .await?;
        let body = check_status(response, "basic auth token request").await?;

        let parsed: BearerTokenResponse = serde_json::from_slice(&body)?;
        if parsed.token.is_empty() {
            return Err(Error::new(ErrorKind::TokenRequest(
                "empty token in basic auth response".to_string(),
            )));
        }
        Ok(parsed.into_token())
    }

    /// Revoke `token` on the server.
    #[instrument(skip_all)]
    pub async fn invalidate(&self, token: &str) -> Result<()> {
        let response = self
            .http
            .post(self.endpoint(INVALIDATE_TOKEN_ENDPOINT))
            .bearer_auth(token)
            .send()
            .await?;
        check_status(response, "invalidate token").await?;
        Ok(())
    }

    /// Exchange `token` for one with a later expiry.
    #[instrument(skip_all)]
    pub async fn keep_alive(&self, token: &str) -> Result<CachedToken> {
        let response = self
            .http
            .post(self.endpoint(KEEP_ALIVE_TOKEN_ENDPOINT))
            .bearer_auth(token)
            .send()
            .await?;
        let body = check_status(response, "keep-alive").await?;
        let parsed: BearerTokenResponse = serde_json::from_slice(&body)?;
        Ok(parsed.into_token())
    }
}

/// Read the body, failing with the status and a short excerpt on non-2xx.
async fn check_status(response: reqwest::Response, operation: &str) -> Result<bytes::Bytes> {
    let status = response.status();
    let body = response.bytes().await?;
    if status.is_success() {
        return Ok(body);
    }
    let excerpt: String = String::from_utf8_lossy(&body).chars().take(200).collect();
    Err(Error::new(ErrorKind::TokenRequest(format!(
        "{operation} failed: {} {}",
        status.as_u16(),
        excerpt.trim()
    ))))
}
