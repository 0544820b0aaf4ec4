//! Cached token lifecycle with single-flight refresh.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::client::AuthClient;
use crate::config::AuthConfig;
use crate::error::Result;
use crate::token::CachedToken;

/// Owns the bearer token for one Jamf Pro instance.
///
/// The cache lock is held across the network fetch, so tasks that find the
/// token expired at the same moment wait for one fetch and then share its
/// result.
pub struct TokenManager {
    client: AuthClient,
    cache: Mutex<Option<CachedToken>>,
    buffer: Duration,
    hide_sensitive_data: bool,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("client", &self.client)
            .field("cache", &"[REDACTED]")
            .field("buffer", &self.buffer)
            .field("hide_sensitive_data", &self.hide_sensitive_data)
            .finish()
    }
}

impl TokenManager {
    /// Validate `config` and prepare a manager. No token is fetched yet.
    pub fn new(config: &AuthConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_client(AuthClient::new(config)?, config))
    }

    /// Use a pre-built [`AuthClient`], e.g. one pointed at a test server.
    pub fn with_client(client: AuthClient, config: &AuthConfig) -> Self {
        Self {
            client,
            cache: Mutex::new(None),
            buffer: config.token_refresh_buffer,
            hide_sensitive_data: config.hide_sensitive_data,
        }
    }

    /// Build a manager and fetch the first token, so bad credentials fail
    /// at startup.
    pub async fn connect(config: &AuthConfig) -> Result<Self> {
        config.validate()?;
        Self::connect_with_client(AuthClient::new(config)?, config).await
    }

    /// Like [`connect`](Self::connect), over a pre-built [`AuthClient`].
    pub async fn connect_with_client(client: AuthClient, config: &AuthConfig) -> Result<Self> {
        let manager = Self::with_client(client, config);
        manager.current_token().await?;
        info!(
            auth_method = %config.auth_method,
            instance = manager.client.base_url(),
            "Jamf Pro API authentication configured"
        );
        Ok(manager)
    }

    /// A token valid for at least the refresh buffer, fetching one if needed.
    #[instrument(skip(self))]
    pub async fn current_token(&self) -> Result<String> {
        let mut cache = self.cache.lock().await;
        if let Some(token) = cache.as_ref().filter(|t| t.is_valid(self.buffer)) {
            return Ok(token.token().to_string());
        }
        let token = self.fetch().await?;
        let value = token.token().to_string();
        *cache = Some(token);
        Ok(value)
    }

    /// Replace `rejected`, unless another task already did.
    #[instrument(skip_all)]
    pub async fn force_refresh(&self, rejected: &str) -> Result<String> {
        let mut cache = self.cache.lock().await;
        if let Some(token) = cache.as_ref() {
            if token.token() != rejected && token.is_valid(self.buffer) {
                debug!("Token already refreshed by another request");
                return Ok(token.token().to_string());
            }
        }
        let token = self.fetch().await?;
        let value = token.token().to_string();
        *cache = Some(token);
        Ok(value)
    }

    /// Revoke the cached token on the server and clear it. A no-op when no
    /// token is cached.
    #[instrument(skip(self))]
    pub async fn invalidate_token(&self) -> Result<()> {
        let mut cache = self.cache.lock().await;
        let Some(token) = cache.as_ref() else {
            return Ok(());
        };
        self.client.invalidate(token.token()).await?;
        *cache = None;
        info!("Bearer token invalidated");
        Ok(())
    }

    /// Extend the cached token's lifetime. A no-op when no token is cached.
    #[instrument(skip(self))]
    pub async fn keep_alive_token(&self) -> Result<()> {
        let mut cache = self.cache.lock().await;
        let Some(token) = cache.as_ref() else {
            return Ok(());
        };
        let renewed = self.client.keep_alive(token.token()).await?;
        info!(
            new_expiry = %renewed.expires_at(),
            token = self.loggable(renewed.token()),
            "Bearer token keep-alive successful"
        );
        *cache = Some(renewed);
        Ok(())
    }

    /// Expiry of the cached token, if any.
    pub async fn expires_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.cache.lock().await.as_ref().map(CachedToken::expires_at)
    }

    async fn fetch(&self) -> Result<CachedToken> {
        let token = self.client.fetch_token().await?;
        info!(
            expiry = %token.expires_at(),
            token = self.loggable(token.token()),
            "Bearer token obtained"
        );
        Ok(token)
    }

    fn loggable<'a>(&self, token: &'a str) -> &'a str {
        if self.hide_sensitive_data {
            "[REDACTED]"
        } else {
            token
        }
    }
}

#[async_trait]
impl jamfpro_client::TokenProvider for TokenManager {
    async fn token(&self) -> jamfpro_client::Result<String> {
        self.current_token().await.map_err(Into::into)
    }

    async fn refresh(&self, rejected: &str) -> jamfpro_client::Result<String> {
        self.force_refresh(rejected).await.map_err(Into::into)
    }

    async fn invalidate(&self) -> jamfpro_client::Result<()> {
        self.invalidate_token().await.map_err(Into::into)
    }

    async fn keep_alive(&self) -> jamfpro_client::Result<()> {
        self.keep_alive_token().await.map_err(Into::into)
    }
}
