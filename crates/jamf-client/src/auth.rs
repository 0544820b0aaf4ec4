//! Bearer token source used by the transport.

use async_trait::async_trait;

use crate::error::Result;

/// Supplies bearer tokens to the [`Transport`](crate::Transport).
///
/// Implementations must be safe to call from many tasks at once. When
/// several requests see a 401 for the same token, `refresh` should fetch
/// a replacement only once.
#[async_trait]
pub trait TokenProvider: Send + Sync + std::fmt::Debug {
    /// A token valid for at least the configured refresh buffer.
    async fn token(&self) -> Result<String>;

    /// Replace `rejected` after the server refused it. Returns the new token,
    /// or the current one if another task already refreshed it.
    async fn refresh(&self, rejected: &str) -> Result<String>;

    /// Revoke the cached token on the server and forget it.
    async fn invalidate(&self) -> Result<()>;

    /// Extend the cached token's lifetime on the server.
    async fn keep_alive(&self) -> Result<()>;
}

/// A fixed token, for tests and short scripts.
#[derive(Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticToken")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> Result<String> {
        Ok(self.token.clone())
    }

    async fn refresh(&self, _rejected: &str) -> Result<String> {
        Ok(self.token.clone())
    }

    async fn invalidate(&self) -> Result<()> {
        Ok(())
    }

    async fn keep_alive(&self) -> Result<()> {
        Ok(())
    }
}
