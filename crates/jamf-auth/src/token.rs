//! Bearer tokens and the token endpoint payloads.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A bearer token and when it stops being accepted.
#[derive(Clone, PartialEq, Eq)]
pub struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Usable for at least `buffer` more.
    pub fn is_valid(&self, buffer: Duration) -> bool {
        let buffer = chrono::Duration::from_std(buffer).unwrap_or(chrono::Duration::MAX);
        Utc::now()
            .checked_add_signed(buffer)
            .is_some_and(|deadline| deadline < self.expires_at)
    }
}

impl fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Response from `POST /api/v1/oauth/token`.
#[derive(Deserialize)]
pub(crate) struct OAuthTokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub expires_in: i64,
}

impl OAuthTokenResponse {
    pub(crate) fn into_token(self) -> CachedToken {
        let expires_at = Utc::now() + chrono::Duration::seconds(self.expires_in.max(0));
        CachedToken::new(self.access_token, expires_at)
    }
}

/// Response from `/api/v1/auth/token` and `/api/v1/auth/keep-alive`.
#[derive(Deserialize)]
pub(crate) struct BearerTokenResponse {
    #[serde(default)]
    pub token: String,
    pub expires: DateTime<Utc>,
}

impl BearerTokenResponse {
    pub(crate) fn into_token(self) -> CachedToken {
        CachedToken::new(self.token, self.expires)
    }
}
