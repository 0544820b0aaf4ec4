//! # jamfpro-auth
//!
//! Bearer token acquisition and lifecycle for the Jamf Pro API.
//!
//! ## Security
//!
//! - Client secrets, passwords and tokens are redacted in Debug output
//! - Tracing spans skip credential parameters
//! - Tokens are logged as `[REDACTED]` when `hide_sensitive_data` is set
//!
//! ## Supported Authentication Methods
//!
//! - **OAuth2 client credentials** - API client ID and secret exchanged at `/api/v1/oauth/token`
//! - **Basic** - username and password exchanged at `/api/v1/auth/token`
//!
//! ## Example
//!
//! ```rust,ignore
//! use jamfpro_auth::{AuthConfig, TokenManager};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), jamfpro_auth::Error> {
//!     // From INSTANCE_DOMAIN, AUTH_METHOD, CLIENT_ID, CLIENT_SECRET ...
//!     let config = AuthConfig::from_env()?;
//!
//!     // Fetches the first token so bad credentials fail here
//!     let manager = TokenManager::connect(&config).await?;
//!     let token = manager.current_token().await?;
//!
//!     manager.invalidate_token().await?;
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod manager;
mod token;

pub use client::{
    AuthClient, AUTH_TIMEOUT, BEARER_TOKEN_ENDPOINT, INVALIDATE_TOKEN_ENDPOINT, KEEP_ALIVE_TOKEN_ENDPOINT,
    OAUTH_TOKEN_ENDPOINT,
};
pub use config::{AuthConfig, AuthMethod, Credentials, DEFAULT_REFRESH_BUFFER};
pub use error::{Error, ErrorKind, Result};
pub use manager::TokenManager;
pub use token::CachedToken;
