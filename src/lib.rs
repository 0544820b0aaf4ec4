//! # jamfpro-sdk
//!
//! A Jamf Pro API client library for Rust, covering the JSON Jamf Pro API
//! (`/api/v1/...`) and the XML Classic API (`/JSSResource/...`).
//!
//! ## Security
//!
//! - Client secrets, passwords and tokens are redacted in Debug output
//! - Tracing spans skip credential parameters and request bodies
//! - API error messages are sanitized before they reach callers
//!
//! ## Crates
//!
//! - **jamfpro-client** - Transport: auth injection, retry, throttling, pagination, multipart, RSQL
//! - **jamfpro-auth** - OAuth2 client credentials and basic auth, token lifecycle
//! - **jamfpro-api** - Resource services for both API surfaces
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use jamfpro_sdk::{JamfProClient, RequestContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), jamfpro_sdk::Error> {
//!     // INSTANCE_DOMAIN, AUTH_METHOD, CLIENT_ID, CLIENT_SECRET ...
//!     let client = JamfProClient::from_env().await?;
//!     let ctx = RequestContext::with_timeout(std::time::Duration::from_secs(60));
//!
//!     let filter = client
//!         .transport()
//!         .rsql_builder()
//!         .equal_to("general.name", "MacBook Pro");
//!     let (computers, _) = client
//!         .computer_inventory
//!         .list_all(&ctx, None, Some(&filter))
//!         .await?;
//!
//!     for computer in computers {
//!         println!("{:?}", computer.id);
//!     }
//!
//!     client.invalidate_token(&ctx).await?;
//!     Ok(())
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use tracing::info;

// Re-export all crates for convenient access
pub use jamfpro_api as api;
pub use jamfpro_auth as auth;
pub use jamfpro_client as client;

// Re-export commonly used types at the top level
pub use jamfpro_api::{
    BuildingsService, CategoriesService, ComputerInventoryService, DepartmentsService,
    JamfProVersionService, NetworkSegmentsService, PackagesService, ScriptsService, SitesService,
};
pub use jamfpro_auth::{AuthClient, AuthConfig, AuthMethod, TokenManager};
pub use jamfpro_client::{
    ClientConfig, Error, ErrorKind, QueryParams, RequestContext, Response, Result, RsqlBuilder,
    Transport,
};

/// Every resource service over one authenticated transport.
///
/// There is no global client; construct one and pass it where it is needed.
/// Cloning is cheap and shares the token cache and connection pool.
#[derive(Debug, Clone)]
pub struct JamfProClient {
    transport: Transport,

    // Jamf Pro API
    pub buildings: BuildingsService,
    pub categories: CategoriesService,
    pub computer_inventory: ComputerInventoryService,
    pub departments: DepartmentsService,
    pub jamf_pro_version: JamfProVersionService,
    pub packages: PackagesService,
    pub scripts: ScriptsService,

    // Classic API
    pub sites: SitesService,
    pub network_segments: NetworkSegmentsService,
}

impl JamfProClient {
    /// Validate `auth`, fetch the first token, and build every service.
    ///
    /// Fails fast on bad credentials. When `config` sets a base URL override
    /// the token endpoints are called there too.
    pub async fn new(mut auth: AuthConfig, config: ClientConfig) -> Result<Self> {
        auth.validate()?;
        if let Some(base_url) = &config.base_url_override {
            auth.instance_domain = base_url.clone();
        }

        // Token calls go over the same proxy and TLS settings as the API.
        let http = config
            .http_client_builder()?
            .timeout(jamfpro_auth::AUTH_TIMEOUT)
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;
        let auth_client = AuthClient::new(&auth)?.with_http(http);
        let tokens = TokenManager::connect_with_client(auth_client, &auth).await?;
        let transport = Transport::new(&auth.instance_domain, Arc::new(tokens), config)?;
        info!(
            base_url = transport.base_url(),
            auth_method = %auth.auth_method,
            "Jamf Pro client ready"
        );
        Ok(Self::with_transport(transport))
    }

    /// Build the services over an existing transport.
    pub fn with_transport(transport: Transport) -> Self {
        Self {
            buildings: BuildingsService::new(transport.clone()),
            categories: CategoriesService::new(transport.clone()),
            computer_inventory: ComputerInventoryService::new(transport.clone()),
            departments: DepartmentsService::new(transport.clone()),
            jamf_pro_version: JamfProVersionService::new(transport.clone()),
            packages: PackagesService::new(transport.clone()),
            scripts: ScriptsService::new(transport.clone()),
            sites: SitesService::new(transport.clone()),
            network_segments: NetworkSegmentsService::new(transport.clone()),
            transport,
        }
    }

    /// Credentials from [`AuthConfig::from_env`], transport settings from
    /// [`ClientConfig::from_env`].
    pub async fn from_env() -> Result<Self> {
        let auth = AuthConfig::from_env()?;
        Self::new(auth, ClientConfig::from_env()?).await
    }

    /// Credentials from a JSON file, transport settings from the environment.
    pub async fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        let auth = AuthConfig::from_file(path)?;
        Self::new(auth, ClientConfig::from_env()?).await
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Revoke the current bearer token. A no-op if none is cached.
    pub async fn invalidate_token(&self, ctx: &RequestContext) -> Result<()> {
        self.transport.invalidate_token(ctx).await
    }

    /// Extend the current bearer token. A no-op if none is cached.
    pub async fn keep_alive_token(&self, ctx: &RequestContext) -> Result<()> {
        self.transport.keep_alive_token(ctx).await
    }
}
