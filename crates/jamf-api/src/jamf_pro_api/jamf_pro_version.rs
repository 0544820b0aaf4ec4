//! Jamf Pro server version (`/api/v1/jamf-pro-version`).

use jamfpro_client::{RequestContext, Response, Result, Transport};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::shared::JSON_HEADERS;

pub const ENDPOINT: &str = "/api/v1/jamf-pro-version";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JamfProVersion {
    /// e.g. `11.4.1-t1712591696`
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone)]
pub struct JamfProVersionService {
    transport: Transport,
}

impl JamfProVersionService {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    #[instrument(skip(self, ctx))]
    pub async fn get(&self, ctx: &RequestContext) -> Result<(JamfProVersion, Response)> {
        self.transport.get(ctx, ENDPOINT, None, JSON_HEADERS).await
    }
}
