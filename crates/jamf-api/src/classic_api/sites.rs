//! Sites (`/JSSResource/sites`).

use jamfpro_client::{Error, RequestContext, Response, Result, Transport};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{ClassicIdResponse, ClassicResource, Lookup};

pub const ENDPOINT: &str = "/JSSResource/sites";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "site")]
pub struct Site {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
}

impl Site {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("site name is required"));
        }
        Ok(())
    }
}

/// `<sites><size/><site/>...</sites>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SiteList {
    #[serde(default)]
    pub size: i64,
    #[serde(rename = "site", default)]
    pub sites: Vec<Site>,
}

#[derive(Debug, Clone)]
pub struct SitesService {
    resource: ClassicResource,
}

impl SitesService {
    pub fn new(transport: Transport) -> Self {
        Self {
            resource: ClassicResource::new(transport, ENDPOINT, "site"),
        }
    }

    #[instrument(skip(self, ctx))]
    pub async fn list(&self, ctx: &RequestContext) -> Result<(SiteList, Response)> {
        self.resource.list(ctx).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn get_by_id(&self, ctx: &RequestContext, id: i64) -> Result<(Site, Response)> {
        self.resource.get(ctx, Lookup::Id(id)).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn get_by_name(&self, ctx: &RequestContext, name: &str) -> Result<(Site, Response)> {
        self.resource.get(ctx, Lookup::Name(name)).await
    }

    #[instrument(skip(self, ctx, site), fields(name = %site.name))]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        site: &Site,
    ) -> Result<(ClassicIdResponse, Response)> {
        site.validate()?;
        self.resource.create(ctx, site).await
    }

    #[instrument(skip(self, ctx, site))]
    pub async fn update_by_id(
        &self,
        ctx: &RequestContext,
        id: i64,
        site: &Site,
    ) -> Result<(ClassicIdResponse, Response)> {
        site.validate()?;
        self.resource.update(ctx, Lookup::Id(id), site).await
    }

    #[instrument(skip(self, ctx, site))]
    pub async fn update_by_name(
        &self,
        ctx: &RequestContext,
        name: &str,
        site: &Site,
    ) -> Result<(ClassicIdResponse, Response)> {
        site.validate()?;
        self.resource.update(ctx, Lookup::Name(name), site).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete_by_id(&self, ctx: &RequestContext, id: i64) -> Result<Response> {
        self.resource.delete(ctx, Lookup::Id(id)).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete_by_name(&self, ctx: &RequestContext, name: &str) -> Result<Response> {
        self.resource.delete(ctx, Lookup::Name(name)).await
    }
}
