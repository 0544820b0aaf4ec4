//! Network segments (`/JSSResource/networksegments`).

use jamfpro_client::{Error, RequestContext, Response, Result, Transport};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{ClassicIdResponse, ClassicResource, Lookup};

pub const ENDPOINT: &str = "/JSSResource/networksegments";

/// An IPv4 range with optional building, department and distribution
/// point overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "network_segment")]
pub struct NetworkSegment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub starting_address: String,
    #[serde(default)]
    pub ending_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution_server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swu_server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default)]
    pub override_buildings: bool,
    #[serde(default)]
    pub override_departments: bool,
}

impl NetworkSegment {
    pub fn new(
        name: impl Into<String>,
        starting_address: impl Into<String>,
        ending_address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            starting_address: starting_address.into(),
            ending_address: ending_address.into(),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("network segment name is required"));
        }
        if self.starting_address.trim().is_empty() || self.ending_address.trim().is_empty() {
            return Err(Error::validation(
                "network segment starting and ending addresses are required",
            ));
        }
        Ok(())
    }
}

/// List entry; the list endpoint omits overrides and distribution settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NetworkSegmentSummary {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub starting_address: String,
    #[serde(default)]
    pub ending_address: String,
}

/// `<network_segments><size/><network_segment/>...</network_segments>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NetworkSegmentList {
    #[serde(default)]
    pub size: i64,
    #[serde(rename = "network_segment", default)]
    pub network_segments: Vec<NetworkSegmentSummary>,
}

#[derive(Debug, Clone)]
pub struct NetworkSegmentsService {
    resource: ClassicResource,
}

impl NetworkSegmentsService {
    pub fn new(transport: Transport) -> Self {
        Self {
            resource: ClassicResource::new(transport, ENDPOINT, "network segment"),
        }
    }

    #[instrument(skip(self, ctx))]
    pub async fn list(&self, ctx: &RequestContext) -> Result<(NetworkSegmentList, Response)> {
        self.resource.list(ctx).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn get_by_id(
        &self,
        ctx: &RequestContext,
        id: i64,
    ) -> Result<(NetworkSegment, Response)> {
        self.resource.get(ctx, Lookup::Id(id)).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn get_by_name(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> Result<(NetworkSegment, Response)> {
        self.resource.get(ctx, Lookup::Name(name)).await
    }

    #[instrument(skip(self, ctx, segment), fields(name = %segment.name))]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        segment: &NetworkSegment,
    ) -> Result<(ClassicIdResponse, Response)> {
        segment.validate()?;
        self.resource.create(ctx, segment).await
    }

    #[instrument(skip(self, ctx, segment))]
    pub async fn update_by_id(
        &self,
        ctx: &RequestContext,
        id: i64,
        segment: &NetworkSegment,
    ) -> Result<(ClassicIdResponse, Response)> {
        segment.validate()?;
        self.resource.update(ctx, Lookup::Id(id), segment).await
    }

    #[instrument(skip(self, ctx, segment))]
    pub async fn update_by_name(
        &self,
        ctx: &RequestContext,
        name: &str,
        segment: &NetworkSegment,
    ) -> Result<(ClassicIdResponse, Response)> {
        segment.validate()?;
        self.resource.update(ctx, Lookup::Name(name), segment).await
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
