//! Buildings (`/api/v1/buildings`).

use jamfpro_client::{Error, PagedResponse, QueryParams, RequestContext, Response, Result, Transport};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::JsonResource;
use crate::shared::{CreateResponse, HistoryResponse};

pub const ENDPOINT: &str = "/api/v1/buildings";

/// A building. `id` is assigned by the server and omitted on create.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_address1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_address2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Building {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("building name is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct BuildingsService {
    resource: JsonResource,
}

impl BuildingsService {
    pub fn new(transport: Transport) -> Self {
        Self {
            resource: JsonResource::new(transport, ENDPOINT, "building"),
        }
    }

    /// One page of buildings. `query` carries `page`, `page-size`, `sort`
    /// and an RSQL `filter`.
    #[instrument(skip(self, ctx))]
    pub async fn list(
        &self,
        ctx: &RequestContext,
        query: Option<&QueryParams>,
    ) -> Result<(PagedResponse<Building>, Response)> {
        self.resource.list(ctx, query).await
    }

    /// Every building, across all pages.
    #[instrument(skip(self, ctx))]
    pub async fn list_all(
        &self,
        ctx: &RequestContext,
        query: Option<&QueryParams>,
    ) -> Result<(Vec<Building>, Response)> {
        self.resource.list_all(ctx, query).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn get_by_id(&self, ctx: &RequestContext, id: &str) -> Result<(Building, Response)> {
        self.resource.get(ctx, id).await
    }

    #[instrument(skip(self, ctx, building), fields(name = %building.name))]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        building: &Building,
    ) -> Result<(CreateResponse, Response)> {
        building.validate()?;
        self.resource.create(ctx, building).await
    }

    #[instrument(skip(self, ctx, building))]
    pub async fn update_by_id(
        &self,
        ctx: &RequestContext,
        id: &str,
        building: &Building,
    ) -> Result<(Building, Response)> {
        building.validate()?;
        self.resource.replace(ctx, id, building).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete_by_id(&self, ctx: &RequestContext, id: &str) -> Result<Response> {
        self.resource.delete(ctx, id).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete_multiple(&self, ctx: &RequestContext, ids: &[String]) -> Result<Response> {
        self.resource.delete_multiple(ctx, ids).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn get_history(
        &self,
        ctx: &RequestContext,
        id: &str,
        query: Option<&QueryParams>,
    ) -> Result<(HistoryResponse, Response)> {
        self.resource.history(ctx, id, query).await
    }

    #[instrument(skip(self, ctx, note))]
    pub async fn add_history_note(
        &self,
        ctx: &RequestContext,
        id: &str,
        note: &str,
    ) -> Result<Response> {
        self.resource.add_history_note(ctx, id, note).await
    }
}
