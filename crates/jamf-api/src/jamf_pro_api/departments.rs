//! Departments (`/api/v1/departments`).

use jamfpro_client::{Error, PagedResponse, QueryParams, RequestContext, Response, Result, Transport};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::JsonResource;
use crate::shared::{CreateResponse, HistoryResponse};

pub const ENDPOINT: &str = "/api/v1/departments";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

impl Department {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DepartmentsService {
    resource: JsonResource,
}

impl DepartmentsService {
    pub fn new(transport: Transport) -> Self {
        Self {
            resource: JsonResource::new(transport, ENDPOINT, "department"),
        }
    }

    #[instrument(skip(self, ctx))]
    pub async fn list(
        &self,
        ctx: &RequestContext,
        query: Option<&QueryParams>,
    ) -> Result<(PagedResponse<Department>, Response)> {
        self.resource.list(ctx, query).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn list_all(
        &self,
        ctx: &RequestContext,
        query: Option<&QueryParams>,
    ) -> Result<(Vec<Department>, Response)> {
        self.resource.list_all(ctx, query).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn get_by_id(&self, ctx: &RequestContext, id: &str) -> Result<(Department, Response)> {
        self.resource.get(ctx, id).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn create(&self, ctx: &RequestContext, name: &str) -> Result<(CreateResponse, Response)> {
        let department = named(name)?;
        self.resource.create(ctx, &department).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn update_by_id(
        &self,
        ctx: &RequestContext,
        id: &str,
        name: &str,
    ) -> Result<(Department, Response)> {
        let department = named(name)?;
        self.resource.replace(ctx, id, &department).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete_by_id(&self, ctx: &RequestContext, id: &str) -> Result<Response> {
        self.resource.delete(ctx, id).await
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

fn named(name: &str) -> Result<Department> {
    if name.trim().is_empty() {
        return Err(Error::validation("department name is required"));
    }
    Ok(Department::new(name.trim()))
}
