//! Jamf Pro API (JSON) services under `/api/v1`.

use std::convert::Infallible;

use jamfpro_client::{
    Error, PagedResponse, QueryParams, RequestContext, Response, Result, Transport,
};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;

use crate::shared::{
    self, DeleteMultipleRequest, HistoryNoteRequest, HistoryResponse, JSON_HEADERS,
};

pub mod buildings;
pub mod categories;
pub mod computer_inventory;
pub mod departments;
pub mod jamf_pro_version;
pub mod packages;
pub mod scripts;

pub use buildings::{Building, BuildingsService};
pub use categories::{CategoriesService, Category};
pub use computer_inventory::{ComputerInventory, ComputerInventoryService, RemoveMdmProfileResponse};
pub use departments::{Department, DepartmentsService};
pub use jamf_pro_version::{JamfProVersion, JamfProVersionService};
pub use packages::{Package, PackagesService};
pub use scripts::{Script, ScriptsService};

/// Verbs shared by collection-style Jamf Pro API resources
/// (`/api/v1/<collection>` and `/api/v1/<collection>/{id}`).
#[derive(Debug, Clone)]
pub(crate) struct JsonResource {
    transport: Transport,
    path: &'static str,
    label: &'static str,
}

impl JsonResource {
    pub(crate) fn new(transport: Transport, path: &'static str, label: &'static str) -> Self {
        Self {
            transport,
            path,
            label,
        }
    }

    pub(crate) fn transport(&self) -> &Transport {
        &self.transport
    }

    /// `{path}/{id}` after validating `id`.
    pub(crate) fn item_path(&self, id: &str) -> Result<String> {
        let id = shared::require_id(id, self.label)?;
        Ok(format!("{}/{}", self.path, shared::encode_segment(id)))
    }

    pub(crate) async fn list<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        query: Option<&QueryParams>,
    ) -> Result<(PagedResponse<T>, Response)> {
        self.transport.get(ctx, self.path, query, JSON_HEADERS).await
    }

    /// Walk every page, returning the items in server order and the last
    /// page's response.
    pub(crate) async fn list_all<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        query: Option<&QueryParams>,
    ) -> Result<(Vec<T>, Response)> {
        let mut items = Vec::new();
        let response = self
            .transport
            .get_paginated(ctx, self.path, query, JSON_HEADERS, |page: Vec<T>| {
                items.extend(page);
                Ok::<(), Infallible>(())
            })
            .await?;
        Ok((items, response))
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        id: &str,
    ) -> Result<(T, Response)> {
        let path = self.item_path(id)?;
        self.transport.get(ctx, &path, None, JSON_HEADERS).await
    }

    pub(crate) async fn create<B, T>(&self, ctx: &RequestContext, body: &B) -> Result<(T, Response)>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.transport.post(ctx, self.path, Some(body), JSON_HEADERS).await
    }

    pub(crate) async fn replace<B, T>(
        &self,
        ctx: &RequestContext,
        id: &str,
        body: &B,
    ) -> Result<(T, Response)>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let path = self.item_path(id)?;
        self.transport.put(ctx, &path, Some(body), JSON_HEADERS).await
    }

    pub(crate) async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<Response> {
        let path = self.item_path(id)?;
        let (_, response) = self
            .transport
            .delete::<IgnoredAny>(ctx, &path, None, JSON_HEADERS)
            .await?;
        Ok(response)
    }

    pub(crate) async fn delete_multiple(
        &self,
        ctx: &RequestContext,
        ids: &[String],
    ) -> Result<Response> {
        let ids: Vec<String> = ids
            .iter()
            .map(|id| shared::require_id(id, self.label).map(str::to_string))
            .collect::<Result<_>>()?;
        if ids.is_empty() {
            return Err(Error::validation(format!(
                "at least one {} ID is required",
                self.label
            )));
        }
        let path = format!("{}/delete-multiple", self.path);
        let (_, response) = self
            .transport
            .post::<_, IgnoredAny>(ctx, &path, Some(&DeleteMultipleRequest { ids }), JSON_HEADERS)
            .await?;
        Ok(response)
    }

    pub(crate) async fn history(
        &self,
        ctx: &RequestContext,
        id: &str,
        query: Option<&QueryParams>,
    ) -> Result<(HistoryResponse, Response)> {
        let path = format!("{}/history", self.item_path(id)?);
        self.transport.get(ctx, &path, query, JSON_HEADERS).await
    }

    pub(crate) async fn add_history_note(
        &self,
        ctx: &RequestContext,
        id: &str,
        note: &str,
    ) -> Result<Response> {
        let path = format!("{}/history", self.item_path(id)?);
        if note.trim().is_empty() {
            return Err(Error::validation("history note is required"));
        }
        let body = HistoryNoteRequest {
            note: note.to_string(),
        };
        let (_, response) = self
            .transport
            .post::<_, IgnoredAny>(ctx, &path, Some(&body), JSON_HEADERS)
            .await?;
        Ok(response)
    }
}
