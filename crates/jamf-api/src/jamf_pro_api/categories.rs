//! Categories (`/api/v1/categories`).

use jamfpro_client::{Error, PagedResponse, QueryParams, RequestContext, Response, Result, Transport};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::JsonResource;
use crate::shared::{CreateResponse, HistoryResponse};

pub const ENDPOINT: &str = "/api/v1/categories";

/// A category. Jamf Pro accepts priorities from 1 to 20.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub priority: i32,
}

impl Category {
    pub fn new(name: impl Into<String>, priority: i32) -> Self {
        Self {
            id: None,
            name: name.into(),
            priority,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("category name is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CategoriesService {
    resource: JsonResource,
}

impl CategoriesService {
    pub fn new(transport: Transport) -> Self {
        Self {
            resource: JsonResource::new(transport, ENDPOINT, "category"),
        }
    }

    #[instrument(skip(self, ctx))]
    pub async fn list(
        &self,
        ctx: &RequestContext,
        query: Option<&QueryParams>,
    ) -> Result<(PagedResponse<Category>, Response)> {
        self.resource.list(ctx, query).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn list_all(
        &self,
        ctx: &RequestContext,
        query: Option<&QueryParams>,
    ) -> Result<(Vec<Category>, Response)> {
        self.resource.list_all(ctx, query).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn get_by_id(&self, ctx: &RequestContext, id: &str) -> Result<(Category, Response)> {
        self.resource.get(ctx, id).await
    }

    #[instrument(skip(self, ctx, category), fields(name = %category.name))]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        category: &Category,
    ) -> Result<(CreateResponse, Response)> {
        category.validate()?;
        self.resource.create(ctx, category).await
    }

    /// Replace a category. The server answers with `{id, href}`, not the
    /// updated object.
    #[instrument(skip(self, ctx, category))]
    pub async fn update_by_id(
        &self,
        ctx: &RequestContext,
        id: &str,
        category: &Category,
    ) -> Result<(CreateResponse, Response)> {
        category.validate()?;
        self.resource.replace(ctx, id, category).await
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{offline_transport, transport};
    use jamfpro_client::ErrorKind;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_update_returns_href() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/v1/categories/3"))
            .and(body_json(json!({"name": "Utilities", "priority": 9})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "3",
                "href": "https://acme.jamfcloud.com/api/v1/categories/3"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = CategoriesService::new(transport(&server));
        let (updated, _) = service
            .update_by_id(&RequestContext::background(), "3", &Category::new("Utilities", 9))
            .await
            .unwrap();
        assert_eq!(updated.href, "https://acme.jamfcloud.com/api/v1/categories/3");
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/categories/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "3",
                "name": "Utilities",
                "priority": 9
            })))
            .mount(&server)
            .await;

        let service = CategoriesService::new(transport(&server));
        let (category, _) = service
            .get_by_id(&RequestContext::background(), "3")
            .await
            .unwrap();
        assert_eq!(category.id.as_deref(), Some("3"));
        assert_eq!(category.priority, 9);
    }

    #[tokio::test]
    async fn test_missing_id_rejected() {
        let service = CategoriesService::new(offline_transport());
        let err = service
            .update_by_id(&RequestContext::background(), "", &Category::new("x", 1))
            .await
            .unwrap_err();
        assert!(matches!(&err.kind, ErrorKind::Validation(m) if m == "category ID is required"));
    }
}
