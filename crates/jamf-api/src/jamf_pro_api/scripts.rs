//! Scripts (`/api/v1/scripts`).

use bytes::Bytes;
use jamfpro_client::{Error, PagedResponse, QueryParams, RequestContext, Response, Result, Transport};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::JsonResource;
use crate::shared::{CreateResponse, HistoryResponse, TEXT_HEADERS};

pub const ENDPOINT: &str = "/api/v1/scripts";

/// When a script runs relative to the rest of a policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScriptPriority {
    Before,
    #[default]
    After,
    AtReboot,
}

/// A script and its parameter labels (`parameter4` through `parameter11`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_requirements: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<ScriptPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_contents: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter4: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter5: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter6: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter7: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter8: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter9: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter10: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter11: Option<String>,
}

impl Script {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script_contents: Some(contents.into()),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("script name is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ScriptsService {
    resource: JsonResource,
}

impl ScriptsService {
    pub fn new(transport: Transport) -> Self {
        Self {
            resource: JsonResource::new(transport, ENDPOINT, "script"),
        }
    }

    #[instrument(skip(self, ctx))]
    pub async fn list(
        &self,
        ctx: &RequestContext,
        query: Option<&QueryParams>,
    ) -> Result<(PagedResponse<Script>, Response)> {
        self.resource.list(ctx, query).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn list_all(
        &self,
        ctx: &RequestContext,
        query: Option<&QueryParams>,
    ) -> Result<(Vec<Script>, Response)> {
        self.resource.list_all(ctx, query).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn get_by_id(&self, ctx: &RequestContext, id: &str) -> Result<(Script, Response)> {
        self.resource.get(ctx, id).await
    }

    #[instrument(skip(self, ctx, script), fields(name = %script.name))]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        script: &Script,
    ) -> Result<(CreateResponse, Response)> {
        script.validate()?;
        self.resource.create(ctx, script).await
    }

    #[instrument(skip(self, ctx, script))]
    pub async fn update_by_id(
        &self,
        ctx: &RequestContext,
        id: &str,
        script: &Script,
    ) -> Result<(Script, Response)> {
        script.validate()?;
        self.resource.replace(ctx, id, script).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete_by_id(&self, ctx: &RequestContext, id: &str) -> Result<Response> {
        self.resource.delete(ctx, id).await
    }

    /// Script body as stored on the server, without the JSON wrapper.
    #[instrument(skip(self, ctx))]
    pub async fn download(&self, ctx: &RequestContext, id: &str) -> Result<(Bytes, Response)> {
        let path = format!("{}/download", self.resource.item_path(id)?);
        self.resource
            .transport()
            .get_bytes(ctx, &path, None, TEXT_HEADERS)
            .await
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
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_download_returns_raw_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/scripts/5/download"))
            .and(header("Accept", "text/plain"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "text/plain")
                    .set_body_string("#!/bin/zsh\necho hello\n"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let service = ScriptsService::new(transport(&server));
        let (contents, response) = service
            .download(&RequestContext::background(), "5")
            .await
            .unwrap();
        assert_eq!(&contents[..], b"#!/bin/zsh\necho hello\n");
        assert_eq!(response.content_type(), Some("text/plain"));
    }

    #[tokio::test]
    async fn test_create_serializes_priority_and_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .and(body_json(json!({
                "name": "Rename Computer",
                "priority": "AT_REBOOT",
                "scriptContents": "scutil --set ComputerName \"$4\"",
                "parameter4": "New name"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "9", "href": "h"})))
            .expect(1)
            .mount(&server)
            .await;

        let service = ScriptsService::new(transport(&server));
        let script = Script {
            priority: Some(ScriptPriority::AtReboot),
            parameter4: Some("New name".to_string()),
            ..Script::new("Rename Computer", "scutil --set ComputerName \"$4\"")
        };
        let (created, _) = service
            .create(&RequestContext::background(), &script)
            .await
            .unwrap();
        assert_eq!(created.id, "9");
    }

    #[tokio::test]
    async fn test_download_requires_id() {
        let service = ScriptsService::new(offline_transport());
        let err = service
            .download(&RequestContext::background(), "")
            .await
            .unwrap_err();
        assert!(matches!(&err.kind, ErrorKind::Validation(m) if m == "script ID is required"));
    }
}
