//! Packages (`/api/v1/packages`).
//!
//! Creating a package is two steps: [`PackagesService::create`] registers the
//! metadata, then [`PackagesService::upload`] streams the file itself.

use std::path::Path;

use jamfpro_client::{
    Error, MultipartUpload, PagedResponse, QueryParams, RequestContext, Response, Result,
    Transport,
};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::JsonResource;
use crate::shared::{CreateResponse, HistoryResponse, JSON_HEADERS};

pub const ENDPOINT: &str = "/api/v1/packages";

/// Multipart field name Jamf Pro expects for package and manifest files.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub package_name: String,
    #[serde(default)]
    pub file_name: String,
    /// `-1` for no category.
    #[serde(default)]
    pub category_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_requirements: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_user_template: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_existing_users: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swu: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reboot_required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_heal_notify: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_healing_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_install: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_package_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suppress_updates: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_transfer_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_conflicts: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suppress_from_dock: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suppress_eula: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suppress_registration: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_installer_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Package {
    /// Metadata with the flags Jamf Pro requires on create set to `false`.
    pub fn new(package_name: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            file_name: file_name.into(),
            category_id: "-1".to_string(),
            priority: 10,
            fill_user_template: Some(false),
            reboot_required: Some(false),
            os_install: Some(false),
            suppress_updates: Some(false),
            suppress_from_dock: Some(false),
            suppress_eula: Some(false),
            suppress_registration: Some(false),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.package_name.trim().is_empty() {
            return Err(Error::validation("package name is required"));
        }
        if self.file_name.trim().is_empty() {
            return Err(Error::validation("package file name is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PackagesService {
    resource: JsonResource,
}

impl PackagesService {
    pub fn new(transport: Transport) -> Self {
        Self {
            resource: JsonResource::new(transport, ENDPOINT, "package"),
        }
    }

    #[instrument(skip(self, ctx))]
    pub async fn list(
        &self,
        ctx: &RequestContext,
        query: Option<&QueryParams>,
    ) -> Result<(PagedResponse<Package>, Response)> {
        self.resource.list(ctx, query).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn list_all(
        &self,
        ctx: &RequestContext,
        query: Option<&QueryParams>,
    ) -> Result<(Vec<Package>, Response)> {
        self.resource.list_all(ctx, query).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn get_by_id(&self, ctx: &RequestContext, id: &str) -> Result<(Package, Response)> {
        self.resource.get(ctx, id).await
    }

    /// Register package metadata. The file is sent separately with
    /// [`upload`](Self::upload).
    #[instrument(skip(self, ctx, package), fields(name = %package.package_name))]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        package: &Package,
    ) -> Result<(CreateResponse, Response)> {
        package.validate()?;
        self.resource.create(ctx, package).await
    }

    #[instrument(skip(self, ctx, package))]
    pub async fn update_by_id(
        &self,
        ctx: &RequestContext,
        id: &str,
        package: &Package,
    ) -> Result<(Package, Response)> {
        package.validate()?;
        self.resource.replace(ctx, id, package).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete_by_id(&self, ctx: &RequestContext, id: &str) -> Result<Response> {
        self.resource.delete(ctx, id).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete_multiple(&self, ctx: &RequestContext, ids: &[String]) -> Result<Response> {
        self.resource.delete_multiple(ctx, ids).await
    }

    /// Stream a package file to an existing package record.
    ///
    /// The upload is always sent in the `file` field; any progress callback
    /// on `upload` is kept.
    #[instrument(skip(self, ctx, upload), fields(file = %upload.file_name, size = upload.size))]
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        id: &str,
        mut upload: MultipartUpload,
    ) -> Result<(CreateResponse, Response)> {
        let path = format!("{}/upload", self.resource.item_path(id)?);
        upload.field_name = FILE_FIELD.to_string();
        let result = self
            .resource
            .transport()
            .post_multipart(ctx, &path, upload, JSON_HEADERS)
            .await?;
        info!(package_id = id, "Package file uploaded");
        Ok(result)
    }

    /// [`upload`](Self::upload) from a file on disk.
    pub async fn upload_file(
        &self,
        ctx: &RequestContext,
        id: &str,
        file: impl AsRef<Path>,
    ) -> Result<(CreateResponse, Response)> {
        let upload = open_file(file.as_ref()).await?;
        self.upload(ctx, id, upload).await
    }

    /// Attach a manifest plist to a package.
    #[instrument(skip(self, ctx, manifest), fields(file = %manifest.file_name))]
    pub async fn assign_manifest(
        &self,
        ctx: &RequestContext,
        id: &str,
        mut manifest: MultipartUpload,
    ) -> Result<(CreateResponse, Response)> {
        let path = format!("{}/manifest", self.resource.item_path(id)?);
        manifest.field_name = FILE_FIELD.to_string();
        self.resource
            .transport()
            .post_multipart(ctx, &path, manifest, JSON_HEADERS)
            .await
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete_manifest(&self, ctx: &RequestContext, id: &str) -> Result<Response> {
        let path = format!("{}/manifest", self.resource.item_path(id)?);
        let (_, response) = self
            .resource
            .transport()
            .delete::<IgnoredAny>(ctx, &path, None, JSON_HEADERS)
            .await?;
        Ok(response)
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

async fn open_file(file: &Path) -> Result<MultipartUpload> {
    if file.as_os_str().is_empty() {
        return Err(Error::validation("file path is required"));
    }
    MultipartUpload::from_path(FILE_FIELD, file).await
}
