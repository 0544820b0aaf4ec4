//! Computer inventory (`/api/v1/computers-inventory`).
//!
//! Inventory records are large and sectioned. The commonly used sections
//! are typed; everything else the server sends is kept in
//! [`ComputerInventory::other_sections`] so a PATCH round trip loses nothing.

use jamfpro_client::{
    Error, PagedResponse, QueryParams, RequestContext, Response, Result, RsqlBuilder, Transport,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::JsonResource;
use crate::shared::JSON_HEADERS;

pub const ENDPOINT: &str = "/api/v1/computers-inventory";

/// Values for the `section` query parameter.
pub mod section {
    pub const ALL: &str = "ALL";
    pub const GENERAL: &str = "GENERAL";
    pub const HARDWARE: &str = "HARDWARE";
    pub const OPERATING_SYSTEM: &str = "OPERATING_SYSTEM";
    pub const USER_AND_LOCATION: &str = "USER_AND_LOCATION";
    pub const APPLICATIONS: &str = "APPLICATIONS";
    pub const DISK_ENCRYPTION: &str = "DISK_ENCRYPTION";
    pub const SECURITY: &str = "SECURITY";
    pub const EXTENSION_ATTRIBUTES: &str = "EXTENSION_ATTRIBUTES";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputerInventory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general: Option<General>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware: Option<Hardware>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_system: Option<OperatingSystem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_and_location: Option<UserAndLocation>,
    /// Sections without a typed field, keyed by their JSON name.
    #[serde(flatten)]
    pub other_sections: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct General {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reported_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jamf_binary_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervised: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_contact_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_enrolled_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<SiteRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_approved_mdm: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declarative_device_management_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension_attributes: Vec<ExtensionAttribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hardware {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor_architecture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_ram_megabytes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_capacity_percent: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apple_silicon: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension_attributes: Vec<ExtensionAttribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatingSystem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplemental_build_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rapid_security_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_vault2_status: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension_attributes: Vec<ExtensionAttribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAndLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension_attributes: Vec<ExtensionAttribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionAttribute {
    #[serde(default)]
    pub definition_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub values: Vec<String>,
}

/// Result of `POST /{id}/remove-mdm-profile`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveMdmProfileResponse {
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub command_uuid: String,
}

#[derive(Debug, Clone)]
pub struct ComputerInventoryService {
    resource: JsonResource,
}

impl ComputerInventoryService {
    pub fn new(transport: Transport) -> Self {
        Self {
            resource: JsonResource::new(transport, ENDPOINT, "computer"),
        }
    }

    /// One page of inventory. `query` accepts `section`, `filter`, `sort`,
    /// `page` and `page-size`.
    #[instrument(skip(self, ctx))]
    pub async fn list(
        &self,
        ctx: &RequestContext,
        query: Option<&QueryParams>,
    ) -> Result<(PagedResponse<ComputerInventory>, Response)> {
        self.resource.list(ctx, query).await
    }

    /// Every matching record across all pages. A non-empty `filter`
    /// replaces any `filter` already in `query`.
    #[instrument(skip(self, ctx, filter))]
    pub async fn list_all(
        &self,
        ctx: &RequestContext,
        query: Option<&QueryParams>,
        filter: Option<&RsqlBuilder>,
    ) -> Result<(Vec<ComputerInventory>, Response)> {
        let mut params = query.cloned().unwrap_or_default();
        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            params.insert("filter".to_string(), filter.build());
        }
        self.resource.list_all(ctx, Some(&params)).await
    }

    /// A single record with every section.
    #[instrument(skip(self, ctx))]
    pub async fn get_by_id(
        &self,
        ctx: &RequestContext,
        id: &str,
    ) -> Result<(ComputerInventory, Response)> {
        self.resource.get(ctx, id).await
    }

    /// Merge-patch the record; only fields set on `update` are sent.
    #[instrument(skip(self, ctx, update))]
    pub async fn update_by_id(
        &self,
        ctx: &RequestContext,
        id: &str,
        update: &ComputerInventory,
    ) -> Result<(ComputerInventory, Response)> {
        let path = self.resource.item_path(id)?;
        if *update == ComputerInventory::default() {
            return Err(Error::validation("request is required"));
        }
        self.resource
            .transport()
            .patch(ctx, &path, Some(update), JSON_HEADERS)
            .await
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete_by_id(&self, ctx: &RequestContext, id: &str) -> Result<Response> {
        self.resource.delete(ctx, id).await
    }

    /// Queue an MDM command that removes the management profile.
    #[instrument(skip(self, ctx))]
    pub async fn remove_mdm_profile(
        &self,
        ctx: &RequestContext,
        id: &str,
    ) -> Result<(RemoveMdmProfileResponse, Response)> {
        let path = format!("{}/remove-mdm-profile", self.resource.item_path(id)?);
        self.resource
            .transport()
            .post::<(), _>(ctx, &path, None, JSON_HEADERS)
            .await
    }
}
