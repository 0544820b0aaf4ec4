//! # jamfpro-api
//!
//! Typed resource services for the Jamf Pro API (JSON, `/api/v1`) and the
//! Classic API (XML, `/JSSResource`).
//!
//! Every service wraps a shared [`Transport`](jamfpro_client::Transport),
//! validates its arguments before any network call, and returns the decoded
//! value together with the raw [`Response`](jamfpro_client::Response).
//!
//! ## Example
//!
//! ```rust,ignore
//! use jamfpro_api::BuildingsService;
//! use jamfpro_client::RequestContext;
//!
//! let buildings = BuildingsService::new(transport.clone());
//! let ctx = RequestContext::with_timeout(std::time::Duration::from_secs(30));
//! let (all, _response) = buildings.list_all(&ctx, None).await?;
//! ```

pub mod classic_api;
pub mod jamf_pro_api;
pub mod shared;

pub use classic_api::{NetworkSegment, NetworkSegmentsService, Site, SitesService};
pub use jamf_pro_api::{
    Building, BuildingsService, CategoriesService, Category, ComputerInventory,
    ComputerInventoryService, Department, DepartmentsService, JamfProVersion,
    JamfProVersionService, Package, PackagesService, RemoveMdmProfileResponse, Script,
    ScriptsService,
};
pub use shared::{CreateResponse, HistoryEntry, HistoryResponse};
