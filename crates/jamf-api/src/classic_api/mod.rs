//! Classic API (XML) services under `/JSSResource`.
//!
//! Classic resources are addressed as `/{collection}/id/{id}` or
//! `/{collection}/name/{name}`; IDs are positive integers and `/id/0` is
//! the create route.

use jamfpro_client::{RequestContext, Response, Result, Transport};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};

use crate::shared::{self, XML_HEADERS};

pub mod network_segments;
pub mod sites;

pub use network_segments::{NetworkSegment, NetworkSegmentsService};
pub use sites::{Site, SitesService};

/// `<resource><id>N</id></resource>` returned by create and update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicIdResponse {
    #[serde(default)]
    pub id: i64,
}

/// How a Classic record is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lookup<'a> {
    Id(i64),
    Name(&'a str),
}

#[derive(Debug, Clone)]
pub(crate) struct ClassicResource {
    transport: Transport,
    path: &'static str,
    label: &'static str,
}

impl ClassicResource {
    pub(crate) fn new(transport: Transport, path: &'static str, label: &'static str) -> Self {
        Self {
            transport,
            path,
            label,
        }
    }

    fn record_path(&self, lookup: Lookup<'_>) -> Result<String> {
        match lookup {
            Lookup::Id(id) => {
                let id = shared::require_positive_id(id, self.label)?;
                Ok(format!("{}/id/{}", self.path, id))
            }
            Lookup::Name(name) => {
                let name = shared::require_name(name, self.label)?;
                Ok(format!("{}/name/{}", self.path, shared::encode_segment(name)))
            }
        }
    }

    pub(crate) async fn list<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
    ) -> Result<(T, Response)> {
        self.transport.get(ctx, self.path, None, XML_HEADERS).await
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        lookup: Lookup<'_>,
    ) -> Result<(T, Response)> {
        let path = self.record_path(lookup)?;
        self.transport.get(ctx, &path, None, XML_HEADERS).await
    }

    pub(crate) async fn create<B: Serialize>(
        &self,
        ctx: &RequestContext,
        body: &B,
    ) -> Result<(ClassicIdResponse, Response)> {
        let path = format!("{}/id/0", self.path);
        self.transport.post(ctx, &path, Some(body), XML_HEADERS).await
    }

    pub(crate) async fn update<B: Serialize>(
        &self,
        ctx: &RequestContext,
        lookup: Lookup<'_>,
        body: &B,
    ) -> Result<(ClassicIdResponse, Response)> {
        let path = self.record_path(lookup)?;
        self.transport.put(ctx, &path, Some(body), XML_HEADERS).await
    }

    pub(crate) async fn delete(&self, ctx: &RequestContext, lookup: Lookup<'_>) -> Result<Response> {
        let path = self.record_path(lookup)?;
        let (_, response) = self
            .transport
            .delete::<IgnoredAny>(ctx, &path, None, XML_HEADERS)
            .await?;
        Ok(response)
    }
}
