//! # jamfpro-client
//!
//! Core HTTP transport for the Jamf Pro API and the Classic API.
//!
//! This crate provides the foundational transport with:
//! - Bearer token injection through a [`TokenProvider`], with one
//!   transparent re-authentication on 401
//! - Bounded retry with exponential backoff and jitter for idempotent requests
//! - Concurrency limiting and response-time based pacing
//! - JSON and XML bodies chosen by Content-Type
//! - Page-number pagination and an RSQL filter builder
//! - Streamed multipart uploads with progress reporting
//! - Cancellation and deadlines through [`RequestContext`]
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Resource services                        │
//! │  (jamfpro-api: buildings, scripts, packages, sites, ...)    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Transport                             │
//! │  - Typed verbs (get, post, put, patch, delete, ...)         │
//! │  - Pagination, form and multipart bodies                    │
//! │  - Throttle, retry, re-authentication                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 TokenProvider + reqwest                     │
//! │  - Cached bearer token (jamfpro-auth)                       │
//! │  - Connection pool, cookie store, TLS, proxy                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use jamfpro_client::{ClientConfig, RequestContext, StaticToken, Transport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), jamfpro_client::Error> {
//!     let transport = Transport::new(
//!         "example.jamfcloud.com",
//!         Arc::new(StaticToken::new("token")),
//!         ClientConfig::default(),
//!     )?;
//!
//!     let ctx = RequestContext::background();
//!     let (version, _resp): (serde_json::Value, _) = transport
//!         .get(&ctx, "/api/v1/jamf-pro-version", None, &[])
//!         .await?;
//!
//!     println!("{version}");
//!     Ok(())
//! }
//! ```

mod auth;
mod config;
mod context;
mod error;
mod multipart;
mod pagination;
mod request;
mod response;
mod retry;
pub mod rsql;
mod throttle;
mod transport;

pub use auth::{StaticToken, TokenProvider};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use context::RequestContext;
pub use error::{ApiError, Error, ErrorKind, Result};
pub use multipart::{MultipartUpload, ProgressCallback, UPLOAD_CHUNK_SIZE};
pub use pagination::{extract_params_from_url, has_next_page, PagedResponse, PaginationLinks};
pub use request::{mime, BodyFormat, QueryParams, RequestBuilder, RequestMethod};
pub use response::Response;
pub use retry::{
    is_non_retryable_status, is_transient_status, BackoffStrategy, RetryConfig, RetryPolicy,
};
pub use rsql::RsqlBuilder;
pub use throttle::{ResponseTimeTracker, ThrottleConfig};
pub use transport::Transport;

// Re-export the async-trait macro so TokenProvider implementors don't need
// their own dependency on it.
pub use async_trait::async_trait;

/// Default User-Agent string.
pub const USER_AGENT: &str = concat!("jamfpro-sdk-rust/", env!("CARGO_PKG_VERSION"));

/// Page size used by [`Transport::get_paginated`] when none is given.
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// Trim a trailing slash and default the scheme to `https://`.
pub fn normalize_base_url(instance_domain: &str) -> String {
    let trimmed = instance_domain.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}
