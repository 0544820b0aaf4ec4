//! Page-number pagination over Jamf Pro list endpoints.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::context::RequestContext;
use crate::error::{Error, ErrorKind, Result};
use crate::request::QueryParams;
use crate::response::Response;
use crate::transport::Transport;
use crate::DEFAULT_PAGE_SIZE;

/// The `{totalCount, results}` envelope Jamf Pro wraps list pages in.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Navigation links returned by cursor-style endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationLinks {
    #[serde(rename = "self", default)]
    pub self_link: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// True when `links` points at another page.
pub fn has_next_page(links: Option<&PaginationLinks>) -> bool {
    links
        .and_then(|l| l.next.as_deref())
        .is_some_and(|next| !next.is_empty())
}

/// Query parameters of `url`, first value per key.
pub fn extract_params_from_url(url: &str) -> Result<QueryParams> {
    let parsed = url::Url::parse(url)?;
    let mut params = QueryParams::new();
    for (key, value) in parsed.query_pairs() {
        params.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }
    Ok(params)
}

impl Transport {
    /// GET every page of `path` and hand each page's results to `merge_page`
    /// in order.
    ///
    /// `page` and `page-size` are managed here; a caller-supplied value sets
    /// the starting page and page size. Stops on an empty or short page, or
    /// once `totalCount` is reached. Returns the last page's response.
    pub async fn get_paginated<T, F, E>(
        &self,
        ctx: &RequestContext,
        path: &str,
        query: Option<&QueryParams>,
        headers: &[(&str, &str)],
        mut merge_page: F,
    ) -> Result<Response>
    where
        T: DeserializeOwned,
        F: FnMut(Vec<T>) -> std::result::Result<(), E>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let mut params = query.cloned().unwrap_or_default();
        let mut page = parse_param(&params, "page", 0)?;
        let page_size = match parse_param(&params, "page-size", DEFAULT_PAGE_SIZE)? {
            0 => DEFAULT_PAGE_SIZE,
            n => n,
        };
        params.insert("page-size".to_string(), page_size.to_string());

        loop {
            ctx.check()?;
            params.insert("page".to_string(), page.to_string());

            let (envelope, response): (PagedResponse<T>, Response) =
                self.get(ctx, path, Some(&params), headers).await?;
            let received = envelope.results.len() as u64;
            debug!(page, received, total = envelope.total_count, "Fetched page");

            if let Err(err) = merge_page(envelope.results) {
                let source = err.into();
                return Err(Error {
                    kind: ErrorKind::Pagination(source.to_string()),
                    source: Some(source),
                    response: Some(Box::new(response)),
                });
            }

            if received == 0
                || received < page_size
                || (page + 1).saturating_mul(page_size) >= envelope.total_count
            {
                return Ok(response);
            }
            page += 1;
        }
    }
}

fn parse_param(params: &QueryParams, key: &str, default: u64) -> Result<u64> {
    match params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| Error::validation(format!("{key} must be a non-negative integer, got {value:?}"))),
    }
}
