//! HTTP request building.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::Serialize;

use crate::error::{Error, ErrorKind, Result};
use crate::multipart::MultipartUpload;

/// Query parameters for a request. Entries with empty values are dropped
/// when the URL is built.
pub type QueryParams = BTreeMap<String, String>;

/// Common MIME types used by the Jamf Pro and Classic APIs.
pub mod mime {
    pub const APPLICATION_JSON: &str = "application/json";
    pub const APPLICATION_XML: &str = "application/xml";
    pub const TEXT_XML: &str = "text/xml";
    pub const TEXT_PLAIN: &str = "text/plain";
    pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
    pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";
    pub const OCTET_STREAM: &str = "application/octet-stream";
}

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl RequestMethod {
    /// Convert to reqwest::Method.
    pub fn to_reqwest(&self) -> reqwest::Method {
        match self {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
            RequestMethod::Put => reqwest::Method::PUT,
            RequestMethod::Patch => reqwest::Method::PATCH,
            RequestMethod::Delete => reqwest::Method::DELETE,
            RequestMethod::Head => reqwest::Method::HEAD,
            RequestMethod::Options => reqwest::Method::OPTIONS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
            RequestMethod::Put => "PUT",
            RequestMethod::Patch => "PATCH",
            RequestMethod::Delete => "DELETE",
            RequestMethod::Head => "HEAD",
            RequestMethod::Options => "OPTIONS",
        }
    }

    /// Whether the request may be replayed after a transient failure.
    pub fn is_idempotent(&self) -> bool {
        matches!(
            self,
            RequestMethod::Get
                | RequestMethod::Head
                | RequestMethod::Options
                | RequestMethod::Put
                | RequestMethod::Delete
        )
    }
}

impl std::fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire format of a request or response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    Xml,
}

impl BodyFormat {
    /// Pick a format from a Content-Type or Accept value.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next()?.trim().to_ascii_lowercase();
        if essence.ends_with("json") {
            Some(BodyFormat::Json)
        } else if essence.ends_with("xml") {
            Some(BodyFormat::Xml)
        } else {
            None
        }
    }
}

/// Request body content.
#[derive(Debug)]
pub(crate) enum RequestBody {
    Bytes(Bytes),
    Form(String),
    /// Consumed on the first send; a multipart stream can't be replayed.
    Multipart(Option<MultipartUpload>),
}

/// Builder for a single logical request.
#[derive(Debug)]
pub struct RequestBuilder {
    pub(crate) method: RequestMethod,
    pub(crate) path: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) query_params: Vec<(String, String)>,
    pub(crate) body: Option<RequestBody>,
}

impl RequestBuilder {
    /// Create a new request builder for a path relative to the base URL.
    pub fn new(method: RequestMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            query_params: Vec::new(),
            body: None,
        }
    }

    /// Add a header. Later values for the same name win.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Add several headers.
    pub fn headers(self, headers: &[(&str, &str)]) -> Self {
        headers
            .iter()
            .fold(self, |req, (name, value)| req.header(*name, *value))
    }

    /// Add a query parameter. Empty values are skipped.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.query_params.push((name.into(), value));
        }
        self
    }

    /// Add every entry of a parameter map.
    pub fn query_map(self, params: Option<&QueryParams>) -> Self {
        params
            .into_iter()
            .flatten()
            .fold(self, |req, (name, value)| req.query(name.as_str(), value.as_str()))
    }

    /// Set a raw body.
    pub fn bytes(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(RequestBody::Bytes(body.into()));
        self
    }

    /// Serialize `body` in the format named by this request's Content-Type
    /// header, defaulting to JSON.
    pub fn serialize_body<T: Serialize + ?Sized>(self, body: &T) -> Result<Self> {
        let format = self
            .header_value("content-type")
            .and_then(BodyFormat::from_content_type)
            .unwrap_or(BodyFormat::Json);
        let bytes = match format {
            BodyFormat::Json => serde_json::to_vec(body)?,
            BodyFormat::Xml => quick_xml::se::to_string(body)
                .map_err(|e| Error::with_source(ErrorKind::Serialization(e.to_string()), e))?
                .into_bytes(),
        };
        let req = if self.header_value("content-type").is_none() {
            self.header("Content-Type", mime::APPLICATION_JSON)
        } else {
            self
        };
        Ok(req.bytes(bytes))
    }

    /// Set a url-encoded form body.
    pub fn form<T: Serialize + ?Sized>(mut self, data: &T) -> Result<Self> {
        let encoded = serde_urlencoded::to_string(data)?;
        self.body = Some(RequestBody::Form(encoded));
        Ok(self)
    }

    /// Set a streamed multipart body.
    pub fn multipart(mut self, upload: MultipartUpload) -> Self {
        self.body = Some(RequestBody::Multipart(Some(upload)));
        self
    }

    /// Look up a header set on this request.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Expected response format, from the Accept header.
    pub(crate) fn response_format(&self) -> BodyFormat {
        self.header_value("accept")
            .and_then(BodyFormat::from_content_type)
            .unwrap_or(BodyFormat::Json)
    }

    /// Whether the body sets its own Content-Type (form and multipart).
    pub(crate) fn owns_content_type(&self) -> bool {
        matches!(
            self.body,
            Some(RequestBody::Form(_)) | Some(RequestBody::Multipart(_))
        )
    }

    /// Whether this request can be sent a second time.
    pub(crate) fn is_replayable(&self) -> bool {
        !matches!(self.body, Some(RequestBody::Multipart(_)))
    }
}
