//! HTTP response capture and Jamf Pro error parsing.

use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, Error, ErrorKind, Result};
use crate::request::BodyFormat;

/// A fully read HTTP response.
///
/// Returned with every successful call and attached to errors whenever the
/// server answered, so callers can always inspect status and headers.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code.
    pub status_code: u16,
    /// HTTP reason phrase (e.g. `Not Found`).
    pub status: String,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw response body.
    pub body: Bytes,
    /// Time from send to last body byte.
    pub duration: Duration,
    /// When the response finished arriving.
    pub received_at: DateTime<Utc>,
    /// Body size in bytes.
    pub size: u64,
}

impl Response {
    pub(crate) fn new(
        status: reqwest::StatusCode,
        headers: HeaderMap,
        body: Bytes,
        duration: Duration,
    ) -> Self {
        Self {
            status_code: status.as_u16(),
            status: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            size: body.len() as u64,
            body,
            duration,
            received_at: Utc::now(),
        }
    }

    /// Returns true if the response status is successful (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Returns true for any 4xx/5xx status.
    pub fn is_error(&self) -> bool {
        self.status_code >= 400
    }

    /// Returns true if the body is empty or whitespace.
    pub fn is_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }

    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Get the `Deprecation` header, set on endpoints scheduled for removal.
    pub fn deprecation(&self) -> Option<&str> {
        self.header("deprecation")
    }

    /// Get the `Sunset` header.
    pub fn sunset(&self) -> Option<&str> {
        self.header("sunset")
    }

    /// Get the Retry-After header as a Duration.
    pub fn retry_after(&self) -> Option<Duration> {
        let value = self.header("retry-after")?;
        value.trim().parse::<u64>().ok().map(Duration::from_secs)
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if self.is_empty() {
            return serde_json::from_slice(b"null").map_err(Into::into);
        }
        serde_json::from_slice(&self.body).map_err(Into::into)
    }

    /// Deserialize the body as XML.
    pub fn xml<T: DeserializeOwned>(&self) -> Result<T> {
        if self.is_empty() {
            return serde_json::from_slice(b"null").map_err(Into::into);
        }
        let text = std::str::from_utf8(&self.body)
            .map_err(|e| Error::with_source(ErrorKind::Xml(e.to_string()), e))?;
        quick_xml::de::from_str(text)
            .map_err(|e| Error::with_source(ErrorKind::Xml(e.to_string()), e))
    }

    /// Deserialize the body using the format named by Content-Type, or
    /// `fallback` when the server did not send one.
    pub fn decode<T: DeserializeOwned>(&self, fallback: BodyFormat) -> Result<T> {
        match self
            .content_type()
            .and_then(BodyFormat::from_content_type)
            .unwrap_or(fallback)
        {
            BodyFormat::Xml => self.xml(),
            BodyFormat::Json => self.json(),
        }
    }
}

/// Build an [`ApiError`] from a 4xx/5xx response.
///
/// Tries the Jamf Pro API JSON shapes first, then Classic API HTML/XML
/// text, then the raw body, then a default message for the status.
pub(crate) fn parse_error_response(response: &Response, method: &str, endpoint: &str) -> ApiError {
    let body = response.text();
    let (code, message) = match extract_error_message(&body) {
        Some((code, message)) => (code, message),
        None => (None, default_message_for_status(response.status_code).to_string()),
    };

    ApiError {
        code,
        message: sanitize_error_message(&message),
        status_code: response.status_code,
        status: response.status.clone(),
        endpoint: endpoint.to_string(),
        method: method.to_string(),
    }
}

fn extract_error_message(body: &str) -> Option<(Option<String>, String)> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = serde_json::from_str::<JamfErrorBody>(trimmed) {
        if parsed.code.is_some() || parsed.message.is_some() {
            return Some((parsed.code, parsed.message.unwrap_or_default()));
        }
        if let Some(first) = parsed.errors.into_iter().next() {
            return Some((first.code, first.description.unwrap_or_default()));
        }
    }

    if trimmed.starts_with('<') {
        let text = strip_markup(trimmed);
        if !text.is_empty() {
            return Some((None, text));
        }
    }

    Some((None, trimmed.to_string()))
}

/// Collapse Classic API HTML/XML error pages to their text content.
fn strip_markup(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut in_tag = false;
    for ch in body.chars() {
        match ch {
            '<' => {
                in_tag = true;
                out.push('\n');
            }
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn default_message_for_status(status: u16) -> &'static str {
    match status {
        400 => "The request could not be understood by the server due to malformed syntax.",
        401 => "The request has not been applied because it lacks valid authentication credentials for the target resource.",
        403 => "Authentication required or token invalid. The server understood the request but refuses to authorize it.",
        404 => "The server has not found anything matching the Request-URI.",
        409 => "The request could not be completed due to a conflict with the current state of the resource.",
        412 => "One or more conditions given in the request header fields evaluated to false when tested on the server.",
        422 => "The request has correct syntax, but has a field with a bad value, such as an ID which does not exist, an illegal enum value, or a field is missing entirely.",
        429 => "The user has sent too many requests in a given amount of time (rate limiting).",
        500 => "The server encountered an unexpected condition which prevented it from fulfilling the request.",
        503 => "The server is currently unable to handle the request due to a temporary overloading or maintenance of the server.",
        _ => "Unknown error",
    }
}

/// Sanitize an error message to prevent exposing sensitive data.
///
/// This function:
/// - Redacts anything that looks like a bearer token or JWT
/// - Truncates messages longer than 500 characters
pub(crate) fn sanitize_error_message(message: &str) -> String {
    const MAX_LENGTH: usize = 500;

    let mut sanitized = message.to_string();

    // Jamf Pro bearer tokens are JWTs: three base64url segments
    if let Ok(jwt) = regex_lite::Regex::new(r"eyJ[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+") {
        sanitized = jwt.replace_all(&sanitized, "[REDACTED_TOKEN]").to_string();
    }

    if let Ok(bearer) = regex_lite::Regex::new(r"(?i)bearer\s+[A-Za-z0-9._~+/=-]{16,}") {
        sanitized = bearer.replace_all(&sanitized, "Bearer [REDACTED]").to_string();
    }

    if sanitized.len() > MAX_LENGTH {
        let mut cut = MAX_LENGTH;
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized.truncate(cut);
        sanitized.push_str("...[truncated]");
    }

    sanitized
}

/// Jamf Pro API error body. Older endpoints send `{code, message}`, newer
/// ones send `{httpStatus, errors: [...]}`.
#[derive(Debug, serde::Deserialize)]
struct JamfErrorBody {
    code: Option<String>,
    message: Option<String>,
    #[serde(default)]
    errors: Vec<JamfErrorDetail>,
}

#[derive(Debug, serde::Deserialize)]
struct JamfErrorDetail {
    code: Option<String>,
    description: Option<String>,
}
