//! Header presets, common payloads and argument validation used by every
//! resource service.

use std::fmt;

use jamfpro_client::{mime, Error, PagedResponse, Result};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Headers for Jamf Pro API (JSON) endpoints.
pub const JSON_HEADERS: &[(&str, &str)] = &[
    ("Accept", mime::APPLICATION_JSON),
    ("Content-Type", mime::APPLICATION_JSON),
];

/// Headers for Classic API (XML) endpoints.
pub const XML_HEADERS: &[(&str, &str)] = &[
    ("Accept", mime::APPLICATION_XML),
    ("Content-Type", mime::APPLICATION_XML),
];

/// Headers for endpoints that return plain text, such as script downloads.
pub const TEXT_HEADERS: &[(&str, &str)] = &[("Accept", mime::TEXT_PLAIN)];

/// `{id, href}` returned by Jamf Pro API create calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateResponse {
    #[serde(default, deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default)]
    pub href: String,
}

/// One entry of an object's change history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default, deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub details: Option<String>,
}

pub type HistoryResponse = PagedResponse<HistoryEntry>;

/// Body of `POST /{id}/history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryNoteRequest {
    pub note: String,
}

/// Body of `POST /delete-multiple`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteMultipleRequest {
    pub ids: Vec<String>,
}

/// Trimmed `id`, or a validation error naming `resource`.
pub fn require_id<'a>(id: &'a str, resource: &str) -> Result<&'a str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(Error::validation(format!("{resource} ID is required")));
    }
    Ok(id)
}

/// Classic API IDs are positive integers.
pub fn require_positive_id(id: i64, resource: &str) -> Result<i64> {
    if id <= 0 {
        return Err(Error::validation(format!(
            "{resource} ID must be a positive integer"
        )));
    }
    Ok(id)
}

pub fn require_name<'a>(name: &'a str, resource: &str) -> Result<&'a str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation(format!("{resource} name is required")));
    }
    Ok(name)
}

/// Percent-encode one path segment.
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Accept an ID sent as either a JSON string or a number.
pub fn id_as_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl Visitor<'_> for IdVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or integer ID")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<String, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_unit<E: de::Error>(self) -> std::result::Result<String, E> {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}
