//! Error types for jamfpro-client.

use std::fmt;
use std::time::Duration;

use crate::response::Response;

/// Result type alias for jamfpro-client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for jamfpro-client operations.
///
/// When an HTTP response was received before the failure, it is attached
/// as [`Error::response`] so callers can inspect status and headers.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    /// The HTTP response, if one was received.
    pub response: Option<Box<Response>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            source: None,
            response: None,
        }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
            response: None,
        }
    }

    /// Shorthand for a local validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation(message.into()))
    }

    /// Attach the HTTP response that produced this error.
    pub fn with_response(mut self, response: Response) -> Self {
        self.response = Some(Box::new(response));
        self
    }

    /// The HTTP response that produced this error, if any.
    pub fn response(&self) -> Option<&Response> {
        self.response.as_deref()
    }

    /// Take ownership of the attached response.
    pub fn take_response(&mut self) -> Option<Response> {
        self.response.take().map(|r| *r)
    }

    /// HTTP status code, from the API error or the attached response.
    pub fn status_code(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Api(api) => Some(api.status_code),
            _ => self.response.as_ref().map(|r| r.status_code),
        }
    }

    /// The structured API error, if the server returned one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match &self.kind {
            ErrorKind::Api(api) => Some(api),
            // A 429 keeps the server's error body as its source.
            _ => self.source.as_deref().and_then(|s| s.downcast_ref::<ApiError>()),
        }
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Returns true if this is a rate limit error.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self.kind, ErrorKind::RateLimited { .. })
    }

    /// Returns true if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Authentication(_)) || self.is_unauthorized()
    }

    /// Returns true if the caller cancelled the call or its deadline passed.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, ErrorKind::Cancelled | ErrorKind::DeadlineExceeded)
    }

    /// Returns true for HTTP 404.
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    /// Returns true for HTTP 401.
    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(401)
    }

    /// Returns true for HTTP 400.
    pub fn is_bad_request(&self) -> bool {
        self.status_code() == Some(400)
    }

    /// Returns true for any HTTP 5xx.
    pub fn is_server_error(&self) -> bool {
        matches!(self.status_code(), Some(500..=599))
    }

    /// Returns the retry-after duration if this is a rate limit error.
    pub fn retry_after(&self) -> Option<Duration> {
        match &self.kind {
            ErrorKind::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// The server answered with a 4xx/5xx status.
    #[error("{0}")]
    Api(ApiError),

    /// Rate limit exceeded (HTTP 429).
    #[error("Rate limited{}", retry_after.map(|d| format!(", retry after {:?}", d)).unwrap_or_default())]
    RateLimited { retry_after: Option<Duration> },

    /// Token acquisition failed, or the server rejected a freshly issued token.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// A required argument was missing or malformed. No request was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Request timeout.
    #[error("Request timeout")]
    Timeout,

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The caller cancelled the request context.
    #[error("Request cancelled")]
    Cancelled,

    /// The request context deadline passed.
    #[error("Request deadline exceeded")]
    DeadlineExceeded,

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// XML serialization/deserialization error.
    #[error("XML error: {0}")]
    Xml(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),

    /// The page merge callback failed during pagination.
    #[error("merge page: {0}")]
    Pagination(String),

    /// All retries exhausted.
    #[error("All {attempts} retry attempts exhausted")]
    RetriesExhausted { attempts: u32 },

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl ErrorKind {
    /// Returns true if this error kind is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            ErrorKind::RateLimited { .. } => true,
            ErrorKind::Timeout => true,
            ErrorKind::Connection(_) => true,
            ErrorKind::Api(api) => crate::retry::is_transient_status(api.status_code),
            _ => false,
        }
    }
}

/// A Jamf Pro error response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Server-provided error code, if any.
    pub code: Option<String>,
    /// Human-readable message.
    pub message: String,
    /// HTTP status code.
    pub status_code: u16,
    /// HTTP reason phrase.
    pub status: String,
    /// Request path.
    pub endpoint: String,
    /// Request method.
    pub method: String,
}

impl std::error::Error for ApiError {}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(
                f,
                "Jamf Pro API error ({} {}) [{}] at {} {}: {}",
                self.status_code, self.status, code, self.method, self.endpoint, self.message
            ),
            None => write!(
                f,
                "Jamf Pro API error ({} {}) at {} {}: {}",
                self.status_code, self.status, self.method, self.endpoint, self.message
            ),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_connect() {
            ErrorKind::Connection(err.to_string())
        } else if err.is_builder() {
            ErrorKind::Config(err.to_string())
        } else {
            ErrorKind::Other(err.to_string())
        };

        Error::with_source(kind, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<serde_urlencoded::ser::Error> for Error {
    fn from(err: serde_urlencoded::ser::Error) -> Self {
        Error::with_source(ErrorKind::Serialization(err.to_string()), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::InvalidUrl(err.to_string()), err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::with_source(ErrorKind::Io(err.to_string()), err)
    }
}
