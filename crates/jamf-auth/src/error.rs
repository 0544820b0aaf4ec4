//! Error types for jamfpro-auth.
//!
//! Error messages are designed to avoid exposing credential values.

/// Result type alias for jamfpro-auth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for jamfpro-auth operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidConfig(message.into()))
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// The auth configuration is incomplete or malformed.
    #[error("authentication configuration invalid: {0}")]
    InvalidConfig(String),

    /// The token endpoint answered with a non-success status.
    #[error("token request failed: {0}")]
    TokenRequest(String),

    /// HTTP error during authentication.
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Environment variable missing or malformed.
    #[error("Environment variable error: {0}")]
    EnvVar(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Strip the URL; it may carry the instance's auth endpoint and query
        let message = err.without_url().to_string();
        Error::new(ErrorKind::Http(message))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<serde_urlencoded::ser::Error> for Error {
    fn from(err: serde_urlencoded::ser::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::with_source(ErrorKind::Io(err.to_string()), err)
    }
}

impl From<Error> for jamfpro_client::Error {
    fn from(err: Error) -> Self {
        let kind = match &err.kind {
            ErrorKind::InvalidConfig(_) | ErrorKind::EnvVar(_) => {
                jamfpro_client::ErrorKind::Config(err.kind.to_string())
            }
            _ => jamfpro_client::ErrorKind::Authentication(err.kind.to_string()),
        };
        jamfpro_client::Error::with_source(kind, err)
    }
}
