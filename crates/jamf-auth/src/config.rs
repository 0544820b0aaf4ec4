//! Authentication configuration from code, environment, or a JSON file.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, ErrorKind, Result};

/// How far before expiry a token is refreshed when no buffer is configured.
pub const DEFAULT_REFRESH_BUFFER: Duration = Duration::from_secs(300);

/// Token exchange flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// OAuth2 client credentials against `/api/v1/oauth/token`.
    OAuth2,
    /// Username and password exchanged at `/api/v1/auth/token`.
    Basic,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::OAuth2 => "oauth2",
            AuthMethod::Basic => "basic",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oauth2" => Ok(AuthMethod::OAuth2),
            "basic" => Ok(AuthMethod::Basic),
            _ => Err(Error::invalid_config(
                "auth method must be \"oauth2\" or \"basic\"",
            )),
        }
    }
}

/// Validated credentials for one auth method.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    OAuth2 {
        client_id: String,
        client_secret: String,
    },
    Basic {
        username: String,
        password: String,
    },
}

impl Credentials {
    pub fn method(&self) -> AuthMethod {
        match self {
            Credentials::OAuth2 { .. } => AuthMethod::OAuth2,
            Credentials::Basic { .. } => AuthMethod::Basic,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::OAuth2 { client_id, .. } => f
                .debug_struct("OAuth2")
                .field("client_id", client_id)
                .field("client_secret", &"[REDACTED]")
                .finish(),
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
        }
    }
}

/// Everything needed to obtain bearer tokens for one Jamf Pro instance.
///
/// Secrets are redacted in Debug output.
#[derive(Clone)]
pub struct AuthConfig {
    /// Instance URL or bare domain (`example.jamfcloud.com`).
    pub instance_domain: String,
    pub auth_method: AuthMethod,
    pub client_id: String,
    client_secret: String,
    pub username: String,
    password: String,
    /// Refresh this long before expiry.
    pub token_refresh_buffer: Duration,
    /// Log tokens as `[REDACTED]`.
    pub hide_sensitive_data: bool,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("instance_domain", &self.instance_domain)
            .field("auth_method", &self.auth_method)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("token_refresh_buffer", &self.token_refresh_buffer)
            .field("hide_sensitive_data", &self.hide_sensitive_data)
            .finish()
    }
}

impl AuthConfig {
    fn empty(instance_domain: String, auth_method: AuthMethod) -> Self {
        Self {
            instance_domain,
            auth_method,
            client_id: String::new(),
            client_secret: String::new(),
            username: String::new(),
            password: String::new(),
            token_refresh_buffer: DEFAULT_REFRESH_BUFFER,
            hide_sensitive_data: false,
        }
    }

    /// OAuth2 client credentials.
    pub fn oauth2(
        instance_domain: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            ..Self::empty(instance_domain.into(), AuthMethod::OAuth2)
        }
    }

    /// Basic auth exchanged for a bearer token.
    pub fn basic(
        instance_domain: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            ..Self::empty(instance_domain.into(), AuthMethod::Basic)
        }
    }

    /// Set the refresh buffer. Zero means the default of five minutes.
    pub fn with_refresh_buffer(mut self, buffer: Duration) -> Self {
        self.token_refresh_buffer = if buffer.is_zero() {
            DEFAULT_REFRESH_BUFFER
        } else {
            buffer
        };
        self
    }

    pub fn with_hide_sensitive_data(mut self, hide: bool) -> Self {
        self.hide_sensitive_data = hide;
        self
    }

    /// Check required fields for the selected method.
    pub fn validate(&self) -> Result<()> {
        self.credentials().map(|_| ())
    }

    /// The validated credentials.
    pub fn credentials(&self) -> Result<Credentials> {
        if self.instance_domain.trim().is_empty() {
            return Err(Error::invalid_config("instance domain is required"));
        }
        match self.auth_method {
            AuthMethod::OAuth2 => {
                if self.client_id.is_empty() || self.client_secret.is_empty() {
                    return Err(Error::invalid_config(
                        "client_id and client_secret are required for oauth2",
                    ));
                }
                Ok(Credentials::OAuth2 {
                    client_id: self.client_id.clone(),
                    client_secret: self.client_secret.clone(),
                })
            }
            AuthMethod::Basic => {
                if self.username.is_empty() || self.password.is_empty() {
                    return Err(Error::invalid_config(
                        "username and password are required for basic auth",
                    ));
                }
                Ok(Credentials::Basic {
                    username: self.username.clone(),
                    password: self.password.clone(),
                })
            }
        }
    }

    /// Load from environment variables.
    ///
    /// Reads `INSTANCE_DOMAIN`, `AUTH_METHOD`, `CLIENT_ID`, `CLIENT_SECRET`,
    /// `BASIC_AUTH_USERNAME`, `BASIC_AUTH_PASSWORD`, and optionally
    /// `TOKEN_REFRESH_BUFFER_SECONDS` and `HIDE_SENSITIVE_DATA`.
    pub fn from_env() -> Result<Self> {
        let file = ConfigFile {
            instance_domain: env_string("INSTANCE_DOMAIN"),
            auth_method: env_string("AUTH_METHOD"),
            client_id: env_string("CLIENT_ID"),
            client_secret: env_string("CLIENT_SECRET"),
            basic_auth_username: env_string("BASIC_AUTH_USERNAME"),
            basic_auth_password: env_string("BASIC_AUTH_PASSWORD"),
            token_refresh_buffer_period_seconds: env_parse("TOKEN_REFRESH_BUFFER_SECONDS")?,
            hide_sensitive_data: env_parse_bool("HIDE_SENSITIVE_DATA")?,
        };
        file.into_config()
    }

    /// Load from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Parse the JSON configuration format.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: ConfigFile = serde_json::from_str(json)?;
        file.into_config()
    }
}

/// On-disk layout, shared with the environment loader.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    instance_domain: String,
    #[serde(default)]
    auth_method: String,
    #[serde(default)]
    client_id: String,
    #[serde(default)]
    client_secret: String,
    #[serde(default)]
    basic_auth_username: String,
    #[serde(default)]
    basic_auth_password: String,
    #[serde(default)]
    token_refresh_buffer_period_seconds: Option<u64>,
    #[serde(default)]
    hide_sensitive_data: Option<bool>,
}

impl ConfigFile {
    fn into_config(self) -> Result<AuthConfig> {
        let method: AuthMethod = self.auth_method.parse()?;
        let config = AuthConfig {
            instance_domain: self.instance_domain,
            auth_method: method,
            client_id: self.client_id,
            client_secret: self.client_secret,
            username: self.basic_auth_username,
            password: self.basic_auth_password,
            token_refresh_buffer: DEFAULT_REFRESH_BUFFER,
            hide_sensitive_data: self.hide_sensitive_data.unwrap_or(false),
        }
        .with_refresh_buffer(Duration::from_secs(
            self.token_refresh_buffer_period_seconds.unwrap_or(0),
        ));
        config.validate()?;
        Ok(config)
    }
}

fn env_string(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}

fn env_parse(name: &str) -> Result<Option<u64>> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value.trim().parse().map(Some).map_err(|e| {
            Error::with_source(ErrorKind::EnvVar(format!("{name} must be a whole number of seconds")), e)
        }),
        _ => Ok(None),
    }
}

fn env_parse_bool(name: &str) -> Result<Option<bool>> {
    match std::env::var(name) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "1" | "true" | "yes" => Ok(Some(true)),
            "0" | "false" | "no" => Ok(Some(false)),
            _ => Err(Error::new(ErrorKind::EnvVar(format!("{name} must be true or false")))),
        },
        Err(_) => Ok(None),
    }
}
