//! Client configuration.

use std::time::Duration;

use crate::error::{Error, ErrorKind, Result};
use crate::retry::RetryConfig;
use crate::throttle::ThrottleConfig;

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Retry configuration. `None` disables retries.
    pub retry: Option<RetryConfig>,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Pool idle timeout.
    pub pool_idle_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_max_idle_per_host: usize,
    /// User-Agent header value.
    pub user_agent: String,
    /// Headers sent with every request. Per-call headers win.
    pub global_headers: Vec<(String, String)>,
    /// HTTP(S) proxy URL.
    pub proxy: Option<String>,
    /// Accept invalid TLS certificates. Only for lab instances.
    pub insecure_skip_verify: bool,
    /// Concurrency and pacing.
    pub throttle: ThrottleConfig,
    /// Deadline for a whole call including retries, used when the caller's
    /// context has none.
    pub total_retry_duration: Option<Duration>,
    /// Whether to log request/response lifecycle at debug level.
    pub enable_tracing: bool,
    /// Send requests here instead of the instance domain.
    pub base_url_override: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            retry: Some(RetryConfig::default()),
            timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            user_agent: crate::USER_AGENT.to_string(),
            global_headers: Vec::new(),
            proxy: None,
            insecure_skip_verify: false,
            throttle: ThrottleConfig::default(),
            total_retry_duration: None,
            enable_tracing: true,
            base_url_override: None,
        }
    }
}

impl ClientConfig {
    /// Create a new client config builder.
    /// A `reqwest` builder carrying the network settings every connection to
    /// the instance needs: connect timeout, user agent, proxy and TLS
    /// verification. Token endpoint calls use it too.
    pub fn http_client_builder(&self) -> Result<reqwest::ClientBuilder> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .user_agent(&self.user_agent);

        if let Some(proxy) = &self.proxy {
            let proxy = reqwest::Proxy::all(proxy.as_str())
                .map_err(|e| Error::with_source(ErrorKind::Config(format!("invalid proxy: {proxy}")), e))?;
            builder = builder.proxy(proxy);
        }

        if self.insecure_skip_verify {
            tracing::warn!("TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(builder)
    }

    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Defaults, overridden by `JAMFPRO_TIMEOUT_SECONDS` and
    /// `JAMFPRO_MAX_RETRIES` when set.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(secs) = read_env_number("JAMFPRO_TIMEOUT_SECONDS")? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = read_env_number("JAMFPRO_MAX_RETRIES")? {
            let retries = u32::try_from(retries).map_err(|e| {
                Error::with_source(
                    ErrorKind::Config(format!("JAMFPRO_MAX_RETRIES out of range: {retries}")),
                    e,
                )
            })?;
            config.retry = Some(
                config
                    .retry
                    .unwrap_or_default()
                    .with_max_attempts(retries),
            );
        }

        Ok(config)
    }
}

fn read_env_number(name: &str) -> Result<Option<u64>> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value.trim().parse::<u64>().map(Some).map_err(|e| {
            Error::with_source(ErrorKind::Config(format!("{name} must be a number, got {value:?}")), e)
        }),
        _ => Ok(None),
    }
}

/// Builder for ClientConfig.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = Some(retry);
        self
    }

    /// Disable retries.
    pub fn without_retry(mut self) -> Self {
        self.config.retry = None;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set pool idle timeout.
    pub fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    pub fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.config.pool_max_idle_per_host = max;
        self
    }

    /// Set custom User-Agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Add a header sent with every request.
    pub fn with_global_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.global_headers.push((name.into(), value.into()));
        self
    }

    /// Route requests through a proxy.
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.config.proxy = Some(proxy.into());
        self
    }

    /// Accept invalid TLS certificates.
    pub fn with_insecure_skip_verify(mut self, skip: bool) -> Self {
        self.config.insecure_skip_verify = skip;
        self
    }

    pub fn with_throttle(mut self, throttle: ThrottleConfig) -> Self {
        self.config.throttle = throttle;
        self
    }

    /// Cap in-flight requests.
    pub fn with_max_concurrent_requests(mut self, max: usize) -> Self {
        self.config.throttle.max_concurrent_requests = Some(max);
        self
    }

    /// Pause after every successful request.
    pub fn with_mandatory_request_delay(mut self, delay: Duration) -> Self {
        self.config.throttle.mandatory_request_delay = delay;
        self
    }

    pub fn with_total_retry_duration(mut self, duration: Duration) -> Self {
        self.config.total_retry_duration = Some(duration);
        self
    }

    /// Enable or disable request/response tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.config.enable_tracing = enabled;
        self
    }

    /// Send requests to `url` instead of the instance domain.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url_override = Some(url.into());
        self
    }

    /// Build the client configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
