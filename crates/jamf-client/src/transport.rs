//! Authenticated HTTP transport for the Jamf Pro and Classic APIs.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::auth::TokenProvider;
use crate::config::ClientConfig;
use crate::context::RequestContext;
use crate::error::{Error, ErrorKind, Result};
use crate::multipart::MultipartUpload;
use crate::request::{mime, BodyFormat, QueryParams, RequestBody, RequestBuilder, RequestMethod};
use crate::response::{parse_error_response, Response};
use crate::retry::{is_non_retryable_status, RetryPolicy};
use crate::rsql::RsqlBuilder;
use crate::throttle::Throttle;

/// HTTP transport shared by every resource service.
///
/// Cloning is cheap; clones share the connection pool, cookie store,
/// throttle and token provider.
#[derive(Debug, Clone)]
pub struct Transport {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    http: reqwest::Client,
    base_url: String,
    config: ClientConfig,
    auth: Arc<dyn TokenProvider>,
    throttle: Throttle,
}

impl Transport {
    /// Build a transport for `instance_domain`, or for
    /// `config.base_url_override` when set.
    pub fn new(
        instance_domain: &str,
        auth: Arc<dyn TokenProvider>,
        config: ClientConfig,
    ) -> Result<Self> {
        let target = config
            .base_url_override
            .as_deref()
            .unwrap_or(instance_domain);
        if target.trim().is_empty() {
            return Err(Error::new(ErrorKind::Config(
                "instance domain is required".to_string(),
            )));
        }
        let base_url = crate::normalize_base_url(target);
        Url::parse(&base_url)?;

        let builder = config
            .http_client_builder()?
            .timeout(config.timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .cookie_store(true)
            .gzip(true)
            .deflate(true);

        let http = builder
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        info!(base_url = %base_url, "Jamf Pro transport created");

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url,
                throttle: Throttle::new(config.throttle.clone()),
                config,
                auth,
            }),
        })
    }

    /// Normalized base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// A fresh RSQL filter builder.
    pub fn rsql_builder(&self) -> RsqlBuilder {
        RsqlBuilder::new()
    }

    /// Revoke the current token. A no-op if none is cached.
    pub async fn invalidate_token(&self, ctx: &RequestContext) -> Result<()> {
        ctx.run(self.inner.auth.invalidate()).await
    }

    /// Extend the current token. A no-op if none is cached.
    pub async fn keep_alive_token(&self, ctx: &RequestContext) -> Result<()> {
        ctx.run(self.inner.auth.keep_alive()).await
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
        query: Option<&QueryParams>,
        headers: &[(&str, &str)],
    ) -> Result<(T, Response)> {
        self.request::<(), T>(ctx, RequestMethod::Get, path, query, None, headers)
            .await
    }

    pub async fn post<B, T>(
        &self,
        ctx: &RequestContext,
        path: &str,
        body: Option<&B>,
        headers: &[(&str, &str)],
    ) -> Result<(T, Response)>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(ctx, RequestMethod::Post, path, None, body, headers)
            .await
    }

    /// POST with URL query parameters as well as a body.
    pub async fn post_with_query<B, T>(
        &self,
        ctx: &RequestContext,
        path: &str,
        query: Option<&QueryParams>,
        body: Option<&B>,
        headers: &[(&str, &str)],
    ) -> Result<(T, Response)>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(ctx, RequestMethod::Post, path, query, body, headers)
            .await
    }

    pub async fn put<B, T>(
        &self,
        ctx: &RequestContext,
        path: &str,
        body: Option<&B>,
        headers: &[(&str, &str)],
    ) -> Result<(T, Response)>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(ctx, RequestMethod::Put, path, None, body, headers)
            .await
    }

    pub async fn patch<B, T>(
        &self,
        ctx: &RequestContext,
        path: &str,
        body: Option<&B>,
        headers: &[(&str, &str)],
    ) -> Result<(T, Response)>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(ctx, RequestMethod::Patch, path, None, body, headers)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
        query: Option<&QueryParams>,
        headers: &[(&str, &str)],
    ) -> Result<(T, Response)> {
        self.request::<(), T>(ctx, RequestMethod::Delete, path, query, None, headers)
            .await
    }

    /// DELETE carrying a body, for bulk delete endpoints.
    pub async fn delete_with_body<B, T>(
        &self,
        ctx: &RequestContext,
        path: &str,
        body: &B,
        headers: &[(&str, &str)],
    ) -> Result<(T, Response)>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(ctx, RequestMethod::Delete, path, None, Some(body), headers)
            .await
    }

    /// POST a form-urlencoded body. Any caller Content-Type is replaced.
    pub async fn post_form<F, T>(
        &self,
        ctx: &RequestContext,
        path: &str,
        form: &F,
        headers: &[(&str, &str)],
    ) -> Result<(T, Response)>
    where
        F: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = RequestBuilder::new(RequestMethod::Post, path)
            .headers(headers)
            .form(form)?;
        self.send_decoded(ctx, request).await
    }

    /// POST a streamed multipart body. Never replayed.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
        upload: MultipartUpload,
        headers: &[(&str, &str)],
    ) -> Result<(T, Response)> {
        let request = RequestBuilder::new(RequestMethod::Post, path)
            .headers(headers)
            .multipart(upload);
        self.send_decoded(ctx, request).await
    }

    /// GET and return the raw body.
    pub async fn get_bytes(
        &self,
        ctx: &RequestContext,
        path: &str,
        query: Option<&QueryParams>,
        headers: &[(&str, &str)],
    ) -> Result<(Bytes, Response)> {
        let request = RequestBuilder::new(RequestMethod::Get, path)
            .headers(headers)
            .query_map(query);
        let response = self.execute(ctx, request).await?;
        Ok((response.body.clone(), response))
    }

    /// The single typed request path every verb goes through.
    pub async fn request<B, T>(
        &self,
        ctx: &RequestContext,
        method: RequestMethod,
        path: &str,
        query: Option<&QueryParams>,
        body: Option<&B>,
        headers: &[(&str, &str)],
    ) -> Result<(T, Response)>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = RequestBuilder::new(method, path)
            .headers(headers)
            .query_map(query);
        if let Some(body) = body {
            request = request.serialize_body(body)?;
        }
        self.send_decoded(ctx, request).await
    }

    async fn send_decoded<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        request: RequestBuilder,
    ) -> Result<(T, Response)> {
        let fallback = request.response_format();
        let response = self.execute(ctx, request).await?;
        match response.decode(fallback) {
            Ok(value) => Ok((value, response)),
            Err(err) => Err(err.with_response(response)),
        }
    }

    /// Send a request with auth, throttling, re-authentication and retry.
    #[instrument(skip_all, fields(method = %request.method, path = %request.path))]
    pub async fn execute(&self, ctx: &RequestContext, mut request: RequestBuilder) -> Result<Response> {
        let ctx = ctx.with_fallback_timeout(self.inner.config.total_retry_duration);
        ctx.check()?;

        let mut policy = self.inner.config.retry.clone().map(RetryPolicy::new);
        let mut token = ctx.run(self.inner.auth.token()).await?;
        let mut reauthenticated = false;

        loop {
            let result = {
                let _permit = self.inner.throttle.acquire(&ctx).await?;
                self.send_once(&ctx, &mut request, &token).await
            };

            let err = match result {
                Ok(response) => {
                    self.inner.throttle.after_success(&ctx, response.duration).await;
                    return Ok(response);
                }
                Err(err) => err,
            };

            if err.status_code() == Some(401) {
                if reauthenticated {
                    return Err(still_unauthorized(err, true));
                }
                if !request.is_replayable() {
                    // The body is spent; replace the token for the next call.
                    info!("Token rejected on a one-shot request, refreshing for later calls");
                    if let Err(refresh_err) = ctx.run(self.inner.auth.refresh(&token)).await {
                        warn!(error = %refresh_err, "Token refresh after rejected upload failed");
                    }
                    return Err(err);
                }
                reauthenticated = true;
                info!("Token rejected, re-authenticating");
                token = ctx.run(self.inner.auth.refresh(&token)).await?;
                continue;
            }

            let retryable = err.is_retryable()
                && !err.status_code().is_some_and(is_non_retryable_status)
                && request.method.is_idempotent()
                && request.is_replayable();
            let Some(policy) = policy.as_mut().filter(|_| retryable) else {
                return Err(err);
            };

            match policy.next_delay(err.retry_after()) {
                Some(delay) => {
                    warn!(
                        attempt = policy.attempt(),
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Request failed, retrying"
                    );
                    ctx.sleep(delay).await?;
                }
                None => return Err(retries_exhausted(err, policy.attempt())),
            }
        }
    }

    async fn send_once(
        &self,
        ctx: &RequestContext,
        request: &mut RequestBuilder,
        token: &str,
    ) -> Result<Response> {
        let url = self.build_url(&request.path, &request.query_params)?;
        let headers = self.merge_headers(request, token)?;

        let mut req = self
            .inner
            .http
            .request(request.method.to_reqwest(), url)
            .headers(headers);

        req = match request.body.as_mut() {
            Some(RequestBody::Bytes(bytes)) => req.body(bytes.clone()),
            Some(RequestBody::Form(encoded)) => req
                .header(CONTENT_TYPE, mime::FORM_URLENCODED)
                .body(encoded.clone()),
            Some(RequestBody::Multipart(upload)) => {
                let upload = upload
                    .take()
                    .ok_or_else(|| Error::validation("multipart body was already sent"))?;
                req.multipart(upload.into_form()?)
            }
            None => req,
        };

        if self.inner.config.enable_tracing {
            debug!(method = %request.method, path = %request.path, "Sending request");
        }

        let started = Instant::now();
        let (status, headers, body) = ctx
            .run(async {
                let resp = req.send().await?;
                let status = resp.status();
                let headers = resp.headers().clone();
                let body = resp.bytes().await?;
                Ok::<_, Error>((status, headers, body))
            })
            .await?;
        let response = Response::new(status, headers, body, started.elapsed());

        if self.inner.config.enable_tracing {
            debug!(
                status = response.status_code,
                size = response.size,
                duration_ms = response.duration.as_millis() as u64,
                "Response received"
            );
        }

        self.check_response_headers(request, &response);

        if response.status_code == 429 {
            let retry_after = response.retry_after();
            let api = parse_error_response(&response, request.method.as_str(), &request.path);
            return Err(
                Error::with_source(ErrorKind::RateLimited { retry_after }, api).with_response(response),
            );
        }

        if response.is_error() {
            let api = parse_error_response(&response, request.method.as_str(), &request.path);
            error!(
                status = api.status_code,
                code = api.code.as_deref().unwrap_or(""),
                message = %api.message,
                "Jamf Pro API error"
            );
            return Err(Error::new(ErrorKind::Api(api)).with_response(response));
        }

        Ok(response)
    }

    fn build_url(&self, path: &str, query: &[(String, String)]) -> Result<Url> {
        let mut url = if path.starts_with("http://") || path.starts_with("https://") {
            // The bearer token only goes to the instance itself.
            let url = Url::parse(path)?;
            let base = Url::parse(&self.inner.base_url)?;
            if url.origin() != base.origin() {
                return Err(Error::new(ErrorKind::InvalidUrl(format!(
                    "{} is not on the instance {}",
                    url.origin().ascii_serialization(),
                    self.inner.base_url
                ))));
            }
            url
        } else if path.starts_with('/') {
            Url::parse(&format!("{}{}", self.inner.base_url, path))?
        } else {
            Url::parse(&format!("{}/{}", self.inner.base_url, path))?
        };
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }

    /// Global headers, then per-call headers, then the bearer token.
    fn merge_headers(&self, request: &RequestBuilder, token: &str) -> Result<HeaderMap> {
        let skip_content_type = request.owns_content_type();
        let mut headers = HeaderMap::new();

        let all = self
            .inner
            .config
            .global_headers
            .iter()
            .chain(request.headers.iter());
        for (name, value) in all {
            if value.is_empty() {
                continue;
            }
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::with_source(ErrorKind::Validation(format!("invalid header name: {name}")), e))?;
            if skip_content_type && name == CONTENT_TYPE {
                continue;
            }
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::with_source(ErrorKind::Validation(format!("invalid value for header {name}")), e))?;
            headers.insert(name, value);
        }

        let mut bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| Error::with_source(ErrorKind::Authentication("token is not a valid header value".into()), e))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        Ok(headers)
    }

    fn check_response_headers(&self, request: &RequestBuilder, response: &Response) {
        if let Some(deprecation) = response.deprecation() {
            warn!(
                endpoint = %request.path,
                deprecation,
                sunset = response.sunset().unwrap_or(""),
                "Endpoint is deprecated"
            );
        }

        let expects_structured = request
            .header_value("accept")
            .map_or(true, |accept| BodyFormat::from_content_type(accept).is_some());
        if response.is_success() && !response.is_empty() && expects_structured {
            let content_type = response.content_type().unwrap_or("");
            if BodyFormat::from_content_type(content_type).is_none() {
                warn!(
                    endpoint = %request.path,
                    content_type,
                    "Unexpected response content type"
                );
            }
        }
    }
}

fn still_unauthorized(mut err: Error, reauthenticated: bool) -> Error {
    if !reauthenticated {
        return err;
    }
    let message = err
        .api_error()
        .map(|api| api.message.clone())
        .unwrap_or_else(|| "token rejected".to_string());
    let response = err.response.take();
    let mut out = Error::with_source(
        ErrorKind::Authentication(format!("token rejected after re-authentication: {message}")),
        err,
    );
    out.response = response;
    out
}

fn retries_exhausted(mut err: Error, attempts: u32) -> Error {
    let response = err.response.take();
    let mut out = Error::with_source(ErrorKind::RetriesExhausted { attempts }, err);
    out.response = response;
    out
}
