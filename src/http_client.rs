use anyhow::{Context, Result};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE,
    IF_MODIFIED_SINCE, IF_NONE_MATCH,
};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{CredentialStore, ObserverGuard, ObserverSlot, SessionObserver};
use crate::config::{normalize_base_url, Config};
use crate::error::{classify, ErrorKind, FailureContext, HttpError};

/// Cache lifetime requested when a hint leaves the TTL unspecified (1 hour)
pub const DEFAULT_CACHE_TTL: u64 = 3600;

/// Desired server-side cache lifetime, in seconds
pub const X_CACHE_TTL: &str = "x-cache-ttl";

/// Placeholder for body-less mutating requests
pub const NO_BODY: Option<&()> = None;

/// Advisory cache negotiation for GET requests
///
/// Translated into request headers only; nothing is cached locally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheHint {
    pub ttl_seconds: Option<u64>,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

impl CacheHint {
    /// Hint with the default TTL
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ttl(ttl_seconds: u64) -> Self {
        Self {
            ttl_seconds: Some(ttl_seconds),
            ..Self::default()
        }
    }

    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    pub fn with_last_modified(mut self, last_modified: impl Into<String>) -> Self {
        self.last_modified = Some(last_modified.into());
        self
    }

    pub fn effective_ttl(&self) -> u64 {
        self.ttl_seconds.unwrap_or(DEFAULT_CACHE_TTL)
    }
}

/// Per-request query parameters and header overrides
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }
}

/// Options accepted by GET: the usual request config plus an optional cache hint
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    pub config: RequestConfig,
    pub cache: Option<CacheHint>,
}

impl GetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(hint: CacheHint) -> Self {
        Self {
            config: RequestConfig::default(),
            cache: Some(hint),
        }
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.config = self.config.query(key, value);
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.config = self.config.header(name, value);
        self
    }

    pub fn cache(mut self, hint: CacheHint) -> Self {
        self.cache = Some(hint);
        self
    }
}

impl From<RequestConfig> for GetOptions {
    fn from(config: RequestConfig) -> Self {
        Self {
            config,
            cache: None,
        }
    }
}

/// Uniform response shape, independent of the transport
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: u16,
    pub ok: bool,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, status: u16) -> Self {
        Self {
            data,
            status,
            ok: (200..300).contains(&status),
        }
    }

    pub fn into_data(self) -> T {
        self.data
    }
}

/// Build the outbound header set for one request
///
/// Layers, later wins on collision: JSON defaults, cache headers, caller
/// overrides, then the bearer credential.
pub fn assemble_headers(
    access_token: Option<&str>,
    cache: Option<&CacheHint>,
    overrides: &[(String, String)],
) -> Result<HeaderMap, HttpError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    if let Some(hint) = cache {
        let ttl = hint.effective_ttl();
        headers.insert(
            HeaderName::from_static(X_CACHE_TTL),
            HeaderValue::from(ttl),
        );
        headers.insert(CACHE_CONTROL, header_value(&format!("max-age={}", ttl))?);
        if let Some(ref etag) = hint.etag {
            headers.insert(IF_NONE_MATCH, header_value(etag)?);
        }
        if let Some(ref last_modified) = hint.last_modified {
            headers.insert(IF_MODIFIED_SINCE, header_value(last_modified)?);
        }
    }

    for (name, value) in overrides {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            HttpError::new(
                ErrorKind::TransportFailure,
                format!("Invalid header name '{}': {}", name, e),
                0,
            )
        })?;
        headers.insert(name, header_value(value)?);
    }

    if let Some(token) = access_token.filter(|t| !t.is_empty()) {
        let mut value = header_value(&format!("Bearer {}", token))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue, HttpError> {
    HeaderValue::from_str(value).map_err(|e| {
        HttpError::new(
            ErrorKind::TransportFailure,
            format!("Invalid header value: {}", e),
            0,
        )
    })
}

/// Single egress point for every backend call
///
/// Injects the bearer credential, normalizes failures, and tears the session
/// down when the backend answers 401. Clones share the credential store and
/// the observer slot.
#[derive(Clone)]
pub struct GatewayClient {
    /// Shared HTTP client with connection pooling
    client: Client,

    /// Backend base URL without trailing slash; may be empty
    base_url: String,

    /// Where the access token is read from and cleared on 401
    store: Arc<dyn CredentialStore>,

    /// Receives session-expiry notifications
    observer: ObserverSlot,
}

impl GatewayClient {
    /// Create a new gateway client
    pub fn new(
        base_url: &str,
        store: Arc<dyn CredentialStore>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = normalize_base_url(base_url);
        if base_url.is_empty() {
            tracing::warn!("No API base URL configured, requests will fail");
        }

        Ok(Self {
            client,
            base_url,
            store,
            observer: ObserverSlot::new(),
        })
    }

    /// Create a gateway client from loaded configuration
    pub fn from_config(config: &Config, store: Arc<dyn CredentialStore>) -> Result<Self> {
        Self::new(
            &config.api_url,
            store,
            Duration::from_secs(config.http_connect_timeout),
            Duration::from_secs(config.http_request_timeout),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The credential store this client reads from
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Register (or with `None`, clear) the session observer
    pub fn set_session_observer(&self, observer: Option<Arc<dyn SessionObserver>>) {
        self.observer.set(observer);
    }

    /// Register a session observer until the returned guard is dropped
    pub fn observe_session(&self, observer: Arc<dyn SessionObserver>) -> ObserverGuard {
        self.observer.register(observer)
    }

    /// GET, optionally negotiating server-side caching
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        options: GetOptions,
    ) -> Result<ApiResponse<T>, HttpError> {
        let GetOptions { config, cache } = options;
        self.execute(Method::GET, path, None, config, cache).await
    }

    pub async fn post<T, B>(
        &self,
        path: &str,
        body: Option<&B>,
        config: RequestConfig,
    ) -> Result<ApiResponse<T>, HttpError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = encode_body(body)?;
        self.execute(Method::POST, path, body, config, None).await
    }

    pub async fn put<T, B>(
        &self,
        path: &str,
        body: Option<&B>,
        config: RequestConfig,
    ) -> Result<ApiResponse<T>, HttpError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = encode_body(body)?;
        self.execute(Method::PUT, path, body, config, None).await
    }

    pub async fn patch<T, B>(
        &self,
        path: &str,
        body: Option<&B>,
        config: RequestConfig,
    ) -> Result<ApiResponse<T>, HttpError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = encode_body(body)?;
        self.execute(Method::PATCH, path, body, config, None).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        config: RequestConfig,
    ) -> Result<ApiResponse<T>, HttpError> {
        self.execute(Method::DELETE, path, None, config, None).await
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Token resolution → header assembly → dispatch → classify and handle
    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        config: RequestConfig,
        cache: Option<CacheHint>,
    ) -> Result<ApiResponse<T>, HttpError> {
        let request_id = uuid::Uuid::new_v4().to_string()[..8].to_string();
        let url = self.url(path);

        let access_token = self.store.access_token().await;
        let headers = assemble_headers(access_token.as_deref(), cache.as_ref(), &config.headers)?;

        tracing::debug!(
            request_id = %request_id,
            method = %method,
            url = %url,
            authenticated = access_token.is_some(),
            cache_ttl = ?cache.as_ref().map(CacheHint::effective_ttl),
            "Sending HTTP request"
        );

        let mut builder = self.client.request(method.clone(), &url).headers(headers);
        if !config.query.is_empty() {
            builder = builder.query(&config.query);
        }
        if let Some(ref body) = body {
            builder = builder.json(body);
        }

        match builder.send().await {
            Ok(response) => self.handle_response(response, &request_id).await,
            Err(e) => {
                let error_kind = if e.is_timeout() {
                    "timeout"
                } else if e.is_connect() {
                    "connection_failed"
                } else if e.is_builder() {
                    "builder_error"
                } else if e.is_request() {
                    "request_error"
                } else {
                    "unknown"
                };

                tracing::warn!(
                    request_id = %request_id,
                    error_kind = error_kind,
                    error = %e,
                    method = %method,
                    url = %url,
                    "HTTP request error"
                );

                Err(self.fail(FailureContext::from_reqwest(e)).await)
            }
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
        request_id: &str,
    ) -> Result<ApiResponse<T>, HttpError> {
        let status = response.status();

        // The response only counts as received once the body is in
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(
                    request_id = %request_id,
                    status = status.as_u16(),
                    error = %e,
                    "Failed to read response body"
                );
                return Err(self.fail(FailureContext::from_reqwest(e)).await);
            }
        };

        tracing::debug!(
            request_id = %request_id,
            status = %status,
            bytes = bytes.len(),
            "Received HTTP response"
        );

        if !status.is_success() {
            let body = raw_payload(&bytes);
            tracing::warn!(
                request_id = %request_id,
                status = status.as_u16(),
                response_body = ?body,
                "Received error response"
            );
            return Err(self
                .fail(FailureContext::from_response(status.as_u16(), body))
                .await);
        }

        match decode_body(&bytes) {
            Ok(data) => Ok(ApiResponse::new(data, status.as_u16())),
            Err(e) => {
                tracing::warn!(
                    request_id = %request_id,
                    status = status.as_u16(),
                    error = %e,
                    "Failed to decode response body"
                );
                Err(self
                    .fail(FailureContext {
                        transport_message: Some(format!("Failed to decode response body: {}", e)),
                        status: Some(status.as_u16()),
                        body: raw_payload(&bytes),
                        ..FailureContext::default()
                    })
                    .await)
            }
        }
    }

    /// Normalize a failure, tearing the session down first when it is a 401
    async fn fail(&self, ctx: FailureContext) -> HttpError {
        let error = classify(ctx);
        if error.is_unauthorized() {
            self.end_session().await;
        }
        error
    }

    /// Clear credentials, then notify the observer
    async fn end_session(&self) {
        tracing::warn!("Received 401, clearing stored credentials");

        if let Err(e) = self.store.clear().await {
            tracing::error!(error = %e, "Failed to clear credentials after 401");
        }

        if self.observer.notify() {
            tracing::debug!("Session observer notified");
        } else {
            tracing::debug!("No session observer registered");
        }
    }
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("base_url", &self.base_url)
            .field("observer", &self.observer)
            .finish()
    }
}

fn encode_body<B: Serialize + ?Sized>(body: Option<&B>) -> Result<Option<Value>, HttpError> {
    body.map(serde_json::to_value).transpose().map_err(|e| {
        HttpError::new(
            ErrorKind::TransportFailure,
            format!("Failed to serialize request body: {}", e),
            0,
        )
    })
}

/// Empty bodies decode as JSON `null`, so `()` and `Option<_>` accept 204s
fn decode_body<T: DeserializeOwned>(bytes: &[u8]) -> serde_json::Result<T> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_value(Value::Null)
    } else {
        serde_json::from_slice(bytes)
    }
}

/// Preserve whatever the server sent: JSON when it parses, text otherwise
fn raw_payload(bytes: &[u8]) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    serde_json::from_slice(bytes)
        .ok()
        .or_else(|| Some(Value::String(String::from_utf8_lossy(bytes).into_owned())))
}
