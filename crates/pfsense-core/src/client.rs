//! Authenticated HTTP client for the pfSense REST API.
//!
//! Requests are issued exactly once. A failed request is reported to the caller and
//! never retried.

use crate::config::PfsenseConfig;
use crate::types::{ApiEndpoint, ApiResponse};
use crate::{Error, Result};
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const USER_AGENT: &str = concat!("pfsense-core/", env!("CARGO_PKG_VERSION"));

/// Default request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 300;

/// Default connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 10;

/// Default idle timeout for connection pools
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,

    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Enable response compression
    pub enable_compression: bool,
}

impl ClientConfig {
    /// Create a new client configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT),
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            enable_compression: true,
        }
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set connection pool idle timeout.
    #[must_use]
    pub const fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    #[must_use]
    pub const fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Enable or disable compression.
    #[must_use]
    pub const fn with_compression(mut self, enabled: bool) -> Self {
        self.enable_compression = enabled;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    #[serde(rename = "client-id")]
    client_id: &'a str,
    #[serde(rename = "client-token")]
    client_token: &'a str,
}

#[derive(Deserialize)]
struct TokenData {
    #[serde(default)]
    token: String,
}

/// Builder for [`ApiClient`].
#[derive(Debug)]
pub struct ApiClientBuilder {
    base_url: Url,
    http_config: ClientConfig,
    tls_insecure: bool,
    token: Option<SecretString>,
}

impl ApiClientBuilder {
    /// Create a builder for the specified API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the URL cannot be parsed.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url.as_ref())?,
            http_config: ClientConfig::new(),
            tls_insecure: false,
            token: None,
        })
    }

    /// Create a builder from a provider configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the configured API URL cannot be parsed.
    pub fn from_config(config: &PfsenseConfig) -> Result<Self> {
        let builder = Self::new(&config.api_url)?
            .with_http_config(ClientConfig::new().with_timeout(config.timeout()))
            .with_tls_insecure(config.tls_insecure);
        Ok(builder)
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Accept invalid TLS certificates.
    #[must_use]
    pub const fn with_tls_insecure(mut self, insecure: bool) -> Self {
        self.tls_insecure = insecure;
        self
    }

    /// Use an already issued bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the underlying HTTP client cannot be built.
    pub fn build(self) -> Result<ApiClient> {
        let mut builder = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .timeout(self.http_config.timeout)
            .pool_idle_timeout(self.http_config.pool_idle_timeout)
            .pool_max_idle_per_host(self.http_config.pool_max_idle_per_host)
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT));

        if self.tls_insecure {
            warn!("TLS verification disabled for pfSense client");
            builder = builder.danger_accept_invalid_certs(true);
        }

        if !self.http_config.enable_compression {
            builder = builder.no_gzip();
        }

        let http = builder
            .build()
            .map_err(|err| Error::ConfigError(format!("Failed to build HTTP client: {err}")))?;

        Ok(ApiClient {
            http,
            base_url: self.base_url,
            token: self.token.map(Arc::new),
        })
    }

    /// Build the client and exchange the API client credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthenticationFailed`] when the appliance refuses the exchange or
    /// answers without a token.
    pub async fn authenticate(
        self,
        client_id: &str,
        client_token: &SecretString,
    ) -> Result<ApiClient> {
        let mut client = self.build()?;
        let request = TokenRequest {
            client_id,
            client_token: client_token.expose_secret(),
        };

        let (status, bytes) = client
            .execute(Method::POST, ApiEndpoint::AccessToken, &[], Some(&request))
            .await?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes);
            return Err(Error::AuthenticationFailed(format!(
                "token exchange returned {status}: {body}"
            )));
        }

        let response: ApiResponse<TokenData> = decode_body(ApiEndpoint::AccessToken, &bytes)?;
        if response.data.token.is_empty() {
            return Err(Error::AuthenticationFailed(format!(
                "token exchange returned no token: {}",
                response.message
            )));
        }

        debug!(client_id, "obtained pfSense bearer token");
        client.token = Some(Arc::new(SecretString::from(response.data.token)));
        Ok(client)
    }
}

/// Asynchronous pfSense API client.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    token: Option<Arc<SecretString>>,
}

impl ApiClient {
    /// Construct an unauthenticated client directly from the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] for an unusable base URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        ApiClientBuilder::new(base_url)?.build()
    }

    /// Build a client from the configuration and authenticate it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] for an unusable base URL and
    /// [`Error::AuthenticationFailed`] when the token exchange fails.
    pub async fn connect(config: &PfsenseConfig) -> Result<Self> {
        ApiClientBuilder::from_config(config)?
            .authenticate(&config.client_id, &config.client_token)
            .await
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns true once a bearer token is attached.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Issue a GET and decode the response envelope.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedStatus`] with the raw body on a non-success status.
    pub async fn get<R>(
        &self,
        endpoint: ApiEndpoint,
        params: &[(&'static str, String)],
    ) -> Result<ApiResponse<R>>
    where
        R: DeserializeOwned,
    {
        let (status, bytes) = self
            .execute::<()>(Method::GET, endpoint, params, None)
            .await?;
        if !status.is_success() {
            return Err(map_status_to_error(&Method::GET, status, &bytes));
        }
        decode_body(endpoint, &bytes)
    }

    /// Issue a POST and decode the response envelope.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteRejected`] with the raw body on a non-success status.
    pub async fn post<B, R>(&self, endpoint: ApiEndpoint, body: &B) -> Result<ApiResponse<R>>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let (status, bytes) = self
            .execute(Method::POST, endpoint, &[], Some(body))
            .await?;
        if !status.is_success() {
            return Err(map_status_to_error(&Method::POST, status, &bytes));
        }
        decode_body(endpoint, &bytes)
    }

    /// Issue a POST whose response payload is not needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteRejected`] with the raw body on a non-success status.
    pub async fn post_empty<B>(&self, endpoint: ApiEndpoint, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.send_empty(Method::POST, endpoint, body).await
    }

    /// Issue a PUT.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteRejected`] with the raw body on a non-success status.
    pub async fn put<B>(&self, endpoint: ApiEndpoint, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.send_empty(Method::PUT, endpoint, body).await
    }

    /// Issue a DELETE carrying a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteRejected`] with the raw body on a non-success status.
    pub async fn delete<B>(&self, endpoint: ApiEndpoint, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.send_empty(Method::DELETE, endpoint, body).await
    }

    async fn send_empty<B>(&self, method: Method, endpoint: ApiEndpoint, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let (status, bytes) = self
            .execute(method.clone(), endpoint, &[], Some(body))
            .await?;
        if status.is_success() {
            Ok(())
        } else {
            Err(map_status_to_error(&method, status, &bytes))
        }
    }

    fn build_url(&self, endpoint: ApiEndpoint) -> Result<Url> {
        let path = endpoint.path().trim_start_matches('/');
        self.base_url.join(path).map_err(|err| {
            Error::InvalidEndpoint(format!("Invalid API path `{}`: {err}", endpoint.path()))
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn execute<B>(
        &self,
        method: Method,
        endpoint: ApiEndpoint,
        params: &[(&'static str, String)],
        body: Option<&B>,
    ) -> Result<(StatusCode, Vec<u8>)>
    where
        B: Serialize + ?Sized,
    {
        let url = self.build_url(endpoint)?;
        let mut request = self
            .http
            .request(method.clone(), url)
            .query(params)
            .header("Accept", "application/json");
        request = self.authorize(request);
        if let Some(payload) = body {
            request = request.json(payload);
        }

        info!(%method, path = endpoint.path(), "pfSense request");

        let response = request.send().await?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| Error::Transport(format!("Failed to read response body: {err}")))?;

        debug!(%method, path = endpoint.path(), %status, len = bytes.len(), "pfSense response");
        Ok((status, bytes.to_vec()))
    }
}

fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)
        .map_err(|err| Error::ConfigError(format!("Invalid API base URL `{raw}`: {err}")))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn map_status_to_error(method: &Method, status: StatusCode, bytes: &[u8]) -> Error {
    let body = String::from_utf8_lossy(bytes).into_owned();
    if *method == Method::GET {
        Error::UnexpectedStatus {
            status: status.as_u16(),
            body,
        }
    } else {
        Error::RemoteRejected {
            status: status.as_u16(),
            body,
        }
    }
}

fn decode_body<R>(endpoint: ApiEndpoint, bytes: &[u8]) -> Result<R>
where
    R: DeserializeOwned,
{
    serde_json::from_slice(bytes).map_err(|err| {
        Error::ParseError(format!(
            "Failed to parse response for `{}`: {err}",
            endpoint.path()
        ))
    })
}
