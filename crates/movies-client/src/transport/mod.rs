//! Transport layer for Movies API operations
//!
//! This module keeps connection management out of the API types:
//! - [`Transport`] is the seam requests go through; `reqwest::Client` is the
//!   production implementation and tests plug in stubs
//! - [`HttpConfig`] tunes the pooled `reqwest` client
//! - [`HttpClient`] binds a shared transport to a base URL and default headers
//! - [`ClientFactory`] hands out named clients that reuse one pool per name

mod factory;

pub use factory::{ClientFactory, ClientRegistration};

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, ClientBuilder, Method, Request, Response};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Once};
use std::time::Duration;
use url::Url;

use crate::error::Result;

/// Install the ring provider for rustls exactly once per process.
pub(crate) fn ensure_crypto_provider() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        // Another component may already have installed a provider.
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Executes fully built requests.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Send `request` and resolve once the response headers are available.
    /// The body is left unread.
    async fn execute(&self, request: Request) -> Result<Response>;
}

#[async_trait]
impl Transport for Client {
    async fn execute(&self, request: Request) -> Result<Response> {
        Ok(Client::execute(self, request).await?)
    }
}

/// Handle to a named, pre-configured API client
///
/// Cloning is cheap; every clone shares the same transport.
#[derive(Clone)]
pub struct HttpClient {
    name: Arc<str>,
    transport: Arc<dyn Transport>,
    base_url: Url,
    default_headers: HeaderMap,
    compression: bool,
}

impl HttpClient {
    pub fn new(name: impl Into<Arc<str>>, base_url: Url, transport: Arc<dyn Transport>) -> Self {
        Self {
            name: name.into(),
            transport,
            base_url: normalize_base(base_url),
            default_headers: HeaderMap::new(),
            compression: false,
        }
    }

    /// Mark the transport as able to decode compressed bodies
    #[must_use]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compression = enabled;
        self
    }

    pub fn supports_compression(&self) -> bool {
        self.compression
    }

    #[must_use]
    pub fn with_default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = headers;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a path relative to the base URL
    pub fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Build a request carrying the client's default headers
    pub fn request(&self, method: Method, path: &str) -> Result<Request> {
        let url = self.url(path)?;
        tracing::debug!("{} {} via {}", method, url, self.name);

        let mut request = Request::new(method, url);
        for (name, value) in &self.default_headers {
            request.headers_mut().append(name.clone(), value.clone());
        }
        Ok(request)
    }

    pub async fn send(&self, request: Request) -> Result<Response> {
        self.transport.execute(request).await
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("name", &self.name)
            .field("base_url", &self.base_url.as_str())
            .field("compression", &self.compression)
            .finish_non_exhaustive()
    }
}

// `Url::join` replaces the last segment unless the base ends in a slash.
fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// HTTP client configuration with connection pool tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Overall request timeout; `None` lets long downloads run
    pub timeout: Option<Duration>,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Enable `TCP_NODELAY` (disable Nagle's algorithm)
    pub tcp_nodelay: bool,

    /// TCP keep-alive duration
    pub tcp_keepalive: Option<Duration>,

    /// Use HTTP/2 prior knowledge (faster but less compatible)
    pub http2_prior_knowledge: bool,

    /// Advertise and transparently decode gzip, brotli and deflate bodies
    pub enable_compression: bool,

    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            timeout: Some(Duration::from_secs(30)),
            connect_timeout: Duration::from_secs(10),
            tcp_nodelay: true,
            tcp_keepalive: Some(Duration::from_secs(60)),
            http2_prior_knowledge: false,
            enable_compression: true,
            user_agent: concat!("movies-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpConfig {
    /// Configuration for large or slow transfers: no overall deadline,
    /// only the connect timeout applies.
    pub fn streaming() -> Self {
        Self {
            timeout: None,
            pool_max_idle_per_host: 4,
            ..Self::default()
        }
    }

    /// Build a pooled `reqwest` client from this configuration
    pub fn build_client(&self) -> Result<Client> {
        ensure_crypto_provider();

        let mut builder = ClientBuilder::new()
            .pool_idle_timeout(self.pool_idle_timeout)
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .connect_timeout(self.connect_timeout)
            .tcp_nodelay(self.tcp_nodelay)
            .tcp_keepalive(self.tcp_keepalive)
            .user_agent(self.user_agent.as_str())
            .gzip(self.enable_compression)
            .brotli(self.enable_compression)
            .deflate(self.enable_compression);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if self.http2_prior_knowledge {
            builder = builder.http2_prior_knowledge();
        }

        Ok(builder.build()?)
    }
}
