//! Client configuration

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::codec::{CodecOptions, JsonCodec};
use crate::error::Result;
use crate::transport::{ClientFactory, ClientRegistration, HttpConfig};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5001";
pub const DEFAULT_CLIENT_NAME: &str = "MoviesAPIClient";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Root of the Movies API
    pub base_url: String,

    /// Name the client is registered under in the factory
    pub client_name: String,

    pub http: HttpConfig,

    pub codec: CodecOptions,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            http: HttpConfig::default(),
            codec: CodecOptions::default(),
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from any key lookup. Missing or malformed values
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());
        let flag = |key: &str| lookup(key).and_then(|s| parse_bool(&s));

        let mut http = defaults.http;
        if let Some(secs) = parsed("MOVIES_API_CONNECT_TIMEOUT") {
            http.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parsed("MOVIES_API_REQUEST_TIMEOUT") {
            http.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(max_idle) = parsed("MOVIES_API_POOL_MAX_IDLE") {
            http.pool_max_idle_per_host = usize::try_from(max_idle).unwrap_or(usize::MAX);
        }
        if let Some(enabled) = flag("MOVIES_API_COMPRESSION") {
            http.enable_compression = enabled;
        }

        let mut codec = defaults.codec;
        if let Some(pretty) = flag("MOVIES_API_PRETTY_JSON") {
            codec.pretty = pretty;
        }

        Self {
            base_url: lookup("MOVIES_API_BASE_URL")
                .map(|s| s.trim().to_string())
                .filter(|s| Url::parse(s).is_ok())
                .unwrap_or(defaults.base_url),
            client_name: lookup("MOVIES_API_CLIENT_NAME")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.client_name),
            http,
            codec,
        }
    }

    pub fn registration(&self) -> Result<ClientRegistration> {
        Ok(ClientRegistration::json(
            Url::parse(&self.base_url)?,
            self.http.clone(),
        ))
    }

    /// Factory with this configuration registered under `client_name`
    pub fn factory(&self) -> Result<ClientFactory> {
        let factory = ClientFactory::new();
        factory.register(self.client_name.clone(), self.registration()?);
        Ok(factory)
    }

    pub fn json_codec(&self) -> Arc<JsonCodec> {
        Arc::new(JsonCodec::new(self.codec))
    }

    /// Shorthand for building the factory and asking it for the named client
    pub fn api_client(&self) -> Result<crate::api::MoviesApiClient> {
        let client = self.factory()?.client(&self.client_name)?;
        Ok(crate::api::MoviesApiClient::new(client, self.json_codec()))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
