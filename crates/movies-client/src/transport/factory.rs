//! Named client factory
//!
//! One connection pool per registered name, built lazily on first use and
//! rebuilt only when the registration changes.

use dashmap::DashMap;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use std::sync::Arc;
use url::Url;

use super::{HttpClient, HttpConfig};
use crate::error::{ApiError, Result};

/// Settings bound to a client name
#[derive(Debug, Clone)]
pub struct ClientRegistration {
    pub base_url: Url,
    pub http: HttpConfig,
    pub default_headers: HeaderMap,
}

impl ClientRegistration {
    /// Registration that asks for JSON by default
    pub fn json(base_url: Url, http: HttpConfig) -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Self {
            base_url,
            http,
            default_headers,
        }
    }
}

/// Named client registrations, each backed by one lazily built connection pool
#[derive(Debug, Default)]
pub struct ClientFactory {
    registrations: DashMap<String, ClientRegistration>,
    pools: DashMap<String, Client>,
}

impl ClientFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the settings for `name`. A replaced
    /// registration drops its pool; handles already given out keep theirs.
    pub fn register(&self, name: impl Into<String>, registration: ClientRegistration) {
        let name = name.into();
        tracing::debug!("Registering client {} at {}", name, registration.base_url);
        self.pools.remove(&name);
        self.registrations.insert(name, registration);
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registrations.contains_key(name)
    }

    /// Hand out a client for `name`, sharing the pool of every earlier
    /// handle with the same name.
    pub fn client(&self, name: &str) -> Result<HttpClient> {
        let registration = self
            .registrations
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ApiError::UnknownClient(name.to_string()))?;

        let pool = self
            .pools
            .entry(name.to_string())
            .or_try_insert_with(|| {
                tracing::debug!("Building connection pool for client {}", name);
                registration.http.build_client()
            })?
            .value()
            .clone();

        Ok(
            HttpClient::new(name, registration.base_url, Arc::new(pool))
                .with_default_headers(registration.default_headers)
                .with_compression(registration.http.enable_compression),
        )
    }

    /// Number of connection pools built so far
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }
}
