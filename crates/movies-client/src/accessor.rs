//! Typed single-resource reads
//!
//! [`MovieAccessor`] fetches one movie by id and folds the HTTP status into
//! an [`Outcome`]: a decoded body, or `NotFound` for a 404. A 401 becomes
//! [`ApiError::AccessDenied`] and any other unsuccessful status becomes
//! [`ApiError::RequestFailed`].

use reqwest::header::{ACCEPT, ACCEPT_ENCODING, HeaderValue};
use reqwest::{Method, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::body::{TransferMode, decode_json};
use crate::cancel::cancellable;
use crate::codec::JsonCodec;
use crate::error::{ApiError, Result};
use crate::model::Movie;
use crate::transport::HttpClient;

/// Result of fetching a single resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Found(T),
    NotFound,
}

impl<T> Outcome<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Self::Found(value) => Outcome::Found(f(value)),
            Self::NotFound => Outcome::NotFound,
        }
    }
}

impl<T> From<Outcome<T>> for Option<T> {
    fn from(outcome: Outcome<T>) -> Self {
        outcome.into_option()
    }
}

/// Reads movies through a shared client and codec
#[derive(Debug, Clone)]
pub struct MovieAccessor {
    client: HttpClient,
    codec: Arc<JsonCodec>,
    deadline: Option<Duration>,
}

impl MovieAccessor {
    pub fn new(client: HttpClient, codec: Arc<JsonCodec>) -> Self {
        Self {
            client,
            codec,
            deadline: None,
        }
    }

    /// Bound every call by `deadline`, on top of any transport timeout.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    pub async fn fetch_movie(
        &self,
        id: Uuid,
        cancel: Option<&CancellationToken>,
    ) -> Result<Outcome<Movie>> {
        self.fetch_resource(&format!("api/movies/{id}"), cancel)
            .await
    }

    /// Fetch and decode the resource at `path`, relative to the base URL.
    pub async fn fetch_resource<T>(
        &self,
        path: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Outcome<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let request = json_request(&self.client, Method::GET, path, true)?;
        fetch_outcome(
            &self.client,
            &self.codec,
            request,
            TransferMode::Streamed,
            cancel,
            self.deadline,
        )
        .await
    }
}

/// Build a request that accepts JSON, and gzip when `compressed` is set and
/// the client can decode it.
pub(crate) fn json_request(
    client: &HttpClient,
    method: Method,
    path: &str,
    compressed: bool,
) -> Result<Request> {
    let mut request = client.request(method, path)?;
    let headers = request.headers_mut();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if compressed && client.supports_compression() {
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
    }
    Ok(request)
}

/// Map 401 and every other unsuccessful status to an error.
pub(crate) fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        tracing::debug!("{} answered 401", response.url());
        Err(ApiError::AccessDenied)
    } else if !status.is_success() {
        tracing::debug!("{} answered {}", response.url(), status);
        Err(ApiError::RequestFailed { status })
    } else {
        Ok(response)
    }
}

/// Like [`ensure_success`], with 404 reported as `None`.
pub(crate) fn classify(response: Response) -> Result<Option<Response>> {
    if response.status() == StatusCode::NOT_FOUND {
        tracing::debug!("{} not found", response.url());
        return Ok(None);
    }
    ensure_success(response).map(Some)
}

/// Send `request` and decode a single resource from a successful response.
///
/// The response is dropped on every path out of this function, which
/// returns its connection to the pool or closes it.
pub(crate) async fn fetch_outcome<T>(
    client: &HttpClient,
    codec: &JsonCodec,
    request: Request,
    mode: TransferMode,
    cancel: Option<&CancellationToken>,
    deadline: Option<Duration>,
) -> Result<Outcome<T>>
where
    T: DeserializeOwned + Send + 'static,
{
    cancellable(cancel, deadline, async {
        // Ends the body stream if this future is dropped mid-decode.
        let body_token = cancel.map_or_else(CancellationToken::new, CancellationToken::child_token);
        let _stop_body = body_token.clone().drop_guard();

        let response = client.send(request).await?;
        match classify(response)? {
            Some(response) => decode_json(response, codec, mode, Some(&body_token))
                .await
                .map(Outcome::Found),
            None => Ok(Outcome::NotFound),
        }
    })
    .await
}

/// Send `request` and decode the body of a successful response.
pub(crate) async fn fetch_value<T>(
    client: &HttpClient,
    codec: &JsonCodec,
    request: Request,
    mode: TransferMode,
    cancel: Option<&CancellationToken>,
) -> Result<T>
where
    T: DeserializeOwned + Send + 'static,
{
    cancellable(cancel, None, async {
        let body_token = cancel.map_or_else(CancellationToken::new, CancellationToken::child_token);
        let _stop_body = body_token.clone().drop_guard();

        let response = ensure_success(client.send(request).await?)?;
        decode_json(response, codec, mode, Some(&body_token)).await
    })
    .await
}
