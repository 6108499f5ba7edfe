//! Typed client for the Movies API routes

use futures::stream::{BoxStream, StreamExt};
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::accessor::{Outcome, ensure_success, fetch_outcome, fetch_value, json_request};
use crate::body::{TransferMode, json_body};
use crate::cancel::cancellable;
use crate::codec::JsonCodec;
use crate::error::Result;
use crate::json_stream::json_array_stream;
use crate::model::{Movie, Poster, PosterForCreation, Trailer};
use crate::transport::HttpClient;

pub const MOVIES_PATH: &str = "api/movies";
pub const FILMS_PATH: &str = "api/films";
pub const MOVIES_STREAM_PATH: &str = "api/moviesstream";

/// Typed operations on the Movies API over one named client
#[derive(Debug, Clone)]
pub struct MoviesApiClient {
    client: HttpClient,
    codec: Arc<JsonCodec>,
}

impl MoviesApiClient {
    pub fn new(client: HttpClient, codec: Arc<JsonCodec>) -> Self {
        Self { client, codec }
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Fetch the full movie catalog
    pub async fn get_movies(&self, cancel: Option<&CancellationToken>) -> Result<Vec<Movie>> {
        self.list(MOVIES_PATH, cancel).await
    }

    /// Same catalog as [`Self::get_movies`], served from the `films` route
    pub async fn get_films(&self, cancel: Option<&CancellationToken>) -> Result<Vec<Movie>> {
        self.list(FILMS_PATH, cancel).await
    }

    async fn list(&self, path: &str, cancel: Option<&CancellationToken>) -> Result<Vec<Movie>> {
        let request = json_request(&self.client, Method::GET, path, true)?;
        let movies: Vec<Movie> = fetch_value(
            &self.client,
            &self.codec,
            request,
            TransferMode::Streamed,
            cancel,
        )
        .await?;
        tracing::debug!("Received {} movies from {}", movies.len(), path);
        Ok(movies)
    }

    /// Fetch one poster, reading the body with `mode`
    pub async fn get_poster(
        &self,
        movie_id: Uuid,
        poster_id: Uuid,
        mode: TransferMode,
        cancel: Option<&CancellationToken>,
    ) -> Result<Outcome<Poster>> {
        let path = format!("{MOVIES_PATH}/{movie_id}/posters/{poster_id}");
        let request = json_request(&self.client, Method::GET, &path, false)?;
        fetch_outcome(&self.client, &self.codec, request, mode, cancel, None).await
    }

    /// Create a poster. `upload` picks how the request body is produced and
    /// `download` how the created poster is read back.
    pub async fn create_poster(
        &self,
        movie_id: Uuid,
        poster: PosterForCreation,
        upload: TransferMode,
        download: TransferMode,
        cancel: Option<&CancellationToken>,
    ) -> Result<Poster> {
        poster.validate()?;

        let path = format!("{MOVIES_PATH}/{movie_id}/posters");
        let mut request = json_request(&self.client, Method::POST, &path, false)?;
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        *request.body_mut() = Some(json_body(&self.codec, poster, upload)?);

        fetch_value(&self.client, &self.codec, request, download, cancel).await
    }

    /// Fetch one trailer; `cancel` aborts the call at any point
    pub async fn get_trailer(
        &self,
        movie_id: Uuid,
        trailer_id: Uuid,
        cancel: Option<&CancellationToken>,
    ) -> Result<Outcome<Trailer>> {
        let path = format!("{MOVIES_PATH}/{movie_id}/trailers/{trailer_id}");
        let request = json_request(&self.client, Method::GET, &path, true)?;
        fetch_outcome(
            &self.client,
            &self.codec,
            request,
            TransferMode::Streamed,
            cancel,
            None,
        )
        .await
    }

    /// Open the movies stream and yield each movie as soon as it has been
    /// received in full.
    ///
    /// Failures before the body starts are returned directly; failures while
    /// reading end the stream with one error item.
    pub async fn stream_movies(
        &self,
        cancel: Option<CancellationToken>,
    ) -> Result<BoxStream<'static, Result<Movie>>> {
        let request = json_request(&self.client, Method::GET, MOVIES_STREAM_PATH, true)?;
        let response = cancellable(cancel.as_ref(), None, async {
            ensure_success(self.client.send(request).await?)
        })
        .await?;

        Ok(json_array_stream(response, self.codec.as_ref().clone(), cancel).boxed())
    }
}
