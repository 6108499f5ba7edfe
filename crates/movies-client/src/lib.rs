//! # movies-client - Typed client for the Movies catalog API
//!
//! This crate wraps a pooled `reqwest` client with the conventions of the
//! Movies API: JSON bodies with camelCase fields, base64 binary payloads and
//! a fixed mapping from HTTP status to typed results.
//!
//! ## Status classification
//!
//! Every single-resource read resolves to an [`Outcome`]:
//!
//! | Response | Result |
//! |----------|--------|
//! | 2xx | `Ok(Outcome::Found(value))`, body decoded while it streams in |
//! | 404 | `Ok(Outcome::NotFound)` |
//! | 401 | `Err(ApiError::AccessDenied)` |
//! | other | `Err(ApiError::RequestFailed { status })` |
//!
//! Cancellation through a [`CancellationToken`] and elapsed deadlines both
//! surface as [`ApiError::Cancelled`].
//!
//! ## Clients
//!
//! - [`MovieAccessor`]: fetch one movie by id
//! - [`MoviesApiClient`]: list, poster, trailer and streaming routes
//! - [`ClientFactory`]: named clients sharing one connection pool per name
//!
//! ## Usage
//!
//! ```rust,no_run
//! use movies_client::{ClientConfig, MovieAccessor, Outcome};
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env();
//!     let factory = config.factory()?;
//!     let accessor = MovieAccessor::new(factory.client(&config.client_name)?, config.json_codec());
//!
//!     let id = Uuid::parse_str("030a43b0-f9a5-405a-811c-bf342524b2be")?;
//!     match accessor.fetch_movie(id, None).await? {
//!         Outcome::Found(movie) => println!("{} ({})", movie.title, movie.director),
//!         Outcome::NotFound => println!("No movie with id {id}"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod accessor;
pub mod api;
pub mod body;
pub mod cancel;
pub mod codec;
pub mod config;
pub mod error;
pub mod harness;
pub mod json_stream;
pub mod model;
pub mod transport;

pub use accessor::{MovieAccessor, Outcome};
pub use api::MoviesApiClient;
pub use body::TransferMode;
pub use cancel::cancellable;
pub use codec::{CodecOptions, JsonCodec};
pub use config::ClientConfig;
pub use error::{ApiError, CancelReason, Result};
pub use harness::{TimingReport, measure};
pub use json_stream::JsonArraySplitter;
pub use model::{Movie, Poster, PosterForCreation, Trailer};
pub use transport::{ClientFactory, ClientRegistration, HttpClient, HttpConfig, Transport};

pub use tokio_util::sync::CancellationToken;
