pub mod movie;
pub mod movies;
pub mod poster;
pub mod stream;
pub mod trailer;

pub use poster::PosterCommands;

use movies_client::{
    ClientConfig, ClientFactory, JsonCodec, MovieAccessor, MoviesApiClient, TransferMode,
};
use std::sync::Arc;

use crate::output::OutputFormat;

/// Movie the sample poster and trailer routes hang off
pub const DEFAULT_MOVIE_ID: &str = "d8663e5e-7494-4f81-8739-6e0de1bea7ee";

/// Shared state for every command: one factory, one codec
pub struct Context {
    pub config: ClientConfig,
    pub factory: ClientFactory,
    pub codec: Arc<JsonCodec>,
    pub format: OutputFormat,
}

impl Context {
    pub fn new(config: ClientConfig, format: OutputFormat) -> movies_client::Result<Self> {
        let factory = config.factory()?;
        let codec = config.json_codec();
        tracing::debug!(
            "Using client {} at {}",
            config.client_name,
            config.base_url
        );
        Ok(Self {
            config,
            factory,
            codec,
            format,
        })
    }

    pub fn api(&self) -> movies_client::Result<MoviesApiClient> {
        let client = self.factory.client(&self.config.client_name)?;
        Ok(MoviesApiClient::new(client, Arc::clone(&self.codec)))
    }

    pub fn accessor(&self) -> movies_client::Result<MovieAccessor> {
        let client = self.factory.client(&self.config.client_name)?;
        Ok(MovieAccessor::new(client, Arc::clone(&self.codec)))
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Hold the whole body in memory
    Buffered,
    /// Encode or decode while the body moves
    #[default]
    Streamed,
}

impl From<Mode> for TransferMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Buffered => Self::Buffered,
            Mode::Streamed => Self::Streamed,
        }
    }
}
