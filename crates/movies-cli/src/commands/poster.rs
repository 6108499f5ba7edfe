use clap::Subcommand;
use movies_client::{Outcome, PosterForCreation, TransferMode, measure};
use uuid::Uuid;

use super::{Context, DEFAULT_MOVIE_ID, Mode};
use crate::output::{TimingSummary, emit, poster_line, timing_line};

const DEFAULT_POSTER_NAME: &str = "A new poster for The Big Lebowski";

#[derive(Subcommand)]
pub enum PosterCommands {
    /// Download a poster
    Get {
        /// Movie the poster belongs to
        #[arg(long, default_value = DEFAULT_MOVIE_ID)]
        movie_id: Uuid,

        /// Poster id (random when omitted)
        #[arg(long)]
        poster_id: Option<Uuid>,

        /// How the response body is read
        #[arg(long, value_enum, default_value = "streamed")]
        mode: Mode,

        /// Repeat the download under the timing harness
        #[arg(long)]
        iterations: Option<u32>,
    },

    /// Upload a poster filled with random bytes
    Create {
        /// Movie the poster belongs to
        #[arg(long, default_value = DEFAULT_MOVIE_ID)]
        movie_id: Uuid,

        #[arg(long, default_value = DEFAULT_POSTER_NAME)]
        name: String,

        /// Payload size in bytes
        #[arg(long, default_value_t = 5 * 1024 * 1024)]
        size: usize,

        /// How the request body is sent
        #[arg(long, value_enum, default_value = "streamed")]
        mode: Mode,

        /// How the created poster is read back
        #[arg(long, value_enum, default_value = "streamed")]
        download_mode: Mode,

        /// Repeat the upload under the timing harness
        #[arg(long)]
        iterations: Option<u32>,
    },
}

pub async fn handle(cmd: PosterCommands, ctx: &Context) -> anyhow::Result<()> {
    match cmd {
        PosterCommands::Get {
            movie_id,
            poster_id,
            mode,
            iterations,
        } => {
            let poster_id = poster_id.unwrap_or_else(Uuid::new_v4);
            get(ctx, movie_id, poster_id, mode.into(), iterations).await
        }
        PosterCommands::Create {
            movie_id,
            name,
            size,
            mode,
            download_mode,
            iterations,
        } => {
            let poster = PosterForCreation::with_random_bytes(name, size);
            create(ctx, movie_id, poster, mode.into(), download_mode.into(), iterations).await
        }
    }
}

async fn get(
    ctx: &Context,
    movie_id: Uuid,
    poster_id: Uuid,
    mode: TransferMode,
    iterations: Option<u32>,
) -> anyhow::Result<()> {
    let api = ctx.api()?;

    if let Some(iterations) = iterations {
        let report =
            measure(iterations, || api.get_poster(movie_id, poster_id, mode, None)).await?;
        return emit(ctx.format, &TimingSummary::from(report), timing_line);
    }

    match api.get_poster(movie_id, poster_id, mode, None).await? {
        Outcome::Found(poster) => emit(ctx.format, &poster, poster_line),
        Outcome::NotFound => {
            println!("No poster {poster_id} for movie {movie_id}");
            Ok(())
        }
    }
}

async fn create(
    ctx: &Context,
    movie_id: Uuid,
    poster: PosterForCreation,
    upload: TransferMode,
    download: TransferMode,
    iterations: Option<u32>,
) -> anyhow::Result<()> {
    let api = ctx.api()?;
    tracing::info!(
        "Uploading {} bytes as {:?}, reading back as {:?}",
        poster.bytes.len(),
        upload,
        download
    );

    if let Some(iterations) = iterations {
        let report = measure(iterations, || {
            api.create_poster(movie_id, poster.clone(), upload, download, None)
        })
        .await?;
        return emit(ctx.format, &TimingSummary::from(report), timing_line);
    }

    let created = api
        .create_poster(movie_id, poster, upload, download, None)
        .await?;
    emit(ctx.format, &created, poster_line)
}
