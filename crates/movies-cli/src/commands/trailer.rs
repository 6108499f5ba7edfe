use clap::Args;
use movies_client::{ApiError, CancellationToken, Outcome};
use std::time::Duration;
use uuid::Uuid;

use super::{Context, DEFAULT_MOVIE_ID};
use crate::output::{emit, trailer_line};

#[derive(Args)]
pub struct TrailerArgs {
    /// Movie the trailer belongs to
    #[arg(long, default_value = DEFAULT_MOVIE_ID)]
    pub movie_id: Uuid,

    /// Trailer id (random when omitted)
    #[arg(long)]
    pub trailer_id: Option<Uuid>,

    /// Cancel the request after this many milliseconds
    #[arg(long, default_value_t = 200)]
    pub cancel_after_ms: u64,
}

pub async fn handle(args: TrailerArgs, ctx: &Context) -> anyhow::Result<()> {
    let api = ctx.api()?;
    let trailer_id = args.trailer_id.unwrap_or_else(Uuid::new_v4);

    let token = CancellationToken::new();
    let trigger = token.clone();
    let delay = Duration::from_millis(args.cancel_after_ms);
    let timer = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        trigger.cancel();
    });

    let result = api.get_trailer(args.movie_id, trailer_id, Some(&token)).await;
    timer.abort();

    match result {
        Ok(Outcome::Found(trailer)) => emit(ctx.format, &trailer, trailer_line),
        Ok(Outcome::NotFound) => {
            println!("No trailer {trailer_id} for movie {}", args.movie_id);
            Ok(())
        }
        Err(ApiError::Cancelled(reason)) => {
            tracing::warn!("Trailer request cancelled: {}", reason);
            Err(ApiError::Cancelled(reason).into())
        }
        Err(e) => Err(e.into()),
    }
}
