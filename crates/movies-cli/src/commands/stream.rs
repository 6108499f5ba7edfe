use futures::StreamExt;
use movies_client::CancellationToken;

use super::Context;
use crate::output::{emit, movie_line};

/// Print each movie as soon as it arrives. Ctrl-C stops the feed.
pub async fn handle(ctx: &Context) -> anyhow::Result<()> {
    let token = CancellationToken::new();
    let interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let mut movies = ctx.api()?.stream_movies(Some(token)).await?;
    let mut count = 0usize;
    while let Some(movie) = movies.next().await {
        emit(ctx.format, &movie?, movie_line)?;
        count += 1;
    }

    tracing::info!("Received {} movies from the stream", count);
    Ok(())
}
