use clap::Args;
use movies_client::Outcome;
use uuid::Uuid;

use super::Context;
use crate::output::{emit, movie_line};

#[derive(Args)]
pub struct MovieArgs {
    /// Movie id
    #[arg(default_value = "030a43b0-f9a5-405a-811c-bf342524b2be")]
    pub id: Uuid,
}

pub async fn handle(args: MovieArgs, ctx: &Context) -> anyhow::Result<()> {
    match ctx.accessor()?.fetch_movie(args.id, None).await? {
        Outcome::Found(movie) => emit(ctx.format, &movie, movie_line),
        Outcome::NotFound => {
            println!("No movie found with id {}", args.id);
            Ok(())
        }
    }
}
