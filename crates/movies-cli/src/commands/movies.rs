use clap::Args;

use super::Context;
use crate::output::{OutputFormat, movie_line};

#[derive(Args)]
pub struct MoviesArgs {
    /// Read the catalog from the films route instead
    #[arg(long)]
    pub films: bool,
}

pub async fn handle(args: MoviesArgs, ctx: &Context) -> anyhow::Result<()> {
    let api = ctx.api()?;
    let movies = if args.films {
        api.get_films(None).await?
    } else {
        api.get_movies(None).await?
    };

    match ctx.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&movies)?);
            Ok(())
        }
        OutputFormat::Text => {
            for movie in &movies {
                println!("{}", movie_line(movie));
            }
            println!("{} movies", movies.len());
            Ok(())
        }
    }
}
