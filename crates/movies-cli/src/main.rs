mod commands;
mod output;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use commands::{Context, PosterCommands};
use movies_client::ClientConfig;
use output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "movies",
    about = "Client for the Movies catalog API",
    version,
    long_about = "A command-line tool for the Movies catalog API: single movie lookups, listings, poster uploads and downloads, trailers with cancellation, and the streamed movie feed."
)]
struct Cli {
    /// Root URL of the Movies API
    #[arg(long, global = true, env = "MOVIES_API_BASE_URL")]
    base_url: Option<String>,

    /// Set the logging level (RUST_LOG takes precedence)
    #[arg(short, long, value_enum, global = true, default_value = "info")]
    log_level: LogLevel,

    /// Overall request timeout in seconds, 0 disables it
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Output format
    #[arg(short = 'o', long, value_enum, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a single movie by id
    Movie(commands::movie::MovieArgs),

    /// List the movie catalog
    Movies(commands::movies::MoviesArgs),

    /// Download or upload posters
    #[command(subcommand)]
    Poster(PosterCommands),

    /// Fetch a trailer, cancelling it after a delay
    Trailer(commands::trailer::TrailerArgs),

    /// Print movies from the streamed feed as they arrive
    Stream,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = ClientConfig::from_env();
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(secs) = cli.timeout_secs {
        config.http.timeout = (secs > 0).then(|| Duration::from_secs(secs));
    }

    let ctx = Context::new(config, cli.format).context("Failed to set up the API client")?;

    match cli.command {
        Commands::Movie(args) => commands::movie::handle(args, &ctx).await,
        Commands::Movies(args) => commands::movies::handle(args, &ctx).await,
        Commands::Poster(cmd) => commands::poster::handle(cmd, &ctx).await,
        Commands::Trailer(args) => commands::trailer::handle(args, &ctx).await,
        Commands::Stream => commands::stream::handle(&ctx).await,
    }
}
