use movies_client::{Movie, Poster, TimingReport, Trailer};
use serde::Serialize;

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable lines
    Text,
    /// One pretty-printed JSON document per result
    Json,
}

pub fn emit<T: Serialize>(
    format: OutputFormat,
    value: &T,
    text: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => println!("{}", text(value)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

pub fn movie_line(movie: &Movie) -> String {
    format!(
        "{}  {} ({}), directed by {}{}",
        movie.id,
        movie.title,
        movie.release_date.format("%Y"),
        movie.director,
        movie
            .genre
            .as_deref()
            .map(|genre| format!(" [{genre}]"))
            .unwrap_or_default()
    )
}

pub fn poster_line(poster: &Poster) -> String {
    format!(
        "Poster {} for movie {}: {} ({} bytes)",
        poster.id,
        poster.movie_id,
        poster.name,
        poster.bytes.len()
    )
}

pub fn trailer_line(trailer: &Trailer) -> String {
    format!(
        "Trailer {} for movie {}: {} ({} bytes)",
        trailer.id,
        trailer.movie_id,
        trailer.name,
        trailer.bytes.len()
    )
}

#[derive(Serialize)]
pub struct TimingSummary {
    pub iterations: u32,
    pub total_ms: u128,
    pub average_ms: u128,
}

impl From<TimingReport> for TimingSummary {
    fn from(report: TimingReport) -> Self {
        Self {
            iterations: report.iterations,
            total_ms: report.total.as_millis(),
            average_ms: report.average.as_millis(),
        }
    }
}

pub fn timing_line(summary: &TimingSummary) -> String {
    format!(
        "Elapsed milliseconds: {}, averaging {} milliseconds/request over {} requests",
        summary.total_ms, summary.average_ms, summary.iterations
    )
}
