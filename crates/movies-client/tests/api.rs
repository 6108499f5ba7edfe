#![allow(clippy::expect_used)]

mod common;

use common::{LEBOWSKI_ID, MOVIE_ID, client_for, movie_json};
use futures::StreamExt;
use movies_client::{
    ApiError, CancelReason, CancellationToken, JsonCodec, Movie, MoviesApiClient, Outcome,
    PosterForCreation, TransferMode, measure,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const POSTER_NAME: &str = "A new poster for The Big Lebowski";

fn lebowski() -> Uuid {
    Uuid::parse_str(LEBOWSKI_ID).expect("valid uuid")
}

fn api_for(server: &MockServer) -> MoviesApiClient {
    MoviesApiClient::new(client_for(server), Arc::new(JsonCodec::default()))
}

fn poster_json(poster_id: Uuid) -> serde_json::Value {
    json!({
        "id": poster_id,
        "movieId": LEBOWSKI_ID,
        "name": POSTER_NAME,
        "bytes": "AAECAwQFBgc="
    })
}

#[tokio::test]
async fn test_get_movies_and_films() {
    let server = MockServer::start().await;
    let catalog = json!([
        movie_json(MOVIE_ID, "The Big Lebowski"),
        movie_json(LEBOWSKI_ID, "Fargo")
    ]);
    for route in ["/api/movies", "/api/films"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(&catalog))
            .expect(1)
            .mount(&server)
            .await;
    }

    let api = api_for(&server);
    let movies = api.get_movies(None).await.expect("Operation should succeed");
    let films = api.get_films(None).await.expect("Operation should succeed");

    assert_eq!(movies.len(), 2);
    assert_eq!(movies, films);
    assert_eq!(movies[1].title, "Fargo");
}

#[tokio::test]
async fn test_get_poster_buffered_and_streamed() {
    let server = MockServer::start().await;
    let poster_id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path(format!("/api/movies/{LEBOWSKI_ID}/posters/{poster_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(poster_json(poster_id)))
        .expect(2)
        .mount(&server)
        .await;

    let api = api_for(&server);
    let buffered = api
        .get_poster(lebowski(), poster_id, TransferMode::Buffered, None)
        .await
        .expect("Operation should succeed");
    let streamed = api
        .get_poster(lebowski(), poster_id, TransferMode::Streamed, None)
        .await
        .expect("Operation should succeed");

    assert_eq!(buffered, streamed);
    let poster = streamed.into_option().expect("poster");
    assert_eq!(poster.id, poster_id);
    assert_eq!(poster.bytes, (0u8..8).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_get_poster_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let outcome = api_for(&server)
        .get_poster(lebowski(), Uuid::new_v4(), TransferMode::Streamed, None)
        .await
        .expect("Operation should succeed");
    assert_eq!(outcome, Outcome::NotFound);
}

#[tokio::test]
async fn test_create_poster_streamed_upload() {
    let server = MockServer::start().await;
    let poster_id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path(format!("/api/movies/{LEBOWSKI_ID}/posters")))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({ "name": POSTER_NAME })))
        .respond_with(ResponseTemplate::new(201).set_body_json(poster_json(poster_id)))
        .expect(1)
        .mount(&server)
        .await;

    let upload = PosterForCreation::with_random_bytes(POSTER_NAME, 256 * 1024);
    let created = api_for(&server)
        .create_poster(
            lebowski(),
            upload.clone(),
            TransferMode::Streamed,
            TransferMode::Streamed,
            None,
        )
        .await
        .expect("Operation should succeed");
    assert_eq!(created.id, poster_id);

    let requests = server.received_requests().await.expect("recording enabled");
    let sent: PosterForCreation =
        serde_json::from_slice(&requests[0].body).expect("Operation should succeed");
    assert_eq!(sent, upload);
}

#[tokio::test]
async fn test_create_poster_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(422))
        .mount(&server)
        .await;

    let result = api_for(&server)
        .create_poster(
            lebowski(),
            PosterForCreation::new(POSTER_NAME, vec![1, 2, 3]),
            TransferMode::Buffered,
            TransferMode::Buffered,
            None,
        )
        .await;
    assert_eq!(
        result.expect_err("422 must fail").status().map(|s| s.as_u16()),
        Some(422)
    );
}

#[tokio::test]
async fn test_trailer_cancelled_after_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("accept-encoding", "gzip"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let result = api_for(&server)
        .get_trailer(lebowski(), Uuid::new_v4(), Some(&token))
        .await;
    assert!(matches!(
        result,
        Err(ApiError::Cancelled(CancelReason::Requested))
    ));
}

#[tokio::test]
async fn test_stream_movies() {
    let server = MockServer::start().await;
    let body = format!(
        "[\n  {},\n  {}\n]",
        movie_json(MOVIE_ID, "The Big Lebowski"),
        movie_json(LEBOWSKI_ID, "Fargo")
    );
    Mock::given(method("GET"))
        .and(path("/api/moviesstream"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/json")
                .set_body_string(body),
        )
        .mount(&server)
        .await;

    let titles: Vec<String> = api_for(&server)
        .stream_movies(None)
        .await
        .expect("Operation should succeed")
        .map(|movie| movie.expect("movie").title)
        .collect()
        .await;
    assert_eq!(titles, vec!["The Big Lebowski", "Fargo"]);
}

#[tokio::test]
async fn test_stream_movies_truncated() {
    let server = MockServer::start().await;
    let body = format!("[{},{{\"id\":", movie_json(MOVIE_ID, "The Big Lebowski"));
    Mock::given(method("GET"))
        .and(path("/api/moviesstream"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let items: Vec<_> = api_for(&server)
        .stream_movies(None)
        .await
        .expect("Operation should succeed")
        .collect()
        .await;
    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    assert!(matches!(items[1], Err(ApiError::DecodeFailed(_))));
}

#[tokio::test]
async fn test_stream_movies_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/moviesstream"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .mount(&server)
        .await;

    let movies: Vec<movies_client::Result<Movie>> = api_for(&server)
        .stream_movies(None)
        .await
        .expect("Operation should succeed")
        .collect()
        .await;
    assert!(movies.is_empty());
}

#[tokio::test]
async fn test_measure_poster_downloads() {
    let server = MockServer::start().await;
    let poster_id = Uuid::new_v4();
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(poster_json(poster_id)))
        .expect(4)
        .mount(&server)
        .await;

    let api = api_for(&server);
    let report = measure(3, || {
        api.get_poster(lebowski(), poster_id, TransferMode::Streamed, None)
    })
    .await
    .expect("Operation should succeed");
    assert_eq!(report.iterations, 3);
}
