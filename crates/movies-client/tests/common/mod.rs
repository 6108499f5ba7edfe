#![allow(dead_code, clippy::expect_used)]

use movies_client::{ClientFactory, ClientRegistration, HttpClient, HttpConfig};
use std::sync::Once;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;
use url::Url;
use wiremock::MockServer;

pub const CLIENT_NAME: &str = "MoviesAPIClient";
pub const MOVIE_ID: &str = "030a43b0-f9a5-405a-811c-bf342524b2be";
pub const LEBOWSKI_ID: &str = "d8663e5e-7494-4f81-8739-6e0de1bea7ee";

/// Route test logs through the test harness; `RUST_LOG=movies_client=debug`
/// shows request classification.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn factory_for(server: &MockServer, http: HttpConfig) -> ClientFactory {
    factory_at(Url::parse(&server.uri()).expect("valid url"), http)
}

pub fn factory_at(base_url: Url, http: HttpConfig) -> ClientFactory {
    init_tracing();
    let factory = ClientFactory::new();
    factory.register(CLIENT_NAME, ClientRegistration::json(base_url, http));
    factory
}

pub fn client_for(server: &MockServer) -> HttpClient {
    factory_for(server, HttpConfig::default())
        .client(CLIENT_NAME)
        .expect("Operation should succeed")
}

pub fn movie_json(id: &str, title: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "description": null,
        "genre": "Comedy",
        "releaseDate": "1998-03-06T00:00:00+00:00",
        "director": "Joel Coen"
    })
}

/// Answers one request with `200` headers and the start of a body, then
/// stalls until the client hangs up.
pub struct StalledServer {
    pub url: Url,
    headers_sent: Option<oneshot::Receiver<()>>,
    hung_up: oneshot::Receiver<()>,
}

impl StalledServer {
    pub async fn start(partial_body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
        let addr = listener.local_addr().expect("local address");
        let (sent_tx, sent_rx) = oneshot::channel();
        let (hung_up_tx, hung_up_rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept connection");

            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut chunk).await {
                    Ok(0) | Err(_) => return,
                    Ok(n) => request.extend_from_slice(&chunk[..n]),
                }
            }

            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 1000\r\n\r\n{partial_body}"
            );
            socket
                .write_all(head.as_bytes())
                .await
                .expect("write response head");
            let _ = sent_tx.send(());

            while matches!(socket.read(&mut chunk).await, Ok(n) if n > 0) {}
            let _ = hung_up_tx.send(());
        });

        Self {
            url: Url::parse(&format!("http://{addr}")).expect("valid url"),
            headers_sent: Some(sent_rx),
            hung_up: hung_up_rx,
        }
    }

    /// Resolves once the response head and partial body have been written
    pub async fn headers_sent(&mut self) {
        if let Some(sent) = self.headers_sent.take() {
            sent.await.expect("server wrote the response head");
        }
    }

    /// True when the client closed the connection within `within`
    pub async fn hung_up_within(self, within: Duration) -> bool {
        matches!(tokio::time::timeout(within, self.hung_up).await, Ok(Ok(())))
    }
}
