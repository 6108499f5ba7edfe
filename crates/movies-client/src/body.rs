//! Request and response body handling
//!
//! Bodies move either fully buffered or as a stream. Streamed responses are
//! decoded on a blocking task that pulls from the body as it arrives;
//! streamed requests are encoded on a blocking task into a pipe feeding the
//! request body.

use futures::TryStreamExt;
use reqwest::{Body, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::{BufReader, BufWriter, Write};
use tokio_util::io::{ReaderStream, StreamReader, SyncIoBridge};
use tokio_util::sync::CancellationToken;

use crate::cancel::guard_stream;
use crate::codec::JsonCodec;
use crate::error::{ApiError, CancelReason, Result};

/// Pipe capacity between the encoder task and the request body
const UPLOAD_PIPE_CAPACITY: usize = 64 * 1024;

/// How a body crosses the wire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransferMode {
    /// Read or write the whole body in memory first
    Buffered,
    /// Decode or encode while the bytes move
    #[default]
    Streamed,
}

/// Decode a JSON response body with the given transfer mode.
///
/// With [`TransferMode::Streamed`], firing `cancel` ends the body stream so
/// the decoder task stops and the connection is released.
pub async fn decode_json<T>(
    response: Response,
    codec: &JsonCodec,
    mode: TransferMode,
    cancel: Option<&CancellationToken>,
) -> Result<T>
where
    T: DeserializeOwned + Send + 'static,
{
    match mode {
        TransferMode::Buffered => {
            let bytes = response.bytes().await?;
            codec.decode_slice(&bytes)
        }
        TransferMode::Streamed => decode_streamed(response, codec.clone(), cancel.cloned()).await,
    }
}

async fn decode_streamed<T>(
    response: Response,
    codec: JsonCodec,
    cancel: Option<CancellationToken>,
) -> Result<T>
where
    T: DeserializeOwned + Send + 'static,
{
    let body = guard_stream(response.bytes_stream(), cancel).map_err(std::io::Error::other);
    let reader = SyncIoBridge::new(StreamReader::new(body));

    let decoded =
        tokio::task::spawn_blocking(move || codec.decode_reader(BufReader::new(reader))).await?;
    decoded.map_err(|e| match e {
        ApiError::Io(io) => body_read_error(io),
        other => other,
    })
}

/// Body read failures reach the decoder wrapped in `io::Error`. A transport
/// timeout in there is a deadline, same as on the buffered path.
fn body_read_error(error: std::io::Error) -> ApiError {
    let timed_out = error
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<reqwest::Error>())
        .is_some_and(reqwest::Error::is_timeout);

    if timed_out {
        ApiError::Cancelled(CancelReason::DeadlineElapsed)
    } else {
        ApiError::Io(error)
    }
}

/// Build a JSON request body for `value`.
///
/// Streamed bodies are produced on a blocking task, so this must be called
/// from within a Tokio runtime.
pub fn json_body<T>(codec: &JsonCodec, value: T, mode: TransferMode) -> Result<Body>
where
    T: Serialize + Send + 'static,
{
    match mode {
        TransferMode::Buffered => Ok(Body::from(codec.encode(&value)?)),
        TransferMode::Streamed => Ok(streamed_json_body(codec.clone(), value)),
    }
}

fn streamed_json_body<T>(codec: JsonCodec, value: T) -> Body
where
    T: Serialize + Send + 'static,
{
    let (reader, writer) = tokio::io::duplex(UPLOAD_PIPE_CAPACITY);
    let mut bridge = SyncIoBridge::new(writer);

    tokio::task::spawn_blocking(move || {
        let mut buffered = BufWriter::new(&mut bridge);
        let encoded = codec
            .encode_to_writer(&mut buffered, &value)
            .and_then(|()| buffered.flush().map_err(Into::into));
        drop(buffered);

        if let Err(e) = encoded {
            // The body ends early; the server rejects the truncated document.
            tracing::warn!("Streaming request body failed: {}", e);
        }
        if let Err(e) = bridge.shutdown() {
            tracing::debug!("Closing request body pipe failed: {}", e);
        }
    });

    Body::wrap_stream(ReaderStream::new(reader))
}
