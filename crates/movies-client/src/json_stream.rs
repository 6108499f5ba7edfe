//! Incremental reading of a top-level JSON array
//!
//! Streaming endpoints write `[`, then one element at a time, then `]`.
//! [`JsonArraySplitter`] cuts the raw bytes into complete element documents
//! as chunks arrive, regardless of where chunk boundaries fall, and
//! [`json_array_stream`] decodes each element as soon as it is complete.

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use reqwest::Response;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use tokio_util::sync::CancellationToken;

use crate::cancel::guard_stream;
use crate::codec::JsonCodec;
use crate::error::{ApiError, CancelReason, Result};

fn framing_error(msg: &str) -> ApiError {
    ApiError::DecodeFailed(<serde_json::Error as serde::de::Error>::custom(msg))
}

/// Splits a top-level JSON array into raw element bytes as chunks arrive
#[derive(Debug, Default)]
pub struct JsonArraySplitter {
    current: Vec<u8>,
    depth: usize,
    in_string: bool,
    escaped: bool,
    opened: bool,
    closed: bool,
    /// An element just ended; only `,` or `]` may follow
    awaiting_separator: bool,
    /// A `,` was consumed; another element must follow
    awaiting_element: bool,
}

impl JsonArraySplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk and drain every element completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<Vec<u8>>> {
        let mut elements = Vec::new();

        for &byte in chunk {
            if self.closed {
                if !byte.is_ascii_whitespace() {
                    return Err(framing_error("trailing data after JSON array"));
                }
                continue;
            }

            if !self.opened {
                match byte {
                    b'[' => self.opened = true,
                    b if b.is_ascii_whitespace() => {}
                    _ => return Err(framing_error("expected '[' at start of JSON array")),
                }
                continue;
            }

            if self.in_string {
                self.current.push(byte);
                if self.escaped {
                    self.escaped = false;
                } else if byte == b'\\' {
                    self.escaped = true;
                } else if byte == b'"' {
                    self.in_string = false;
                }
                continue;
            }

            if self.depth > 0 {
                self.current.push(byte);
                match byte {
                    b'"' => self.in_string = true,
                    b'{' | b'[' => self.depth += 1,
                    b'}' | b']' => {
                        self.depth -= 1;
                        if self.depth == 0 {
                            elements.push(self.take_element());
                        }
                    }
                    _ => {}
                }
                continue;
            }

            // Top level of the array: between elements or inside a scalar.
            match byte {
                b',' => {
                    if !self.current.is_empty() {
                        elements.push(self.take_element());
                    } else if !self.awaiting_separator {
                        return Err(framing_error("missing element before ','"));
                    }
                    self.awaiting_separator = false;
                    self.awaiting_element = true;
                }
                b']' => {
                    if !self.current.is_empty() {
                        elements.push(self.take_element());
                    } else if self.awaiting_element {
                        return Err(framing_error("trailing ',' before ']'"));
                    }
                    self.awaiting_separator = false;
                    self.closed = true;
                }
                b if b.is_ascii_whitespace() => {
                    // Whitespace ends a scalar; the separator still has to come.
                    if !self.current.is_empty() {
                        elements.push(self.take_element());
                    }
                }
                _ if self.awaiting_separator => {
                    return Err(framing_error("expected ',' or ']' between elements"));
                }
                b'"' => {
                    self.current.push(byte);
                    self.in_string = true;
                }
                b'{' | b'[' => {
                    self.current.push(byte);
                    self.depth = 1;
                }
                _ => self.current.push(byte),
            }
        }

        Ok(elements)
    }

    /// Check that the array was closed once the input has ended.
    pub fn finish(&self) -> Result<()> {
        if self.closed {
            Ok(())
        } else if !self.opened {
            Err(framing_error("empty response, expected a JSON array"))
        } else {
            Err(framing_error("JSON array ended before ']'"))
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn take_element(&mut self) -> Vec<u8> {
        self.awaiting_separator = true;
        self.awaiting_element = false;
        std::mem::take(&mut self.current)
    }
}

struct ArrayState {
    body: BoxStream<'static, reqwest::Result<Bytes>>,
    splitter: JsonArraySplitter,
    pending: VecDeque<Vec<u8>>,
    codec: JsonCodec,
    cancel: Option<CancellationToken>,
    done: bool,
}

/// Decode the elements of a streamed JSON array response one at a time.
///
/// The stream ends after the first error. Firing `cancel` ends the body and
/// yields a single `Cancelled` error, unless the closing `]` was already read.
pub fn json_array_stream<T>(
    response: Response,
    codec: JsonCodec,
    cancel: Option<CancellationToken>,
) -> impl Stream<Item = Result<T>> + Send + 'static
where
    T: DeserializeOwned + Send + 'static,
{
    let state = ArrayState {
        body: guard_stream(response.bytes_stream(), cancel.clone()),
        splitter: JsonArraySplitter::new(),
        pending: VecDeque::new(),
        codec,
        cancel,
        done: false,
    };

    futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(element) = state.pending.pop_front() {
                let item = state.codec.decode_slice::<T>(&element);
                if item.is_err() {
                    state.pending.clear();
                    state.done = true;
                }
                return Some((item, state));
            }
            if state.done {
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => match state.splitter.feed(&chunk) {
                    Ok(elements) => state.pending.extend(elements),
                    Err(e) => {
                        state.done = true;
                        return Some((Err(e), state));
                    }
                },
                Some(Err(e)) => {
                    state.done = true;
                    return Some((Err(e.into()), state));
                }
                None => {
                    state.done = true;
                    let cancelled =
                        state.cancel.as_ref().is_some_and(CancellationToken::is_cancelled);
                    if cancelled && !state.splitter.is_closed() {
                        return Some((Err(ApiError::Cancelled(CancelReason::Requested)), state));
                    }
                    if let Err(e) = state.splitter.finish() {
                        return Some((Err(e), state));
                    }
                }
            }
        }
    })
}
