//! JSON codec configuration shared by every client
//!
//! A [`JsonCodec`] is built once from [`CodecOptions`] and handed to clients
//! behind an `Arc`. Field naming is fixed by the model types; the runtime
//! options only control output layout and null handling.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{Read, Write};

use crate::error::{ApiError, Result};

/// Encoding conventions applied to outgoing bodies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecOptions {
    /// Indent encoded output
    pub pretty: bool,

    /// Drop object members whose value is `null`
    pub omit_null_fields: bool,
}

/// Serializer and deserializer shared by the accessor and the API client
#[derive(Debug, Clone, Default)]
pub struct JsonCodec {
    options: CodecOptions,
}

impl JsonCodec {
    pub fn new(options: CodecOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> CodecOptions {
        self.options
    }

    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.encode_to_writer(&mut out, value)?;
        Ok(out)
    }

    /// Encode straight into `writer`. Without null stripping the value is
    /// never materialized as a document tree.
    pub fn encode_to_writer<W, T>(&self, writer: W, value: &T) -> Result<()>
    where
        W: Write,
        T: Serialize + ?Sized,
    {
        let result = if self.options.omit_null_fields {
            let mut tree = serde_json::to_value(value).map_err(ApiError::Encode)?;
            strip_nulls(&mut tree);
            self.write(writer, &tree)
        } else {
            self.write(writer, value)
        };
        result.map_err(ApiError::Encode)
    }

    fn write<W: Write, T: Serialize + ?Sized>(
        &self,
        writer: W,
        value: &T,
    ) -> serde_json::Result<()> {
        if self.options.pretty {
            serde_json::to_writer_pretty(writer, value)
        } else {
            serde_json::to_writer(writer, value)
        }
    }

    pub fn decode_slice<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(ApiError::DecodeFailed)
    }

    /// Decode incrementally from a reader; the input is consumed as it is
    /// parsed rather than buffered up front. Read failures surface as
    /// [`ApiError::Io`], not as decode errors.
    pub fn decode_reader<T: DeserializeOwned, R: Read>(&self, reader: R) -> Result<T> {
        serde_json::from_reader(reader).map_err(|e| {
            if e.is_io() {
                ApiError::Io(e.into())
            } else {
                ApiError::DecodeFailed(e)
            }
        })
    }
}

fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}
