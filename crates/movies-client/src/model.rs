//! Resource representations returned by the Movies API
//!
//! Field names follow the API's camelCase convention. Binary payloads travel
//! as base64 strings.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, Result};

/// Longest poster name the API accepts
pub const MAX_POSTER_NAME_LEN: usize = 200;

/// Catalog entry for a single movie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub release_date: DateTime<FixedOffset>,
    pub director: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poster {
    pub id: Uuid,
    pub movie_id: Uuid,
    pub name: String,
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
}

/// Request body for creating a poster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosterForCreation {
    pub name: String,
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
}

impl PosterForCreation {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Poster with `len` random bytes, used by upload benchmarks.
    pub fn with_random_bytes(name: impl Into<String>, len: usize) -> Self {
        use rand::RngCore;

        let mut bytes = vec![0u8; len];
        rand::rng().fill_bytes(&mut bytes);
        Self::new(name, bytes)
    }

    /// Reject payloads the API would refuse with a 422.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ApiError::Invalid("poster name is required".to_string()));
        }
        if self.name.chars().count() > MAX_POSTER_NAME_LEN {
            return Err(ApiError::Invalid(format!(
                "poster name exceeds {MAX_POSTER_NAME_LEN} characters"
            )));
        }
        if self.bytes.is_empty() {
            return Err(ApiError::Invalid("poster bytes are required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trailer {
    pub id: Uuid,
    pub movie_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
