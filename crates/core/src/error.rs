// ABOUTME: Error types for recipe storage and coordinator message decoding.
// ABOUTME: Provides StoreError (Io, Corrupt, Serialize, InvalidId) and MessageError.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while reading or writing saved recipes.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A filesystem operation on the store failed.
    #[error("store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A saved recipe exists but could not be decoded.
    #[error("saved recipe {id} is corrupt: {source}")]
    Corrupt {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// A recipe could not be encoded for storage.
    #[error("failed to serialize recipe: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A string that is not a recipe id was used to address the store.
    #[error("invalid recipe id: {0}")]
    InvalidId(String),
}

impl StoreError {
    /// Creates an Io error for the given path.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a Corrupt error for the given recipe id.
    pub fn corrupt(id: impl fmt::Display, source: serde_json::Error) -> Self {
        StoreError::Corrupt {
            id: id.to_string(),
            source,
        }
    }

    /// Creates an InvalidId error with the offending text.
    pub fn invalid_id(id: impl Into<String>) -> Self {
        StoreError::InvalidId(id.into())
    }
}

/// Errors that can occur decoding a message sent to the coordinator.
#[derive(Debug, Error)]
pub enum MessageError {
    /// The payload is not valid JSON or not a known message shape.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}
