//! Error types for codecmedia-convert.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for codecmedia-convert operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Error type for conversions. Every variant is surfaced to the caller.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Input file does not exist.
    #[error("File does not exist: {0}")]
    NotFound(PathBuf),

    /// The media-type or extension pair has no implemented conversion.
    #[error("{0}")]
    UnsupportedRoute(String),

    /// Destination exists and overwrite is disabled.
    #[error("Output already exists and overwrite is disabled: {0}")]
    OutputExists(PathBuf),

    /// Filesystem failure on a specific path.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The image codec could not decode or encode.
    #[error("Image codec error: {0}")]
    Codec(String),

    /// The request itself is inconsistent.
    #[error("Invalid conversion request: {0}")]
    InvalidRequest(String),
}

impl ConvertError {
    /// Create an unsupported route error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedRoute(msg.into())
    }

    /// Attach a path to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
