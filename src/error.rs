//! Error type for the codecmedia facade.

use std::io;
use std::path::PathBuf;

use codecmedia_convert::ConvertError;
use codecmedia_probe::ProbeError;
use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// Sidecar metadata could not be read, written, or accepted.
    #[error("{0}")]
    Metadata(String),

    /// Audio extraction request that cannot be honored.
    #[error("{0}")]
    Extraction(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error means the input path does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Probe(ProbeError::NotFound(_)) | Self::Convert(ConvertError::NotFound(_))
        )
    }
}
