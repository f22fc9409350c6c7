//! Error types for codecmedia-probe

use std::path::PathBuf;

/// Result type for codecmedia-probe operations.
pub type Result<T> = std::result::Result<T, ProbeError>;

/// Errors that can occur while probing or parsing media
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// File not found
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A field would extend past the end of the buffer
    #[error("Truncated data: need {need} bytes at offset {offset}, have {have}")]
    Truncated { offset: usize, need: usize, have: usize },

    /// Structurally invalid header, chunk or box
    #[error("Malformed input: {0}")]
    Malformed(String),

    /// Recognized container carrying a variant we do not parse
    #[error("Unsupported format: {0}")]
    Unsupported(String),

    /// Input exceeds the size allowed for strict parsing
    #[error("File too large: {size} bytes exceeds limit of {limit} bytes")]
    TooLarge { size: u64, limit: u64 },
}

impl ProbeError {
    /// Create a malformed input error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Create an unsupported format error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Whether this error came from parsing the bytes themselves.
    ///
    /// These are the failures the probe orchestrator downgrades to an
    /// extension-only result instead of surfacing.
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            Self::Truncated { .. } | Self::Malformed(_) | Self::Unsupported(_)
        )
    }
}
