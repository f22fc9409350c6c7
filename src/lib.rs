//! Codecmedia - media probing, validation and conversion
//!
//! The [`Engine`] ties the header parsers in `codecmedia-probe` and the
//! conversion hub in `codecmedia-convert` to a TOML [`config::Config`],
//! and adds validation, audio extraction and sidecar metadata on top.

pub mod config;
pub mod engine;
pub mod error;

pub use codecmedia_convert::{ConversionOptions, ConversionResult, ConversionRoute};
pub use codecmedia_probe::{BitrateMode, MediaType, ProbeResult, StreamInfo, StreamKind};
pub use engine::{
    AudioExtractOptions, Engine, ExtractionResult, Metadata, ValidationOptions, ValidationReport,
};
pub use error::{Error, Result};
