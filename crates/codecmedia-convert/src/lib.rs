//! # codecmedia-convert
//!
//! Conversion routing for codecmedia.
//!
//! A [`ConversionRequest`] is classified into a [`ConversionRoute`] from its
//! source and target media types, then mapped to a single [`Strategy`]:
//!
//! - identical extensions are copied through unchanged
//! - WAV and PCM are copied in either direction
//! - still images are decoded and re-encoded through an [`ImageCodec`]
//! - every other pair fails with [`ConvertError::UnsupportedRoute`]
//!
//! ## Example
//!
//! ```no_run
//! use codecmedia_convert::{ConversionHub, ConversionOptions, ConversionRequest};
//! use codecmedia_probe::MediaType;
//!
//! let request = ConversionRequest::new(
//!     "cover.png",
//!     "cover.jpg",
//!     MediaType::Image,
//!     ConversionOptions::default(),
//! )
//! .unwrap();
//! let result = ConversionHub::default().convert(&request).unwrap();
//! assert!(result.reencoded);
//! ```

pub mod error;
pub mod hub;
pub mod image_codec;
pub mod output;
pub mod request;
pub mod route;
pub mod strategy;

pub use error::{ConvertError, Result};
pub use hub::ConversionHub;
pub use image_codec::{ImageCodec, ImageRsCodec};
pub use request::{
    normalize_extension, target_media_type, ConversionOptions, ConversionRequest,
    ConversionResult,
};
pub use route::ConversionRoute;
pub use strategy::Strategy;
