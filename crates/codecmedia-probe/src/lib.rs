//! # codecmedia-probe
//!
//! Pure Rust media header parsing for files of unknown origin.
//!
//! This crate reads technical characteristics (codec, duration, bitrate,
//! sample rate, channels, pixel dimensions, bit depth) straight from the
//! container and codec headers, without any external decoder.
//!
//! ## Formats
//!
//! - Audio: MP3 (MPEG Layer III with Xing/Info/VBRI), Ogg/Vorbis, WAV
//! - Image: PNG, JPEG, BMP, TIFF, WebP, HEIF/HEIC/AVIF
//! - Video: MP4/ISOBMFF (`.m4a` reported as audio)
//!
//! Every parser reads through a bounds-checked [`ByteCursor`], so truncated
//! or hostile input produces an error instead of a panic.
//!
//! ## Example
//!
//! ```no_run
//! let result = codecmedia_probe::probe_file("song.mp3").unwrap();
//! println!("{} {:?}ms", result.mime_type, result.duration_millis);
//! if let Some(stream) = result.primary_stream() {
//!     println!("codec {} at {:?} Hz", stream.codec, stream.sample_rate);
//! }
//! ```

pub mod boxes;
pub mod cursor;
pub mod error;
pub mod format;
pub mod probe;
pub mod sniff;
pub mod types;

pub use cursor::ByteCursor;
pub use error::{ProbeError, Result};
pub use format::{Format, ProbeInfo};
pub use probe::{parse_strict, probe_bytes, probe_file, STRICT_MAX_BYTES};
pub use sniff::{describe_extension, extension_of, Descriptor};
pub use types::*;
