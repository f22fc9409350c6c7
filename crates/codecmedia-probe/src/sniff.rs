//! Extension and magic-byte classification.
//!
//! Maps an extension to the mime type and [`MediaType`] reported for it, and
//! picks candidate parsers from the extension and the leading bytes.

use std::path::Path;

use crate::format::Format;
use crate::types::MediaType;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// The strings a probe reports for a file's type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub mime_type: &'static str,
    pub extension: String,
    pub media_type: MediaType,
}

/// Lower-cased text after the last `.` in the file name, or empty.
pub fn extension_of(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Mime type and media type for an extension.
pub fn describe_extension(ext: &str) -> Descriptor {
    let (mime_type, media_type) = match ext {
        "mp4" => ("video/mp4", MediaType::Video),
        "m4a" => ("audio/mp4", MediaType::Audio),
        "mp3" => ("audio/mpeg", MediaType::Audio),
        "ogg" => ("audio/ogg", MediaType::Audio),
        "wav" => ("audio/wav", MediaType::Audio),
        "png" => ("image/png", MediaType::Image),
        "jpg" | "jpeg" => ("image/jpeg", MediaType::Image),
        "bmp" => ("image/bmp", MediaType::Image),
        "tif" | "tiff" => ("image/tiff", MediaType::Image),
        "webp" => ("image/webp", MediaType::Image),
        "heic" => ("image/heic", MediaType::Image),
        "heif" => ("image/heif", MediaType::Image),
        "avif" => ("image/avif", MediaType::Image),
        _ => (OCTET_STREAM, MediaType::Unknown),
    };
    Descriptor {
        mime_type,
        extension: ext.to_string(),
        media_type,
    }
}

/// Extension reported for a format found by content alone.
pub fn canonical_extension(format: Format) -> &'static str {
    match format {
        Format::Mp3 => "mp3",
        Format::Ogg => "ogg",
        Format::Wav => "wav",
        Format::Png => "png",
        Format::Jpeg => "jpg",
        Format::Mp4 => "mp4",
        Format::Heif => "heif",
        Format::Bmp => "bmp",
        Format::Tiff => "tiff",
        Format::Webp => "webp",
    }
}

/// Descriptor for a file that parsed as `format`.
///
/// The extension's strings win while it names the same family; otherwise the
/// format's canonical extension is reported.
pub fn describe(format: Format, ext: &str) -> Descriptor {
    if Format::from_extension(ext) == Some(format) {
        describe_extension(ext)
    } else {
        describe_extension(canonical_extension(format))
    }
}

/// Parser candidates in the order they should be tried: the extension's
/// family, then the sniffed family when it differs.
pub fn candidates(ext: &str, data: &[u8]) -> Vec<Format> {
    let by_extension = Format::from_extension(ext);
    let sniffed = Format::sniff(data);
    let mut out: Vec<Format> = by_extension.into_iter().collect();
    if let Some(s) = sniffed.filter(|s| Some(*s) != by_extension) {
        out.push(s);
    }
    out
}
