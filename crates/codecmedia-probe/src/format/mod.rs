//! Per-format header parsers and the closed dispatch table over them.
//!
//! Every parser exposes `looks_like(&[u8]) -> bool` (cheap magic check) and
//! `parse(&[u8]) -> Result<Info>`. [`Format`] ties them together so callers
//! never hold parser objects.

pub mod bmp;
pub mod heif;
pub mod jpeg;
pub mod mp3;
pub mod mp4;
pub mod ogg;
pub mod png;
pub mod tiff;
pub mod wav;
pub mod webp;

use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;
use crate::types::{MediaType, StreamInfo};

/// A container or codec family with a header parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Mp3,
    Ogg,
    Wav,
    Png,
    Jpeg,
    Mp4,
    Heif,
    Bmp,
    Tiff,
    Webp,
}

impl Format {
    /// Magic-byte sniffing order. MP3 comes last because a bare frame sync
    /// is the weakest signature.
    pub const SNIFF_ORDER: [Format; 10] = [
        Format::Ogg,
        Format::Wav,
        Format::Webp,
        Format::Png,
        Format::Jpeg,
        Format::Heif,
        Format::Mp4,
        Format::Bmp,
        Format::Tiff,
        Format::Mp3,
    ];

    /// The parser family for a lower-cased extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "mp3" => Some(Format::Mp3),
            "ogg" => Some(Format::Ogg),
            "wav" => Some(Format::Wav),
            "png" => Some(Format::Png),
            "jpg" | "jpeg" => Some(Format::Jpeg),
            "mp4" | "m4a" => Some(Format::Mp4),
            "heic" | "heif" | "avif" => Some(Format::Heif),
            "bmp" => Some(Format::Bmp),
            "tif" | "tiff" => Some(Format::Tiff),
            "webp" => Some(Format::Webp),
            _ => None,
        }
    }

    /// Guess the format from leading magic bytes.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        Self::SNIFF_ORDER.into_iter().find(|f| f.looks_like(data))
    }

    pub fn looks_like(&self, data: &[u8]) -> bool {
        match self {
            Format::Mp3 => mp3::looks_like(data),
            Format::Ogg => ogg::looks_like(data),
            Format::Wav => wav::looks_like(data),
            Format::Png => png::looks_like(data),
            Format::Jpeg => jpeg::looks_like(data),
            Format::Mp4 => mp4::looks_like(data),
            Format::Heif => heif::looks_like(data),
            Format::Bmp => bmp::looks_like(data),
            Format::Tiff => tiff::looks_like(data),
            Format::Webp => webp::looks_like(data),
        }
    }

    /// Run this format's parser over `data`.
    pub fn parse(&self, data: &[u8]) -> Result<ProbeInfo> {
        Ok(match self {
            Format::Mp3 => ProbeInfo::Mp3(mp3::parse(data)?),
            Format::Ogg => ProbeInfo::Ogg(ogg::parse(data)?),
            Format::Wav => ProbeInfo::Wav(wav::parse(data)?),
            Format::Png => ProbeInfo::Png(png::parse(data)?),
            Format::Jpeg => ProbeInfo::Jpeg(jpeg::parse(data)?),
            Format::Mp4 => ProbeInfo::Mp4(mp4::parse(data)?),
            Format::Heif => ProbeInfo::Heif(heif::parse(data)?),
            Format::Bmp => ProbeInfo::Bmp(bmp::parse(data)?),
            Format::Tiff => ProbeInfo::Tiff(tiff::parse(data)?),
            Format::Webp => ProbeInfo::Webp(webp::parse(data)?),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Format::Mp3 => "mp3",
            Format::Ogg => "ogg",
            Format::Wav => "wav",
            Format::Png => "png",
            Format::Jpeg => "jpeg",
            Format::Mp4 => "mp4",
            Format::Heif => "heif",
            Format::Bmp => "bmp",
            Format::Tiff => "tiff",
            Format::Webp => "webp",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw parser output, one variant per format.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeInfo {
    Mp3(mp3::Mp3Info),
    Ogg(ogg::OggInfo),
    Wav(wav::WavInfo),
    Png(png::PngInfo),
    Jpeg(jpeg::JpegInfo),
    Mp4(mp4::Mp4Info),
    Heif(heif::HeifInfo),
    Bmp(bmp::BmpInfo),
    Tiff(tiff::TiffInfo),
    Webp(webp::WebpInfo),
}

impl ProbeInfo {
    /// Playback length, absent when the headers give none or it rounds to zero.
    pub fn duration_millis(&self) -> Option<u64> {
        let millis = match self {
            ProbeInfo::Mp3(i) => Some(i.duration_millis),
            ProbeInfo::Ogg(i) => Some(i.duration_millis),
            ProbeInfo::Wav(i) => Some(i.duration_millis),
            ProbeInfo::Mp4(i) => i.duration_millis,
            _ => None,
        };
        millis.filter(|&ms| ms > 0)
    }

    /// The single elementary stream this file reports, if any.
    ///
    /// `media_type` is the classification chosen for the file; it decides
    /// whether an MP4 reports its audio or its video track.
    pub fn stream(&self, media_type: MediaType) -> Option<StreamInfo> {
        match self {
            ProbeInfo::Mp3(i) => Some(StreamInfo::audio(
                "mp3",
                i.bitrate_kbps,
                i.sample_rate,
                i.channels,
            )),
            ProbeInfo::Ogg(i) => Some(StreamInfo::audio(
                "vorbis",
                i.bitrate_kbps,
                i.sample_rate,
                i.channels,
            )),
            ProbeInfo::Wav(i) => Some(StreamInfo::audio(
                "pcm",
                i.bitrate_kbps,
                i.sample_rate,
                u32::from(i.channels),
            )),
            ProbeInfo::Png(i) => Some(StreamInfo::picture("png", i.width, i.height)),
            ProbeInfo::Jpeg(i) => Some(StreamInfo::picture(
                "jpeg",
                u32::from(i.width),
                u32::from(i.height),
            )),
            ProbeInfo::Mp4(i) => i.stream(media_type),
            ProbeInfo::Heif(i) => Some(StreamInfo::picture(i.codec(), i.width, i.height)),
            ProbeInfo::Bmp(i) => Some(StreamInfo::picture("bmp", i.width, i.height)),
            ProbeInfo::Tiff(i) => Some(StreamInfo::picture("tiff", i.width, i.height)),
            ProbeInfo::Webp(i) => Some(StreamInfo::picture("webp", i.width, i.height)),
        }
    }

    /// Format-specific tags, excluding `sizeBytes`.
    pub fn tags(&self) -> BTreeMap<String, String> {
        let mut tags = BTreeMap::new();
        let mut put = |key: &str, value: String| {
            tags.insert(key.to_string(), value);
        };
        match self {
            ProbeInfo::Mp3(i) => put("bitrateMode", i.bitrate_mode.to_string()),
            ProbeInfo::Ogg(i) => put("bitrateMode", i.bitrate_mode.to_string()),
            ProbeInfo::Wav(i) => {
                put("bitrateMode", i.bitrate_mode().to_string());
                put("bitsPerSample", i.bits_per_sample.to_string());
            }
            ProbeInfo::Png(i) => {
                put("bitDepth", i.bit_depth.to_string());
                put("colorType", i.color_type.to_string());
            }
            ProbeInfo::Jpeg(i) => {
                put("bitsPerSample", i.bits_per_sample.to_string());
                put("channels", i.channels.to_string());
            }
            ProbeInfo::Mp4(i) => {
                if let Some(brand) = i.major_brand.as_deref().filter(|b| !b.is_empty()) {
                    put("majorBrand", brand.to_string());
                }
            }
            ProbeInfo::Heif(i) => {
                put("majorBrand", i.major_brand.clone());
                if let Some(depth) = i.bit_depth {
                    put("bitDepth", depth.to_string());
                }
            }
            ProbeInfo::Bmp(i) => put("bitsPerPixel", i.bits_per_pixel.to_string()),
            ProbeInfo::Tiff(i) => {
                if let Some(bits) = i.bits_per_sample {
                    put("bitsPerSample", bits.to_string());
                }
            }
            ProbeInfo::Webp(i) => put("variant", i.variant.as_str().to_string()),
        }
        tags
    }
}

/// Brand fourcc as trimmed text.
pub(crate) fn brand_text(brand: [u8; 4]) -> String {
    String::from_utf8_lossy(&brand).trim().to_string()
}
