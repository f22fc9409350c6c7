//! Strategy dispatch table.
//!
//! Each conversion maps to exactly one [`Strategy`]. Selection is pure: it
//! looks at the request's extensions and media types and touches no files.

use crate::error::{ConvertError, Result};
use crate::request::ConversionRequest;
use crate::route::ConversionRoute;

/// Image extensions the image codec is asked to handle.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "webp", "bmp", "tif", "tiff", "heif", "heic",
];

/// How a request is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Same extension on both sides: copy bytes unchanged.
    Passthrough,
    /// WAV and raw PCM share a payload here: copy bytes unchanged.
    WavPcmCopy,
    /// Decode and re-encode through the image codec.
    ImageTranscode,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Passthrough => "passthrough",
            Self::WavPcmCopy => "wav-pcm-copy",
            Self::ImageTranscode => "image-transcode",
        }
    }

    /// Whether the output bytes differ from the input bytes.
    pub fn reencodes(&self) -> bool {
        matches!(self, Self::ImageTranscode)
    }

    /// Pick the strategy for a request, or the error it must fail with.
    pub fn select(request: &ConversionRequest) -> Result<(ConversionRoute, Self)> {
        let route =
            ConversionRoute::resolve(request.source_media_type, request.target_media_type);
        let source = request.source_extension.as_str();
        let target = request.target_extension.as_str();

        if source == target {
            return Ok((route, Self::Passthrough));
        }

        let strategy = match route {
            ConversionRoute::AudioToAudio => {
                if is_wav_pcm(source, target) {
                    Self::WavPcmCopy
                } else {
                    return Err(ConvertError::unsupported(
                        "audio->audio transcoding is not implemented yet",
                    ));
                }
            }
            ConversionRoute::ImageToImage => {
                if !IMAGE_EXTENSIONS.contains(&source) || !IMAGE_EXTENSIONS.contains(&target) {
                    return Err(ConvertError::unsupported(format!(
                        "image->image conversion is not supported for {source} -> {target}"
                    )));
                }
                Self::ImageTranscode
            }
            ConversionRoute::VideoToAudio => {
                return Err(ConvertError::unsupported(
                    "video->audio conversion is not implemented yet",
                ));
            }
            ConversionRoute::AudioToImage => {
                return Err(ConvertError::unsupported(
                    "audio->image (album cover) conversion is not implemented yet",
                ));
            }
            ConversionRoute::VideoToVideo => {
                return Err(ConvertError::unsupported(
                    "video->video conversion is not implemented yet",
                ));
            }
            ConversionRoute::Unsupported => {
                return Err(ConvertError::unsupported(format!(
                    "Unsupported conversion route: {} -> {}",
                    request.source_media_type, request.target_media_type
                )));
            }
        };
        Ok((route, strategy))
    }
}

fn is_wav_pcm(source: &str, target: &str) -> bool {
    matches!((source, target), ("wav", "pcm") | ("pcm", "wav"))
}
