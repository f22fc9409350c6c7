//! Classification of a (source, target) media-type pair.

use std::fmt;

use codecmedia_probe::MediaType;
use serde::{Deserialize, Serialize};

/// Which kind of transformation a conversion needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversionRoute {
    AudioToAudio,
    AudioToImage,
    VideoToAudio,
    VideoToVideo,
    ImageToImage,
    Unsupported,
}

impl ConversionRoute {
    /// Total over the 4x4 media-type grid; independent of extensions.
    pub fn resolve(source: MediaType, target: MediaType) -> Self {
        use MediaType::*;
        match (source, target) {
            (Audio, Audio) => Self::AudioToAudio,
            (Audio, Image) => Self::AudioToImage,
            (Video, Audio) => Self::VideoToAudio,
            (Video, Video) => Self::VideoToVideo,
            (Image, Image) => Self::ImageToImage,
            _ => Self::Unsupported,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AudioToAudio => "AUDIO_TO_AUDIO",
            Self::AudioToImage => "AUDIO_TO_IMAGE",
            Self::VideoToAudio => "VIDEO_TO_AUDIO",
            Self::VideoToVideo => "VIDEO_TO_VIDEO",
            Self::ImageToImage => "IMAGE_TO_IMAGE",
            Self::Unsupported => "UNSUPPORTED",
        }
    }
}

impl fmt::Display for ConversionRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
