//! Core types for probe results

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Coarse media classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaType {
    Audio,
    Video,
    Image,
    Unknown,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Audio => "AUDIO",
            MediaType::Video => "VIDEO",
            MediaType::Image => "IMAGE",
            MediaType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of elementary stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StreamKind {
    Audio,
    Video,
}

/// How the bitrate of an audio stream behaves over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BitrateMode {
    /// Constant bitrate
    Cbr,
    /// Variable bitrate
    Vbr,
    /// Constrained VBR: a VBR header with a single observed bitrate
    Cvbr,
    /// Too few frames or pages to tell
    Unknown,
}

impl BitrateMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BitrateMode::Cbr => "CBR",
            BitrateMode::Vbr => "VBR",
            BitrateMode::Cvbr => "CVBR",
            BitrateMode::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for BitrateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One elementary stream. Numeric fields are either absent or positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamInfo {
    /// Stream index (0-based)
    pub index: u32,
    pub kind: StreamKind,
    /// Codec name (e.g. "mp3", "vorbis", "png")
    pub codec: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitrate_kbps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<f64>,
}

impl StreamInfo {
    /// Audio stream; zero values are dropped.
    pub fn audio(codec: impl Into<String>, bitrate_kbps: u32, sample_rate: u32, channels: u32) -> Self {
        Self {
            index: 0,
            kind: StreamKind::Audio,
            codec: codec.into(),
            bitrate_kbps: positive(bitrate_kbps),
            sample_rate: positive(sample_rate),
            channels: positive(channels),
            width: None,
            height: None,
            frame_rate: None,
        }
    }

    /// Picture stream (still image or video track); zero values are dropped.
    pub fn picture(codec: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            index: 0,
            kind: StreamKind::Video,
            codec: codec.into(),
            bitrate_kbps: None,
            sample_rate: None,
            channels: None,
            width: positive(width),
            height: positive(height),
            frame_rate: None,
        }
    }
}

fn positive(value: u32) -> Option<u32> {
    (value > 0).then_some(value)
}

/// Public outcome of probing one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    /// Path that was probed
    pub input: PathBuf,
    pub mime_type: String,
    /// Lower-cased extension reported for the file (no leading dot)
    pub extension: String,
    pub media_type: MediaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_millis: Option<u64>,
    /// Zero or one stream
    pub streams: Vec<StreamInfo>,
    /// Always contains `sizeBytes`
    pub tags: BTreeMap<String, String>,
}

impl ProbeResult {
    /// The first stream, if the probe produced one.
    pub fn primary_stream(&self) -> Option<&StreamInfo> {
        self.streams.first()
    }

    /// Size of the probed file as recorded in the tags.
    pub fn size_bytes(&self) -> Option<u64> {
        self.tags.get("sizeBytes").and_then(|s| s.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&MediaType::Audio).unwrap(), "\"AUDIO\"");
        assert_eq!(serde_json::to_string(&BitrateMode::Cvbr).unwrap(), "\"CVBR\"");
        assert_eq!(MediaType::Unknown.to_string(), "UNKNOWN");
    }

    #[test]
    fn result_serializes_camel_case_and_omits_absent_fields() {
        let result = ProbeResult {
            input: PathBuf::from("a.wav"),
            mime_type: "audio/wav".into(),
            extension: "wav".into(),
            media_type: MediaType::Audio,
            duration_millis: None,
            streams: vec![StreamInfo::audio("pcm", 128, 8000, 1)],
            tags: BTreeMap::from([("sizeBytes".to_string(), "44".to_string())]),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["mimeType"], "audio/wav");
        assert_eq!(json["mediaType"], "AUDIO");
        assert!(json.get("durationMillis").is_none());
        assert!(json.get("mime_type").is_none());
        assert_eq!(json["streams"][0]["bitrateKbps"], 128);
        assert_eq!(json["streams"][0]["sampleRate"], 8000);
        assert!(json["streams"][0].get("width").is_none());

        let back: ProbeResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn stream_constructors_drop_zero_fields() {
        let s = StreamInfo::audio("vorbis", 0, 44100, 2);
        assert_eq!(s.bitrate_kbps, None);
        assert_eq!(s.sample_rate, Some(44100));
        assert_eq!(s.kind, StreamKind::Audio);

        let p = StreamInfo::picture("png", 16, 0);
        assert_eq!(p.width, Some(16));
        assert_eq!(p.height, None);
        assert_eq!(p.kind, StreamKind::Video);
    }
}
