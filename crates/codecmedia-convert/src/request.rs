//! Conversion request, options, and result types.

use std::path::{Path, PathBuf};

use codecmedia_probe::{extension_of, MediaType};
use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};

/// Caller-tunable conversion options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConversionOptions {
    /// Target format; falls back to the output file's extension.
    pub target_format: Option<String>,
    /// Encoder preset name. Accepted and carried, not interpreted.
    pub preset: String,
    /// Replace an existing output file.
    pub overwrite: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            target_format: None,
            preset: "balanced".to_string(),
            overwrite: false,
        }
    }
}

/// Fully resolved conversion request handed to the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub source_extension: String,
    pub target_extension: String,
    pub source_media_type: MediaType,
    pub target_media_type: MediaType,
    pub options: ConversionOptions,
}

impl ConversionRequest {
    /// Build a request from paths and the probed source media type.
    ///
    /// The target format comes from `options.target_format` when set,
    /// otherwise from the output extension. A blank target is rejected.
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        source_media_type: MediaType,
        options: ConversionOptions,
    ) -> Result<Self> {
        let input = input.into();
        let output = output.into();

        let target_extension = match options.target_format.as_deref() {
            Some(fmt) if !fmt.trim().is_empty() => normalize_extension(fmt),
            _ => extension_of(&output),
        };
        if target_extension.is_empty() {
            return Err(ConvertError::InvalidRequest(format!(
                "Target format is required: {}",
                output.display()
            )));
        }

        Ok(Self {
            source_extension: extension_of(&input),
            target_media_type: target_media_type(&target_extension),
            target_extension,
            source_media_type,
            input,
            output,
            options,
        })
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }
}

/// What a successful conversion produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub output_file: PathBuf,
    pub format: String,
    pub reencoded: bool,
}

/// Trim, lower-case, and drop one leading dot.
pub fn normalize_extension(format: &str) -> String {
    let trimmed = format.trim().to_ascii_lowercase();
    match trimmed.strip_prefix('.') {
        Some(rest) => rest.to_string(),
        None => trimmed,
    }
}

/// Media type a conversion target extension belongs to.
///
/// Broader than the probe table: it also names formats that can only be
/// produced, never parsed.
pub fn target_media_type(ext: &str) -> MediaType {
    match ext {
        "mp3" | "ogg" | "wav" | "pcm" | "m4a" | "aac" | "flac" => MediaType::Audio,
        "mp4" | "mkv" | "mov" | "avi" | "webm" => MediaType::Video,
        "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" | "tif" | "tiff" | "heif" | "heic" => {
            MediaType::Image
        }
        _ => MediaType::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn normalizes_format_names() {
        assert_eq!(normalize_extension(" .PNG "), "png");
        assert_eq!(normalize_extension("Jpeg"), "jpeg");
        assert_eq!(normalize_extension("wav"), "wav");
    }

    #[test]
    fn target_from_output_extension() {
        let req = ConversionRequest::new(
            "in/song.WAV",
            "out/song.pcm",
            MediaType::Audio,
            ConversionOptions::default(),
        )
        .unwrap();
        assert_eq!(req.source_extension, "wav");
        assert_eq!(req.target_extension, "pcm");
        assert_eq!(req.target_media_type, MediaType::Audio);
    }

    #[test]
    fn explicit_format_wins() {
        let options = ConversionOptions {
            target_format: Some(".JPG".into()),
            ..Default::default()
        };
        let req = ConversionRequest::new("a.png", "b.out", MediaType::Image, options).unwrap();
        assert_eq!(req.target_extension, "jpg");
        assert_eq!(req.target_media_type, MediaType::Image);
    }

    #[test]
    fn missing_target_is_rejected() {
        let err = ConversionRequest::new(
            "a.png",
            "noext",
            MediaType::Image,
            ConversionOptions::default(),
        )
        .unwrap_err();
        assert_matches!(err, ConvertError::InvalidRequest(_));
    }

    #[test]
    fn classifier_covers_output_only_formats() {
        assert_eq!(target_media_type("flac"), MediaType::Audio);
        assert_eq!(target_media_type("mkv"), MediaType::Video);
        assert_eq!(target_media_type("gif"), MediaType::Image);
        assert_eq!(target_media_type("txt"), MediaType::Unknown);
    }

    #[test]
    fn result_uses_output_file_key() {
        let result = ConversionResult {
            output_file: PathBuf::from("out/a.jpg"),
            format: "jpg".into(),
            reencoded: true,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            r#"{"outputFile":"out/a.jpg","format":"jpg","reencoded":true}"#
        );
    }

    #[test]
    fn default_options() {
        let opts = ConversionOptions::default();
        assert_eq!(opts.preset, "balanced");
        assert!(!opts.overwrite);
        assert!(opts.target_format.is_none());
    }
}
