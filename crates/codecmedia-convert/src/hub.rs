//! Conversion hub: resolves a request to a strategy and runs it.

use std::fs;

use crate::error::{ConvertError, Result};
use crate::image_codec::{ImageCodec, ImageRsCodec};
use crate::output::{copy_bytes, prepare_output};
use crate::request::{ConversionRequest, ConversionResult};
use crate::strategy::Strategy;

/// Dispatches conversion requests.
pub struct ConversionHub {
    images: Box<dyn ImageCodec>,
}

impl Default for ConversionHub {
    fn default() -> Self {
        Self::new(Box::new(ImageRsCodec::new()))
    }
}

impl ConversionHub {
    pub fn new(images: Box<dyn ImageCodec>) -> Self {
        Self { images }
    }

    /// Run a conversion.
    ///
    /// Nothing is written when the request maps to a rejected route.
    pub fn convert(&self, request: &ConversionRequest) -> Result<ConversionResult> {
        let input = request.input();
        let output = request.output();
        if !input.exists() {
            return Err(ConvertError::NotFound(input.to_path_buf()));
        }

        let (route, strategy) = Strategy::select(request)?;
        tracing::debug!(
            input = %input.display(),
            route = %route,
            strategy = strategy.name(),
            "strategy chosen"
        );

        prepare_output(input, output, request.options.overwrite)?;

        match strategy {
            Strategy::Passthrough | Strategy::WavPcmCopy => {
                copy_bytes(input, output)?;
            }
            Strategy::ImageTranscode => {
                let data = fs::read(input).map_err(|e| ConvertError::io(input, e))?;
                let img = self.images.decode(&data, &request.source_extension)?;
                let encoded = self.images.encode(&img, &request.target_extension)?;
                fs::write(output, encoded).map_err(|e| ConvertError::io(output, e))?;
            }
        }

        tracing::info!(
            output = %output.display(),
            format = %request.target_extension,
            strategy = strategy.name(),
            "conversion written"
        );

        Ok(ConversionResult {
            output_file: output.to_path_buf(),
            format: request.target_extension.clone(),
            reencoded: strategy.reencodes(),
        })
    }

    /// Name of the image codec backend in use.
    pub fn image_codec(&self) -> &'static str {
        self.images.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ConversionOptions;
    use assert_matches::assert_matches;
    use codecmedia_probe::MediaType;
    use image::DynamicImage;
    use tempfile::TempDir;

    struct FailingCodec;

    impl ImageCodec for FailingCodec {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn decode(&self, _data: &[u8], _ext: &str) -> Result<DynamicImage> {
            Err(ConvertError::Codec("decoder offline".into()))
        }

        fn encode(&self, _img: &DynamicImage, _ext: &str) -> Result<Vec<u8>> {
            unreachable!("decode always fails")
        }
    }

    #[test]
    fn uses_injected_codec() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("a.png");
        fs::write(&input, b"png-ish").unwrap();
        let output = dir.path().join("a.jpg");

        let hub = ConversionHub::new(Box::new(FailingCodec));
        assert_eq!(hub.image_codec(), "failing");

        let req = ConversionRequest::new(
            &input,
            &output,
            MediaType::Image,
            ConversionOptions::default(),
        )
        .unwrap();
        let err = hub.convert(&req).unwrap_err();
        assert_matches!(err, ConvertError::Codec(ref m) if m == "decoder offline");
    }

    #[test]
    fn rejected_route_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("clip.mp4");
        fs::write(&input, b"video").unwrap();
        let output = dir.path().join("sub/clip.mp3");

        let req = ConversionRequest::new(
            &input,
            &output,
            MediaType::Video,
            ConversionOptions::default(),
        )
        .unwrap();
        let err = ConversionHub::default().convert(&req).unwrap_err();
        assert_matches!(err, ConvertError::UnsupportedRoute(_));
        assert!(!output.parent().unwrap().exists());
    }

    #[test]
    fn missing_input() {
        let dir = TempDir::new().unwrap();
        let req = ConversionRequest::new(
            dir.path().join("gone.wav"),
            dir.path().join("gone.pcm"),
            MediaType::Audio,
            ConversionOptions::default(),
        )
        .unwrap();
        assert_matches!(
            ConversionHub::default().convert(&req),
            Err(ConvertError::NotFound(_))
        );
    }
}
