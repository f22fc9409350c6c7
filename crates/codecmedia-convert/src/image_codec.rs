//! Image codec collaborator used by the image transcode strategy.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};

use crate::error::{ConvertError, Result};

/// Decodes and re-encodes still images.
///
/// The hub only talks to this trait, so a different codec backend can be
/// plugged in without touching strategy selection.
pub trait ImageCodec: Send + Sync {
    /// Name of this codec backend.
    fn name(&self) -> &'static str;

    /// Decode an image whose source extension is `ext`.
    fn decode(&self, data: &[u8], ext: &str) -> Result<DynamicImage>;

    /// Encode `img` into the format named by `ext`.
    fn encode(&self, img: &DynamicImage, ext: &str) -> Result<Vec<u8>>;
}

/// [`ImageCodec`] backed by the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageRsCodec;

impl ImageRsCodec {
    pub fn new() -> Self {
        Self
    }

    fn format_for(ext: &str) -> Result<ImageFormat> {
        if matches!(ext, "heif" | "heic") {
            return Err(ConvertError::Codec(format!(
                "no HEIF/HEIC codec available for .{ext}"
            )));
        }
        ImageFormat::from_extension(ext)
            .ok_or_else(|| ConvertError::Codec(format!("no image codec for .{ext}")))
    }
}

impl ImageCodec for ImageRsCodec {
    fn name(&self) -> &'static str {
        "image-rs"
    }

    fn decode(&self, data: &[u8], ext: &str) -> Result<DynamicImage> {
        let format = Self::format_for(ext)?;
        // Content wins over a mislabelled extension.
        let format = image::guess_format(data).unwrap_or(format);
        image::load_from_memory_with_format(data, format)
            .map_err(|e| ConvertError::Codec(format!("failed to decode .{ext} image: {e}")))
    }

    fn encode(&self, img: &DynamicImage, ext: &str) -> Result<Vec<u8>> {
        let format = Self::format_for(ext)?;
        let mut buf = Cursor::new(Vec::new());
        let written = match format {
            // No alpha channel in JPEG.
            ImageFormat::Jpeg => {
                DynamicImage::ImageRgb8(img.to_rgb8()).write_to(&mut buf, format)
            }
            ImageFormat::WebP => {
                DynamicImage::ImageRgba8(img.to_rgba8()).write_to(&mut buf, format)
            }
            _ => img.write_to(&mut buf, format),
        };
        written.map_err(|e| ConvertError::Codec(format!("failed to encode .{ext} image: {e}")))?;
        Ok(buf.into_inner())
    }
}
