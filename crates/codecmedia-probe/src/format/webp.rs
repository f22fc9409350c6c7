//! WebP RIFF container with VP8, VP8L or VP8X first chunk.

use crate::cursor::{has_bytes_at, ByteCursor};
use crate::error::{ProbeError, Result};

/// Enough for the largest fixed header read (VP8 dimensions end at 30).
const MIN_LEN: usize = 30;
const CHUNK_DATA: usize = 20;

const VP8_START_CODE: [u8; 3] = [0x9D, 0x01, 0x2A];
const VP8L_SIGNATURE: u8 = 0x2F;

/// Which bitstream the first chunk carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebpVariant {
    Lossy,
    Lossless,
    Extended,
}

impl WebpVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebpVariant::Lossy => "lossy",
            WebpVariant::Lossless => "lossless",
            WebpVariant::Extended => "extended",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebpInfo {
    pub width: u32,
    pub height: u32,
    pub variant: WebpVariant,
}

pub fn looks_like(data: &[u8]) -> bool {
    has_bytes_at(data, 0, b"RIFF") && has_bytes_at(data, 8, b"WEBP")
}

pub fn parse(data: &[u8]) -> Result<WebpInfo> {
    if !looks_like(data) {
        if data.len() < 12 {
            return Err(ProbeError::Truncated {
                offset: 0,
                need: 12,
                have: data.len(),
            });
        }
        return Err(ProbeError::malformed("missing RIFF/WEBP signature"));
    }
    if data.len() < MIN_LEN {
        return Err(ProbeError::Truncated {
            offset: 0,
            need: MIN_LEN,
            have: data.len(),
        });
    }

    let chunk = ByteCursor::at(data, 12)?.fourcc()?;
    let (width, height, variant) = match &chunk {
        b"VP8 " => lossy(data)?,
        b"VP8L" => lossless(data)?,
        b"VP8X" => extended(data)?,
        other => {
            return Err(ProbeError::unsupported(format!(
                "WebP chunk '{}'",
                String::from_utf8_lossy(other)
            )))
        }
    };

    if width == 0 || height == 0 {
        return Err(ProbeError::malformed(format!(
            "WebP {} has zero dimensions",
            variant.as_str()
        )));
    }
    Ok(WebpInfo {
        width,
        height,
        variant,
    })
}

/// Key frame: 3-byte frame tag, start code, then 14-bit width and height
/// each with a 2-bit scale in the top bits.
fn lossy(data: &[u8]) -> Result<(u32, u32, WebpVariant)> {
    let mut c = ByteCursor::at(data, CHUNK_DATA + 3)?;
    if c.bytes(3)? != VP8_START_CODE {
        return Err(ProbeError::malformed("invalid VP8 key frame start code"));
    }
    let width = u32::from(c.u16_le()? & 0x3FFF);
    let height = u32::from(c.u16_le()? & 0x3FFF);
    Ok((width, height, WebpVariant::Lossy))
}

/// Signature byte, then width-1 and height-1 as consecutive 14-bit fields.
fn lossless(data: &[u8]) -> Result<(u32, u32, WebpVariant)> {
    let mut c = ByteCursor::at(data, CHUNK_DATA)?;
    if c.u8()? != VP8L_SIGNATURE {
        return Err(ProbeError::malformed("invalid VP8L signature byte"));
    }
    let bits = c.u32_le()?;
    let width = (bits & 0x3FFF) + 1;
    let height = ((bits >> 14) & 0x3FFF) + 1;
    Ok((width, height, WebpVariant::Lossless))
}

/// Flags (4 bytes), then 24-bit canvas width-1 and height-1.
fn extended(data: &[u8]) -> Result<(u32, u32, WebpVariant)> {
    let mut c = ByteCursor::at(data, CHUNK_DATA + 4)?;
    let width = c.u24_le()? + 1;
    let height = c.u24_le()? + 1;
    Ok((width, height, WebpVariant::Extended))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn riff(chunk: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = b"RIFF".to_vec();
        out.extend_from_slice(&((payload.len() + 12) as u32).to_le_bytes());
        out.extend_from_slice(b"WEBP");
        out.extend_from_slice(chunk);
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(payload);
        out
    }

    pub(crate) fn vp8(width: u16, height: u16) -> Vec<u8> {
        let mut payload = vec![0x10, 0x02, 0x00];
        payload.extend_from_slice(&VP8_START_CODE);
        payload.extend_from_slice(&(width | 0x4000).to_le_bytes());
        payload.extend_from_slice(&height.to_le_bytes());
        payload.resize(16, 0);
        riff(b"VP8 ", &payload)
    }

    #[test]
    fn lossy_masks_scale_bits() {
        let info = parse(&vp8(400, 300)).unwrap();
        assert_eq!((info.width, info.height), (400, 300));
        assert_eq!(info.variant, WebpVariant::Lossy);
    }

    #[test]
    fn lossless_bit_packing() {
        let (w, h) = (1000u32, 700u32);
        let bits = (w - 1) | ((h - 1) << 14);
        let mut payload = vec![VP8L_SIGNATURE];
        payload.extend_from_slice(&bits.to_le_bytes());
        payload.resize(12, 0);
        let info = parse(&riff(b"VP8L", &payload)).unwrap();
        assert_eq!((info.width, info.height), (1000, 700));
        assert_eq!(info.variant, WebpVariant::Lossless);
    }

    #[test]
    fn extended_canvas() {
        let mut payload = vec![0x10, 0, 0, 0];
        payload.extend_from_slice(&[0xFF, 0x0F, 0x00]); // 4095 + 1
        payload.extend_from_slice(&[0x01, 0x00, 0x01]); // 65537 + 1
        let info = parse(&riff(b"VP8X", &payload)).unwrap();
        assert_eq!((info.width, info.height), (4096, 65538));
        assert_eq!(info.variant, WebpVariant::Extended);
    }

    #[test]
    fn bad_start_code() {
        let mut data = vp8(10, 10);
        data[24] = 0x00;
        assert!(matches!(parse(&data), Err(ProbeError::Malformed(_))));
    }

    #[test]
    fn unknown_chunk_unsupported() {
        let data = riff(b"ALPH", &[0; 16]);
        assert!(matches!(parse(&data), Err(ProbeError::Unsupported(_))));
    }

    #[test]
    fn short_file_truncated() {
        let mut data = vp8(10, 10);
        data.truncate(20);
        assert!(matches!(parse(&data), Err(ProbeError::Truncated { .. })));
    }
}
