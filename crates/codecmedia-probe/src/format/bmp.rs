//! Windows bitmap file and DIB headers.

use crate::cursor::{has_bytes_at, ByteCursor};
use crate::error::{ProbeError, Result};

/// File header (14) + OS/2 core header (12).
const MIN_LEN: usize = 26;
const CORE_HEADER_SIZE: u32 = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BmpInfo {
    pub width: u32,
    pub height: u32,
    pub bits_per_pixel: u16,
}

pub fn looks_like(data: &[u8]) -> bool {
    data.len() >= MIN_LEN && has_bytes_at(data, 0, b"BM")
}

pub fn parse(data: &[u8]) -> Result<BmpInfo> {
    if !has_bytes_at(data, 0, b"BM") {
        return Err(ProbeError::malformed("missing BM signature"));
    }
    if data.len() < MIN_LEN {
        return Err(ProbeError::Truncated {
            offset: 0,
            need: MIN_LEN,
            have: data.len(),
        });
    }

    let mut c = ByteCursor::at(data, 14)?;
    let dib_size = c.u32_le()?;

    let (width, height, bits_per_pixel) = match dib_size {
        CORE_HEADER_SIZE => {
            let width = i64::from(c.u16_le()?);
            let height = i64::from(c.u16_le()?);
            c.skip(2)?; // planes
            (width, height, c.u16_le()?)
        }
        n if n > CORE_HEADER_SIZE => {
            let width = i64::from(c.i32_le()?);
            // Negative height marks a top-down bitmap.
            let height = i64::from(c.i32_le()?).abs();
            c.skip(2)?; // planes
            (width, height, c.u16_le()?)
        }
        n => {
            return Err(ProbeError::unsupported(format!(
                "BMP DIB header size {}",
                n
            )))
        }
    };

    let width = u32::try_from(width).ok().filter(|&w| w > 0);
    let height = u32::try_from(height).ok().filter(|&h| h > 0);
    let (width, height) = width
        .zip(height)
        .ok_or_else(|| ProbeError::malformed("BMP has non-positive dimensions"))?;
    if bits_per_pixel == 0 {
        return Err(ProbeError::malformed("BMP declares zero bits per pixel"));
    }

    Ok(BmpInfo {
        width,
        height,
        bits_per_pixel,
    })
}
