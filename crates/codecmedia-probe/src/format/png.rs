//! PNG signature and IHDR.

use crate::cursor::{has_bytes_at, ByteCursor};
use crate::error::{ProbeError, Result};

pub const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Signature (8) + IHDR length/type (8) + IHDR payload (13) + CRC (4).
const MIN_LEN: usize = 33;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngInfo {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_type: u8,
}

pub fn looks_like(data: &[u8]) -> bool {
    has_bytes_at(data, 0, &SIGNATURE)
}

pub fn parse(data: &[u8]) -> Result<PngInfo> {
    if !looks_like(data) {
        if data.len() < SIGNATURE.len() {
            return Err(ProbeError::Truncated {
                offset: 0,
                need: SIGNATURE.len(),
                have: data.len(),
            });
        }
        return Err(ProbeError::malformed("missing PNG signature"));
    }
    if data.len() < MIN_LEN {
        return Err(ProbeError::Truncated {
            offset: 0,
            need: MIN_LEN,
            have: data.len(),
        });
    }

    let mut c = ByteCursor::at(data, SIGNATURE.len())?;
    let length = c.u32_be()?;
    if length != 13 {
        return Err(ProbeError::malformed(format!(
            "IHDR length is {}, expected 13",
            length
        )));
    }
    if &c.fourcc()? != b"IHDR" {
        return Err(ProbeError::malformed("first PNG chunk is not IHDR"));
    }

    let width = c.u32_be()?;
    let height = c.u32_be()?;
    let bit_depth = c.u8()?;
    let color_type = c.u8()?;

    // Dimensions are positive 31-bit values.
    if width == 0 || height == 0 || width > i32::MAX as u32 || height > i32::MAX as u32 {
        return Err(ProbeError::malformed(format!(
            "invalid PNG dimensions {}x{}",
            width, height
        )));
    }

    Ok(PngInfo {
        width,
        height,
        bit_depth,
        color_type,
    })
}
