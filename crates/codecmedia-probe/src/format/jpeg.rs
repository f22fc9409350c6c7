//! JPEG marker walking up to the first start-of-frame segment.

use crate::cursor::ByteCursor;
use crate::error::{ProbeError, Result};

const SOI: u8 = 0xD8;
const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JpegInfo {
    pub width: u16,
    pub height: u16,
    pub bits_per_sample: u8,
    pub channels: u8,
}

/// Start-of-frame markers for every coding process (not DHT, JPG or DAC).
fn is_sof(marker: u8) -> bool {
    matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF)
}

/// Markers with no length field.
fn is_standalone(marker: u8) -> bool {
    marker == 0x01 || (0xD0..=0xD7).contains(&marker)
}

pub fn looks_like(data: &[u8]) -> bool {
    data.len() >= 4 && data[0] == 0xFF && data[1] == SOI && data[2] == 0xFF
}

pub fn parse(data: &[u8]) -> Result<JpegInfo> {
    if data.len() < 4 {
        return Err(ProbeError::Truncated {
            offset: 0,
            need: 4,
            have: data.len(),
        });
    }
    if !looks_like(data) {
        return Err(ProbeError::malformed("missing JPEG SOI marker"));
    }

    let mut c = ByteCursor::at(data, 2)?;
    loop {
        if c.u8()? != 0xFF {
            return Err(ProbeError::malformed(format!(
                "expected JPEG marker at offset {}",
                c.position() - 1
            )));
        }
        let mut marker = c.u8()?;
        // Fill bytes: any number of 0xFF may precede the marker code.
        while marker == 0xFF {
            marker = c.u8()?;
        }

        if marker == EOI || marker == SOS {
            return Err(ProbeError::malformed(
                "JPEG reached scan data or end of image before a frame header",
            ));
        }
        if is_standalone(marker) {
            continue;
        }

        let segment_start = c.position();
        let length = usize::from(c.u16_be()?);
        if length < 2 {
            return Err(ProbeError::malformed(format!(
                "JPEG segment length {} at offset {}",
                length, segment_start
            )));
        }
        let payload = c.bytes(length - 2)?;

        if is_sof(marker) {
            let mut sof = ByteCursor::new(payload);
            let bits_per_sample = sof.u8()?;
            let height = sof.u16_be()?;
            let width = sof.u16_be()?;
            let channels = sof.u8()?;
            if width == 0 || height == 0 || channels == 0 {
                return Err(ProbeError::malformed(format!(
                    "JPEG frame header declares {}x{} with {} components",
                    width, height, channels
                )));
            }
            return Ok(JpegInfo {
                width,
                height,
                bits_per_sample,
                channels,
            });
        }
    }
}
