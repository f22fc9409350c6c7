//! TIFF byte-order header and first IFD.

use crate::cursor::{has_bytes_at, ByteCursor};
use crate::error::{ProbeError, Result};

const TAG_IMAGE_WIDTH: u16 = 256;
const TAG_IMAGE_LENGTH: u16 = 257;
const TAG_BITS_PER_SAMPLE: u16 = 258;

const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;

const IFD_ENTRY_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TiffInfo {
    pub width: u32,
    pub height: u32,
    pub bits_per_sample: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Little,
    Big,
}

/// Endian-aware reads over the whole file.
struct Reader<'a> {
    data: &'a [u8],
    order: ByteOrder,
}

impl Reader<'_> {
    fn u16(&self, offset: usize) -> Result<u16> {
        let mut c = ByteCursor::at(self.data, offset)?;
        match self.order {
            ByteOrder::Little => c.u16_le(),
            ByteOrder::Big => c.u16_be(),
        }
    }

    fn u32(&self, offset: usize) -> Result<u32> {
        let mut c = ByteCursor::at(self.data, offset)?;
        match self.order {
            ByteOrder::Little => c.u32_le(),
            ByteOrder::Big => c.u32_be(),
        }
    }

    /// First value of a SHORT or LONG entry; other types yield `None`.
    ///
    /// Single values are stored inline in the 4-byte value field, left-justified,
    /// so an inline SHORT sits in the low half for little-endian files and in
    /// the high half for big-endian ones.
    fn first_value(&self, field_type: u16, count: u32, value: u32) -> Result<Option<u32>> {
        let v = match (field_type, count) {
            (TYPE_SHORT, 1) => match self.order {
                ByteOrder::Little => value & 0xFFFF,
                ByteOrder::Big => value >> 16,
            },
            (TYPE_SHORT, _) => u32::from(self.u16(value as usize)?),
            (TYPE_LONG, 1) => value,
            (TYPE_LONG, _) => self.u32(value as usize)?,
            _ => return Ok(None),
        };
        Ok(Some(v))
    }
}

pub fn looks_like(data: &[u8]) -> bool {
    data.len() >= 8
        && (has_bytes_at(data, 0, &[b'I', b'I', 42, 0]) || has_bytes_at(data, 0, &[b'M', b'M', 0, 42]))
}

pub fn parse(data: &[u8]) -> Result<TiffInfo> {
    if data.len() < 8 {
        return Err(ProbeError::Truncated {
            offset: 0,
            need: 8,
            have: data.len(),
        });
    }
    if !looks_like(data) {
        return Err(ProbeError::malformed("missing TIFF byte-order header"));
    }

    let reader = Reader {
        data,
        order: if data[0] == b'I' {
            ByteOrder::Little
        } else {
            ByteOrder::Big
        },
    };

    let ifd = reader.u32(4)? as usize;
    if ifd < 8 {
        return Err(ProbeError::malformed(format!(
            "TIFF IFD offset {} overlaps the header",
            ifd
        )));
    }
    let entries = usize::from(reader.u16(ifd)?);

    let mut width = None;
    let mut height = None;
    let mut bits_per_sample = None;

    for i in 0..entries {
        let pos = ifd + 2 + i * IFD_ENTRY_LEN;
        let tag = reader.u16(pos)?;
        let field_type = reader.u16(pos + 2)?;
        let count = reader.u32(pos + 4)?;
        let value = reader.u32(pos + 8)?;

        let slot = match tag {
            TAG_IMAGE_WIDTH => &mut width,
            TAG_IMAGE_LENGTH => &mut height,
            TAG_BITS_PER_SAMPLE => &mut bits_per_sample,
            _ => continue,
        };
        if count == 0 {
            continue;
        }
        if let Some(v) = reader.first_value(field_type, count, value)?.filter(|&v| v > 0) {
            *slot = Some(v);
        }
    }

    match (width, height) {
        (Some(width), Some(height)) => Ok(TiffInfo {
            width,
            height,
            bits_per_sample,
        }),
        _ => Err(ProbeError::malformed("TIFF IFD lacks image width or length")),
    }
}
