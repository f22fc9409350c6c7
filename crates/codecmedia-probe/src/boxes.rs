//! ISOBMFF box headers and a bounded depth-first box walker.
//!
//! Shared by the MP4 and HEIF parsers. A box is `[u32 size][fourcc][payload]`;
//! size `0` runs to the end of the enclosing range and size `1` means a 64-bit
//! size follows the type, making the header 16 bytes instead of 8.

use std::fmt;

use crate::cursor::ByteCursor;
use crate::error::{ProbeError, Result};

/// Deepest nesting the walker will descend into.
pub const MAX_BOX_DEPTH: usize = 16;

/// Upper bound on boxes visited in one walk.
pub const MAX_BOXES: usize = 100_000;

/// Four-character box type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoxType(pub [u8; 4]);

impl BoxType {
    pub const FTYP: Self = Self(*b"ftyp");
    pub const MOOV: Self = Self(*b"moov");
    pub const MVHD: Self = Self(*b"mvhd");
    pub const TRAK: Self = Self(*b"trak");
    pub const TKHD: Self = Self(*b"tkhd");
    pub const MDIA: Self = Self(*b"mdia");
    pub const HDLR: Self = Self(*b"hdlr");
    pub const MINF: Self = Self(*b"minf");
    pub const STBL: Self = Self(*b"stbl");
    pub const STSD: Self = Self(*b"stsd");
    pub const EDTS: Self = Self(*b"edts");
    pub const DINF: Self = Self(*b"dinf");
    pub const UDTA: Self = Self(*b"udta");
    pub const META: Self = Self(*b"meta");
    pub const IPRP: Self = Self(*b"iprp");
    pub const IPCO: Self = Self(*b"ipco");
    pub const GRPL: Self = Self(*b"grpl");
    pub const MOOF: Self = Self(*b"moof");
    pub const TRAF: Self = Self(*b"traf");
    pub const MVEX: Self = Self(*b"mvex");
    pub const MFRA: Self = Self(*b"mfra");
    pub const SINF: Self = Self(*b"sinf");
    pub const SCHI: Self = Self(*b"schi");
    pub const TREF: Self = Self(*b"tref");
    pub const ISPE: Self = Self(*b"ispe");
    pub const PIXI: Self = Self(*b"pixi");

    /// Get the 4-char code as a string.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("????")
    }

    /// Whether this box holds child boxes.
    pub fn is_container(&self) -> bool {
        matches!(
            *self,
            Self::MOOV
                | Self::TRAK
                | Self::MDIA
                | Self::MINF
                | Self::STBL
                | Self::EDTS
                | Self::DINF
                | Self::UDTA
                | Self::META
                | Self::IPRP
                | Self::IPCO
                | Self::GRPL
                | Self::MOOF
                | Self::TRAF
                | Self::MVEX
                | Self::MFRA
                | Self::SINF
                | Self::SCHI
                | Self::TREF
        )
    }

    /// Containers whose children follow a 4-byte version/flags field.
    pub fn is_full_container(&self) -> bool {
        *self == Self::META
    }
}

impl fmt::Display for BoxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parsed box header, with absolute offsets into the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxHeader {
    pub box_type: BoxType,
    /// Offset of the size field.
    pub start: usize,
    /// Offset of the first payload byte.
    pub payload_start: usize,
    /// One past the last byte of the box.
    pub end: usize,
}

impl BoxHeader {
    /// Read the header of the box starting at `pos`, which must end by `limit`.
    pub fn read(data: &[u8], pos: usize, limit: usize) -> Result<Self> {
        let mut cursor = ByteCursor::at(data, pos)?;
        let size32 = cursor.u32_be()?;
        let box_type = BoxType(cursor.fourcc()?);

        let (size, header_size) = match size32 {
            0 => ((limit - pos) as u64, 8u64),
            1 => (cursor.u64_be()?, 16u64),
            n => (u64::from(n), 8u64),
        };

        if size < header_size {
            return Err(ProbeError::malformed(format!(
                "box '{}' at offset {} declares size {} smaller than its header",
                box_type, pos, size
            )));
        }

        let available = (limit - pos) as u64;
        if size > available {
            return Err(ProbeError::Truncated {
                offset: pos,
                need: usize::try_from(size).unwrap_or(usize::MAX),
                have: limit - pos,
            });
        }

        Ok(Self {
            box_type,
            start: pos,
            payload_start: pos + header_size as usize,
            end: pos + size as usize,
        })
    }

    /// The payload bytes of this box.
    pub fn payload<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[self.payload_start..self.end]
    }

    pub fn payload_len(&self) -> usize {
        self.end - self.payload_start
    }

    /// Where child boxes begin, skipping the version/flags of full boxes.
    fn children_start(&self) -> usize {
        if self.box_type.is_full_container() {
            (self.payload_start + 4).min(self.end)
        } else {
            self.payload_start
        }
    }
}

/// What the walker should do after visiting a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Descend into the box's children when it is a container.
    Descend,
    /// Continue with the next sibling.
    Skip,
    /// End the walk.
    Stop,
}

struct Level {
    pos: usize,
    end: usize,
    depth: usize,
}

/// Visit every box in `data` depth-first, in file order.
///
/// Uses an explicit stack rather than recursion. Descending deeper than
/// [`MAX_BOX_DEPTH`] or visiting more than [`MAX_BOXES`] boxes fails with
/// [`ProbeError::Malformed`]. A trailing fragment shorter than a box header is
/// ignored.
pub fn walk<F>(data: &[u8], mut visit: F) -> Result<()>
where
    F: FnMut(&BoxHeader, usize) -> Visit,
{
    let mut stack = vec![Level {
        pos: 0,
        end: data.len(),
        depth: 0,
    }];
    let mut visited = 0usize;

    while let Some(level) = stack.last_mut() {
        if level.end - level.pos < 8 {
            stack.pop();
            continue;
        }

        let header = BoxHeader::read(data, level.pos, level.end)?;
        level.pos = header.end;
        let depth = level.depth;

        visited += 1;
        if visited > MAX_BOXES {
            return Err(ProbeError::malformed(format!(
                "more than {} boxes in file",
                MAX_BOXES
            )));
        }

        match visit(&header, depth) {
            Visit::Stop => return Ok(()),
            Visit::Skip => {}
            Visit::Descend if header.box_type.is_container() => {
                if depth + 1 > MAX_BOX_DEPTH {
                    return Err(ProbeError::malformed(format!(
                        "box nesting deeper than {} at '{}'",
                        MAX_BOX_DEPTH, header.box_type
                    )));
                }
                stack.push(Level {
                    pos: header.children_start(),
                    end: header.end,
                    depth: depth + 1,
                });
            }
            Visit::Descend => {}
        }
    }

    Ok(())
}

/// Major brand of a leading `ftyp` box.
pub fn major_brand(data: &[u8]) -> Option<[u8; 4]> {
    let mut cursor = ByteCursor::at(data, 4).ok()?;
    if cursor.fourcc().ok()? != BoxType::FTYP.0 {
        return None;
    }
    cursor.fourcc().ok()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a box with a 32-bit size.
    pub(crate) fn make_box(box_type: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(payload.len() + 8);
        out.extend_from_slice(&((payload.len() + 8) as u32).to_be_bytes());
        out.extend_from_slice(box_type);
        out.extend_from_slice(payload);
        out
    }

    /// Build a full box (version/flags prefix).
    pub(crate) fn make_full_box(box_type: &[u8; 4], version: u8, payload: &[u8]) -> Vec<u8> {
        let mut body = vec![version, 0, 0, 0];
        body.extend_from_slice(payload);
        make_box(box_type, &body)
    }

    pub(crate) fn ftyp(brand: &[u8; 4]) -> Vec<u8> {
        let mut payload = brand.to_vec();
        payload.extend_from_slice(&0u32.to_be_bytes());
        payload.extend_from_slice(brand);
        make_box(b"ftyp", &payload)
    }

    #[test]
    fn reads_compact_header() {
        let data = make_box(b"free", &[0; 4]);
        let h = BoxHeader::read(&data, 0, data.len()).unwrap();
        assert_eq!(h.box_type, BoxType(*b"free"));
        assert_eq!(h.payload_start, 8);
        assert_eq!(h.end, 12);
    }

    #[test]
    fn reads_extended_size() {
        let mut data = Vec::new();
        data.extend_from_slice(&1u32.to_be_bytes());
        data.extend_from_slice(b"mdat");
        data.extend_from_slice(&20u64.to_be_bytes());
        data.extend_from_slice(&[0xAA; 4]);
        let h = BoxHeader::read(&data, 0, data.len()).unwrap();
        assert_eq!(h.payload_start, 16);
        assert_eq!(h.end, 20);
        assert_eq!(h.payload(&data), &[0xAA; 4]);
    }

    #[test]
    fn size_zero_runs_to_end_of_range() {
        let mut data = Vec::new();
        data.extend_from_slice(&0u32.to_be_bytes());
        data.extend_from_slice(b"mdat");
        data.extend_from_slice(&[0; 100]);
        let h = BoxHeader::read(&data, 0, data.len()).unwrap();
        assert_eq!(h.end, 108);
    }

    #[test]
    fn undersized_box_is_malformed() {
        let mut data = 4u32.to_be_bytes().to_vec();
        data.extend_from_slice(b"free");
        assert!(matches!(
            BoxHeader::read(&data, 0, data.len()),
            Err(ProbeError::Malformed(_))
        ));
    }

    #[test]
    fn oversized_box_is_truncated() {
        let mut data = 64u32.to_be_bytes().to_vec();
        data.extend_from_slice(b"moov");
        assert!(matches!(
            BoxHeader::read(&data, 0, data.len()),
            Err(ProbeError::Truncated { .. })
        ));
    }

    #[test]
    fn walk_visits_depth_first() {
        let inner = make_box(b"tkhd", &[0; 4]);
        let trak = make_box(b"trak", &inner);
        let mvhd = make_box(b"mvhd", &[0; 4]);
        let mut moov_payload = mvhd.clone();
        moov_payload.extend_from_slice(&trak);
        let mut data = ftyp(b"isom");
        data.extend_from_slice(&make_box(b"moov", &moov_payload));
        data.extend_from_slice(&make_box(b"free", &[]));

        let mut seen = Vec::new();
        walk(&data, |h, depth| {
            seen.push((h.box_type.as_str().to_string(), depth));
            Visit::Descend
        })
        .unwrap();

        let expected: Vec<(String, usize)> = [
            ("ftyp", 0),
            ("moov", 0),
            ("mvhd", 1),
            ("trak", 1),
            ("tkhd", 2),
            ("free", 0),
        ]
        .iter()
        .map(|(t, d)| (t.to_string(), *d))
        .collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn walk_skips_meta_version_flags() {
        let ispe = make_full_box(b"ispe", 0, &[0; 8]);
        let meta = make_full_box(b"meta", 0, &ispe);
        let mut found = false;
        walk(&meta, |h, _| {
            if h.box_type == BoxType::ISPE {
                found = true;
            }
            Visit::Descend
        })
        .unwrap();
        assert!(found);
    }

    #[test]
    fn walk_rejects_excessive_nesting() {
        let mut data = make_box(b"free", &[]);
        for _ in 0..(MAX_BOX_DEPTH + 2) {
            data = make_box(b"moov", &data);
        }
        let err = walk(&data, |_, _| Visit::Descend).unwrap_err();
        assert!(matches!(err, ProbeError::Malformed(_)));
    }

    #[test]
    fn walk_stop_ends_early() {
        let mut data = make_box(b"free", &[]);
        data.extend_from_slice(&make_box(b"skip", &[]));
        let mut count = 0;
        walk(&data, |_, _| {
            count += 1;
            Visit::Stop
        })
        .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn major_brand_requires_ftyp() {
        assert_eq!(major_brand(&ftyp(b"heic")), Some(*b"heic"));
        assert_eq!(major_brand(&make_box(b"moov", &[0; 8])), None);
        assert_eq!(major_brand(b"short"), None);
    }
}
