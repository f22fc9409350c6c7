//! HEIF/HEIC/AVIF still images: `ispe` extents and `pixi` bit depth.

use crate::boxes::{self, BoxType, Visit};
use crate::cursor::{has_bytes_at, ByteCursor};
use crate::error::{ProbeError, Result};
use crate::format::brand_text;

const HEIF_BRANDS: [&[u8; 4]; 9] = [
    b"heic", b"heix", b"hevc", b"hevx", b"mif1", b"msf1", b"heif", b"avif", b"avis",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeifInfo {
    pub major_brand: String,
    pub width: u32,
    pub height: u32,
    /// Smallest positive per-channel depth from `pixi`.
    pub bit_depth: Option<u8>,
}

impl HeifInfo {
    /// Image codec implied by the major brand.
    pub fn codec(&self) -> &'static str {
        match self.major_brand.as_str() {
            "avif" | "avis" => "av1",
            _ => "hevc",
        }
    }
}

pub fn looks_like(data: &[u8]) -> bool {
    boxes::major_brand(data).is_some_and(|brand| HEIF_BRANDS.iter().any(|b| **b == brand))
}

pub fn parse(data: &[u8]) -> Result<HeifInfo> {
    if data.len() < 12 {
        return Err(ProbeError::Truncated {
            offset: 0,
            need: 12,
            have: data.len(),
        });
    }
    if !has_bytes_at(data, 4, b"ftyp") {
        return Err(ProbeError::malformed("missing ftyp box"));
    }
    let brand = boxes::major_brand(data)
        .filter(|brand| HEIF_BRANDS.iter().any(|b| **b == *brand))
        .ok_or_else(|| ProbeError::unsupported("ftyp major brand is not a HEIF brand"))?;

    let mut extents = None;
    let mut bit_depth = None;
    let mut pixi_seen = false;

    let walked = boxes::walk(data, |header, _depth| {
        match header.box_type {
            BoxType::ISPE if extents.is_none() => {
                extents = read_ispe(header.payload(data));
            }
            BoxType::PIXI if !pixi_seen => {
                pixi_seen = true;
                bit_depth = read_pixi(header.payload(data));
            }
            _ => {}
        }
        if extents.is_some() && pixi_seen {
            Visit::Stop
        } else {
            Visit::Descend
        }
    });

    // A damaged box after `ispe` (typically a partly written `mdat`) ends
    // the search but keeps what was already found.
    if let Err(e) = walked {
        if extents.is_none() || !e.is_parse_failure() {
            return Err(e);
        }
        tracing::debug!(error = %e, "stopping HEIF box search at damaged box");
    }

    let (width, height) = extents.ok_or_else(|| {
        ProbeError::malformed("HEIF has no ispe box with positive dimensions")
    })?;

    Ok(HeifInfo {
        major_brand: brand_text(brand),
        width,
        height,
        bit_depth,
    })
}

/// Full box: version/flags, then width and height.
fn read_ispe(payload: &[u8]) -> Option<(u32, u32)> {
    let mut c = ByteCursor::at(payload, 4).ok()?;
    let width = c.u32_be().ok()?;
    let height = c.u32_be().ok()?;
    (width > 0 && height > 0).then_some((width, height))
}

/// Full box: version/flags, channel count, one depth byte per channel.
fn read_pixi(payload: &[u8]) -> Option<u8> {
    let mut c = ByteCursor::at(payload, 4).ok()?;
    let channels = usize::from(c.u8().ok()?);
    c.bytes(channels)
        .ok()?
        .iter()
        .copied()
        .filter(|&d| d > 0)
        .min()
}
