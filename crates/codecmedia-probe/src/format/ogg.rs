//! Ogg page walking with a Vorbis identification header.

use crate::cursor::{has_bytes_at, ByteCursor};
use crate::error::{ProbeError, Result};
use crate::types::BitrateMode;

const CAPTURE_PATTERN: &[u8; 4] = b"OggS";
const PAGE_HEADER_LEN: usize = 27;
/// Packet type, "vorbis", version, channels, rate, three bitrates, blocksizes, framing.
const VORBIS_IDENT_LEN: usize = 30;

/// Fixed part of one Ogg page plus its segment table sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    pub version: u8,
    pub header_type: u8,
    /// Signed so the "no packet ends here" sentinel reads as `-1`.
    pub granule_position: i64,
    pub serial: u32,
    pub sequence: u32,
    pub segment_count: u8,
    pub payload_size: usize,
    pub header_size: usize,
}

impl PageHeader {
    /// Read the page header at `offset`. `None` when there is no complete
    /// page there.
    pub fn read_at(data: &[u8], offset: usize) -> Option<Self> {
        if !has_bytes_at(data, offset, CAPTURE_PATTERN) {
            return None;
        }
        let mut c = ByteCursor::at(data, offset + 4).ok()?;
        let version = c.u8().ok()?;
        let header_type = c.u8().ok()?;
        let granule_position = c.u64_le().ok()? as i64;
        let serial = c.u32_le().ok()?;
        let sequence = c.u32_le().ok()?;
        let _checksum = c.u32_le().ok()?;
        let segment_count = c.u8().ok()?;
        let payload_size = c
            .bytes(usize::from(segment_count))
            .ok()?
            .iter()
            .map(|&b| usize::from(b))
            .sum();

        let header = Self {
            version,
            header_type,
            granule_position,
            serial,
            sequence,
            segment_count,
            payload_size,
            header_size: PAGE_HEADER_LEN + usize::from(segment_count),
        };
        (offset + header.total_size() <= data.len()).then_some(header)
    }

    pub fn total_size(&self) -> usize {
        self.header_size + self.payload_size
    }
}

/// Sequential page walk from the start of the buffer.
#[derive(Debug, Clone)]
pub struct Pages<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Pages<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }
}

impl Iterator for Pages<'_> {
    type Item = PageHeader;

    fn next(&mut self) -> Option<PageHeader> {
        let page = PageHeader::read_at(self.data, self.offset)?;
        self.offset += page.total_size();
        Some(page)
    }
}

/// Parsed Ogg/Vorbis stream summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OggInfo {
    pub sample_rate: u32,
    pub channels: u32,
    pub bitrate_kbps: u32,
    pub bitrate_mode: BitrateMode,
    pub duration_millis: u64,
}

pub fn looks_like(data: &[u8]) -> bool {
    has_bytes_at(data, 0, CAPTURE_PATTERN)
}

pub fn parse(data: &[u8]) -> Result<OggInfo> {
    if data.len() < PAGE_HEADER_LEN {
        return Err(ProbeError::Truncated {
            offset: 0,
            need: PAGE_HEADER_LEN,
            have: data.len(),
        });
    }

    let first = PageHeader::read_at(data, 0)
        .ok_or_else(|| ProbeError::malformed("missing or incomplete first OggS page"))?;

    let ident = first.header_size;
    if ident + VORBIS_IDENT_LEN > data.len() {
        return Err(ProbeError::Truncated {
            offset: ident,
            need: VORBIS_IDENT_LEN,
            have: data.len() - ident,
        });
    }
    if data[ident] != 0x01 || !has_bytes_at(data, ident + 1, b"vorbis") {
        return Err(ProbeError::unsupported("Ogg stream does not carry Vorbis"));
    }

    let mut c = ByteCursor::at(data, ident + 7)?;
    let _vorbis_version = c.u32_le()?;
    let channels = u32::from(c.u8()?);
    let sample_rate = c.u32_le()?;
    // The bitrate field that directly follows the sample rate.
    let declared_bitrate = c.u32_le()?;

    if channels == 0 || sample_rate == 0 {
        return Err(ProbeError::malformed(
            "Vorbis identification declares zero channels or sample rate",
        ));
    }

    let (page_count, payload_bits, max_granule) =
        Pages::new(data).fold((0u64, 0u64, 0u64), |(pages, bits, granule), page| {
            // Negative granules (all bits set) mean no packet finished on the page.
            let g = u64::try_from(page.granule_position).unwrap_or(0);
            (pages + 1, bits + page.payload_size as u64 * 8, granule.max(g))
        });

    let duration_millis = max_granule.saturating_mul(1000) / u64::from(sample_rate);
    let average = if duration_millis > 0 {
        (payload_bits * 1000 / duration_millis / 1000) as u32
    } else {
        0
    };
    let nominal = declared_bitrate / 1000;

    let bitrate_mode = if declared_bitrate > 0 || page_count > 2 {
        BitrateMode::Vbr
    } else {
        BitrateMode::Unknown
    };

    Ok(OggInfo {
        sample_rate,
        channels,
        bitrate_kbps: if average > 0 { average } else { nominal },
        bitrate_mode,
        duration_millis,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn page(granule: i64, sequence: u32, payload: &[u8]) -> Vec<u8> {
        let mut p = b"OggS".to_vec();
        p.push(0); // version
        p.push(if sequence == 0 { 0x02 } else { 0x00 });
        p.extend_from_slice(&granule.to_le_bytes());
        p.extend_from_slice(&0x1234u32.to_le_bytes());
        p.extend_from_slice(&sequence.to_le_bytes());
        p.extend_from_slice(&0u32.to_le_bytes());
        let mut remaining = payload.len();
        let mut lacing = Vec::new();
        while remaining >= 255 {
            lacing.push(255u8);
            remaining -= 255;
        }
        lacing.push(remaining as u8);
        p.push(lacing.len() as u8);
        p.extend_from_slice(&lacing);
        p.extend_from_slice(payload);
        p
    }

    /// Vorbis identification packet with the reference-layout bitrate fields.
    pub(crate) fn ident_packet(channels: u8, rate: u32, maximum: u32, nominal: u32) -> Vec<u8> {
        let mut v = vec![0x01];
        v.extend_from_slice(b"vorbis");
        v.extend_from_slice(&0u32.to_le_bytes());
        v.push(channels);
        v.extend_from_slice(&rate.to_le_bytes());
        v.extend_from_slice(&maximum.to_le_bytes());
        v.extend_from_slice(&nominal.to_le_bytes());
        v.extend_from_slice(&0u32.to_le_bytes());
        v.push(0xB8);
        v.push(0x01);
        v
    }

    #[test]
    fn single_bos_page() {
        let data = page(0, 0, &ident_packet(2, 44100, 0, 128_000));
        assert_eq!(data.len(), 58);
        let info = parse(&data).unwrap();
        assert_eq!(info.channels, 2);
        assert_eq!(info.sample_rate, 44100);
        assert_eq!(info.bitrate_mode, BitrateMode::Unknown);
        assert_eq!(info.duration_millis, 0);
    }

    #[test]
    fn duration_from_max_granule() {
        let mut data = page(0, 0, &ident_packet(2, 44100, 0, 0));
        data.extend_from_slice(&page(-1, 1, &[0u8; 300]));
        data.extend_from_slice(&page(88_200, 2, &[0u8; 1000]));
        data.extend_from_slice(&page(-1, 3, &[0u8; 10]));
        let info = parse(&data).unwrap();
        assert_eq!(info.duration_millis, 2000);
        assert_eq!(info.bitrate_mode, BitrateMode::Vbr);
        // (30 + 300 + 1000 + 10) bytes over two seconds
        assert_eq!(info.bitrate_kbps, 5);
    }

    #[test]
    fn declared_bitrate_used_without_duration() {
        let data = page(0, 0, &ident_packet(1, 48000, 96_000, 0));
        let info = parse(&data).unwrap();
        assert_eq!(info.bitrate_kbps, 96);
        assert_eq!(info.bitrate_mode, BitrateMode::Vbr);
    }

    #[test]
    fn non_vorbis_is_unsupported() {
        let mut opus = b"OpusHead".to_vec();
        opus.resize(30, 0);
        let data = page(0, 0, &opus);
        assert!(matches!(parse(&data), Err(ProbeError::Unsupported(_))));
    }

    #[test]
    fn truncated_ident_packet() {
        let mut data = page(0, 0, &ident_packet(2, 44100, 0, 0));
        data.truncate(40);
        assert!(parse(&data).is_err());
    }

    #[test]
    fn pages_iterator_stops_at_junk() {
        let mut data = page(0, 0, &[1, 2, 3]);
        data.extend_from_slice(&page(10, 1, &[4]));
        data.extend_from_slice(b"garbage trailing bytes here....");
        assert_eq!(Pages::new(&data).count(), 2);
    }
}
