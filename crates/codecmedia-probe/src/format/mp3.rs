//! MPEG-1/2/2.5 Layer III frame scanning.

use std::collections::BTreeSet;

use crate::cursor::{has_bytes_at, ByteCursor};
use crate::error::{ProbeError, Result};
use crate::types::BitrateMode;

const BITRATE_MPEG1_L3: [u32; 16] = [
    0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 0,
];
const BITRATE_MPEG2_L3: [u32; 16] = [
    0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160, 0,
];
const SAMPLE_RATE_MPEG1: [u32; 4] = [44100, 48000, 32000, 0];
const SAMPLE_RATE_MPEG2: [u32; 4] = [22050, 24000, 16000, 0];
const SAMPLE_RATE_MPEG25: [u32; 4] = [11025, 12000, 8000, 0];

const FRAME_SYNC: u32 = 0xFFE0_0000;

/// MPEG audio version from the two header version bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegVersion {
    Mpeg1,
    Mpeg2,
    Mpeg25,
}

/// Decoded 4-byte frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: MpegVersion,
    pub bitrate_kbps: u32,
    pub sample_rate: u32,
    pub channels: u32,
    pub frame_length: usize,
    pub samples_per_frame: u32,
}

impl FrameHeader {
    /// Decode a header word, rejecting reserved or non-Layer-III values.
    pub fn decode(word: u32) -> Option<Self> {
        if word & FRAME_SYNC != FRAME_SYNC {
            return None;
        }

        let version_bits = (word >> 19) & 0b11;
        let layer_bits = (word >> 17) & 0b11;
        let bitrate_index = ((word >> 12) & 0b1111) as usize;
        let sample_rate_index = ((word >> 10) & 0b11) as usize;
        let padding = (word >> 9) & 0b1;
        let channel_mode = (word >> 6) & 0b11;

        // Only Layer III.
        if layer_bits != 0b01 {
            return None;
        }

        let (version, sample_rates, bitrates) = match version_bits {
            0b11 => (MpegVersion::Mpeg1, &SAMPLE_RATE_MPEG1, &BITRATE_MPEG1_L3),
            0b10 => (MpegVersion::Mpeg2, &SAMPLE_RATE_MPEG2, &BITRATE_MPEG2_L3),
            0b00 => (MpegVersion::Mpeg25, &SAMPLE_RATE_MPEG25, &BITRATE_MPEG2_L3),
            _ => return None,
        };

        let sample_rate = sample_rates[sample_rate_index];
        let bitrate_kbps = bitrates[bitrate_index];
        if sample_rate == 0 || bitrate_kbps == 0 {
            return None;
        }

        let (coefficient, samples_per_frame) = match version {
            MpegVersion::Mpeg1 => (144_000, 1152),
            MpegVersion::Mpeg2 | MpegVersion::Mpeg25 => (72_000, 576),
        };
        let frame_length = (coefficient * bitrate_kbps / sample_rate + padding) as usize;
        if frame_length < 4 {
            return None;
        }

        Some(Self {
            version,
            bitrate_kbps,
            sample_rate,
            channels: if channel_mode == 0b11 { 1 } else { 2 },
            frame_length,
            samples_per_frame,
        })
    }

    /// Decode the header at `offset`, if four bytes are available there.
    pub fn read_at(data: &[u8], offset: usize) -> Option<Self> {
        let word = ByteCursor::at(data, offset).ok()?.u32_be().ok()?;
        Self::decode(word)
    }

    /// Size of the Layer III side information following the header.
    fn side_info_size(&self) -> usize {
        match (self.version, self.channels) {
            (MpegVersion::Mpeg1, 1) => 17,
            (MpegVersion::Mpeg1, _) => 32,
            (_, 1) => 9,
            (_, _) => 17,
        }
    }
}

/// Sequential frame walk from a starting offset.
///
/// Yields `(offset, header)` for each complete frame and stops at the first
/// offset that does not hold a valid header or whose frame runs past the end.
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Frames<'a> {
    pub fn new(data: &'a [u8], offset: usize) -> Self {
        Self { data, offset }
    }
}

impl Iterator for Frames<'_> {
    type Item = (usize, FrameHeader);

    fn next(&mut self) -> Option<Self::Item> {
        let header = FrameHeader::read_at(self.data, self.offset)?;
        let end = self.offset.checked_add(header.frame_length)?;
        if end > self.data.len() {
            return None;
        }
        let item = (self.offset, header);
        self.offset = end;
        Some(item)
    }
}

/// Parsed MP3 stream summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mp3Info {
    pub sample_rate: u32,
    pub channels: u32,
    pub bitrate_kbps: u32,
    pub bitrate_mode: BitrateMode,
    pub duration_millis: u64,
}

#[derive(Debug, Default)]
struct ScanStats {
    frames: u64,
    total_bits: u64,
    total_samples: u64,
    bitrates: BTreeSet<u32>,
}

/// Check for an ID3v2 tag or a frame sync at the start of the buffer.
pub fn looks_like(data: &[u8]) -> bool {
    if has_bytes_at(data, 0, b"ID3") {
        return true;
    }
    FrameHeader::read_at(data, 0).is_some()
}

pub fn parse(data: &[u8]) -> Result<Mp3Info> {
    if data.len() < 4 {
        return Err(ProbeError::Truncated {
            offset: 0,
            need: 4,
            have: data.len(),
        });
    }

    let audio_start = skip_id3v2(data);
    let (first_offset, first) = find_first_frame(data, audio_start)
        .ok_or_else(|| ProbeError::malformed("no valid MP3 frame found"))?;

    let xing_frames = xing_frame_count(data, first_offset, &first);
    let vbri_frames = vbri_frame_count(data, first_offset);
    let declared_frames = xing_frames.or(vbri_frames);

    let stats = Frames::new(data, first_offset).fold(ScanStats::default(), |mut s, (_, h)| {
        s.frames += 1;
        s.total_bits += h.frame_length as u64 * 8;
        s.total_samples += u64::from(h.samples_per_frame);
        s.bitrates.insert(h.bitrate_kbps);
        s
    });

    let duration_millis = estimate_duration(&stats, declared_frames, &first);
    let average = if duration_millis > 0 && stats.total_bits > 0 {
        (stats.total_bits * 1000 / duration_millis / 1000) as u32
    } else {
        0
    };

    let bitrate_mode = classify(&stats, declared_frames.is_some());

    Ok(Mp3Info {
        sample_rate: first.sample_rate,
        channels: first.channels,
        bitrate_kbps: if average > 0 { average } else { first.bitrate_kbps },
        bitrate_mode,
        duration_millis,
    })
}

/// Offset of the first byte after an ID3v2 tag, or 0 if there is none.
fn skip_id3v2(data: &[u8]) -> usize {
    if data.len() < 10 || !has_bytes_at(data, 0, b"ID3") {
        return 0;
    }
    let flags = data[5];
    let size = synchsafe([data[6], data[7], data[8], data[9]]) as usize;
    let footer = if flags & 0x10 != 0 { 10 } else { 0 };
    (10 + size + footer).min(data.len())
}

/// Decode four 7-bit groups, ignoring each byte's high bit.
pub fn synchsafe(bytes: [u8; 4]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |acc, &b| (acc << 7) | u32::from(b & 0x7F))
}

/// First offset holding a valid header that is followed by another one.
fn find_first_frame(data: &[u8], start: usize) -> Option<(usize, FrameHeader)> {
    (start..data.len().saturating_sub(3)).find_map(|offset| {
        let header = FrameHeader::read_at(data, offset)?;
        let next = offset + header.frame_length;
        FrameHeader::read_at(data, next).map(|_| (offset, header))
    })
}

fn xing_frame_count(data: &[u8], frame_offset: usize, header: &FrameHeader) -> Option<u64> {
    let tag_offset = frame_offset + 4 + header.side_info_size();
    if tag_offset + 16 > data.len() {
        return None;
    }
    if !has_bytes_at(data, tag_offset, b"Xing") && !has_bytes_at(data, tag_offset, b"Info") {
        return None;
    }
    let mut cursor = ByteCursor::at(data, tag_offset + 4).ok()?;
    let flags = cursor.u32_be().ok()?;
    if flags & 0x1 == 0 {
        return None;
    }
    cursor.u32_be().ok().filter(|&n| n > 0).map(u64::from)
}

fn vbri_frame_count(data: &[u8], frame_offset: usize) -> Option<u64> {
    let tag_offset = frame_offset + 4 + 32;
    if tag_offset + 18 > data.len() || !has_bytes_at(data, tag_offset, b"VBRI") {
        return None;
    }
    let count = ByteCursor::at(data, tag_offset + 14).ok()?.u32_be().ok()?;
    (count > 0).then_some(u64::from(count))
}

fn estimate_duration(stats: &ScanStats, declared_frames: Option<u64>, first: &FrameHeader) -> u64 {
    if stats.frames == 0 {
        return 0;
    }
    if stats.total_samples > 0 {
        return stats.total_samples * 1000 / u64::from(first.sample_rate);
    }
    declared_frames
        .map(|n| n * u64::from(first.samples_per_frame) * 1000 / u64::from(first.sample_rate))
        .unwrap_or(0)
}

fn classify(stats: &ScanStats, has_vbr_tag: bool) -> BitrateMode {
    if stats.frames <= 1 {
        return BitrateMode::Unknown;
    }
    let single_bitrate = stats.bitrates.len() <= 1;
    match (has_vbr_tag, single_bitrate) {
        (true, true) => BitrateMode::Cvbr,
        (true, false) | (false, false) => BitrateMode::Vbr,
        (false, true) => BitrateMode::Cbr,
    }
}
