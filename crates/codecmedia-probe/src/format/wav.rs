//! RIFF/WAVE chunk walking.

use crate::cursor::{has_bytes_at, ByteCursor};
use crate::error::{ProbeError, Result};
use crate::types::BitrateMode;

/// Parsed PCM WAV summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavInfo {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub data_size: u64,
    pub bitrate_kbps: u32,
    pub duration_millis: u64,
}

impl WavInfo {
    /// Uncompressed PCM is always constant bitrate.
    pub fn bitrate_mode(&self) -> BitrateMode {
        BitrateMode::Cbr
    }
}

#[derive(Debug, Clone, Copy)]
struct FmtChunk {
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

pub fn looks_like(data: &[u8]) -> bool {
    has_bytes_at(data, 0, b"RIFF") && has_bytes_at(data, 8, b"WAVE")
}

pub fn parse(data: &[u8]) -> Result<WavInfo> {
    if data.len() < 12 {
        return Err(ProbeError::Truncated {
            offset: 0,
            need: 12,
            have: data.len(),
        });
    }
    if !looks_like(data) {
        return Err(ProbeError::malformed("missing RIFF/WAVE signature"));
    }

    let mut fmt = None;
    let mut data_size = None;
    let mut c = ByteCursor::at(data, 12)?;

    while c.remaining() >= 8 {
        let id = c.fourcc()?;
        let size = c.u32_le()? as usize;
        let payload_start = c.position();
        if size > c.remaining() {
            return Err(ProbeError::Truncated {
                offset: payload_start,
                need: size,
                have: c.remaining(),
            });
        }

        match &id {
            b"fmt " => {
                if size < 16 {
                    return Err(ProbeError::malformed(format!(
                        "fmt chunk is {} bytes, need at least 16",
                        size
                    )));
                }
                let mut f = ByteCursor::at(data, payload_start + 2)?;
                let channels = f.u16_le()?;
                let sample_rate = f.u32_le()?;
                f.skip(6)?; // byte rate, block align
                let bits_per_sample = f.u16_le()?;
                fmt = Some(FmtChunk {
                    channels,
                    sample_rate,
                    bits_per_sample,
                });
            }
            b"data" => data_size = Some(size as u64),
            _ => {}
        }

        // Chunks are padded to an even length; a missing final pad byte is tolerated.
        let padded = size + (size & 1);
        c.skip(padded.min(c.remaining()))?;
    }

    let (fmt, data_size) = match (fmt, data_size) {
        (Some(f), Some(d)) => (f, d),
        _ => return Err(ProbeError::malformed("WAV is missing a fmt or data chunk")),
    };

    if fmt.channels == 0 || fmt.sample_rate == 0 || fmt.bits_per_sample == 0 {
        return Err(ProbeError::malformed("WAV declares a zero format field"));
    }

    let byte_rate = u64::from(fmt.sample_rate) * u64::from(fmt.channels)
        * u64::from(fmt.bits_per_sample)
        / 8;
    if byte_rate == 0 {
        return Err(ProbeError::malformed("WAV byte rate is zero"));
    }

    Ok(WavInfo {
        channels: fmt.channels,
        sample_rate: fmt.sample_rate,
        bits_per_sample: fmt.bits_per_sample,
        data_size,
        bitrate_kbps: (byte_rate * 8 / 1000) as u32,
        duration_millis: data_size * 1000 / byte_rate,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn wav(channels: u16, rate: u32, bits: u16, data_len: usize) -> Vec<u8> {
        let mut fmt = Vec::new();
        fmt.extend_from_slice(&1u16.to_le_bytes());
        fmt.extend_from_slice(&channels.to_le_bytes());
        fmt.extend_from_slice(&rate.to_le_bytes());
        let byte_rate = rate * u32::from(channels) * u32::from(bits) / 8;
        fmt.extend_from_slice(&byte_rate.to_le_bytes());
        fmt.extend_from_slice(&(channels * bits / 8).to_le_bytes());
        fmt.extend_from_slice(&bits.to_le_bytes());

        let mut out = b"RIFF".to_vec();
        out.extend_from_slice(&((4 + 8 + fmt.len() + 8 + data_len) as u32).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&(fmt.len() as u32).to_le_bytes());
        out.extend_from_slice(&fmt);
        out.extend_from_slice(b"data");
        out.extend_from_slice(&(data_len as u32).to_le_bytes());
        out.resize(out.len() + data_len, 0);
        out
    }

    #[test]
    fn mono_16_bit_one_second() {
        let info = parse(&wav(1, 8000, 16, 16000)).unwrap();
        assert_eq!(info.duration_millis, 1000);
        assert_eq!(info.bitrate_kbps, 128);
        assert_eq!(info.bitrate_mode(), BitrateMode::Cbr);
        assert_eq!(info.bits_per_sample, 16);
    }

    #[test]
    fn skips_unknown_odd_sized_chunks() {
        let base = wav(2, 44100, 16, 0);
        // Insert a LIST chunk with odd size before fmt.
        let mut data = base[..12].to_vec();
        data.extend_from_slice(b"LIST");
        data.extend_from_slice(&3u32.to_le_bytes());
        data.extend_from_slice(&[1, 2, 3, 0]);
        data.extend_from_slice(&base[12..]);
        let info = parse(&data).unwrap();
        assert_eq!(info.channels, 2);
        assert_eq!(info.duration_millis, 0);
    }

    #[test]
    fn missing_data_chunk() {
        let mut data = wav(1, 8000, 8, 0);
        data.truncate(data.len() - 8);
        assert!(matches!(parse(&data), Err(ProbeError::Malformed(_))));
    }

    #[test]
    fn chunk_past_end_is_truncated() {
        let mut data = wav(1, 8000, 16, 100);
        data.truncate(data.len() - 50);
        assert!(matches!(parse(&data), Err(ProbeError::Truncated { .. })));
    }

    #[test]
    fn short_fmt_chunk() {
        let mut data = b"RIFF\0\0\0\0WAVEfmt ".to_vec();
        data.extend_from_slice(&8u32.to_le_bytes());
        data.extend_from_slice(&[0; 8]);
        assert!(matches!(parse(&data), Err(ProbeError::Malformed(_))));
    }

    #[test]
    fn zero_channels_rejected() {
        let data = wav(0, 8000, 16, 10);
        assert!(parse(&data).is_err());
    }
}
