//! MP4/ISOBMFF movie and track headers.

use crate::boxes::{self, BoxHeader, BoxType, Visit};
use crate::cursor::{has_bytes_at, ByteCursor};
use crate::error::{ProbeError, Result};
use crate::format::brand_text;
use crate::types::{MediaType, StreamInfo};

const MP4_BRANDS: [&[u8; 4]; 6] = [b"isom", b"iso2", b"avc1", b"mp41", b"mp42", b"qt  "];

/// Track handler from `hdlr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerType {
    Video,
    Audio,
    Other([u8; 4]),
}

impl HandlerType {
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        match &bytes {
            b"vide" => Self::Video,
            b"soun" => Self::Audio,
            _ => Self::Other(bytes),
        }
    }
}

/// What the walk found in the movie.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mp4Info {
    pub major_brand: Option<String>,
    pub duration_millis: Option<u64>,
    /// First track header with nonzero dimensions.
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// First video track sample entry fourcc.
    pub video_entry: Option<[u8; 4]>,
    /// First audio track sample entry fourcc.
    pub audio_entry: Option<[u8; 4]>,
    pub audio_channels: Option<u16>,
    pub audio_sample_rate: Option<u32>,
}

impl Mp4Info {
    /// Codec name for the video sample entry.
    pub fn video_codec(&self) -> &'static str {
        match self.video_entry.as_ref() {
            Some(b"avc1") | Some(b"avc3") => "h264",
            Some(b"hvc1") | Some(b"hev1") => "hevc",
            Some(b"av01") => "av1",
            Some(b"vp09") => "vp9",
            Some(b"mp4v") => "mpeg4",
            _ => "h264/unknown",
        }
    }

    /// Codec name for the audio sample entry.
    pub fn audio_codec(&self) -> String {
        match self.audio_entry {
            Some(entry) if &entry == b"mp4a" => "aac".to_string(),
            Some(entry) => brand_text(entry),
            None => "aac".to_string(),
        }
    }

    /// The stream matching the file's classification, when its fields are known.
    pub fn stream(&self, media_type: MediaType) -> Option<StreamInfo> {
        match media_type {
            MediaType::Audio => {
                let channels = u32::from(self.audio_channels?);
                let rate = self.audio_sample_rate?;
                (channels > 0 && rate > 0).then(|| StreamInfo::audio(self.audio_codec(), 0, rate, channels))
            }
            _ => {
                let (w, h) = (self.width?, self.height?);
                Some(StreamInfo::picture(self.video_codec(), w, h))
            }
        }
    }
}

/// Per-track state while walking one `trak`.
#[derive(Debug, Default)]
struct Track {
    handler: Option<HandlerType>,
}

pub fn looks_like(data: &[u8]) -> bool {
    boxes::major_brand(data).is_some_and(|brand| MP4_BRANDS.iter().any(|b| **b == brand))
}

pub fn parse(data: &[u8]) -> Result<Mp4Info> {
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
    if !looks_like(data) {
        return Err(ProbeError::unsupported("ftyp major brand is not an MP4 brand"));
    }

    let mut info = Mp4Info {
        major_brand: boxes::major_brand(data).map(brand_text),
        ..Default::default()
    };
    let mut track = Track::default();
    let mut failure = None;

    boxes::walk(data, |header, _depth| {
        let result = match header.box_type {
            BoxType::MOOV | BoxType::MDIA | BoxType::MINF | BoxType::STBL => return Visit::Descend,
            BoxType::TRAK => {
                track = Track::default();
                return Visit::Descend;
            }
            BoxType::MVHD if info.duration_millis.is_none() => {
                read_mvhd(header.payload(data)).map(|d| info.duration_millis = d)
            }
            BoxType::TKHD if info.width.is_none() => read_tkhd(header.payload(data)).map(|dims| {
                if let Some((w, h)) = dims {
                    info.width = Some(w);
                    info.height = Some(h);
                }
            }),
            BoxType::HDLR => read_hdlr(header.payload(data)).map(|h| track.handler = Some(h)),
            BoxType::STSD => read_stsd(header, data, track.handler, &mut info),
            _ => Ok(()),
        };
        match result {
            Ok(()) => Visit::Skip,
            Err(e) => {
                failure = Some(e);
                Visit::Stop
            }
        }
    })?;

    match failure {
        Some(e) => Err(e),
        None => Ok(info),
    }
}

/// Movie duration in milliseconds, or `None` when timescale or duration is zero.
fn read_mvhd(payload: &[u8]) -> Result<Option<u64>> {
    let mut c = ByteCursor::new(payload);
    let version = c.u8()?;
    let (timescale, duration) = if version == 1 {
        c.skip(3 + 8 + 8)?;
        (c.u32_be()?, c.u64_be()?)
    } else {
        c.skip(3 + 4 + 4)?;
        (c.u32_be()?, u64::from(c.u32_be()?))
    };
    if timescale == 0 || duration == 0 {
        return Ok(None);
    }
    Ok(Some(
        (u128::from(duration) * 1000 / u128::from(timescale)).min(u128::from(u64::MAX)) as u64,
    ))
}

/// Track width and height (16.16 fixed point), when both are nonzero.
fn read_tkhd(payload: &[u8]) -> Result<Option<(u32, u32)>> {
    let version = ByteCursor::new(payload).u8()?;
    let offset = if version == 1 { 88 } else { 76 };
    let Ok(mut c) = ByteCursor::at(payload, offset) else {
        return Ok(None);
    };
    let (Ok(w), Ok(h)) = (c.u32_be(), c.u32_be()) else {
        return Ok(None);
    };
    let (w, h) = (w >> 16, h >> 16);
    Ok((w > 0 && h > 0).then_some((w, h)))
}

/// Handler type sits after version/flags and `pre_defined`.
fn read_hdlr(payload: &[u8]) -> Result<HandlerType> {
    let mut c = ByteCursor::at(payload, 8)?;
    Ok(HandlerType::from_bytes(c.fourcc()?))
}

/// Record the first sample entry of the current track.
fn read_stsd(
    header: &BoxHeader,
    data: &[u8],
    handler: Option<HandlerType>,
    info: &mut Mp4Info,
) -> Result<()> {
    let payload = header.payload(data);
    let mut c = ByteCursor::new(payload);
    c.skip(4)?; // version/flags
    if c.u32_be()? == 0 {
        return Ok(());
    }
    c.skip(4)?; // entry size
    let entry = c.fourcc()?;

    match handler {
        Some(HandlerType::Video) if info.video_entry.is_none() => {
            info.video_entry = Some(entry);
        }
        Some(HandlerType::Audio) if info.audio_entry.is_none() => {
            info.audio_entry = Some(entry);
            // SampleEntry reserved (6) + data_reference_index (2), then
            // version, revision, vendor (8) before the channel count.
            c.skip(6 + 2 + 8)?;
            let channels = c.u16_be()?;
            c.skip(2 + 2 + 2)?; // sample size, compression id, packet size
            let rate = c.u32_be()? >> 16;
            info.audio_channels = Some(channels);
            info.audio_sample_rate = Some(rate);
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::boxes::tests::{ftyp, make_box, make_full_box};

    pub(crate) fn mvhd_v0(timescale: u32, duration: u32) -> Vec<u8> {
        let mut p = vec![0u8; 8];
        p.extend_from_slice(&timescale.to_be_bytes());
        p.extend_from_slice(&duration.to_be_bytes());
        p.resize(96, 0);
        make_full_box(b"mvhd", 0, &p)
    }

    fn tkhd_v0(width: u32, height: u32) -> Vec<u8> {
        let mut p = vec![0u8; 72];
        p.extend_from_slice(&(width << 16).to_be_bytes());
        p.extend_from_slice(&(height << 16).to_be_bytes());
        make_full_box(b"tkhd", 0, &p)
    }

    fn hdlr(handler: &[u8; 4]) -> Vec<u8> {
        let mut p = vec![0u8; 4];
        p.extend_from_slice(handler);
        p.extend_from_slice(&[0; 13]);
        make_full_box(b"hdlr", 0, &p)
    }

    fn stsd(entry: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut p = 1u32.to_be_bytes().to_vec();
        p.extend_from_slice(&make_box(entry, body));
        make_full_box(b"stsd", 0, &p)
    }

    fn audio_entry_body(channels: u16, rate: u32) -> Vec<u8> {
        let mut b = vec![0u8; 6];
        b.extend_from_slice(&1u16.to_be_bytes());
        b.extend_from_slice(&[0; 8]);
        b.extend_from_slice(&channels.to_be_bytes());
        b.extend_from_slice(&16u16.to_be_bytes());
        b.extend_from_slice(&[0; 4]);
        b.extend_from_slice(&(rate << 16).to_be_bytes());
        b
    }

    fn trak(parts: &[Vec<u8>], handler: &[u8; 4], sample_entry: Vec<u8>) -> Vec<u8> {
        let stbl = make_box(b"stbl", &sample_entry);
        let minf = make_box(b"minf", &stbl);
        let mut mdia_payload = hdlr(handler);
        mdia_payload.extend_from_slice(&minf);
        let mdia = make_box(b"mdia", &mdia_payload);
        let mut payload: Vec<u8> = parts.concat();
        payload.extend_from_slice(&mdia);
        make_box(b"trak", &payload)
    }

    pub(crate) fn movie() -> Vec<u8> {
        let video = trak(&[tkhd_v0(1920, 1080)], b"vide", stsd(b"hvc1", &[0; 78]));
        let audio = trak(&[tkhd_v0(0, 0)], b"soun", stsd(b"mp4a", &audio_entry_body(2, 48000)));
        let mut moov = mvhd_v0(600, 6000);
        moov.extend_from_slice(&video);
        moov.extend_from_slice(&audio);
        let mut data = ftyp(b"mp42");
        data.extend_from_slice(&make_box(b"moov", &moov));
        data
    }

    #[test]
    fn top_level_mvhd_duration() {
        let mut data = ftyp(b"isom");
        data.extend_from_slice(&mvhd_v0(1000, 5000));
        let info = parse(&data).unwrap();
        assert_eq!(info.duration_millis, Some(5000));
        assert_eq!(info.major_brand.as_deref(), Some("isom"));
    }

    #[test]
    fn nested_tracks() {
        let info = parse(&movie()).unwrap();
        assert_eq!(info.duration_millis, Some(10_000));
        assert_eq!((info.width, info.height), (Some(1920), Some(1080)));
        assert_eq!(info.video_codec(), "hevc");
        assert_eq!(info.audio_channels, Some(2));
        assert_eq!(info.audio_sample_rate, Some(48000));
    }

    #[test]
    fn stream_follows_classification() {
        let info = parse(&movie()).unwrap();
        let video = info.stream(MediaType::Video).unwrap();
        assert_eq!(video.codec, "hevc");
        assert_eq!(video.width, Some(1920));
        let audio = info.stream(MediaType::Audio).unwrap();
        assert_eq!(audio.codec, "aac");
        assert_eq!(audio.channels, Some(2));
        assert_eq!(audio.sample_rate, Some(48000));
    }

    #[test]
    fn mvhd_version_one() {
        let mut p = vec![0u8; 16];
        p.extend_from_slice(&90_000u32.to_be_bytes());
        p.extend_from_slice(&(90_000u64 * 3).to_be_bytes());
        let mut data = ftyp(b"iso2");
        data.extend_from_slice(&make_full_box(b"mvhd", 1, &p));
        assert_eq!(parse(&data).unwrap().duration_millis, Some(3000));
    }

    #[test]
    fn zero_timescale_leaves_duration_unset() {
        let mut data = ftyp(b"isom");
        data.extend_from_slice(&mvhd_v0(0, 5000));
        assert_eq!(parse(&data).unwrap().duration_millis, None);
    }

    #[test]
    fn unknown_brand_is_unsupported() {
        assert!(matches!(parse(&ftyp(b"heic")), Err(ProbeError::Unsupported(_))));
    }

    #[test]
    fn box_past_end_is_truncated() {
        let mut data = ftyp(b"isom");
        data.extend_from_slice(&1000u32.to_be_bytes());
        data.extend_from_slice(b"moov");
        assert!(matches!(parse(&data), Err(ProbeError::Truncated { .. })));
    }

    #[test]
    fn unknown_video_entry_falls_back() {
        let info = Mp4Info {
            video_entry: Some(*b"xyz1"),
            ..Default::default()
        };
        assert_eq!(info.video_codec(), "h264/unknown");
        assert_eq!(Mp4Info::default().video_codec(), "h264/unknown");
    }
}
