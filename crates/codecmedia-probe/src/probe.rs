//! Probe orchestration: pick a parser, parse, and degrade gracefully.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{ProbeError, Result};
use crate::format::{Format, ProbeInfo};
use crate::sniff::{self, Descriptor};
use crate::types::ProbeResult;

/// Ceiling for strict parsing, checked before the file is read.
pub const STRICT_MAX_BYTES: u64 = 32 * 1024 * 1024;

/// Probe a file on disk.
///
/// Fails only when the file is missing or unreadable. Undecodable content
/// still yields a result describing the file by its extension or magic bytes.
pub fn probe_file<P: AsRef<Path>>(path: P) -> Result<ProbeResult> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ProbeError::NotFound(path.to_path_buf()));
    }
    let data = fs::read(path)?;
    Ok(probe_bytes(path, &data))
}

/// Probe bytes already in memory. `path` supplies the extension and is
/// echoed in the result.
pub fn probe_bytes(path: &Path, data: &[u8]) -> ProbeResult {
    let ext = sniff::extension_of(path);
    let candidates = sniff::candidates(&ext, data);

    for format in &candidates {
        match format.parse(data) {
            Ok(info) => {
                let descriptor = sniff::describe(*format, &ext);
                return build(path, descriptor, Some(&info), data.len());
            }
            Err(e) => {
                tracing::debug!(
                    path = %path.display(),
                    format = %format,
                    error = %e,
                    "parser failed, trying next candidate"
                );
            }
        }
    }

    // Nothing parsed: describe by extension if it names a family we know,
    // else by the sniffed family, else as opaque bytes.
    let descriptor = match (Format::from_extension(&ext), candidates.first()) {
        (Some(_), _) | (None, None) => sniff::describe_extension(&ext),
        (None, Some(sniffed)) => sniff::describe(*sniffed, &ext),
    };
    if !candidates.is_empty() {
        tracing::info!(
            path = %path.display(),
            extension = %descriptor.extension,
            "content could not be parsed, reporting extension-only probe"
        );
    }
    build(path, descriptor, None, data.len())
}

/// Parse a file with its extension's parser, surfacing every failure.
///
/// The size is checked against `limit` (capped at [`STRICT_MAX_BYTES`])
/// before any bytes are read. Returns `Ok(None)` for extensions without a
/// parser.
pub fn parse_strict<P: AsRef<Path>>(path: P, limit: u64) -> Result<Option<ProbeInfo>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ProbeError::NotFound(path.to_path_buf()));
    }

    let limit = limit.min(STRICT_MAX_BYTES);
    let size = fs::metadata(path)?.len();
    if size > limit {
        return Err(ProbeError::TooLarge { size, limit });
    }

    let Some(format) = Format::from_extension(&sniff::extension_of(path)) else {
        return Ok(None);
    };
    let data = fs::read(path)?;
    format.parse(&data).map(Some)
}

fn build(path: &Path, descriptor: Descriptor, info: Option<&ProbeInfo>, size: usize) -> ProbeResult {
    let mut tags = BTreeMap::new();
    tags.insert("sizeBytes".to_string(), size.to_string());

    let (duration_millis, streams) = match info {
        Some(info) => {
            tags.extend(info.tags());
            (
                info.duration_millis(),
                info.stream(descriptor.media_type).into_iter().collect(),
            )
        }
        None => (None, Vec::new()),
    };

    ProbeResult {
        input: path.to_path_buf(),
        mime_type: descriptor.mime_type.to_string(),
        extension: descriptor.extension,
        media_type: descriptor.media_type,
        duration_millis,
        streams,
        tags,
    }
}
