//! Bounds-checked reader over an in-memory byte buffer.
//!
//! Every parser in this crate reads through [`ByteCursor`]. A read that would
//! run past the end of the buffer returns [`ProbeError::Truncated`] instead of
//! indexing out of bounds, so truncated or hostile input can never panic.

use crate::error::{ProbeError, Result};

/// Movable read position over an immutable byte slice.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Create a cursor positioned at `pos`.
    pub fn at(data: &'a [u8], pos: usize) -> Result<Self> {
        let mut cursor = Self::new(data);
        cursor.seek(pos)?;
        Ok(cursor)
    }

    /// Total length of the underlying buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current read position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the current position.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Move to an absolute position. Seeking exactly to the end is allowed.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(ProbeError::Truncated {
                offset: pos,
                need: 0,
                have: self.data.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    /// Advance the position by `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    /// Look at the byte `offset` bytes past the current position without moving.
    pub fn peek(&self, offset: usize) -> Result<u8> {
        self.pos
            .checked_add(offset)
            .and_then(|idx| self.data.get(idx).copied())
            .ok_or(ProbeError::Truncated {
                offset: self.pos.saturating_add(offset),
                need: 1,
                have: self.remaining().saturating_sub(offset),
            })
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn u16_be(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.array()?))
    }

    pub fn u16_le(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    /// Three-byte little-endian integer (WebP VP8X canvas fields).
    pub fn u24_le(&mut self) -> Result<u32> {
        let b = self.take(3)?;
        Ok(u32::from(b[0]) | (u32::from(b[1]) << 8) | (u32::from(b[2]) << 16))
    }

    pub fn u32_be(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    pub fn u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    pub fn i32_le(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    pub fn u64_be(&mut self) -> Result<u64> {
        Ok(u64::from_be_bytes(self.array()?))
    }

    pub fn u64_le(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    /// Borrow the next `n` bytes.
    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n)
    }

    /// Read a four-character code.
    pub fn fourcc(&mut self) -> Result<[u8; 4]> {
        self.array()
    }

    /// Read `n` bytes as text. Non-ASCII bytes are replaced.
    pub fn ascii(&mut self, n: usize) -> Result<String> {
        Ok(String::from_utf8_lossy(self.take(n)?).into_owned())
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or(ProbeError::Truncated {
                offset: self.pos,
                need: n,
                have: self.remaining(),
            })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }
}

/// Whether `data` holds `literal` at `offset`.
pub(crate) fn has_bytes_at(data: &[u8], offset: usize, literal: &[u8]) -> bool {
    offset
        .checked_add(literal.len())
        .and_then(|end| data.get(offset..end))
        .is_some_and(|slice| slice == literal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_mixed_endianness() {
        let data = [0x12, 0x34, 0x12, 0x34, 0x00, 0x00, 0x00, 0x2A, 0x2A, 0x00, 0x00, 0x00];
        let mut c = ByteCursor::new(&data);
        assert_eq!(c.u16_be().unwrap(), 0x1234);
        assert_eq!(c.u16_le().unwrap(), 0x3412);
        assert_eq!(c.u32_be().unwrap(), 42);
        assert_eq!(c.u32_le().unwrap(), 42);
        assert_eq!(c.remaining(), 0);
    }

    #[test]
    fn u64_little_endian() {
        let data = [1, 0, 0, 0, 0, 0, 0, 0x80];
        let mut c = ByteCursor::new(&data);
        assert_eq!(c.u64_le().unwrap(), 0x8000_0000_0000_0001);
    }

    #[test]
    fn read_past_end_is_truncated() {
        let data = [0u8; 3];
        let mut c = ByteCursor::new(&data);
        let err = c.u32_be().unwrap_err();
        assert!(matches!(err, ProbeError::Truncated { offset: 0, need: 4, have: 3 }));
        // A failed read leaves the position untouched.
        assert_eq!(c.position(), 0);
    }

    #[test]
    fn huge_skip_does_not_overflow() {
        let data = [0u8; 8];
        let mut c = ByteCursor::at(&data, 4).unwrap();
        assert!(c.skip(usize::MAX).is_err());
        assert!(c.peek(usize::MAX).is_err());
    }

    #[test]
    fn seek_bounds() {
        let data = [0u8; 4];
        let mut c = ByteCursor::new(&data);
        assert!(c.seek(4).is_ok());
        assert!(c.seek(5).is_err());
        assert!(c.u8().is_err());
    }

    #[test]
    fn ascii_and_fourcc() {
        let mut c = ByteCursor::new(b"ftypisom");
        assert_eq!(&c.fourcc().unwrap(), b"ftyp");
        assert_eq!(c.ascii(4).unwrap(), "isom");
    }

    #[test]
    fn has_bytes_at_checks_bounds() {
        assert!(has_bytes_at(b"RIFF....WAVE", 8, b"WAVE"));
        assert!(!has_bytes_at(b"RIFF....WAV", 8, b"WAVE"));
        assert!(!has_bytes_at(b"RIFF", usize::MAX, b"W"));
    }
}
