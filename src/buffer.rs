//! Byte ranges and owned buffers
//!
//! Every structure in a DAT archive is read through the [`MemRange`] trait: a
//! read-only view over contiguous bytes with bounds-checked, little-endian
//! field extraction. [`Buffer`] owns its storage (and is what decompression
//! appends into), [`Slice`] borrows a sub-range of some other range.
//!
//! All accessors validate `offset + width <= size` and fail with
//! [`DatError::OutOfRange`] instead of truncating or wrapping.

use crate::{DatError, Result};
use std::io::Read;

/// Read-only view over a contiguous byte range
///
/// The typed accessors are implemented once against [`data`](MemRange::data)
/// and [`size`](MemRange::size), so owned and borrowed ranges share the exact
/// same bounds and endianness behavior.
pub trait MemRange {
    /// The underlying bytes
    fn data(&self) -> &[u8];

    /// Number of bytes in the range
    fn size(&self) -> usize {
        self.data().len()
    }

    /// Validate that `len` bytes at `offset` are inside the range
    fn check(&self, offset: usize, len: usize) -> Result<()> {
        // offset + len may overflow on 32-bit targets with hostile offsets
        if offset.checked_add(len).map_or(true, |end| end > self.size()) {
            return Err(DatError::OutOfRange {
                offset,
                len,
                size: self.size(),
            });
        }
        Ok(())
    }

    /// Read an unsigned byte at `offset`
    fn get_byte(&self, offset: usize) -> Result<u8> {
        self.check(offset, 1)?;
        Ok(self.data()[offset])
    }

    /// Read a little-endian u16 at `offset`
    fn get_word(&self, offset: usize) -> Result<u16> {
        self.check(offset, 2)?;
        let d = self.data();
        Ok(u16::from_le_bytes([d[offset], d[offset + 1]]))
    }

    /// Read a little-endian u32 at `offset`
    fn get_dword(&self, offset: usize) -> Result<u32> {
        self.check(offset, 4)?;
        let d = self.data();
        Ok(u32::from_le_bytes([
            d[offset],
            d[offset + 1],
            d[offset + 2],
            d[offset + 3],
        ]))
    }

    /// Read a signed byte at `offset`
    fn get_sbyte(&self, offset: usize) -> Result<i8> {
        Ok(self.get_byte(offset)? as i8)
    }

    /// Read a little-endian i16 at `offset`
    fn get_sword(&self, offset: usize) -> Result<i16> {
        Ok(self.get_word(offset)? as i16)
    }

    /// Read a little-endian i32 at `offset`
    fn get_sdword(&self, offset: usize) -> Result<i32> {
        Ok(self.get_dword(offset)? as i32)
    }

    /// Extract `length` bytes at `offset` as text
    fn get_string(&self, offset: usize, length: usize) -> Result<String> {
        self.check(offset, length)?;
        Ok(String::from_utf8_lossy(&self.data()[offset..offset + length]).into_owned())
    }

    /// Sub-range from `offset` to the end of this range
    fn slice_at(&self, offset: usize) -> Result<Slice<'_>> {
        self.check(offset, 0)?;
        Ok(Slice {
            data: &self.data()[offset..],
        })
    }

    /// Sub-range of `length` bytes starting at `offset`
    fn slice(&self, offset: usize, length: usize) -> Result<Slice<'_>> {
        self.check(offset, length)?;
        Ok(Slice {
            data: &self.data()[offset..offset + length],
        })
    }
}

impl MemRange for [u8] {
    fn data(&self) -> &[u8] {
        self
    }
}

/// Growable byte container that owns its storage
///
/// Produced by [`DatFile::data`](crate::DatFile::data) as the destination of
/// decompression; construction from a stream reads an exact byte count.
#[derive(Debug, Default, Clone)]
pub struct Buffer {
    data: Vec<u8>,
}

impl Buffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Read exactly `size` bytes from `reader` into a new buffer
    pub fn from_reader<R: Read>(reader: &mut R, size: usize) -> Result<Self> {
        let mut data = vec![0u8; size];
        reader.read_exact(&mut data)?;
        Ok(Self { data })
    }

    /// Append a single byte
    pub fn append(&mut self, c: u8) {
        self.data.push(c);
    }

    /// Reserve capacity for `size` bytes total
    ///
    /// Called with the unpacked-size hint before decompression so the append
    /// path does not reallocate.
    pub fn reserve(&mut self, size: usize) {
        self.data.reserve(size.saturating_sub(self.data.len()));
    }

    /// Consume the buffer, returning the owned bytes
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl MemRange for Buffer {
    fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Non-owning view into another range
///
/// Valid only as long as the range it was sliced from; the borrow checker
/// enforces what the original format code had to document.
#[derive(Debug, Clone, Copy)]
pub struct Slice<'a> {
    data: &'a [u8],
}

impl<'a> Slice<'a> {
    /// View over a whole byte slice
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Sub-range from `offset` to the end, keeping the original lifetime
    /// instead of borrowing from `self`
    pub fn slice_at(&self, offset: usize) -> Result<Slice<'a>> {
        self.check(offset, 0)?;
        Ok(Slice {
            data: &self.data[offset..],
        })
    }

    /// Sub-range of `length` bytes starting at `offset`, keeping the
    /// original lifetime instead of borrowing from `self`
    pub fn slice(&self, offset: usize, length: usize) -> Result<Slice<'a>> {
        self.check(offset, length)?;
        Ok(Slice {
            data: &self.data[offset..offset + length],
        })
    }
}

impl MemRange for Slice<'_> {
    fn data(&self) -> &[u8] {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_reads() {
        let buf = Buffer::from(vec![0x01, 0x02, 0x03, 0x04]);

        assert_eq!(buf.get_byte(0).unwrap(), 0x01);
        assert_eq!(buf.get_word(0).unwrap(), 0x0201);
        assert_eq!(buf.get_word(2).unwrap(), 0x0403);
        assert_eq!(buf.get_dword(0).unwrap(), 0x04030201);
    }

    #[test]
    fn test_signed_reads() {
        let buf = Buffer::from(vec![0xFF, 0xFF, 0xFF, 0xFF]);

        assert_eq!(buf.get_sbyte(0).unwrap(), -1);
        assert_eq!(buf.get_sword(0).unwrap(), -1);
        assert_eq!(buf.get_sdword(0).unwrap(), -1);
    }

    #[test]
    fn test_bounds_violations() {
        let buf = Buffer::from(vec![0u8; 4]);

        assert!(buf.get_byte(4).is_err());
        assert!(buf.get_word(3).is_err());
        assert!(buf.get_dword(1).is_err());
        assert!(buf.get_string(2, 3).is_err());
        assert!(buf.slice(2, 3).is_err());
        assert!(buf.slice_at(5).is_err());

        // boundary reads still succeed
        assert!(buf.get_dword(0).is_ok());
        assert!(buf.slice_at(4).is_ok());
    }

    #[test]
    fn test_get_string() {
        let buf = Buffer::from(b"LEVEL0  ".to_vec());
        assert_eq!(buf.get_string(0, 8).unwrap(), "LEVEL0  ");
        assert_eq!(buf.get_string(0, 6).unwrap(), "LEVEL0");
    }

    #[test]
    fn test_slice_composition() {
        let buf = Buffer::from((0u8..32).collect::<Vec<_>>());

        let outer = buf.slice(4, 16).unwrap();
        let inner = outer.slice(2, 8).unwrap();
        let direct = buf.slice(6, 8).unwrap();

        assert_eq!(inner.data(), direct.data());
        assert_eq!(inner.size(), 8);

        // inner slice re-validates against the parent's bounds
        assert!(outer.slice(10, 8).is_err());
    }

    #[test]
    fn test_from_reader() {
        let mut cursor = std::io::Cursor::new(vec![1u8, 2, 3, 4, 5]);
        let buf = Buffer::from_reader(&mut cursor, 3).unwrap();
        assert_eq!(buf.data(), &[1, 2, 3]);

        let mut cursor = std::io::Cursor::new(vec![1u8, 2]);
        assert!(Buffer::from_reader(&mut cursor, 3).is_err());
    }

    #[test]
    fn test_append_and_reserve() {
        let mut buf = Buffer::new();
        buf.reserve(16);
        buf.append(0xAB);
        buf.append(0xCD);
        assert_eq!(buf.size(), 2);
        assert_eq!(buf.into_vec(), vec![0xAB, 0xCD]);
    }
}
