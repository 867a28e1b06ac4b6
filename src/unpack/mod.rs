//! DAT entry decompression
//!
//! Archive entries are compressed with an adaptive byte-pair substitution
//! scheme: a 256-entry table maps each input code either to a literal byte or
//! to a pair of further codes, forming a small binary tree that the stream
//! itself patches. An escape character introduces commands for literal runs,
//! RLE runs, mid-stream table rebuilds and end of file.
//!
//! Decoding is byte-at-a-time, single-pass and strictly append-only into the
//! output [`Buffer`](crate::Buffer); a fresh [`Unpacker`] is consumed per
//! stream.

mod decoder;
mod state;

pub use state::Unpacker;

use crate::buffer::Slice;
use crate::{Buffer, Result};

/// Number of substitution table entries
pub const TABLE_ENTRIES: usize = 256;

/// Escape command terminating the stream
pub const ESCAPE_EOF: u8 = 0x00;

/// Escape command that rebuilds the substitution table mid-stream
pub const ESCAPE_TABLE_RESET: u8 = 0x80;

/// Mask extracting the run length (or its high part) from an escape command
pub const RUN_LENGTH_MASK: u8 = 0x3F;

/// Recursion limit for substitution tree expansion
///
/// Well-formed tables are acyclic by construction; the guard turns a corrupt
/// cyclic table into an error instead of a stack overflow.
pub const MAX_EXPANSION_DEPTH: usize = 256;

/// Convenience function to decompress one entry's bytes in memory
pub fn unpack_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Buffer::new();
    Unpacker::new().process(&Slice::new(data), &mut out)?;
    Ok(out.into_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_truncated() {
        assert!(matches!(
            unpack_bytes(&[]),
            Err(crate::DatError::TruncatedStream)
        ));
    }

    #[test]
    fn test_pass_through_mode() {
        // table size 0: every remaining byte is emitted verbatim
        assert_eq!(unpack_bytes(&[0x00]).unwrap(), Vec::<u8>::new());
        assert_eq!(
            unpack_bytes(&[0x00, 0x10, 0x20, 0x30]).unwrap(),
            vec![0x10, 0x20, 0x30]
        );
    }
}
