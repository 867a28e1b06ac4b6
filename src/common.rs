//! Common types and constants for the DAT archive format
//!
//! This module defines the error type, the crate-wide `Result` alias and the
//! fixed layout constants shared by the archive reader and the parsers.

use thiserror::Error;

/// Error type for DAT decoding operations
#[derive(Debug, Error)]
pub enum DatError {
    /// Read past the end of a byte range
    #[error("read of {len} byte(s) at offset {offset} out of range (size {size})")]
    OutOfRange {
        /// Offset the read started at
        offset: usize,
        /// Number of bytes requested
        len: usize,
        /// Size of the range
        size: usize,
    },

    /// Compressed input ended before the end-of-file marker
    #[error("unexpected end of compressed data")]
    TruncatedStream,

    /// Substitution table expansion exceeded the recursion limit
    #[error("substitution table expansion too deep (cyclic table entry?)")]
    ExpansionTooDeep,

    /// Decompressed data is larger than the size stored in the table of contents
    #[error("unpacked data is {actual} bytes, larger than the expected {hint}")]
    UnpackedSizeExceeded {
        /// Actual decompressed size
        actual: usize,
        /// Unpacked size hint from the TOC entry
        hint: usize,
    },

    /// Archive entry name not present in the table of contents
    #[error("entry {0:?} not found in archive")]
    EntryNotFound(String),

    /// Ordinal entry or sprite index out of bounds
    #[error("index {index} out of bounds (count {count})")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Number of available items
        count: usize,
    },

    /// Section tag mismatch
    #[error("bad section tag: expected {expected:?}, got {actual:?}")]
    BadTag {
        /// Tag required by the format
        expected: &'static str,
        /// Tag actually present
        actual: String,
    },

    /// BLOCKS sprite sub-format marker set
    #[error("BLOCKS graphics variant is not supported")]
    UnsupportedBlocks,

    /// Pixel data references a color missing from the palette
    #[error("color index {index} not found in the palette ({size} colors)")]
    PaletteIndexOutOfRange {
        /// Color index from the pixel data
        index: u8,
        /// Number of palette entries
        size: usize,
    },

    /// Building type id was never seen in the level data
    #[error("unknown building type {0:#06x}")]
    UnknownBuildingType(u16),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for DAT decoding operations
pub type Result<T> = std::result::Result<T, DatError>;

// Archive layout constants

/// Size of the fixed archive header
pub const HEADER_SIZE: usize = 16;

/// Offset of the entry count within the archive header
pub const HEADER_TOC_LENGTH_OFFSET: usize = 0;

/// Size of one table-of-contents record
pub const TOC_ENTRY_SIZE: usize = 16;

/// Offset of the space-padded entry name within a TOC record
pub const TOC_ENTRY_NAME_OFFSET: usize = 0;

/// Length of the entry name field
pub const TOC_ENTRY_NAME_SIZE: usize = 8;

/// Offset of the entry data offset within a TOC record
pub const TOC_ENTRY_DATA_OFFSET_OFFSET: usize = 8;

/// Offset of the unpacked size (in paragraphs) within a TOC record
pub const TOC_ENTRY_UNPACKED_SIZE_OFFSET: usize = 14;

/// Unit of the stored unpacked-size hint
pub const PARAGRAPH_SIZE: usize = 16;
