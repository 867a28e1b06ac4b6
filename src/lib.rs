//! strikedat - Rust decoder for the DAT archive format of 1990s strike-series
//! helicopter games
//!
//! This crate reads the proprietary archive-and-compression format those
//! games shipped their sprites, palettes and levels in: a table-of-contents
//! archive of named entries, each compressed with an adaptive byte-pair
//! substitution scheme, plus structured parsers for the decompressed
//! graphics and level resources.
//!
//! # Example - reading an archive
//!
//! ```no_run
//! use strikedat::{DatFile, DatGraphics, MemRange};
//!
//! let mut archive = DatFile::open("DESERT.DAT")?;
//! for entry in archive.entries() {
//!     println!("{}: {} packed bytes", entry.name, entry.packed_size);
//! }
//!
//! let data = archive.data_by_name("HELI")?;
//! let graphics = DatGraphics::parse(&data)?;
//! let rgba = graphics.pixels(0)?;
//! # Ok::<(), strikedat::DatError>(())
//! ```
//!
//! # Example - decompressing raw bytes
//!
//! ```
//! use strikedat::unpack_bytes;
//!
//! // table size 0 selects pass-through mode
//! let unpacked = unpack_bytes(&[0x00, 0x10, 0x20])?;
//! assert_eq!(unpacked, vec![0x10, 0x20]);
//! # Ok::<(), strikedat::DatError>(())
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod archive;
pub mod buffer;
pub mod common;
pub mod graphics;
pub mod level;
pub mod unpack;

// Re-export commonly used types
pub use archive::{DatFile, TocEntry};
pub use buffer::{Buffer, MemRange, Slice};
pub use common::{DatError, Result};
pub use graphics::{Color, DatGraphics, Sprite};
pub use level::{BBox, BuildingInstance, BuildingType, DatLevel};
pub use unpack::{unpack_bytes, Unpacker};
