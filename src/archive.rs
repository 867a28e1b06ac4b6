//! DAT archive reader
//!
//! A DAT archive is a 16-byte header, a table of contents of 16-byte records
//! and the individually compressed entry payloads. Entry boundaries are not
//! stored: an entry's packed size is the gap to the next entry's data offset
//! (or to end of file for the last entry). Each TOC record also carries the
//! unpacked size in 16-byte paragraphs, used both to presize the output
//! buffer and as a late consistency check after decompression.

use crate::buffer::MemRange;
use crate::common::{
    HEADER_SIZE, HEADER_TOC_LENGTH_OFFSET, PARAGRAPH_SIZE, TOC_ENTRY_DATA_OFFSET_OFFSET,
    TOC_ENTRY_NAME_OFFSET, TOC_ENTRY_NAME_SIZE, TOC_ENTRY_SIZE, TOC_ENTRY_UNPACKED_SIZE_OFFSET,
};
use crate::unpack::Unpacker;
use crate::{Buffer, DatError, Result};

use std::collections::HashMap;
use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::Path;

/// One named resource's location and size metadata
#[derive(Debug, Clone)]
pub struct TocEntry {
    /// Entry name, trimmed of trailing space padding
    pub name: String,
    /// Byte offset of the compressed payload within the archive
    pub offset: u64,
    /// Compressed payload length
    pub packed_size: usize,
    /// Expected decompressed size, rounded up to whole paragraphs
    pub unpacked_size_hint: usize,
}

/// An opened DAT archive
///
/// The file handle stays open for the archive's lifetime; reading an entry
/// seeks and decompresses on demand, so reads take `&mut self` and there is
/// no caching — repeated reads repeat the full decompression.
#[derive(Debug)]
pub struct DatFile {
    file: File,
    toc: Vec<TocEntry>,
    by_name: HashMap<String, usize>,
}

impl DatFile {
    /// Open an archive and parse its table of contents
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let file_size = file.seek(SeekFrom::End(0))?;
        file.seek(SeekFrom::Start(0))?;

        let header = Buffer::from_reader(&mut file, HEADER_SIZE)?;
        let num_entries = header.get_dword(HEADER_TOC_LENGTH_OFFSET)? as usize;

        let toc_data = Buffer::from_reader(&mut file, TOC_ENTRY_SIZE * num_entries)?;

        let mut toc = Vec::with_capacity(num_entries);
        let mut by_name = HashMap::with_capacity(num_entries);

        for i in 0..num_entries {
            let record = toc_data.slice(i * TOC_ENTRY_SIZE, TOC_ENTRY_SIZE)?;

            let mut name = record.get_string(TOC_ENTRY_NAME_OFFSET, TOC_ENTRY_NAME_SIZE)?;
            while name.ends_with(' ') {
                name.pop();
            }

            let offset = u64::from(record.get_dword(TOC_ENTRY_DATA_OFFSET_OFFSET)?);

            let packed_size = if i < num_entries - 1 {
                let next = toc_data.slice((i + 1) * TOC_ENTRY_SIZE, TOC_ENTRY_SIZE)?;
                let next_offset = u64::from(next.get_dword(TOC_ENTRY_DATA_OFFSET_OFFSET)?);
                next_offset.saturating_sub(offset) as usize
            } else {
                file_size.saturating_sub(offset) as usize
            };

            let unpacked_size_hint =
                record.get_word(TOC_ENTRY_UNPACKED_SIZE_OFFSET)? as usize * PARAGRAPH_SIZE;

            log::debug!(
                "entry {i} {name:?}: offset {offset}, packed {packed_size}, unpacked hint {unpacked_size_hint}"
            );

            by_name.insert(name.clone(), i);
            toc.push(TocEntry {
                name,
                offset,
                packed_size,
                unpacked_size_hint,
            });
        }

        Ok(Self {
            file,
            toc,
            by_name,
        })
    }

    /// Number of entries in the archive
    pub fn len(&self) -> usize {
        self.toc.len()
    }

    /// Whether the archive has no entries
    pub fn is_empty(&self) -> bool {
        self.toc.is_empty()
    }

    /// Whether an entry with the given (trimmed) name exists
    pub fn exists(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// TOC entry by ordinal index
    pub fn entry(&self, index: usize) -> Result<&TocEntry> {
        self.toc.get(index).ok_or(DatError::IndexOutOfBounds {
            index,
            count: self.toc.len(),
        })
    }

    /// TOC entry by exact trimmed name
    pub fn entry_by_name(&self, name: &str) -> Result<&TocEntry> {
        self.by_name
            .get(name)
            .map(|&i| &self.toc[i])
            .ok_or_else(|| DatError::EntryNotFound(name.to_string()))
    }

    /// Name of the entry at `index`
    pub fn name(&self, index: usize) -> Result<&str> {
        Ok(&self.entry(index)?.name)
    }

    /// Iterate over TOC entries in archive order
    pub fn entries(&self) -> impl Iterator<Item = &TocEntry> {
        self.toc.iter()
    }

    /// Read and decompress the entry at `index`
    pub fn data(&mut self, index: usize) -> Result<Buffer> {
        let entry = self.entry(index)?.clone();
        self.read_entry(&entry)
    }

    /// Read and decompress the entry with the given name
    pub fn data_by_name(&mut self, name: &str) -> Result<Buffer> {
        let entry = self.entry_by_name(name)?.clone();
        self.read_entry(&entry)
    }

    fn read_entry(&mut self, entry: &TocEntry) -> Result<Buffer> {
        self.file.seek(SeekFrom::Start(entry.offset))?;
        let packed = Buffer::from_reader(&mut self.file, entry.packed_size)?;

        let mut unpacked = Buffer::new();
        unpacked.reserve(entry.unpacked_size_hint);

        Unpacker::new().process(&packed, &mut unpacked)?;

        // a well-formed entry never decompresses past its stored hint
        if unpacked.size() > entry.unpacked_size_hint {
            return Err(DatError::UnpackedSizeExceeded {
                actual: unpacked.size(),
                hint: entry.unpacked_size_hint,
            });
        }

        Ok(unpacked)
    }
}
