//! Decompression state
//!
//! Holds the adaptive substitution table and the two orthogonal machine
//! states: what kind of byte the input cursor expects next, and what the
//! previously consumed count/command byte means for emission.

use super::TABLE_ENTRIES;

/// One substitution table entry
///
/// A flag of 0 marks the entry as a plain literal leaf; after a patch record
/// the flags are 1 ("emit this half directly") or 2 ("this half is itself a
/// patched entry, expand it").
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TableEntry {
    pub first: u8,
    pub first_flag: u8,
    pub second: u8,
    pub second_flag: u8,
}

/// What the next input byte is expected to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputState {
    /// One-byte table size (stream start, or after a table reset command)
    ReadTableSize,
    /// The escape character byte
    ReadEscapeChar,
    /// First code of a table patch triple
    ReadTableFirst,
    /// Second code of a table patch triple
    ReadTableSecond,
    /// Third code of a table patch triple
    ReadTableThird,
    /// Byte following the escape character (bypasses table expansion)
    ReadEscaped,
    /// Ordinary data byte, expanded through the table
    ReadByte,
    /// Pass-through mode for streams with table size 0
    ReadRaw,
    /// End-of-file command seen; remaining input is ignored
    EndOfFile,
}

/// What an emitted byte means for the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputState {
    /// Next emitted byte is an escape command
    Escaped,
    /// Literal run: append the next `counter` emitted bytes
    Single,
    /// Waiting for the low half of a two-part literal run length
    LowSingle,
    /// RLE run: append the next emitted byte `counter` times
    Rle,
    /// Waiting for the low half of a two-part RLE run length
    LowRle,
}

/// Decompressor for one compressed entry
///
/// The table is rebuilt once at stream start (and again on an explicit reset
/// command), so an instance is good for exactly one stream;
/// [`process`](Unpacker::process) consumes it.
#[derive(Debug)]
pub struct Unpacker {
    pub(crate) in_state: InputState,
    pub(crate) out_state: OutputState,
    pub(crate) table: [TableEntry; TABLE_ENTRIES],
    pub(crate) table_size: u8,
    pub(crate) escape_char: u8,
    pub(crate) patch_first: u8,
    pub(crate) patch_second: u8,
    pub(crate) counter: u32,
}

impl Unpacker {
    /// Create a decompressor expecting the start of a compressed stream
    pub fn new() -> Self {
        Self {
            in_state: InputState::ReadTableSize,
            out_state: OutputState::Escaped,
            table: [TableEntry::default(); TABLE_ENTRIES],
            table_size: 0,
            escape_char: 0,
            patch_first: 0,
            patch_second: 0,
            counter: 0,
        }
    }

    /// Reset the table to identity: code i expands to literal i
    pub(crate) fn reset_table(&mut self) {
        for (i, entry) in self.table.iter_mut().enumerate() {
            *entry = TableEntry {
                first: i as u8,
                ..TableEntry::default()
            };
        }
    }

    /// Apply one patch triple to the table
    ///
    /// Each half's flag records whether the referenced code was itself
    /// already patched at the time of this record, which is what makes the
    /// table adaptive: later patches may point at earlier two-level entries.
    pub(crate) fn patch_entry(&mut self, first: u8, second: u8, third: u8) {
        let second_flag = if self.table[second as usize].first_flag != 0 {
            2
        } else {
            1
        };
        let first_flag = if self.table[third as usize].first_flag != 0 {
            2
        } else {
            1
        };

        self.table[first as usize] = TableEntry {
            first: third,
            first_flag,
            second,
            second_flag,
        };
    }
}

impl Default for Unpacker {
    fn default() -> Self {
        Self::new()
    }
}
