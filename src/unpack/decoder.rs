//! The byte-consumption state machine
//!
//! Ported structure: every byte of the input range drives the input state;
//! bytes that survive table expansion funnel through [`output_byte`], whose
//! output state interprets run commands. The escape character only forces the
//! following byte straight to [`output_byte`] without table expansion, which
//! is how commands are normally introduced.
//!
//! [`output_byte`]: Unpacker::output_byte

use super::state::{InputState, OutputState};
use super::{Unpacker, ESCAPE_TABLE_RESET, MAX_EXPANSION_DEPTH, RUN_LENGTH_MASK};
use crate::buffer::MemRange;
use crate::{Buffer, DatError, Result};

impl Unpacker {
    /// Decompress `input`, appending decoded bytes to `out`
    ///
    /// Consumes the decompressor: the table and machine state are only valid
    /// for a single stream. Input remaining after the end-of-file command is
    /// ignored (legacy archives rely on trailing padding); input ending in
    /// any other state except pass-through mode is a truncation error.
    pub fn process<R: MemRange + ?Sized>(mut self, input: &R, out: &mut Buffer) -> Result<()> {
        for &byte in input.data() {
            match self.in_state {
                InputState::ReadTableSize => {
                    self.table_size = byte;
                    self.reset_table();
                    self.in_state = InputState::ReadEscapeChar;
                }

                InputState::ReadEscapeChar => {
                    if self.table_size == 0 {
                        // no escape mechanism: the rest of the stream,
                        // starting with this byte, is literal output
                        self.in_state = InputState::ReadRaw;
                        out.append(byte);
                    } else {
                        self.escape_char = byte;
                        self.in_state = InputState::ReadTableFirst;
                    }
                }

                InputState::ReadTableFirst => {
                    self.patch_first = byte;
                    self.in_state = InputState::ReadTableSecond;
                }
                InputState::ReadTableSecond => {
                    self.patch_second = byte;
                    self.in_state = InputState::ReadTableThird;
                }
                InputState::ReadTableThird => {
                    self.patch_entry(self.patch_first, self.patch_second, byte);

                    self.table_size -= 1;
                    self.in_state = if self.table_size == 0 {
                        InputState::ReadByte
                    } else {
                        InputState::ReadTableFirst
                    };
                }

                InputState::ReadEscaped => {
                    // output_byte may override this with EndOfFile or
                    // ReadTableSize when the byte is a command saying so
                    self.in_state = InputState::ReadByte;
                    self.output_byte(byte, out)?;
                }

                InputState::ReadByte => {
                    if byte == self.escape_char {
                        self.in_state = InputState::ReadEscaped;
                    } else {
                        self.process_byte(byte, out, 0)?;
                    }
                }

                InputState::ReadRaw => out.append(byte),

                InputState::EndOfFile => return Ok(()),
            }
        }

        match self.in_state {
            InputState::EndOfFile | InputState::ReadRaw => Ok(()),
            _ => Err(DatError::TruncatedStream),
        }
    }

    /// Expand one code through the substitution tree
    ///
    /// An unpatched entry emits its literal; a patched entry processes its
    /// second half before its first, each half either emitted directly or
    /// expanded further according to its flag.
    fn process_byte(&mut self, code: u8, out: &mut Buffer, depth: usize) -> Result<()> {
        if depth > MAX_EXPANSION_DEPTH {
            return Err(DatError::ExpansionTooDeep);
        }

        let entry = self.table[code as usize];

        if entry.first_flag == 0 {
            self.output_byte(entry.first, out)?;
        } else {
            if entry.second_flag == 1 {
                self.output_byte(entry.second, out)?;
            } else {
                self.process_byte(entry.second, out, depth + 1)?;
            }

            if entry.first_flag == 1 {
                self.output_byte(entry.first, out)?;
            } else {
                self.process_byte(entry.first, out, depth + 1)?;
            }
        }

        Ok(())
    }

    /// Route one expanded byte through the output state
    fn output_byte(&mut self, byte: u8, out: &mut Buffer) -> Result<()> {
        match self.out_state {
            OutputState::Single => {
                out.append(byte);
                if self.counter <= 1 {
                    self.counter = 0;
                    self.out_state = OutputState::Escaped;
                } else {
                    self.counter -= 1;
                }
            }

            OutputState::Rle => {
                for _ in 0..self.counter {
                    out.append(byte);
                }
                self.out_state = OutputState::Escaped;
            }

            OutputState::LowSingle => {
                self.counter |= u32::from(byte);
                self.out_state = OutputState::Single;
            }

            OutputState::LowRle => {
                self.counter |= u32::from(byte);
                self.out_state = OutputState::Rle;
            }

            OutputState::Escaped => self.process_escape(byte),
        }

        Ok(())
    }

    /// Interpret an escape command byte
    fn process_escape(&mut self, byte: u8) {
        if byte == 0 {
            self.in_state = InputState::EndOfFile;
        } else if byte < 0x40 {
            self.counter = u32::from(byte);
            self.out_state = OutputState::Single;
        } else if byte < ESCAPE_TABLE_RESET {
            self.counter = u32::from(byte & RUN_LENGTH_MASK) << 8;
            self.out_state = OutputState::LowSingle;
        } else if byte == ESCAPE_TABLE_RESET {
            self.in_state = InputState::ReadTableSize;
        } else if byte < 0xC0 {
            self.counter = u32::from(byte & RUN_LENGTH_MASK);
            self.out_state = OutputState::Rle;
        } else {
            self.counter = u32::from(byte & RUN_LENGTH_MASK) << 8;
            self.out_state = OutputState::LowRle;
        }
    }
}
