//! Graphics resource parser
//!
//! A decompressed graphics entry is a tagged section chain: a 32-byte
//! "GRAPHICS" header, then either a "SPRITES " section (sprite sheet) or a
//! "PICTURE " section (one full-frame image), then a "PALETTE " section.
//! Sprite pixel data stays index-encoded until [`DatGraphics::pixels`]
//! resolves it against the palette into RGBA.

use crate::buffer::{MemRange, Slice};
use crate::{DatError, Result};

// GRAPHICS header
const GRAPHICS_SIZE: usize = 32;
const GRAPHICS_OFFS_TRANSPARENCY: usize = 8;
const GRAPHICS_OFFS_SPRITES_LENGTH: usize = 12;

// SPRITES section
const SPRITES_HEADER_SIZE: usize = 16;
const SPRITES_OFFS_NUM_SPRITES: usize = 8;
const SPRITES_OFFS_BLOCKS_MARKER: usize = 12;

const SPRITE_ENTRY_SIZE: usize = 16;
const SPRITE_OFFS_FRAME_WIDTH: usize = 0;
const SPRITE_OFFS_FRAME_HEIGHT: usize = 2;
const SPRITE_OFFS_X_OFFSET: usize = 4;
const SPRITE_OFFS_Y_OFFSET: usize = 6;
const SPRITE_OFFS_WIDTH: usize = 8;
const SPRITE_OFFS_HEIGHT: usize = 10;
const SPRITE_OFFS_DATA_OFFSET: usize = 12;

// PICTURE section
const PICTURE_HEADER_SIZE: usize = 16;
const PICTURE_OFFS_WIDTH: usize = 8;
const PICTURE_OFFS_HEIGHT: usize = 10;

// PALETTE section
const PALETTE_HEADER_SIZE: usize = 32;
const PALETTE_OFFS_NUM_COLORS: usize = 8;

/// One palette color, already expanded from 6-bit to 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    /// Red channel
    pub red: u8,
    /// Green channel
    pub green: u8,
    /// Blue channel
    pub blue: u8,
}

/// One sprite's metadata plus its encoded pixel-index bytes
///
/// The frame rect is the full animation cell; the sprite rect is the
/// possibly-smaller opaque region at (`x_offset`, `y_offset`) within it.
#[derive(Debug, Clone, Copy)]
pub struct Sprite<'a> {
    /// Opaque-region width in pixels
    pub width: u16,
    /// Opaque-region height in pixels
    pub height: u16,
    /// Horizontal offset of the sprite rect within the frame
    pub x_offset: u16,
    /// Vertical offset of the sprite rect within the frame
    pub y_offset: u16,
    /// Animation cell width
    pub frame_width: u16,
    /// Animation cell height
    pub frame_height: u16,
    data: Slice<'a>,
}

/// Parsed graphics resource: sprite table and palette
#[derive(Debug)]
pub struct DatGraphics<'a> {
    transparency: bool,
    sprites: Vec<Sprite<'a>>,
    palette: Vec<Color>,
}

/// Expand a stored 6-bit channel value to 8 bits
///
/// The low bits are replicated into the freed positions so full intensity
/// maps to 255 instead of 252.
fn fix_color(color: u8) -> u8 {
    (color << 2) | (color >> 4)
}

impl<'a> DatGraphics<'a> {
    /// Parse a decompressed graphics entry
    pub fn parse<R: MemRange + ?Sized>(data: &'a R) -> Result<Self> {
        let graphics_section = data.slice(0, GRAPHICS_SIZE)?;

        let tag = graphics_section.get_string(0, 8)?;
        if tag != "GRAPHICS" {
            return Err(DatError::BadTag {
                expected: "GRAPHICS",
                actual: tag,
            });
        }

        let transparency = graphics_section.get_byte(GRAPHICS_OFFS_TRANSPARENCY)? != 0;
        let sprites_length = graphics_section.get_dword(GRAPHICS_OFFS_SPRITES_LENGTH)? as usize;

        let sprites_section = data.slice(GRAPHICS_SIZE, sprites_length)?;
        let palette_section = data.slice_at(GRAPHICS_SIZE + sprites_length)?;

        let sprites = match sprites_section.get_string(0, 8)?.as_str() {
            "SPRITES " => Self::parse_sprites(sprites_section)?,
            "PICTURE " => vec![Self::parse_picture(sprites_section)?],
            other => {
                return Err(DatError::BadTag {
                    expected: "SPRITES ",
                    actual: other.to_string(),
                })
            }
        };

        let palette = Self::parse_palette(palette_section)?;

        Ok(Self {
            transparency,
            sprites,
            palette,
        })
    }

    fn parse_sprites(section: Slice<'a>) -> Result<Vec<Sprite<'a>>> {
        if section.get_dword(SPRITES_OFFS_BLOCKS_MARKER)? != 0 {
            return Err(DatError::UnsupportedBlocks);
        }

        let num_sprites = section.get_word(SPRITES_OFFS_NUM_SPRITES)? as usize;
        let mut sprites = Vec::with_capacity(num_sprites);

        for i in 0..num_sprites {
            let entry =
                section.slice(SPRITES_HEADER_SIZE + i * SPRITE_ENTRY_SIZE, SPRITE_ENTRY_SIZE)?;

            let data_offset = entry.get_dword(SPRITE_OFFS_DATA_OFFSET)? as usize;

            // a sprite's pixel data runs until the next sprite's data, or to
            // the end of the section for the last one
            let data = if i < num_sprites - 1 {
                let next = section.slice(
                    SPRITES_HEADER_SIZE + (i + 1) * SPRITE_ENTRY_SIZE,
                    SPRITE_ENTRY_SIZE,
                )?;
                let next_offset = next.get_dword(SPRITE_OFFS_DATA_OFFSET)? as usize;
                section.slice(data_offset, next_offset.saturating_sub(data_offset))?
            } else {
                section.slice_at(data_offset)?
            };

            sprites.push(Sprite {
                frame_width: entry.get_word(SPRITE_OFFS_FRAME_WIDTH)?,
                frame_height: entry.get_word(SPRITE_OFFS_FRAME_HEIGHT)?,
                x_offset: entry.get_word(SPRITE_OFFS_X_OFFSET)?,
                y_offset: entry.get_word(SPRITE_OFFS_Y_OFFSET)?,
                width: entry.get_word(SPRITE_OFFS_WIDTH)?,
                height: entry.get_word(SPRITE_OFFS_HEIGHT)?,
                data,
            });
        }

        Ok(sprites)
    }

    fn parse_picture(section: Slice<'a>) -> Result<Sprite<'a>> {
        let width = section.get_word(PICTURE_OFFS_WIDTH)?;
        let height = section.get_word(PICTURE_OFFS_HEIGHT)?;

        Ok(Sprite {
            width,
            height,
            frame_width: width,
            frame_height: height,
            x_offset: 0,
            y_offset: 0,
            data: section.slice(PICTURE_HEADER_SIZE, width as usize * height as usize)?,
        })
    }

    fn parse_palette(section: Slice<'a>) -> Result<Vec<Color>> {
        let tag = section.get_string(0, 8)?;
        if tag != "PALETTE " {
            return Err(DatError::BadTag {
                expected: "PALETTE ",
                actual: tag,
            });
        }

        let num_colors = section.get_word(PALETTE_OFFS_NUM_COLORS)? as usize;
        let mut palette = Vec::with_capacity(num_colors);

        for i in 0..num_colors {
            palette.push(Color {
                red: fix_color(section.get_byte(PALETTE_HEADER_SIZE + i * 3)?),
                green: fix_color(section.get_byte(PALETTE_HEADER_SIZE + i * 3 + 1)?),
                blue: fix_color(section.get_byte(PALETTE_HEADER_SIZE + i * 3 + 2)?),
            });
        }

        Ok(palette)
    }

    /// Whether pixel data uses the masked (transparency) encoding
    pub fn transparency(&self) -> bool {
        self.transparency
    }

    /// Parsed sprite records in file order
    pub fn sprites(&self) -> &[Sprite<'a>] {
        &self.sprites
    }

    /// Number of sprites
    pub fn num_sprites(&self) -> usize {
        self.sprites.len()
    }

    /// The parsed palette
    pub fn palette(&self) -> &[Color] {
        &self.palette
    }

    /// Decode sprite `num` into RGBA8 pixels (blue, green, red, alpha order)
    ///
    /// Output is `width * height * 4` bytes, zero-initialized, so pixels the
    /// encoding never reaches stay fully transparent.
    pub fn pixels(&self, num: usize) -> Result<Vec<u8>> {
        let sprite = self.sprites.get(num).ok_or(DatError::IndexOutOfBounds {
            index: num,
            count: self.sprites.len(),
        })?;

        let width = sprite.width as usize;
        let pixels_size = width * sprite.height as usize * 4;
        let mut pixels = vec![0u8; pixels_size];

        let data = sprite.data.data();
        let mut data_pos = 0;
        let mut out_pos = 0;

        if self.transparency {
            // each mask byte covers up to 8 pixels, MSB first; set bits
            // consume a color index, clear bits emit transparency. Mask
            // consumption restarts at each row boundary regardless of how
            // many bits of the current mask were used.
            let mut pixel_in_line = 0;

            while data_pos < data.len() && out_pos + 4 <= pixels_size {
                let mask = data[data_pos];
                data_pos += 1;

                let mut bit = 0;
                while bit < 8
                    && pixel_in_line < width
                    && data_pos < data.len()
                    && out_pos + 4 <= pixels_size
                {
                    if mask & (0x80 >> bit) != 0 {
                        let color = data[data_pos];
                        data_pos += 1;
                        self.put_pixel(&mut pixels, &mut out_pos, color)?;
                    } else {
                        out_pos += 4;
                    }

                    bit += 1;
                    pixel_in_line += 1;
                }

                if pixel_in_line == width {
                    pixel_in_line = 0;
                }
            }
        } else {
            while data_pos < data.len() && out_pos + 4 <= pixels_size {
                let color = data[data_pos];
                data_pos += 1;
                self.put_pixel(&mut pixels, &mut out_pos, color)?;
            }
        }

        Ok(pixels)
    }

    fn put_pixel(&self, pixels: &mut [u8], out_pos: &mut usize, color: u8) -> Result<()> {
        let c = self
            .palette
            .get(color as usize)
            .ok_or(DatError::PaletteIndexOutOfRange {
                index: color,
                size: self.palette.len(),
            })?;

        pixels[*out_pos] = c.blue;
        pixels[*out_pos + 1] = c.green;
        pixels[*out_pos + 2] = c.red;
        pixels[*out_pos + 3] = 255;
        *out_pos += 4;

        Ok(())
    }
}
