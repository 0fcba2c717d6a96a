use std::mem;
use image::{ImageBuffer, Rgba, RgbaImage};
use log::trace;

use crate::agg::palette::Palette;
use crate::cursor::ByteCursor;
use crate::error::{Error, Result};


/*
    icn group raw structures
 */
#[derive(Debug, Copy, Clone)]
#[repr(C, packed)]
struct IcnGroupHeader {
    sprite_count: u16,
    block_size: u32,
}

#[derive(Debug, Copy, Clone)]
#[repr(C, packed)]
struct IcnSpriteHeader {
    offset_x: i16,
    offset_y: i16,
    width: u16,
    height: u16,
    frames: u8,         // animation frame count, 32 marks a monochrome sprite
    data_offset: u32,   // relative to the end of IcnGroupHeader
}

const GROUP_HEADER_SIZE: usize = mem::size_of::<IcnGroupHeader>();
const SPRITE_HEADER_SIZE: usize = mem::size_of::<IcnSpriteHeader>();

const MONOCHROME_FRAMES: u8 = 32;

/// transform value of a pixel that is drawn from the pixel buffer
pub const TRANSFORM_REPLACE: u8 = 0;
/// transform value of a pixel that keeps whatever is below it
pub const TRANSFORM_SKIP: u8 = 1;
const TRANSFORM_LAST_TABLE: u8 = 15;


#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SpriteVariant {
    Single,
    /// one frame of an animation of `frames` sprites following this one
    Series { frames: u8 },
    Monochrome,
}

impl SpriteVariant {
    fn from_frames(frames: u8) -> Self {
        match frames {
            0 => Self::Single,
            MONOCHROME_FRAMES => Self::Monochrome,
            frames => Self::Series { frames },
        }
    }
}


/// Decoded sprite. `pixels` holds palette indices, `transform` says what to do with every pixel:
/// 0 draw it, 1 leave the background untouched, 2..=15 darken the background with that shading table.
/// Both buffers always hold `width * height` entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    pub width: usize,
    pub height: usize,
    pub offset_x: i16,
    pub offset_y: i16,
    pub variant: SpriteVariant,
    pub pixels: Vec<u8>,
    pub transform: Vec<u8>,
}


impl Sprite {
    /// decodes one opcode stream into a sprite of the given size
    pub fn decode(payload: &[u8], width: usize, height: usize, offset_x: i16, offset_y: i16, variant: SpriteVariant) -> Self {
        let mut canvas = Canvas::new(width, height);

        match variant {
            SpriteVariant::Monochrome => decode_monochrome(payload, &mut canvas),
            _ => decode_colored(payload, &mut canvas),
        }

        Self {
            width,
            height,
            offset_x,
            offset_y,
            variant,
            pixels: canvas.pixels,
            transform: canvas.transform,
        }
    }

    /// renders the sprite with the given palette, untouched pixels become fully transparent
    /// and shaded pixels become translucent black
    pub fn to_rgba_image(&self, palette: &Palette) -> RgbaImage {
        ImageBuffer::from_fn(self.width as u32, self.height as u32, |x, y| {
            let i = y as usize * self.width + x as usize;
            match self.transform[i] {
                TRANSFORM_REPLACE => {
                    let (r, g, b, a) = palette.color(self.pixels[i]);
                    Rgba([r, g, b, a])
                }
                TRANSFORM_SKIP => Rgba([0, 0, 0, 0]),
                table => Rgba([0, 0, 0, (table.min(TRANSFORM_LAST_TABLE) - 1) * 16]),
            }
        })
    }
}


/// Decodes a whole icon group: `u16 count`, `u32 block size`, `count` sprite headers, then the opcode streams.
pub fn decode_icn_group(data: &[u8]) -> Result<Vec<Sprite>> {
    trace!("decode_icn_group {} bytes", data.len());
    let f = &mut ByteCursor::new(data);

    let group = IcnGroupHeader {
        sprite_count: f.read_u16()?,
        block_size: f.read_u32()?,
    };

    let count = group.sprite_count as usize;
    let block_size = group.block_size as usize;
    if count == 0 || block_size == 0 {
        return Err(Error::SpriteLoad(format!("icon group declares {count} sprites in {block_size} bytes")));
    }

    let mut headers = Vec::with_capacity(count);
    for _ in 0..count {
        headers.push(IcnSpriteHeader {
            offset_x: f.read_i16()?,
            offset_y: f.read_i16()?,
            width: f.read_u16()?,
            height: f.read_u16()?,
            frames: f.read_u8()?,
            data_offset: f.read_u32()?,
        });
    }

    let mut sprites = Vec::with_capacity(count);
    for (i, header) in headers.iter().enumerate() {
        let start = header.data_offset as usize;
        let end = match headers.get(i + 1) {
            Some(next) => next.data_offset as usize,
            None => block_size,
        };

        f.seek(GROUP_HEADER_SIZE + start)?;
        let payload = f.read(end.saturating_sub(start))?;

        let header = *header;
        sprites.push(Sprite::decode(
            payload,
            header.width as usize,
            header.height as usize,
            header.offset_x,
            header.offset_y,
            SpriteVariant::from_frames(header.frames),
        ));
    }

    Ok(sprites)
}


/// Output side of the decoder. Writes that fall outside the buffers are dropped.
struct Canvas {
    width: usize,
    row: usize,
    column: usize,
    pixels: Vec<u8>,
    transform: Vec<u8>,
}

impl Canvas {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            row: 0,
            column: 0,
            pixels: vec![0; width * height],
            transform: vec![TRANSFORM_SKIP; width * height],
        }
    }

    #[inline]
    fn paint(&mut self, value: u8) {
        let i = self.row + self.column;
        if i < self.pixels.len() {
            self.pixels[i] = value;
            self.transform[i] = TRANSFORM_REPLACE;
        }
        self.column += 1;
    }

    #[inline]
    fn shade(&mut self, table: u8) {
        let i = self.row + self.column;
        if i < self.transform.len() {
            self.transform[i] = table;
        }
        self.column += 1;
    }

    #[inline]
    fn skip(&mut self, count: usize) {
        self.column += count;
    }

    #[inline]
    fn next_row(&mut self) {
        self.row += self.width;
        self.column = 0;
    }
}


fn decode_colored(data: &[u8], canvas: &mut Canvas) {
    let mut pos = 0;

    while let Some(&op) = data.get(pos) {
        match op {
            // end of row
            0x00 => {
                canvas.next_row();
                pos += 1;
            }
            // literal run
            0x01..=0x7F => {
                pos += 1;
                for _ in 0..op {
                    let Some(&value) = data.get(pos) else { break };
                    canvas.paint(value);
                    pos += 1;
                }
            }
            // end of image
            0x80 => break,
            // transparent run
            0x81..=0xBF => {
                canvas.skip((op - 0x80) as usize);
                pos += 1;
            }
            // shading run
            0xC0 => {
                pos += 1;
                let Some(&control) = data.get(pos) else { break };
                let table = ((control & 0x3C) >> 2) + 2;
                let count = if control % 4 != 0 {
                    control % 4
                } else {
                    pos += 1;
                    let Some(&count) = data.get(pos) else { break };
                    count
                };

                if control & 0x40 != 0 && table <= TRANSFORM_LAST_TABLE {
                    for _ in 0..count {
                        canvas.shade(table);
                    }
                } else {
                    canvas.skip(count as usize);
                }
                pos += 1;
            }
            // fill run with explicit length
            0xC1 => {
                pos += 1;
                let Some(&count) = data.get(pos) else { break };
                pos += 1;
                let Some(&value) = data.get(pos) else { break };
                for _ in 0..count {
                    canvas.paint(value);
                }
                pos += 1;
            }
            // fill run, length in the opcode
            _ => {
                let count = op - 0xC0;
                pos += 1;
                let Some(&value) = data.get(pos) else { break };
                for _ in 0..count {
                    canvas.paint(value);
                }
                pos += 1;
            }
        }

        if pos >= data.len() {
            break;
        }
    }
}


fn decode_monochrome(data: &[u8], canvas: &mut Canvas) {
    let mut pos = 0;

    while let Some(&op) = data.get(pos) {
        match op {
            0x00 => canvas.next_row(),
            0x01..=0x7F => {
                for _ in 0..op {
                    canvas.paint(0);
                }
            }
            0x80 => break,
            _ => canvas.skip((op - 0x80) as usize),
        }
        pos += 1;
    }
}
