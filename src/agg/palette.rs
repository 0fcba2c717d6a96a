use log::trace;

use crate::cursor::ByteCursor;
use crate::error::Result;


/// Palette stores the 256 colors sprites index into. Allows you to get any color in rgba8 format
pub struct Palette {
    colors: Vec<(u8, u8, u8)>,
}


// the file holds 256 vga triples, 6 bit per r/g/b component
pub const PALETTE_COLORS: usize = 256;
const VGA_COMPONENT_MAX: u16 = 63;


impl Palette {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        trace!("Palette::from_bytes");
        let mut result = Self {
            colors: Vec::with_capacity(PALETTE_COLORS),
        };

        let f = &mut ByteCursor::new(data);
        for _ in 0..PALETTE_COLORS {
            let (r, g, b) = (f.read_u8()?, f.read_u8()?, f.read_u8()?);
            result.colors.push((Self::scale(r), Self::scale(g), Self::scale(b)));
        }

        Ok(result)
    }

    /// returns color in rgba8 format
    pub fn color(&self, index: u8) -> (u8, u8, u8, u8) {
        let (r, g, b) = self.colors[index as usize];
        (r, g, b, 255)
    }

    fn scale(component: u8) -> u8 {
        let c = (component as u16).min(VGA_COMPONENT_MAX);
        (c * 255 / VGA_COMPONENT_MAX) as u8
    }
}
