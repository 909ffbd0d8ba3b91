//! 16-entry RGB palettes and application to a host-facing 24-bit surface
//! (spec §3 Palette, §4.3, §9 Endianness).

use crate::error::RenderError;
use crate::gfx::buffer::{FrameBuffer, HEIGHT, WIDTH};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// One 16-color palette, as decoded from a palette bank entry.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub entries: [Rgb; 16],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            entries: [Rgb::default(); 16],
        }
    }
}

impl Palette {
    /// Parses one 32-byte palette entry: 16 big-endian `0x0RGB` words, each
    /// nibble expanded to a full byte (`0xF -> 0xFF`) the way the original
    /// 4-bit-per-channel palette data is conventionally widened.
    pub fn parse(data: &[u8]) -> Self {
        let mut entries = [Rgb::default(); 16];
        for (i, chunk) in data.chunks_exact(2).take(16).enumerate() {
            let word = u16::from_be_bytes([chunk[0], chunk[1]]);
            let r = ((word >> 8) & 0x0F) as u8;
            let g = ((word >> 4) & 0x0F) as u8;
            let b = (word & 0x0F) as u8;
            entries[i] = Rgb {
                r: (r << 4) | r,
                g: (g << 4) | g,
                b: (b << 4) | b,
            };
        }
        Self { entries }
    }

    pub fn color(&self, index: u8) -> Rgb {
        self.entries[(index & 0x0F) as usize]
    }
}

/// A bank of 32 palettes, one of which is active at a time.
pub struct PaletteBank {
    palettes: Vec<Palette>,
}

impl PaletteBank {
    pub const COUNT: usize = 32;

    pub fn parse(data: &[u8]) -> Self {
        let palettes = data
            .chunks(32)
            .take(Self::COUNT)
            .map(Palette::parse)
            .collect();
        Self { palettes }
    }

    pub fn get(&self, id: u8) -> Option<&Palette> {
        self.palettes.get(id as usize)
    }
}

/// Maps every pixel of `buffer` through `palette` into a host surface:
/// 320x200, 4 bytes per pixel, little-endian ABGR (so a little-endian u32
/// load yields RGBA order).
pub fn apply(
    buffer: &FrameBuffer,
    palette: &Palette,
    surface: &mut [u8],
) -> Result<(), RenderError> {
    debug_assert_eq!(surface.len(), WIDTH * HEIGHT * 4);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let color = buffer.get_pixel(x as i32, y as i32);
            let rgb = palette.color(color);
            let at = (y * WIDTH + x) * 4;
            surface[at] = rgb.b;
            surface[at + 1] = rgb.g;
            surface[at + 2] = rgb.r;
            surface[at + 3] = 0xFF;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_maps_every_index_through_the_palette() {
        let mut entries = [Rgb::default(); 16];
        entries[5] = Rgb {
            r: 0x11,
            g: 0x22,
            b: 0x33,
        };
        let palette = Palette { entries };
        let mut buffer = FrameBuffer::new();
        buffer.fill(5);
        let mut surface = vec![0u8; WIDTH * HEIGHT * 4];
        apply(&buffer, &palette, &mut surface).unwrap();
        assert_eq!(&surface[0..4], &[0x33, 0x22, 0x11, 0xFF]);
    }

    #[test]
    fn parse_widens_4bit_channels_to_8bit() {
        // 0x0F0F -> r=0x0, g=0xF, b=0xF
        let data = [0x0F, 0x0F];
        let palette = Palette::parse(&data);
        assert_eq!(
            palette.color(0),
            Rgb {
                r: 0x00,
                g: 0xFF,
                b: 0xFF
            }
        );
    }
}
