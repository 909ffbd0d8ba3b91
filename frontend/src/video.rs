//! SDL2 presentation: blits the core's already palette-applied 320x200
//! little-endian-ABGR surface (`ootw_core::gfx::palette::apply`'s output,
//! delivered through `Host::present_surface`) to a scaled window.
//!
//! Mirrors the teacher's `Video`: a canvas plus a streaming texture
//! re-created on every `present` call. That's not an oversight carried
//! over unexamined — `Texture<'_>` borrows from `TextureCreator`, so
//! storing both a `Canvas` and one of its own textures in the same struct
//! is self-referential and the borrow checker rejects it. Recreating the
//! texture per frame is the straightforward way around that in safe Rust,
//! so the teacher's shape is kept rather than "fixed."

use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, TextureCreator};
use sdl2::video::{Window, WindowContext};

use ootw_core::gfx::{HEIGHT, WIDTH};

pub struct Video {
    canvas: Canvas<Window>,
    texture_creator: TextureCreator<WindowContext>,
}

impl Video {
    /// Creates an SDL window sized `WIDTH*scale` x `HEIGHT*scale`.
    pub fn new(sdl_video: &sdl2::VideoSubsystem, title: &str, scale: u32) -> Result<Self, String> {
        let window = sdl_video
            .window(title, WIDTH as u32 * scale, HEIGHT as u32 * scale)
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        let canvas = window.into_canvas().accelerated().build().map_err(|e| e.to_string())?;
        let texture_creator = canvas.texture_creator();

        Ok(Self { canvas, texture_creator })
    }

    /// Uploads a BGRA surface (byte order B, G, R, A per pixel, matching
    /// `palette::apply`'s little-endian ABGR output) and presents it.
    pub fn present(&mut self, surface: &[u8; WIDTH * HEIGHT * 4]) -> Result<(), String> {
        let mut texture = self
            .texture_creator
            .create_texture_streaming(PixelFormatEnum::BGRA32, WIDTH as u32, HEIGHT as u32)
            .map_err(|e| e.to_string())?;

        texture
            .update(None, surface, WIDTH * 4)
            .map_err(|e| e.to_string())?;

        self.canvas.clear();
        self.canvas.copy(&texture, None, None)?;
        self.canvas.present();
        Ok(())
    }
}
