//! Software rasterizer: four 320x200 indexed-color buffers, polygon fill,
//! font blit, and palette application to a host surface (spec §4.3).

pub mod buffer;
pub mod font;
pub mod palette;
pub mod polygon;
pub mod raster;
pub mod strings;

pub use buffer::{Buffers, DrawTarget, FrameBuffer, HEIGHT, WIDTH};
pub use palette::{Palette, PaletteBank};
pub use polygon::PolygonBank;
pub use raster::{ColorOp, FixedPoint};
