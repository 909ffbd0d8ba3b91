//! Fixed-point scanline polygon fill: solid / highlight / mask draw modes
//! (spec §4.3).

use crate::gfx::buffer::{FrameBuffer, HEIGHT, WIDTH};

/// A signed 32-bit 16.16 fixed-point accumulator (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPoint(i32);

impl FixedPoint {
    pub fn init(whole: i32) -> Self {
        Self(whole << 16)
    }

    /// Wrapping add, equal to plain signed 32-bit wraparound addition.
    pub fn add(&mut self, delta: i32) {
        self.0 = self.0.wrapping_add(delta);
    }

    pub fn set_fraction(&mut self, frac: u16) {
        self.0 = (self.0 & !0xFFFF) | frac as i32;
    }

    pub fn whole(self) -> i32 {
        self.0 >> 16
    }

    pub fn raw(self) -> i32 {
        self.0
    }
}

/// How a polygon's color code maps pixels onto the destination buffer
/// (spec §4.3 Color codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorOp {
    Solid(u8),
    Highlight,
    Mask,
}

impl ColorOp {
    pub fn from_code(code: u8) -> Self {
        match code {
            0x10 => ColorOp::Highlight,
            0x11 => ColorOp::Mask,
            solid => ColorOp::Solid(solid & 0x0F),
        }
    }
}

fn apply_pixel(target: &mut FrameBuffer, backdrop: &FrameBuffer, x: i32, y: i32, op: ColorOp) {
    match op {
        ColorOp::Solid(color) => target.set_pixel(x, y, color),
        ColorOp::Highlight => {
            let current = target.get_pixel(x, y);
            if current < 8 {
                target.set_pixel(x, y, current + 8);
            }
        }
        ColorOp::Mask => {
            let backdrop_pixel = backdrop.get_pixel(x, y);
            target.set_pixel(x, y, backdrop_pixel);
        }
    }
}

/// Fills one horizontal span `[min, max]` inclusive at row `y`, clipping to
/// the buffer bounds. Rows outside `[0, HEIGHT)` are skipped entirely.
pub fn draw_span(target: &mut FrameBuffer, backdrop: &FrameBuffer, y: i32, min: i32, max: i32, op: ColorOp) {
    if y < 0 || y as usize >= HEIGHT {
        return;
    }
    let min = min.max(0);
    let max = max.min(WIDTH as i32 - 1);
    let mut x = min;
    while x <= max {
        apply_pixel(target, backdrop, x, y, op);
        x += 1;
    }
}

pub(crate) fn scale_coord(v: u8, scale: u16) -> i32 {
    (v as i32 * scale as i32) >> 6
}

/// Fills a convex polygon described by an even-length, top-to-bottom,
/// left/right-mirrored vertex list (spec §4.3 Polygon draw). Each
/// successive pair of (left, right) vertices advances the fill by the
/// number of rows their `y` values span, interpolating `x` with a 16.16
/// accumulator along the way.
pub fn fill_polygon(
    target: &mut FrameBuffer,
    backdrop: &FrameBuffer,
    vertices: &[(u8, u8)],
    origin: (i16, i16),
    scale: u16,
    op: ColorOp,
) {
    let n = vertices.len();
    if n < 4 || n % 2 != 0 {
        return;
    }

    let cx = origin.0 as i32;
    let cy = origin.1 as i32;

    let mut left: i64 = 0;
    let mut right: i64 = n as i64 - 1;
    let mut cur_left = FixedPoint::init(scale_coord(vertices[left as usize].0, scale));
    let mut cur_right = FixedPoint::init(scale_coord(vertices[right as usize].0, scale));
    let mut y = scale_coord(vertices[left as usize].1, scale);
    left += 1;
    right -= 1;

    while left <= right {
        let l = left as usize;
        let r = right as usize;
        let target_y = scale_coord(vertices[l].1, scale);
        let rows = (target_y - y).max(1);
        let left_target_x = scale_coord(vertices[l].0, scale);
        let right_target_x = scale_coord(vertices[r].0, scale);
        let left_slope = ((left_target_x - cur_left.whole()) << 16) / rows;
        let right_slope = ((right_target_x - cur_right.whole()) << 16) / rows;

        // The last row of each segment is left for the next segment (or the
        // polygon's final vertex pair) to own, so a shared boundary row
        // between two segments is never drawn twice.
        for step in 0..rows {
            if step + 1 < rows {
                draw_span(
                    target,
                    backdrop,
                    cy + y,
                    cx + cur_left.whole(),
                    cx + cur_right.whole(),
                    op,
                );
            }
            y += 1;
            cur_left.add(left_slope);
            cur_right.add(right_slope);
        }
        left += 1;
        right -= 1;
    }
}
