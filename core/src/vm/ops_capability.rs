//! The capability interface opcode dispatch talks to, decoupling the
//! bytecode interpreter from the concrete `Machine` for testability (spec
//! §9 "Polymorphic machine for testability"). Production code runs
//! against the real `Machine`; scheduler unit tests run against the
//! recording mock below.

use crate::error::{BytecodeError, EngineError};
use crate::gfx::DrawTarget;
use crate::host::Host;
use crate::vm::thread::ThreadOp;

/// Which bank a compact polygon-draw opcode pulls its shape from (spec
/// §4.2 high-bit opcodes, §4.3 Polygon source).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonSource {
    Polygons,
    Animations,
}

pub trait Peripherals {
    fn reg(&self, id: u8) -> i16;
    fn set_reg(&mut self, id: u8, value: i16);

    fn select_palette(&mut self, id: u8);
    fn select_draw_target(&mut self, target: DrawTarget);
    fn fill_buffer(&mut self, target: DrawTarget, color: u8);
    fn copy_buffer(&mut self, src: DrawTarget, dst: DrawTarget, y_offset: i32);
    fn render_buffer(&mut self, target: DrawTarget, host: &mut dyn Host) -> Result<(), EngineError>;
    fn draw_string(&mut self, string_id: u16, x: u8, y: u8, color: u8) -> Result<(), EngineError>;
    fn draw_polygon(
        &mut self,
        source: PolygonSource,
        address: u16,
        origin: (i16, i16),
        scale: u16,
    ) -> Result<(), EngineError>;

    fn activate_thread(&mut self, tid: u8, addr: u16) -> Result<(), BytecodeError>;
    fn thread_control(&mut self, start: u8, end: u8, op: ThreadOp) -> Result<(), BytecodeError>;

    fn play_sound(
        &mut self,
        host: &mut dyn Host,
        sample: &[u8],
        freq: u8,
        vol: u8,
        channel: u8,
    ) -> Result<(), EngineError>;
    fn stop_channel(&mut self, host: &mut dyn Host, channel: u8) -> Result<(), EngineError>;
    fn play_music(
        &mut self,
        host: &mut dyn Host,
        sample: &[u8],
        delay: u16,
        offset: u8,
    ) -> Result<(), EngineError>;
    fn stop_music(&mut self, host: &mut dyn Host) -> Result<(), EngineError>;
    fn set_music_delay(&mut self, delay: u16);

    /// Opcode 25 `ControlResources`: 0 unloads every transient resource,
    /// a small id schedules a game-part switch, anything else loads one
    /// resource into memory (spec §4.2 opcode table).
    fn control_resources(&mut self, res: u16) -> Result<(), EngineError>;
}
