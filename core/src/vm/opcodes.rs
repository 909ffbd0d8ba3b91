//! One function per opcode, dispatched from a single `match` in
//! `vm::scheduler` (spec §4.2 opcode table). Each function reads its own
//! operands from the cursor and applies them through `Peripherals`,
//! mirroring how the historical engine's `op_*` handlers are laid out one
//! per mnemonic rather than inlined into the dispatch loop.

use crate::error::{BytecodeError, EngineError, RenderError};
use crate::gfx::DrawTarget;
use crate::host::Host;
use crate::res::directory::LoadedResources;
use crate::vm::cursor::Cursor;
use crate::vm::ops_capability::{Peripherals, PolygonSource};
use crate::vm::thread::ThreadOp;

/// What the scheduler should do with the current thread after an opcode
/// runs (spec §4.2 `Yield`/`Return`/`KillThread` vs. falling through).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Yield,
    Kill,
}

pub fn op_set_register(cursor: &mut Cursor<'_>, p: &mut dyn Peripherals) -> Result<Flow, BytecodeError> {
    let dst = cursor.read_u8()?;
    let value = cursor.read_i16()?;
    p.set_reg(dst, value);
    Ok(Flow::Continue)
}

pub fn op_copy_register(cursor: &mut Cursor<'_>, p: &mut dyn Peripherals) -> Result<Flow, BytecodeError> {
    let dst = cursor.read_u8()?;
    let src = cursor.read_u8()?;
    p.set_reg(dst, p.reg(src));
    Ok(Flow::Continue)
}

pub fn op_add_to_register(cursor: &mut Cursor<'_>, p: &mut dyn Peripherals) -> Result<Flow, BytecodeError> {
    let dst = cursor.read_u8()?;
    let src = cursor.read_u8()?;
    let sum = p.reg(dst).wrapping_add(p.reg(src));
    p.set_reg(dst, sum);
    Ok(Flow::Continue)
}

pub fn op_add_const_to_register(
    cursor: &mut Cursor<'_>,
    p: &mut dyn Peripherals,
) -> Result<Flow, BytecodeError> {
    let dst = cursor.read_u8()?;
    let delta = cursor.read_i16()?;
    let sum = p.reg(dst).wrapping_add(delta);
    p.set_reg(dst, sum);
    Ok(Flow::Continue)
}

pub fn op_sub_from_register(cursor: &mut Cursor<'_>, p: &mut dyn Peripherals) -> Result<Flow, BytecodeError> {
    let dst = cursor.read_u8()?;
    let src = cursor.read_u8()?;
    let diff = p.reg(dst).wrapping_sub(p.reg(src));
    p.set_reg(dst, diff);
    Ok(Flow::Continue)
}

pub fn op_and_register(cursor: &mut Cursor<'_>, p: &mut dyn Peripherals) -> Result<Flow, BytecodeError> {
    let dst = cursor.read_u8()?;
    let mask = cursor.read_u16()?;
    p.set_reg(dst, (p.reg(dst) as u16 & mask) as i16);
    Ok(Flow::Continue)
}

pub fn op_or_register(cursor: &mut Cursor<'_>, p: &mut dyn Peripherals) -> Result<Flow, BytecodeError> {
    let dst = cursor.read_u8()?;
    let mask = cursor.read_u16()?;
    p.set_reg(dst, (p.reg(dst) as u16 | mask) as i16);
    Ok(Flow::Continue)
}

pub fn op_shift_left(cursor: &mut Cursor<'_>, p: &mut dyn Peripherals) -> Result<Flow, BytecodeError> {
    let dst = cursor.read_u8()?;
    let amount = cursor.read_u16()?;
    p.set_reg(dst, ((p.reg(dst) as u16) << amount) as i16);
    Ok(Flow::Continue)
}

pub fn op_shift_right(cursor: &mut Cursor<'_>, p: &mut dyn Peripherals) -> Result<Flow, BytecodeError> {
    let dst = cursor.read_u8()?;
    let amount = cursor.read_u16()?;
    p.set_reg(dst, ((p.reg(dst) as u16) >> amount) as i16);
    Ok(Flow::Continue)
}

/// `Call`: pushes the return address and jumps. The call stack lives on
/// the `Thread`, applied by the scheduler around dispatch, so this only
/// computes the target; the scheduler performs the push (spec §4.2).
pub fn op_call(cursor: &mut Cursor<'_>) -> Result<u16, BytecodeError> {
    cursor.read_u16()
}

pub fn op_jump(cursor: &mut Cursor<'_>) -> Result<u16, BytecodeError> {
    cursor.read_u16()
}

/// `JumpIfNotZero`: decrements the register, jumps if the result isn't
/// zero (classic loop-counter opcode; spec §4.2).
pub fn op_jump_if_not_zero(
    cursor: &mut Cursor<'_>,
    p: &mut dyn Peripherals,
) -> Result<Option<u16>, BytecodeError> {
    let reg = cursor.read_u8()?;
    let target = cursor.read_u16()?;
    let value = p.reg(reg).wrapping_sub(1);
    p.set_reg(reg, value);
    Ok(if value != 0 { Some(target) } else { None })
}

/// The six comparison kinds packed into `ConditionalJump`'s opcode byte
/// (spec §4.2: low 3 bits of the second operand byte select the test).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl Comparison {
    fn from_bits(bits: u8) -> Result<Self, BytecodeError> {
        match bits & 0x07 {
            0 => Ok(Comparison::Equal),
            1 => Ok(Comparison::NotEqual),
            2 => Ok(Comparison::Greater),
            3 => Ok(Comparison::GreaterOrEqual),
            4 => Ok(Comparison::Less),
            5 => Ok(Comparison::LessOrEqual),
            other => Err(BytecodeError::InvalidOpcode(other)),
        }
    }

    fn test(self, lhs: i16, rhs: i16) -> bool {
        match self {
            Comparison::Equal => lhs == rhs,
            Comparison::NotEqual => lhs != rhs,
            Comparison::Greater => lhs > rhs,
            Comparison::GreaterOrEqual => lhs >= rhs,
            Comparison::Less => lhs < rhs,
            Comparison::LessOrEqual => lhs <= rhs,
        }
    }
}

/// `ConditionalJump`: compares a register against either another register
/// or an immediate (selected by the high bits of the operand-kind byte,
/// same convention as the original opcode's packed operand byte), and
/// jumps on a true comparison.
pub fn op_conditional_jump(
    cursor: &mut Cursor<'_>,
    p: &mut dyn Peripherals,
) -> Result<Option<u16>, BytecodeError> {
    let op_byte = cursor.read_u8()?;
    let lhs_reg = cursor.read_u8()?;
    let lhs = p.reg(lhs_reg);
    let kind = op_byte >> 3;
    let rhs = match kind {
        0 => p.reg(cursor.read_u8()?),
        1 => cursor.read_i16()?,
        2 => cursor.read_i8()? as i16,
        other => return Err(BytecodeError::InvalidOpcode(other)),
    };
    let target = cursor.read_u16()?;
    let comparison = Comparison::from_bits(op_byte)?;
    Ok(if comparison.test(lhs, rhs) { Some(target) } else { None })
}

pub fn op_select_palette(cursor: &mut Cursor<'_>, p: &mut dyn Peripherals) -> Result<Flow, BytecodeError> {
    let id = cursor.read_u16()?;
    p.select_palette((id & 0xFF) as u8);
    Ok(Flow::Continue)
}

/// `ActivateThread`: schedules a pending jump for a (possibly different)
/// thread; takes effect at end-of-tic (spec §4.2, §9).
pub fn op_activate_thread(
    cursor: &mut Cursor<'_>,
    p: &mut dyn Peripherals,
) -> Result<Flow, BytecodeError> {
    let tid = cursor.read_u8()?;
    let addr = cursor.read_u16()?;
    p.activate_thread(tid, addr)?;
    Ok(Flow::Continue)
}

/// `ControlThreads`: applies `op` to every thread id in `start..=end`.
pub fn op_control_threads(
    cursor: &mut Cursor<'_>,
    p: &mut dyn Peripherals,
) -> Result<Flow, BytecodeError> {
    let start = cursor.read_u8()?;
    let end = cursor.read_u8()?;
    let op = ThreadOp::from_byte(cursor.read_u8()?)?;
    p.thread_control(start, end, op)?;
    Ok(Flow::Continue)
}

pub fn op_select_video_buffer(
    cursor: &mut Cursor<'_>,
    p: &mut dyn Peripherals,
) -> Result<Flow, BytecodeError> {
    let id = cursor.read_u8()?;
    p.select_draw_target(draw_target_from_byte(id));
    Ok(Flow::Continue)
}

pub fn op_fill_video_buffer(
    cursor: &mut Cursor<'_>,
    p: &mut dyn Peripherals,
) -> Result<Flow, BytecodeError> {
    let id = cursor.read_u8()?;
    let color = cursor.read_u8()?;
    p.fill_buffer(draw_target_from_byte(id), color);
    Ok(Flow::Continue)
}

pub fn op_copy_video_buffer(
    cursor: &mut Cursor<'_>,
    p: &mut dyn Peripherals,
) -> Result<Flow, BytecodeError> {
    let src = cursor.read_u8()?;
    let dst = cursor.read_u8()?;
    p.copy_buffer(draw_target_from_byte(src), draw_target_from_byte(dst), 0);
    Ok(Flow::Continue)
}

/// `RenderVideoBuffer`: presenting before any palette is selected (as the
/// original game's intro briefly does) isn't a bytecode fault, so a
/// `PaletteNotSelected` render error is swallowed here and the frame is
/// just dropped rather than propagated to the scheduler (spec §7).
pub fn op_render_video_buffer(
    cursor: &mut Cursor<'_>,
    p: &mut dyn Peripherals,
    host: &mut dyn Host,
) -> Result<Flow, EngineError> {
    let id = cursor.read_u8()?;
    match p.render_buffer(draw_target_from_byte(id), host) {
        Ok(()) | Err(EngineError::Render(RenderError::PaletteNotSelected)) => {}
        Err(other) => return Err(other),
    }
    Ok(Flow::Yield)
}

pub fn op_kill_thread() -> Flow {
    Flow::Kill
}

pub fn op_draw_string(
    cursor: &mut Cursor<'_>,
    p: &mut dyn Peripherals,
) -> Result<Flow, EngineError> {
    let string_id = cursor.read_u16()?;
    let x = cursor.read_u8()?;
    let y = cursor.read_u8()?;
    let color = cursor.read_u8()?;
    p.draw_string(string_id, x, y, color)?;
    Ok(Flow::Continue)
}

/// `PlaySound`: resolves `res` against the loaded resource set (so the
/// machine's `Peripherals` surface never needs to know about resource
/// ids, only raw sample bytes, spec §4.2 opcode 24). A `res` that isn't
/// currently loaded plays silence rather than failing the tic — the
/// original game never treats a missing sample as fatal.
pub fn op_play_sound(
    cursor: &mut Cursor<'_>,
    p: &mut dyn Peripherals,
    host: &mut dyn Host,
    resources: &LoadedResources,
) -> Result<Flow, EngineError> {
    let res = cursor.read_u16()?;
    let freq = cursor.read_u8()?;
    let vol = cursor.read_u8()?;
    let channel = cursor.read_u8()?;
    let sample = resources.get(res).unwrap_or(&[]);
    p.play_sound(host, sample, freq, vol, channel)?;
    Ok(Flow::Continue)
}

pub fn op_control_resources(
    cursor: &mut Cursor<'_>,
    p: &mut dyn Peripherals,
) -> Result<Flow, EngineError> {
    let res = cursor.read_u16()?;
    p.control_resources(res)?;
    Ok(Flow::Continue)
}

pub fn op_control_music(
    cursor: &mut Cursor<'_>,
    p: &mut dyn Peripherals,
    host: &mut dyn Host,
    resources: &LoadedResources,
) -> Result<Flow, EngineError> {
    let res = cursor.read_u16()?;
    let delay = cursor.read_u16()?;
    let offset = cursor.read_u8()?;
    match res {
        0 => p.stop_music(host)?,
        _ if delay == 0 && offset == 0 && res == 0xFFFF => p.set_music_delay(0),
        _ => {
            let sample = resources.get(res).unwrap_or(&[]);
            p.play_music(host, sample, delay, offset)?;
        }
    }
    Ok(Flow::Continue)
}

fn draw_target_from_byte(id: u8) -> DrawTarget {
    match id {
        0xFE => DrawTarget::Back,
        0xFF => DrawTarget::Front,
        other => DrawTarget::Specific(other & 0x03),
    }
}

/// Decodes a compact polygon/animation draw opcode's packed operand byte
/// (spec §4.2 high-bit opcodes): bit 6 of the opcode byte selects the bank
/// (polygons vs. animations), and the trailing operand byte's top two
/// bits pick one of four zoom presets while its low 6 bits, scaled by 2,
/// offset the y coordinate (mirrors `op_draw_background`/`op_draw_sprite`
/// style opcodes in the reference VM's compact draw path).
pub fn op_draw_polygon_compact(
    opcode: u8,
    cursor: &mut Cursor<'_>,
    p: &mut dyn Peripherals,
) -> Result<Flow, EngineError> {
    let source = if opcode & 0x40 != 0 {
        PolygonSource::Animations
    } else {
        PolygonSource::Polygons
    };
    let low = cursor.read_u8()?;
    let address = (((opcode as u16) & 0x3F) << 8) | low as u16;
    let x = cursor.read_u8()? as i16;
    let packed_y = cursor.read_u8()?;
    let y = (packed_y & 0x3F) as i16;
    let scale = match packed_y >> 6 {
        0 => 64,
        1 => 128,
        2 => 32,
        _ => 64,
    };
    p.draw_polygon(source, address, (x, y), scale)?;
    Ok(Flow::Continue)
}
