//! PAL/NTSC constants and the frame-count/period/tempo conversions the
//! scheduler and `ControlMusic` need (spec §2 leaf table names this
//! component but the distilled body text never spells out the three
//! conversions; they follow directly from the inputs spec.md's data model
//! already threads through `RenderVideoBuffer`'s delay and `ControlMusic`'s
//! tempo argument).

pub const PAL_HZ: u32 = 50;
pub const NTSC_HZ: u32 = 60;

/// `RenderVideoBuffer`'s delay operand is a count of 1/50s (PAL) tics
/// (spec §4.2 opcode 16); converts that count to milliseconds for
/// whichever refresh rate the host is running.
pub fn frames_to_ms(frames: u32, refresh_hz: u32) -> u32 {
    if refresh_hz == 0 {
        return 0;
    }
    frames.saturating_mul(1000) / refresh_hz
}

/// A hardware-style period value (e.g. a PC speaker/Paula-style divider)
/// to its audible frequency: `hz = clock / period`.
pub fn period_to_hz(period: u32, clock_hz: u32) -> u32 {
    if period == 0 {
        return 0;
    }
    clock_hz / period
}

/// `ControlMusic`'s tempo operand (ticks between pattern rows) to
/// milliseconds per row at the given refresh rate.
pub fn tempo_to_ms_per_row(tempo_ticks: u16, refresh_hz: u32) -> u32 {
    frames_to_ms(tempo_ticks as u32, refresh_hz)
}
