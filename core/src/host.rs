//! The boundary the core crate is driven through: input in, rendered
//! surfaces and bank bytes out (spec §6 External interfaces). The real
//! implementation lives in the `game`/`frontend` crates; this module only
//! pins down the contract, the way the teacher's `Bus` trait separates a
//! `Component`'s logic from the system it's wired into.

use crate::res::descriptor::Descriptor;

/// One tic's worth of input, polled once at the start of `run_tic` and
/// latched into the joystick/last-key registers (spec §6).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub action: bool,
    pub last_character: Option<u8>,
    pub show_password_screen: bool,
    pub exited: bool,
}

/// External collaborators the VM drives through synchronous calls: input
/// polling, frame presentation, bank/descriptor loading, and the audio
/// control surface (spec §6).
pub trait Host {
    fn poll_input(&mut self) -> InputState;

    /// Displays an already palette-applied 320x200 ABGR surface and
    /// sleeps for `delay_ms` (spec §4.2 opcode 16, §6).
    fn present_surface(&mut self, buffer_rgba: &[u8; 320 * 200 * 4], delay_ms: u32);

    fn load_bank(&mut self, bank_number: u8) -> Result<Vec<u8>, crate::error::ResourceError>;
    fn load_resource_descriptors(&mut self) -> Result<Vec<Descriptor>, crate::error::ResourceError>;

    fn play_sound(&mut self, sample: &[u8], channel: u8, volume: u8, frequency_hz: u32);
    fn stop_channel(&mut self, channel: u8);
    fn play_music(&mut self, sample: &[u8], delay_ms: u32, offset: u8);
    fn stop_music(&mut self);
    fn set_music_delay(&mut self, delay_ms: u32);
}
