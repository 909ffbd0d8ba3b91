//! The concrete machine: registers, threads, buffers, resources, and the
//! game-part switch orchestration, tying every leaf module together
//! (spec §3 Machine). Implements `Peripherals` for the scheduler to drive
//! through opcode dispatch; the program bytes and resource-loading state
//! live outside the `Peripherals`-facing part so the scheduler can hold a
//! `Cursor` borrowing `program` and a `&mut dyn Peripherals` borrowing
//! `state` at the same time without aliasing.

use crate::audio;
use crate::error::{BytecodeError, EngineError, RenderError};
use crate::gfx::{Buffers, ColorOp, DrawTarget, Palette, PaletteBank, PolygonBank};
use crate::gfx::font;
use crate::gfx::raster::fill_polygon;
use crate::host::{Host, InputState};
use crate::res::descriptor::Descriptor;
use crate::res::directory::{self, LoadedResources};
use crate::res::game_part::GamePart;
use crate::rle;
use crate::vm::ops_capability::{Peripherals, PolygonSource};
use crate::vm::registers::{self, Registers};
use crate::vm::thread::{self, Execution, Thread, ThreadOp};

/// What `ControlResources` asked for, applied by the scheduler after
/// dispatch rather than inline (spec §4.2 opcode 25; same deferred shape
/// as thread-transition application in §9, generalized so `Peripherals`
/// doesn't need direct access to the resource directory or `Host`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceAction {
    UnloadAll,
    SwitchPart(u16),
    Load(u16),
}

/// Everything opcode dispatch touches through the `Peripherals` trait.
/// Deliberately excludes the bytecode program bytes and the resource
/// directory/bank data, which the scheduler manages directly.
pub struct MachineState {
    registers: Registers,
    threads: [Thread; thread::COUNT],
    buffers: Buffers,
    palette_bank: PaletteBank,
    active_palette: Option<u8>,
    draw_target: DrawTarget,
    polygon_bank: Vec<u8>,
    animation_bank: Vec<u8>,
    audio: audio::Controller,
    pending_resource_action: Option<ResourceAction>,
    refresh_hz: u32,
}

impl MachineState {
    pub fn new() -> Self {
        Self {
            registers: Registers::new(),
            threads: std::array::from_fn(Thread::initial),
            buffers: Buffers::new(),
            palette_bank: PaletteBank::parse(&[]),
            active_palette: None,
            draw_target: DrawTarget::Back,
            polygon_bank: Vec::new(),
            animation_bank: Vec::new(),
            audio: audio::Controller::new(),
            pending_resource_action: None,
            refresh_hz: crate::timing::PAL_HZ,
        }
    }

    /// Sets the refresh rate `RenderVideoBuffer`'s delay operand (a count
    /// of 1/50s PAL tics, spec §4.2 opcode 16) is converted against.
    /// Defaults to PAL; the frontend's `--ntsc` flag calls this once at
    /// startup.
    pub fn set_refresh_rate(&mut self, refresh_hz: u32) {
        self.refresh_hz = refresh_hz;
    }

    pub fn threads(&self) -> &[Thread; thread::COUNT] {
        &self.threads
    }

    pub fn thread_mut(&mut self, id: usize) -> &mut Thread {
        &mut self.threads[id]
    }

    pub fn buffers(&self) -> &Buffers {
        &self.buffers
    }

    pub fn take_pending_resource_action(&mut self) -> Option<ResourceAction> {
        self.pending_resource_action.take()
    }

    pub fn set_polygon_bank(&mut self, bytes: Vec<u8>) {
        self.polygon_bank = bytes;
    }

    pub fn set_animation_bank(&mut self, bytes: Vec<u8>) {
        self.animation_bank = bytes;
    }

    pub fn set_palette_bank(&mut self, bank: PaletteBank) {
        self.palette_bank = bank;
    }

    /// Latches joystick/action/last-key input into the well-known
    /// registers at the start of a tic (spec §6 `InputState`, §3 Machine).
    pub fn latch_input(&mut self, input: InputState) {
        self.registers.set(registers::JOYSTICK_LEFT, input.left as i16);
        self.registers.set(registers::JOYSTICK_RIGHT, input.right as i16);
        self.registers.set(registers::JOYSTICK_UP, input.up as i16);
        self.registers.set(registers::JOYSTICK_DOWN, input.down as i16);
        self.registers.set(registers::JOYSTICK_ACTION, input.action as i16);
        if let Some(key) = input.last_character {
            self.registers.set(registers::LAST_KEY_PRESSED, key as i16);
        }
    }

    pub fn seed_random(&mut self, seed: u16) {
        self.registers.set(registers::RANDOM_SEED, seed as i16);
    }

    /// Resets every thread but 0 to inactive, and thread 0 to active at
    /// pc=0 (spec §4.4 game-part switch, §3 Lifecycle).
    pub fn reset_threads(&mut self) {
        for (id, thread) in self.threads.iter_mut().enumerate() {
            thread.reset(if id == 0 { Execution::Active(0) } else { Execution::Inactive });
        }
    }
}

impl Default for MachineState {
    fn default() -> Self {
        Self::new()
    }
}

impl Peripherals for MachineState {
    fn reg(&self, id: u8) -> i16 {
        self.registers.get(id)
    }

    fn set_reg(&mut self, id: u8, value: i16) {
        self.registers.set(id, value);
    }

    fn select_palette(&mut self, id: u8) {
        self.active_palette = Some(id);
    }

    fn select_draw_target(&mut self, target: DrawTarget) {
        self.draw_target = target;
    }

    fn fill_buffer(&mut self, target: DrawTarget, color: u8) {
        self.buffers.fill(target, color);
    }

    fn copy_buffer(&mut self, src: DrawTarget, dst: DrawTarget, y_offset: i32) {
        self.buffers.copy(src, dst, y_offset);
    }

    fn render_buffer(&mut self, target: DrawTarget, host: &mut dyn Host) -> Result<(), EngineError> {
        let palette_id = self.active_palette.ok_or(RenderError::PaletteNotSelected)?;
        let palette = self
            .palette_bank
            .get(palette_id)
            .copied()
            .unwrap_or_else(Palette::default);
        let mut surface = [0u8; 320 * 200 * 4];
        crate::gfx::palette::apply(self.buffers.get(target), &palette, &mut surface)?;
        let delay_frames = self.registers.get(registers::PAUSE_SLICE).max(0) as u32;
        let delay_ms = crate::timing::frames_to_ms(delay_frames, self.refresh_hz);
        host.present_surface(&surface, delay_ms);
        self.buffers.swap();
        Ok(())
    }

    fn draw_string(&mut self, string_id: u16, x: u8, y: u8, color: u8) -> Result<(), EngineError> {
        let text = crate::gfx::strings::lookup(string_id);
        let target = self.draw_target;
        font::draw_string_to(&mut self.buffers, target, text, x, y, color)?;
        Ok(())
    }

    fn draw_polygon(
        &mut self,
        source: PolygonSource,
        address: u16,
        origin: (i16, i16),
        scale: u16,
    ) -> Result<(), EngineError> {
        let bank_bytes = match source {
            PolygonSource::Polygons => self.polygon_bank.clone(),
            PolygonSource::Animations => self.animation_bank.clone(),
        };
        let bank = PolygonBank::new(&bank_bytes);
        let backdrop = self.buffers.plane(0).clone();
        let target = self.draw_target;

        bank.walk(address, (0, 0), &mut |leaf, offset| {
            let leaf_origin = (
                origin.0.wrapping_add(crate::gfx::raster::scale_coord(offset.0 as u8, scale) as i16),
                origin.1.wrapping_add(crate::gfx::raster::scale_coord(offset.1 as u8, scale) as i16),
            );
            let op = ColorOp::from_code(leaf.color_code);
            let buf = self.buffers.get_mut(target);
            fill_polygon(buf, &backdrop, &leaf.vertices, leaf_origin, scale, op);
            Ok(())
        })?;
        Ok(())
    }

    fn activate_thread(&mut self, tid: u8, addr: u16) -> Result<(), BytecodeError> {
        let thread = self
            .threads
            .get_mut(tid as usize)
            .ok_or(BytecodeError::InvalidThreadID(tid))?;
        thread.pending_execution = Some(Execution::Active(addr));
        Ok(())
    }

    fn thread_control(&mut self, start: u8, end: u8, op: ThreadOp) -> Result<(), BytecodeError> {
        if end < start {
            return Err(BytecodeError::InvalidThreadRange { start, end });
        }
        for tid in start..=end {
            let thread = self
                .threads
                .get_mut(tid as usize)
                .ok_or(BytecodeError::InvalidThreadID(tid))?;
            match op {
                ThreadOp::Resume => thread.pending_paused = Some(false),
                ThreadOp::Pause => thread.pending_paused = Some(true),
                ThreadOp::Deactivate => thread.pending_execution = Some(Execution::Inactive),
            }
        }
        Ok(())
    }

    fn play_sound(
        &mut self,
        host: &mut dyn Host,
        sample: &[u8],
        freq: u8,
        vol: u8,
        channel: u8,
    ) -> Result<(), EngineError> {
        self.audio
            .play_sound(host, sample, freq as u32, vol, channel)
            .map_err(EngineError::from)
    }

    fn stop_channel(&mut self, host: &mut dyn Host, channel: u8) -> Result<(), EngineError> {
        self.audio.stop_channel(host, channel).map_err(EngineError::from)
    }

    fn play_music(
        &mut self,
        host: &mut dyn Host,
        sample: &[u8],
        delay: u16,
        offset: u8,
    ) -> Result<(), EngineError> {
        self.audio.play_music(host, sample, delay as u32, offset);
        Ok(())
    }

    fn stop_music(&mut self, host: &mut dyn Host) -> Result<(), EngineError> {
        self.audio.stop_music(host);
        Ok(())
    }

    fn set_music_delay(&mut self, _delay: u16) {}

    fn control_resources(&mut self, res: u16) -> Result<(), EngineError> {
        self.pending_resource_action = Some(match res {
            0 => ResourceAction::UnloadAll,
            id if crate::res::game_part::by_id(id).is_some() => ResourceAction::SwitchPart(id),
            id => ResourceAction::Load(id),
        });
        Ok(())
    }
}

/// The top-level machine: `MachineState` (the `Peripherals` surface) plus
/// the bytecode program and resource-directory state the scheduler
/// manages directly (spec §3 Machine).
pub struct Machine {
    pub state: MachineState,
    pub program: Vec<u8>,
    pub descriptors: Vec<Descriptor>,
    pub resources: LoadedResources,
    pub game_part: Option<GamePart>,
}

impl Machine {
    pub fn new() -> Self {
        Self {
            state: MachineState::new(),
            program: Vec::new(),
            descriptors: Vec::new(),
            resources: LoadedResources::new(),
            game_part: None,
        }
    }

    pub fn load_descriptors(&mut self, host: &mut dyn Host) -> Result<(), crate::error::ResourceError> {
        self.descriptors = host.load_resource_descriptors()?;
        Ok(())
    }

    /// Unloads every transient resource, loads the named part's palette,
    /// bytecode, polygon and (optional) animation resources, and resets
    /// every thread but 0 (spec §4.4 Game-part switch).
    pub fn switch_game_part(&mut self, host: &mut dyn Host, part: &GamePart) -> Result<(), EngineError> {
        let mut loaded = LoadedResources::new();
        let palette_bytes = loaded
            .load(host, &self.descriptors, part.palette)
            .map_err(EngineError::from)?
            .to_vec();
        let bytecode = loaded
            .load(host, &self.descriptors, part.bytecode)
            .map_err(EngineError::from)?
            .to_vec();
        let polygons = loaded
            .load(host, &self.descriptors, part.polygon)
            .map_err(EngineError::from)?
            .to_vec();
        let animations = match part.animation {
            Some(id) => Some(loaded.load(host, &self.descriptors, id).map_err(EngineError::from)?.to_vec()),
            None => None,
        };

        self.resources = loaded;
        self.state.set_palette_bank(PaletteBank::parse(&palette_bytes));
        self.program = bytecode;
        self.state.set_polygon_bank(polygons);
        self.state.set_animation_bank(animations.unwrap_or_default());
        self.state.reset_threads();
        self.game_part = Some(*part);
        Ok(())
    }

    pub fn unload_all_resources(&mut self) {
        self.resources.unload_all();
    }

    pub fn load_resource(&mut self, host: &mut dyn Host, id: u16) -> Result<(), EngineError> {
        self.resources
            .load(host, &self.descriptors, id)
            .map(|_| ())
            .map_err(EngineError::from)
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies a deferred `ResourceAction` against the full `Machine` (the
/// parts the `Peripherals` surface can't reach directly).
pub fn apply_resource_action(machine: &mut Machine, host: &mut dyn Host, action: ResourceAction) -> Result<(), EngineError> {
    match action {
        ResourceAction::UnloadAll => {
            machine.unload_all_resources();
            Ok(())
        }
        ResourceAction::SwitchPart(id) => {
            let part = *crate::res::game_part::by_id(id).ok_or(crate::error::ResourceError::UnknownResource(id))?;
            machine.switch_game_part(host, &part)
        }
        ResourceAction::Load(id) => machine.load_resource(host, id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::InputState;
    use crate::res::descriptor::Descriptor;

    struct NullHost;
    impl Host for NullHost {
        fn poll_input(&mut self) -> InputState {
            InputState::default()
        }
        fn present_surface(&mut self, _buffer_rgba: &[u8; 320 * 200 * 4], _delay_ms: u32) {}
        fn load_bank(&mut self, _bank_number: u8) -> Result<Vec<u8>, crate::error::ResourceError> {
            Ok(Vec::new())
        }
        fn load_resource_descriptors(&mut self) -> Result<Vec<Descriptor>, crate::error::ResourceError> {
            Ok(Vec::new())
        }
        fn play_sound(&mut self, _sample: &[u8], _channel: u8, _volume: u8, _frequency_hz: u32) {}
        fn stop_channel(&mut self, _channel: u8) {}
        fn play_music(&mut self, _sample: &[u8], _delay_ms: u32, _offset: u8) {}
        fn stop_music(&mut self) {}
        fn set_music_delay(&mut self, _delay_ms: u32) {}
    }

    #[test]
    fn fresh_machine_has_thread_zero_active_and_the_rest_inactive() {
        let machine = Machine::new();
        assert_eq!(machine.state.threads()[0].execution, Execution::Active(0));
        assert_eq!(machine.state.threads()[1].execution, Execution::Inactive);
    }

    #[test]
    fn control_resources_zero_schedules_unload_all() {
        let mut state = MachineState::new();
        state.control_resources(0).unwrap();
        assert_eq!(state.take_pending_resource_action(), Some(ResourceAction::UnloadAll));
    }

    #[test]
    fn render_without_a_selected_palette_is_an_error() {
        let mut state = MachineState::new();
        let mut host = NullHost;
        let err = state.render_buffer(DrawTarget::Front, &mut host).unwrap_err();
        assert_eq!(err, EngineError::Render(RenderError::PaletteNotSelected));
    }
}
