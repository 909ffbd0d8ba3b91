//! Wires up SDL2 and runs the headless `ootw_game::run` loop against an
//! `SdlHost` until the window is closed. The teacher's own `emulator::run`
//! owned its event loop directly (poll events, `machine.run_frame`,
//! `video.present`); here the VM's own tic loop lives in `ootw_game::run`,
//! so this module's job shrinks to standing up SDL and handing the
//! assembled `Host` off to it.

use std::path::PathBuf;

use ootw_core::res::game_part::GamePart;
use ootw_core::timing;

use crate::audio::AudioEngine;
use crate::input::{Input, KeyMap};
use crate::sdl_host::SdlHost;
use crate::video::Video;
use ootw_game::DirectoryHost;

pub struct Options {
    pub game_directory: PathBuf,
    pub scale: u32,
    pub refresh_hz: u32,
    pub key_map: KeyMap,
    pub screenshot_dir: PathBuf,
}

pub fn run(options: Options, part: &GamePart) -> Result<(), String> {
    let directory = DirectoryHost::open(&options.game_directory).map_err(|e| e.to_string())?;

    let sdl_context = sdl2::init()?;
    let sdl_video = sdl_context.video()?;
    let sdl_audio = sdl_context.audio()?;

    let video = Video::new(&sdl_video, "Another World", options.scale)?;
    let input = Input::new(&sdl_context, options.key_map)?;
    let audio = match AudioEngine::new(&sdl_audio) {
        Ok(engine) => Some(engine),
        Err(e) => {
            log::warn!("audio disabled: {e}");
            None
        }
    };

    let mut host = SdlHost::new(directory, video, input, audio, options.screenshot_dir);

    let refresh_hz = if options.refresh_hz == 0 { timing::PAL_HZ } else { options.refresh_hz };
    ootw_game::run(&mut host, part, refresh_hz, None).map_err(|e| e.to_string())
}
