//! The concrete `Host` this frontend drives the engine through: resource
//! loading delegated to `ootw_game::DirectoryHost`, presentation/input/
//! audio delegated to this crate's `Video`/`Input`/`AudioEngine`. Plays
//! the role the teacher's `Machine` trait implementations play for a
//! concrete arcade board, generalized here to composition over a single
//! `Host` trait rather than one big struct per machine.

use ootw_core::error::ResourceError;
use ootw_core::gfx::{HEIGHT, WIDTH};
use ootw_core::host::{Host, InputState};
use ootw_core::res::descriptor::Descriptor;
use ootw_game::DirectoryHost;

use crate::audio::AudioEngine;
use crate::input::Input;
use crate::video::Video;

pub struct SdlHost {
    directory: DirectoryHost,
    video: Video,
    input: Input,
    audio: Option<AudioEngine>,
    pending_screenshot: bool,
    screenshot_dir: std::path::PathBuf,
    screenshot_count: u32,
}

impl SdlHost {
    pub fn new(
        directory: DirectoryHost,
        video: Video,
        input: Input,
        audio: Option<AudioEngine>,
        screenshot_dir: std::path::PathBuf,
    ) -> Self {
        Self {
            directory,
            video,
            input,
            audio,
            pending_screenshot: false,
            screenshot_dir,
            screenshot_count: 0,
        }
    }

    fn save_screenshot(&mut self, surface: &[u8; WIDTH * HEIGHT * 4]) {
        self.screenshot_count += 1;
        let path = self.screenshot_dir.join(format!("ootw-{:04}.png", self.screenshot_count));
        if let Err(e) = write_png(&path, surface) {
            log::warn!("failed to write screenshot {}: {e}", path.display());
        } else {
            log::info!("wrote screenshot {}", path.display());
        }
    }
}

impl Host for SdlHost {
    fn poll_input(&mut self) -> InputState {
        let input = self.input.poll();
        self.pending_screenshot = self.input.take_screenshot_requested();
        input
    }

    fn present_surface(&mut self, buffer_rgba: &[u8; WIDTH * HEIGHT * 4], delay_ms: u32) {
        if self.pending_screenshot {
            self.pending_screenshot = false;
            self.save_screenshot(buffer_rgba);
        }
        if let Err(e) = self.video.present(buffer_rgba) {
            log::warn!("present failed: {e}");
        }
        if delay_ms > 0 {
            std::thread::sleep(std::time::Duration::from_millis(delay_ms as u64));
        }
    }

    fn load_bank(&mut self, bank_number: u8) -> Result<Vec<u8>, ResourceError> {
        self.directory.load_bank(bank_number)
    }

    fn load_resource_descriptors(&mut self) -> Result<Vec<Descriptor>, ResourceError> {
        self.directory.load_resource_descriptors()
    }

    fn play_sound(&mut self, sample: &[u8], channel: u8, volume: u8, frequency_hz: u32) {
        if let Some(audio) = &mut self.audio {
            audio.play_sound(sample, channel, volume, frequency_hz);
        }
    }

    fn stop_channel(&mut self, channel: u8) {
        if let Some(audio) = &mut self.audio {
            audio.stop_channel(channel);
        }
    }

    fn play_music(&mut self, sample: &[u8], delay_ms: u32, offset: u8) {
        if let Some(audio) = &mut self.audio {
            audio.play_music(sample, delay_ms, offset);
        }
    }

    fn stop_music(&mut self) {
        if let Some(audio) = &mut self.audio {
            audio.stop_music();
        }
    }

    fn set_music_delay(&mut self, delay_ms: u32) {
        if let Some(audio) = &mut self.audio {
            audio.set_music_delay(delay_ms);
        }
    }
}

/// Writes `surface` (little-endian ABGR, per `palette::apply`) out as an
/// 8-bit RGBA PNG, reordering bytes since `png::ColorType::Rgba` expects
/// R, G, B, A per pixel rather than B, G, R, A.
fn write_png(path: &std::path::Path, surface: &[u8; WIDTH * HEIGHT * 4]) -> Result<(), String> {
    let mut rgba = vec![0u8; surface.len()];
    for (src, dst) in surface.chunks_exact(4).zip(rgba.chunks_exact_mut(4)) {
        dst[0] = src[2]; // R
        dst[1] = src[1]; // G
        dst[2] = src[0]; // B
        dst[3] = src[3]; // A
    }

    let file = std::fs::File::create(path).map_err(|e| e.to_string())?;
    let writer = std::io::BufWriter::new(file);
    let mut encoder = png::Encoder::new(writer, WIDTH as u32, HEIGHT as u32);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().map_err(|e| e.to_string())?;
    writer.write_image_data(&rgba).map_err(|e| e.to_string())
}
