//! VM-facing audio control surface: validates channel/resource ids and
//! forwards to the `Host` (spec §4 table, §6). Grounded structurally on
//! `core/src/device/dac.rs` (the teacher's thinnest audio device, a
//! register-to-host-value translator) rather than `pokey.rs`'s full
//! channel-synthesis model, since sample playback and frequency
//! modulation are out of scope per spec §1 — this module dispatches only.

use crate::error::AudioError;
use crate::host::Host;

pub const CHANNEL_COUNT: u8 = 4;

#[derive(Default)]
pub struct Controller {
    music_delay_ms: u32,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_channel(channel: u8) -> Result<(), AudioError> {
        if channel >= CHANNEL_COUNT {
            return Err(AudioError::InvalidChannel(channel));
        }
        Ok(())
    }

    pub fn play_sound(
        &mut self,
        host: &mut dyn Host,
        sample: &[u8],
        frequency_hz: u32,
        volume: u8,
        channel: u8,
    ) -> Result<(), AudioError> {
        Self::check_channel(channel)?;
        host.play_sound(sample, channel, volume, frequency_hz);
        Ok(())
    }

    pub fn stop_channel(&mut self, host: &mut dyn Host, channel: u8) -> Result<(), AudioError> {
        Self::check_channel(channel)?;
        host.stop_channel(channel);
        Ok(())
    }

    pub fn play_music(&mut self, host: &mut dyn Host, sample: &[u8], delay_ms: u32, offset: u8) {
        self.music_delay_ms = delay_ms;
        host.play_music(sample, delay_ms, offset);
    }

    pub fn stop_music(&mut self, host: &mut dyn Host) {
        host.stop_music();
    }

    pub fn set_music_delay(&mut self, host: &mut dyn Host, delay_ms: u32) {
        self.music_delay_ms = delay_ms;
        host.set_music_delay(delay_ms);
    }

    pub fn music_delay_ms(&self) -> u32 {
        self.music_delay_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::InputState;
    use crate::res::descriptor::Descriptor;
    use crate::error::ResourceError;

    #[derive(Default)]
    struct RecordingHost {
        played: Vec<(u8, u8, u32)>,
        stopped: Vec<u8>,
    }

    impl Host for RecordingHost {
        fn poll_input(&mut self) -> InputState {
            InputState::default()
        }
        fn present_surface(&mut self, _buffer_rgba: &[u8; 320 * 200 * 4], _delay_ms: u32) {}
        fn load_bank(&mut self, _bank_number: u8) -> Result<Vec<u8>, ResourceError> {
            Ok(Vec::new())
        }
        fn load_resource_descriptors(&mut self) -> Result<Vec<Descriptor>, ResourceError> {
            Ok(Vec::new())
        }
        fn play_sound(&mut self, _sample: &[u8], channel: u8, volume: u8, frequency_hz: u32) {
            self.played.push((channel, volume, frequency_hz));
        }
        fn stop_channel(&mut self, channel: u8) {
            self.stopped.push(channel);
        }
        fn play_music(&mut self, _sample: &[u8], _delay_ms: u32, _offset: u8) {}
        fn stop_music(&mut self) {}
        fn set_music_delay(&mut self, _delay_ms: u32) {}
    }

    #[test]
    fn play_sound_forwards_to_the_host() {
        let mut host = RecordingHost::default();
        let mut controller = Controller::new();
        controller.play_sound(&mut host, &[1, 2, 3], 8000, 40, 2).unwrap();
        assert_eq!(host.played, vec![(2, 40, 8000)]);
    }

    #[test]
    fn out_of_range_channel_is_rejected_before_touching_the_host() {
        let mut host = RecordingHost::default();
        let mut controller = Controller::new();
        let err = controller.play_sound(&mut host, &[], 0, 0, 9).unwrap_err();
        assert_eq!(err, AudioError::InvalidChannel(9));
        assert!(host.played.is_empty());
    }

    #[test]
    fn set_music_delay_updates_both_the_controller_and_the_host() {
        let mut host = RecordingHost::default();
        let mut controller = Controller::new();
        controller.set_music_delay(&mut host, 120);
        assert_eq!(controller.music_delay_ms(), 120);
    }
}
