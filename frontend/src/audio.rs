//! SDL2 PCM playback: a fixed-channel mixer fed by the VM's audio control
//! surface (`Host::play_sound`/`play_music`/`stop_channel`/`stop_music`).
//! Shaped like the teacher's `AudioPlayer`/`AudioRing` (a shared buffer the
//! SDL callback thread drains while the emulator thread feeds it), but a
//! mixer over a fixed channel table rather than a single ring, since the
//! VM addresses four independent sample channels plus one music channel
//! (spec §4 table, §1 Non-goals: synthesis/resampling fidelity itself is
//! out of scope, so channel mixing here is linear sum-and-clamp, not the
//! original's volume-table/resampling hardware).

use std::sync::{Arc, Mutex};

use sdl2::audio::{AudioCallback, AudioDevice, AudioSpecDesired};

pub const CHANNEL_COUNT: usize = 4;
const DEVICE_HZ: u32 = 44_100;
const MAX_VOLUME: u8 = 63;

/// One playing sample: signed 16-bit PCM (converted from the VM's raw
/// unsigned 8-bit samples), a 16.16 fixed-point read position, and a
/// 16.16 fixed-point step derived from the ratio of the sample's own
/// frequency to the device's output rate.
struct Voice {
    samples: Vec<i16>,
    pos: u32,
    step: u32,
    volume: u8,
}

impl Voice {
    fn new(samples: Vec<i16>, frequency_hz: u32, volume: u8) -> Self {
        let step = ((frequency_hz as u64) << 16) / DEVICE_HZ as u64;
        Self { samples, pos: 0, step: step.max(1) as u32, volume: volume.min(MAX_VOLUME) }
    }

    /// Returns the next mixed-in sample, or `None` once the voice has run
    /// past the end of its data (non-looping playback only, matching
    /// `play_sound`'s one-shot semantics).
    fn next(&mut self) -> Option<i32> {
        let index = (self.pos >> 16) as usize;
        if index >= self.samples.len() {
            return None;
        }
        let raw = self.samples[index] as i32;
        self.pos = self.pos.wrapping_add(self.step);
        Some(raw * self.volume as i32 / MAX_VOLUME as i32)
    }
}

struct MixerState {
    channels: [Option<Voice>; CHANNEL_COUNT],
    music: Option<Voice>,
    music_delay_ms: u32,
}

impl Default for MixerState {
    fn default() -> Self {
        Self { channels: std::array::from_fn(|_| None), music: None, music_delay_ms: 0 }
    }
}

pub type SharedMixer = Arc<Mutex<MixerState>>;

struct Mixer {
    state: SharedMixer,
}

impl AudioCallback for Mixer {
    type Channel = i16;

    fn callback(&mut self, out: &mut [i16]) {
        let mut state = self.state.lock().unwrap();
        for sample in out.iter_mut() {
            let mut acc = 0i32;
            for slot in state.channels.iter_mut() {
                if let Some(voice) = slot {
                    match voice.next() {
                        Some(v) => acc += v,
                        None => *slot = None,
                    }
                }
            }
            if let Some(voice) = state.music.as_mut() {
                match voice.next() {
                    Some(v) => acc += v,
                    None => state.music = None,
                }
            }
            *sample = acc.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        }
    }
}

/// Owns the SDL audio device and the shared mixer state the VM's audio
/// control surface methods push into.
pub struct AudioEngine {
    _device: AudioDevice<Mixer>,
    state: SharedMixer,
}

impl AudioEngine {
    pub fn new(sdl_audio: &sdl2::AudioSubsystem) -> Result<Self, String> {
        let state: SharedMixer = Arc::new(Mutex::new(MixerState::default()));
        let spec = AudioSpecDesired { freq: Some(DEVICE_HZ as i32), channels: Some(1), samples: Some(1024) };
        let device = sdl_audio
            .open_playback(None, &spec, |_spec| Mixer { state: Arc::clone(&state) })
            .map_err(|e| e.to_string())?;
        device.resume();
        Ok(Self { _device: device, state })
    }

    pub fn play_sound(&mut self, sample: &[u8], channel: u8, volume: u8, frequency_hz: u32) {
        let slot = channel as usize;
        if slot >= CHANNEL_COUNT {
            return;
        }
        let samples = to_signed_pcm(sample);
        let mut state = self.state.lock().unwrap();
        state.channels[slot] = Some(Voice::new(samples, frequency_hz, volume));
    }

    pub fn stop_channel(&mut self, channel: u8) {
        if (channel as usize) >= CHANNEL_COUNT {
            return;
        }
        self.state.lock().unwrap().channels[channel as usize] = None;
    }

    pub fn play_music(&mut self, sample: &[u8], delay_ms: u32, offset: u8) {
        let samples = to_signed_pcm(sample);
        let mut state = self.state.lock().unwrap();
        let mut voice = Voice::new(samples, DEVICE_HZ, MAX_VOLUME);
        voice.pos = (offset as u32) << 16;
        state.music = Some(voice);
        if delay_ms > 0 {
            state.music_delay_ms = delay_ms;
        }
    }

    pub fn stop_music(&mut self) {
        self.state.lock().unwrap().music = None;
    }

    pub fn set_music_delay(&mut self, delay_ms: u32) {
        self.state.lock().unwrap().music_delay_ms = delay_ms;
    }
}

/// Converts the VM's raw unsigned 8-bit PCM samples (centered on 128) to
/// signed 16-bit, matching the dynamic range SDL's callback expects.
fn to_signed_pcm(raw: &[u8]) -> Vec<i16> {
    raw.iter().map(|&b| ((b as i16) - 128) * 256).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_signed_pcm_centers_on_zero() {
        assert_eq!(to_signed_pcm(&[128]), vec![0]);
        assert_eq!(to_signed_pcm(&[0]), vec![-32768]);
        assert_eq!(to_signed_pcm(&[255]), vec![32512]);
    }

    #[test]
    fn voice_step_matches_the_frequency_ratio() {
        let voice = Voice::new(vec![0; 4], DEVICE_HZ, MAX_VOLUME);
        assert_eq!(voice.step, 1 << 16);
    }

    #[test]
    fn voice_runs_dry_once_its_samples_are_exhausted() {
        let mut voice = Voice::new(vec![100, 200], DEVICE_HZ, MAX_VOLUME);
        assert!(voice.next().is_some());
        assert!(voice.next().is_some());
        assert!(voice.next().is_none());
    }
}
