//! SDL2 event translation into `ootw_core::host::InputState`, plus the
//! scancode-to-action binding table. Generalizes the teacher's
//! `KeyMap`/`default_key_map` (a `HashMap<Scancode, button id>` built for a
//! machine's variable-shaped `InputButton` list) to this engine's fixed
//! `InputState` fields, and makes it user-overridable via an optional
//! `~/.config/ootw/keymap.toml` (loaded by `main`, not here).

use std::collections::HashMap;

use sdl2::EventPump;
use sdl2::event::Event;
use sdl2::keyboard::{Keycode, Scancode};
use serde::Deserialize;

use ootw_core::host::InputState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    Action,
    PasswordScreen,
}

/// User-facing key-binding config, deserialized straight from
/// `keymap.toml`. Scancode names match SDL2's, e.g. `"Left"`, `"Space"`.
#[derive(Debug, Deserialize)]
pub struct KeyMapConfig {
    #[serde(default)]
    pub left: Option<String>,
    #[serde(default)]
    pub right: Option<String>,
    #[serde(default)]
    pub up: Option<String>,
    #[serde(default)]
    pub down: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub password_screen: Option<String>,
    #[serde(default)]
    pub screenshot: Option<String>,
}

pub struct KeyMap {
    bindings: HashMap<Scancode, Action>,
    screenshot: Scancode,
}

impl KeyMap {
    /// Arrow keys, space, F1, and F12, matching the original game's
    /// keyboard layout plus a frontend-only screenshot hotkey.
    pub fn default_bindings() -> Self {
        let mut bindings = HashMap::new();
        bindings.insert(Scancode::Left, Action::Left);
        bindings.insert(Scancode::Right, Action::Right);
        bindings.insert(Scancode::Up, Action::Up);
        bindings.insert(Scancode::Down, Action::Down);
        bindings.insert(Scancode::Space, Action::Action);
        bindings.insert(Scancode::LCtrl, Action::Action);
        bindings.insert(Scancode::F1, Action::PasswordScreen);
        Self { bindings, screenshot: Scancode::F12 }
    }

    /// Overlays `config` onto the default bindings; fields left `None` in
    /// the config file keep their default binding.
    pub fn from_config(config: &KeyMapConfig) -> Self {
        let mut km = Self::default_bindings();
        let rebind = |km: &mut Self, name: &Option<String>, action: Action| {
            if let Some(scancode) = name.as_deref().and_then(Scancode::from_name) {
                km.bindings.retain(|_, a| *a != action);
                km.bindings.insert(scancode, action);
            }
        };
        rebind(&mut km, &config.left, Action::Left);
        rebind(&mut km, &config.right, Action::Right);
        rebind(&mut km, &config.up, Action::Up);
        rebind(&mut km, &config.down, Action::Down);
        rebind(&mut km, &config.action, Action::Action);
        rebind(&mut km, &config.password_screen, Action::PasswordScreen);
        if let Some(scancode) = config.screenshot.as_deref().and_then(Scancode::from_name) {
            km.screenshot = scancode;
        }
        km
    }

    fn action_for(&self, scancode: Scancode) -> Option<Action> {
        self.bindings.get(&scancode).copied()
    }
}

/// Polls SDL2 events into an `InputState`, latching held direction/action
/// keys and the most recent typed character since the previous poll
/// (spec §6's "joystick/last-key registers").
pub struct Input {
    event_pump: EventPump,
    key_map: KeyMap,
    state: InputState,
    screenshot_requested: bool,
}

impl Input {
    pub fn new(sdl_context: &sdl2::Sdl, key_map: KeyMap) -> Result<Self, String> {
        let event_pump = sdl_context.event_pump()?;
        Ok(Self { event_pump, key_map, state: InputState::default(), screenshot_requested: false })
    }

    pub fn poll(&mut self) -> InputState {
        self.state.last_character = None;
        self.state.show_password_screen = false;

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => self.state.exited = true,
                Event::KeyDown { scancode: Some(Scancode::Escape), .. } => self.state.exited = true,
                Event::KeyDown { scancode: Some(sc), keycode, repeat: false, .. } => {
                    if sc == self.key_map.screenshot {
                        self.screenshot_requested = true;
                    }
                    match self.key_map.action_for(sc) {
                        Some(Action::Left) => self.state.left = true,
                        Some(Action::Right) => self.state.right = true,
                        Some(Action::Up) => self.state.up = true,
                        Some(Action::Down) => self.state.down = true,
                        Some(Action::Action) => self.state.action = true,
                        Some(Action::PasswordScreen) => self.state.show_password_screen = true,
                        None => {}
                    }
                    if let Some(ch) = ascii_char(keycode) {
                        self.state.last_character = Some(ch);
                    }
                }
                Event::KeyUp { scancode: Some(sc), .. } => match self.key_map.action_for(sc) {
                    Some(Action::Left) => self.state.left = false,
                    Some(Action::Right) => self.state.right = false,
                    Some(Action::Up) => self.state.up = false,
                    Some(Action::Down) => self.state.down = false,
                    Some(Action::Action) => self.state.action = false,
                    _ => {}
                },
                _ => {}
            }
        }

        self.state
    }

    /// Consumes and clears the screenshot hotkey flag; called by `SdlHost`
    /// right after `poll` so `present_surface` knows whether to dump the
    /// frame it's about to receive.
    pub fn take_screenshot_requested(&mut self) -> bool {
        std::mem::take(&mut self.screenshot_requested)
    }
}

fn ascii_char(keycode: Option<Keycode>) -> Option<u8> {
    let name = keycode?.name();
    let mut chars = name.chars();
    let ch = chars.next()?;
    if chars.next().is_none() && ch.is_ascii_graphic() {
        Some(ch as u8)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_map_arrow_keys_to_directions() {
        let km = KeyMap::default_bindings();
        assert_eq!(km.action_for(Scancode::Left), Some(Action::Left));
        assert_eq!(km.action_for(Scancode::Space), Some(Action::Action));
        assert_eq!(km.action_for(Scancode::Q), None);
    }

    #[test]
    fn config_rebind_overrides_the_default_and_clears_the_old_slot() {
        let config = KeyMapConfig {
            left: Some("A".to_string()),
            right: None,
            up: None,
            down: None,
            action: None,
            password_screen: None,
            screenshot: None,
        };
        let km = KeyMap::from_config(&config);
        assert_eq!(km.action_for(Scancode::A), Some(Action::Left));
        assert_eq!(km.action_for(Scancode::Left), None);
    }

    #[test]
    fn ascii_char_accepts_single_graphic_characters_only() {
        assert_eq!(ascii_char(Some(Keycode::A)), Some(b'A'));
        assert_eq!(ascii_char(Some(Keycode::Left)), None);
    }
}
