//! Compiled-in settings.

use crate::audio::DeviceRole;
use crate::hotkey::{Chord, HotkeyAction, HotkeyBinding, Modifiers};
use std::time::Duration;

/// How often the default device is re-queried.
pub const REFRESH_INTERVAL: Duration = Duration::from_millis(1000);

/// Application id of the Alt+Shift+P binding.
pub const MUTE_HOTKEY_ID: u32 = 123;

/// Application id of the Alt+Shift+O binding.
pub const UNMUTE_HOTKEY_ID: u32 = 234;

#[derive(Debug, Clone)]
pub struct Settings {
    pub refresh_interval: Duration,

    /// Role whose default capture endpoint is tracked
    pub capture_role: DeviceRole,

    pub hotkeys: Vec<HotkeyBinding>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_interval: REFRESH_INTERVAL,
            capture_role: DeviceRole::Communications,
            hotkeys: vec![
                HotkeyBinding {
                    action: HotkeyAction::Mute,
                    chord: Chord::new(Modifiers::ALT | Modifiers::SHIFT, 'P'),
                    id: MUTE_HOTKEY_ID,
                },
                HotkeyBinding {
                    action: HotkeyAction::Unmute,
                    chord: Chord::new(Modifiers::ALT | Modifiers::SHIFT, 'O'),
                    id: UNMUTE_HOTKEY_ID,
                },
            ],
        }
    }
}
