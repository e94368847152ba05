//! Global hotkey registration backed by the `global-hotkey` crate.

use super::{Chord, EventIds, HotkeyBinding, HotkeyError, HotkeyRegistrar, Modifiers};
use crate::app::AppEvent;
use crate::platform::Waker;
use global_hotkey::hotkey::{Code, HotKey, Modifiers as KeyModifiers};
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use std::collections::HashMap;
use std::sync::mpsc::Sender;

/// Registers chords with the OS.
///
/// `global-hotkey` reports fired chords by an id derived from the chord; the
/// registrar records which binding id each one belongs to so events carry the
/// binding id. Must be created on the thread that runs the message loop;
/// dropping the manager releases anything still registered.
pub struct GlobalHotkeys {
    manager: Option<GlobalHotKeyManager>,
    hotkeys: HashMap<u32, HotKey>,
    ids: EventIds,
}

impl GlobalHotkeys {
    /// Create the registrar. If the OS manager cannot be created every
    /// registration fails instead.
    pub fn new() -> Self {
        let manager = match GlobalHotKeyManager::new() {
            Ok(manager) => Some(manager),
            Err(e) => {
                tracing::warn!(error = %e, "Global hotkey manager unavailable");
                None
            }
        };

        Self {
            manager,
            hotkeys: HashMap::new(),
            ids: EventIds::default(),
        }
    }

    /// Route hotkey presses to `events` as their binding id. Key releases and
    /// chords registered elsewhere are ignored.
    pub fn forward_events(&self, events: Sender<AppEvent>, waker: Waker) {
        let ids = self.ids.clone();
        GlobalHotKeyEvent::set_event_handler(Some(move |event: GlobalHotKeyEvent| {
            if event.state != HotKeyState::Pressed {
                return;
            }
            if let Some(id) = ids.translate(event.id) {
                if events.send(AppEvent::Hotkey(id)).is_ok() {
                    waker.wake();
                }
            }
        }));
    }
}

impl Default for GlobalHotkeys {
    fn default() -> Self {
        Self::new()
    }
}

impl HotkeyRegistrar for GlobalHotkeys {
    fn register(&mut self, binding: &HotkeyBinding) -> Result<(), HotkeyError> {
        if self.hotkeys.contains_key(&binding.id) {
            return Err(HotkeyError::RegistrationFailed {
                chord: binding.chord,
                reason: format!("id {} already in use", binding.id),
            });
        }
        let manager = self.manager.as_ref().ok_or_else(|| {
            HotkeyError::ManagerUnavailable("manager was not created".to_string())
        })?;

        let hotkey = to_hotkey(&binding.chord)?;
        manager
            .register(hotkey)
            .map_err(|e| HotkeyError::RegistrationFailed {
                chord: binding.chord,
                reason: e.to_string(),
            })?;

        self.ids.insert(hotkey.id(), binding.id);
        self.hotkeys.insert(binding.id, hotkey);
        Ok(())
    }

    fn unregister(&mut self, id: u32) -> Result<(), HotkeyError> {
        let hotkey = self
            .hotkeys
            .remove(&id)
            .ok_or(HotkeyError::NotRegistered(id))?;
        self.ids.remove(id);
        let manager = self.manager.as_ref().ok_or_else(|| {
            HotkeyError::ManagerUnavailable("manager was not created".to_string())
        })?;

        manager
            .unregister(hotkey)
            .map_err(|e| HotkeyError::ManagerUnavailable(e.to_string()))
    }
}

fn to_hotkey(chord: &Chord) -> Result<HotKey, HotkeyError> {
    let mut mods = KeyModifiers::empty();
    for (modifier, key_modifier) in [
        (Modifiers::ALT, KeyModifiers::ALT),
        (Modifiers::CONTROL, KeyModifiers::CONTROL),
        (Modifiers::SHIFT, KeyModifiers::SHIFT),
        (Modifiers::SUPER, KeyModifiers::SUPER),
    ] {
        if chord.modifiers.contains(modifier) {
            mods |= key_modifier;
        }
    }

    let mods = if mods.is_empty() { None } else { Some(mods) };
    Ok(HotKey::new(mods, key_code(chord.key)?))
}

fn key_code(key: char) -> Result<Code, HotkeyError> {
    let code = match key.to_ascii_uppercase() {
        'A' => Code::KeyA,
        'B' => Code::KeyB,
        'C' => Code::KeyC,
        'D' => Code::KeyD,
        'E' => Code::KeyE,
        'F' => Code::KeyF,
        'G' => Code::KeyG,
        'H' => Code::KeyH,
        'I' => Code::KeyI,
        'J' => Code::KeyJ,
        'K' => Code::KeyK,
        'L' => Code::KeyL,
        'M' => Code::KeyM,
        'N' => Code::KeyN,
        'O' => Code::KeyO,
        'P' => Code::KeyP,
        'Q' => Code::KeyQ,
        'R' => Code::KeyR,
        'S' => Code::KeyS,
        'T' => Code::KeyT,
        'U' => Code::KeyU,
        'V' => Code::KeyV,
        'W' => Code::KeyW,
        'X' => Code::KeyX,
        'Y' => Code::KeyY,
        'Z' => Code::KeyZ,
        '0' => Code::Digit0,
        '1' => Code::Digit1,
        '2' => Code::Digit2,
        '3' => Code::Digit3,
        '4' => Code::Digit4,
        '5' => Code::Digit5,
        '6' => Code::Digit6,
        '7' => Code::Digit7,
        '8' => Code::Digit8,
        '9' => Code::Digit9,
        other => return Err(HotkeyError::UnsupportedKey(other)),
    };
    Ok(code)
}
