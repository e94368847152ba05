//! Global hotkeys.
//!
//! Key chords, the mute/unmute bindings, and the bookkeeping that maps OS hotkey
//! events back to actions and unregisters everything on shutdown.

#[cfg(windows)]
pub mod global;

use std::collections::HashMap;
use std::fmt;
use std::ops::BitOr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Modifier keys of a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Self = Self(0);
    pub const ALT: Self = Self(1);
    pub const CONTROL: Self = Self(1 << 1);
    pub const SHIFT: Self = Self(1 << 2);
    pub const SUPER: Self = Self(1 << 3);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Modifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A global key combination, e.g. Alt+Shift+P.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chord {
    pub modifiers: Modifiers,

    /// ASCII letter or digit, stored uppercase
    pub key: char,
}

impl Chord {
    pub fn new(modifiers: Modifiers, key: char) -> Self {
        Self {
            modifiers,
            key: key.to_ascii_uppercase(),
        }
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (modifier, label) in [
            (Modifiers::CONTROL, "Ctrl"),
            (Modifiers::ALT, "Alt"),
            (Modifiers::SHIFT, "Shift"),
            (Modifiers::SUPER, "Super"),
        ] {
            if self.modifiers.contains(modifier) {
                write!(f, "{}+", label)?;
            }
        }
        write!(f, "{}", self.key)
    }
}

/// What a hotkey does when pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotkeyAction {
    Mute,
    Unmute,
}

impl HotkeyAction {
    /// The mute flag this action requests.
    pub fn desired_mute(self) -> bool {
        matches!(self, HotkeyAction::Mute)
    }
}

/// A chord bound to an action under an application-unique id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyBinding {
    pub action: HotkeyAction,
    pub chord: Chord,
    pub id: u32,
}

/// The OS-facing side of global hotkey registration.
pub trait HotkeyRegistrar {
    /// Bind `binding`'s chord under `binding.id`. Events for the chord carry
    /// that id.
    fn register(&mut self, binding: &HotkeyBinding) -> Result<(), HotkeyError>;

    /// Release the chord bound under `id`.
    fn unregister(&mut self, id: u32) -> Result<(), HotkeyError>;
}

/// Maps the ids the OS reports for fired chords to binding ids.
///
/// Cloned into the hotkey event handler, which may run on another thread.
#[derive(Debug, Clone, Default)]
pub struct EventIds(Arc<Mutex<HashMap<u32, u32>>>);

impl EventIds {
    pub fn insert(&self, os_id: u32, id: u32) {
        self.lock().insert(os_id, id);
    }

    /// Forget every OS id mapped to binding `id`.
    pub fn remove(&self, id: u32) {
        self.lock().retain(|_, bound| *bound != id);
    }

    pub fn translate(&self, os_id: u32) -> Option<u32> {
        self.lock().get(&os_id).copied()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<u32, u32>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Hotkeys registered by this process.
pub struct HotkeyBindings<R: HotkeyRegistrar> {
    registrar: R,
    active: Vec<HotkeyBinding>,
}

impl<R: HotkeyRegistrar> HotkeyBindings<R> {
    pub fn new(registrar: R) -> Self {
        Self {
            registrar,
            active: Vec::new(),
        }
    }

    /// Register every binding. Failures are logged and skipped.
    ///
    /// Returns the number of bindings that are live.
    pub fn register_all(&mut self, bindings: &[HotkeyBinding]) -> usize {
        for binding in bindings {
            match self.registrar.register(binding) {
                Ok(()) => {
                    info!(hotkey = %binding.chord, id = binding.id, action = ?binding.action, "Global hotkey registered");
                    self.active.push(*binding);
                }
                Err(e) => {
                    warn!(
                        hotkey = %binding.chord,
                        action = ?binding.action,
                        error = %e,
                        "Hotkey unavailable, continuing without it"
                    );
                }
            }
        }
        self.active.len()
    }

    /// Action for a hotkey event, if it is one of ours.
    pub fn action_for(&self, id: u32) -> Option<HotkeyAction> {
        self.active.iter().find(|b| b.id == id).map(|b| b.action)
    }

    pub fn is_registered(&self, action: HotkeyAction) -> bool {
        self.active.iter().any(|b| b.action == action)
    }

    /// Unregister every live hotkey. Subsequent calls do nothing.
    pub fn release(&mut self) {
        for binding in self.active.drain(..) {
            match self.registrar.unregister(binding.id) {
                Ok(()) => debug!(hotkey = %binding.chord, "Global hotkey unregistered"),
                Err(e) => warn!(hotkey = %binding.chord, error = %e, "Failed to unregister hotkey"),
            }
        }
    }
}

/// Hotkey service error types.
#[derive(Debug, Error)]
pub enum HotkeyError {
    #[error("Hotkey manager unavailable: {0}")]
    ManagerUnavailable(String),

    #[error("Failed to register {chord}: {reason}")]
    RegistrationFailed { chord: Chord, reason: String },

    #[error("Unsupported hotkey key: {0:?}")]
    UnsupportedKey(char),

    #[error("Hotkey {0} is not registered")]
    NotRegistered(u32),
}
