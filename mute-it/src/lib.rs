//! MuteIt - Library
//!
//! A notification area utility that shows whether the default microphone is
//! muted and mutes/unmutes it from global hotkeys or a tray icon double-click.
//!
//! ## Features
//!
//! - Tray icon reflecting the default communications microphone's mute state
//! - Alt+Shift+P mutes, Alt+Shift+O unmutes
//! - Double-click the tray icon to toggle mute
//! - Device state re-queried every second

pub mod app;
pub mod audio;
pub mod config;
pub mod hotkey;
#[cfg(windows)]
pub mod platform;
pub mod poller;
pub mod tray;

#[cfg(test)]
mod testing;

pub use app::{AppError, AppEvent, Flow, MuteIt, Phase};
pub use audio::{AudioError, DeviceQuery, DeviceRole, MicDevice, MicSnapshot};
pub use config::Settings;
pub use hotkey::{Chord, HotkeyAction, HotkeyBinding, HotkeyError, HotkeyRegistrar, Modifiers};
pub use poller::{RefreshTimer, StatePoller, TimerError};
pub use tray::{IconVariant, TrayError, TrayPresenter, TrayState, TrayView};
