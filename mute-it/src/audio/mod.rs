//! Audio module for the default capture device.
//!
//! The portable half defines the device handle and mute operations; the
//! Windows half talks to the Core Audio endpoint API.

pub mod device;
#[cfg(windows)]
pub mod endpoint;

pub use device::{set_mute, toggle_mute, AudioError, DeviceQuery, DeviceRole, MicDevice, MicSnapshot};
#[cfg(windows)]
pub use endpoint::{ComGuard, CoreAudioQuery, EndpointMic};
