//! Capture device abstractions.
//!
//! Defines the handle to the default capture device, the query that resolves it,
//! and the mute operations the rest of the app drives through it.

use thiserror::Error;
use tracing::debug;

/// Audio device role (maps to Windows ERole enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum DeviceRole {
    /// Used by games, system sounds, most general applications
    Console = 0,

    /// Used by music players, video players
    Multimedia = 1,

    /// Used by Teams, Zoom, Discord, and other VoIP applications
    #[default]
    Communications = 2,
}

/// A handle to the default capture device.
///
/// Handles are resolved fresh for every operation and dropped as soon as the
/// operation completes; the OS can change the mute flag behind our back at any time.
pub trait MicDevice {
    /// Human-readable device name (from device properties).
    fn friendly_name(&self) -> &str;

    /// Read the current mute flag.
    fn is_muted(&self) -> Result<bool, AudioError>;

    /// Write the mute flag.
    fn set_muted(&self, muted: bool) -> Result<(), AudioError>;

    /// Flip the mute flag. Returns the new state.
    fn toggle_muted(&self) -> Result<bool, AudioError> {
        let new_state = !self.is_muted()?;
        self.set_muted(new_state)?;
        Ok(new_state)
    }
}

/// Resolves the OS default capture device.
pub trait DeviceQuery {
    type Device: MicDevice;

    /// The default capture device, or `None` when there is no microphone.
    ///
    /// OS failures are reported as `None` as well.
    fn default_capture_device(&self) -> Option<Self::Device>;
}

/// Point-in-time view of a device: its name and the mute flag read once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MicSnapshot {
    pub name: String,
    pub is_muted: bool,
}

impl MicSnapshot {
    /// Read a snapshot from a device. A device whose mute flag cannot be read
    /// is treated as absent.
    pub fn capture<D: MicDevice>(device: Option<&D>) -> Option<Self> {
        let device = device?;
        match device.is_muted() {
            Ok(is_muted) => Some(Self {
                name: device.friendly_name().to_string(),
                is_muted,
            }),
            Err(e) => {
                debug!(error = %e, device = device.friendly_name(), "Mute state unreadable");
                None
            }
        }
    }
}

/// Set the mute flag on `device`. No-op when the device is absent.
pub fn set_mute<D: MicDevice>(device: Option<&D>, desired: bool) {
    if let Some(device) = device {
        if let Err(e) = device.set_muted(desired) {
            debug!(error = %e, desired, "Failed to set mute state");
        }
    }
}

/// Flip the mute flag on `device`. No-op when the device is absent.
pub fn toggle_mute<D: MicDevice>(device: Option<&D>) {
    if let Some(device) = device {
        if let Err(e) = device.toggle_muted() {
            debug!(error = %e, "Failed to toggle mute state");
        }
    }
}

/// Audio service error types.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("No default device available")]
    NoDefaultDevice,

    #[cfg(windows)]
    #[error("COM initialization failed: {0}")]
    ComInitFailed(#[source] windows::core::Error),

    #[cfg(windows)]
    #[error("Failed to enumerate devices: {0}")]
    EnumerationFailed(#[source] windows::core::Error),

    #[error("Volume control not available for device")]
    VolumeNotAvailable,

    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    WindowsError(#[source] windows::core::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeOs;

    #[test]
    fn test_snapshot_of_absent_device_is_none() {
        let os = FakeOs::without_device();
        let device = os.query().default_capture_device();
        assert!(MicSnapshot::capture(device.as_ref()).is_none());
    }

    #[test]
    fn test_snapshot_reads_name_and_mute() {
        let os = FakeOs::with_device("Headset Microphone", true);
        let device = os.query().default_capture_device();
        assert_eq!(
            MicSnapshot::capture(device.as_ref()),
            Some(MicSnapshot {
                name: "Headset Microphone".to_string(),
                is_muted: true,
            })
        );
    }

    #[test]
    fn test_unreadable_mute_flag_counts_as_absent() {
        let os = FakeOs::with_device("USB Mic", false);
        os.fail_calls(true);
        let device = os.query().default_capture_device();
        assert!(device.is_some());
        assert!(MicSnapshot::capture(device.as_ref()).is_none());
    }

    #[test]
    fn test_toggle_is_self_inverse() {
        let os = FakeOs::with_device("USB Mic", false);
        let query = os.query();

        toggle_mute(query.default_capture_device().as_ref());
        assert_eq!(os.muted(), Some(true));

        toggle_mute(query.default_capture_device().as_ref());
        assert_eq!(os.muted(), Some(false));
    }

    #[test]
    fn test_set_mute_is_idempotent() {
        let os = FakeOs::with_device("USB Mic", false);
        let query = os.query();

        set_mute(query.default_capture_device().as_ref(), true);
        set_mute(query.default_capture_device().as_ref(), true);
        assert_eq!(os.muted(), Some(true));
    }

    #[test]
    fn test_mute_ops_on_absent_device_are_noops() {
        let os = FakeOs::without_device();
        let query = os.query();

        set_mute(query.default_capture_device().as_ref(), true);
        toggle_mute(query.default_capture_device().as_ref());
        assert_eq!(os.muted(), None);
        assert_eq!(os.open_handles(), 0);
    }

    #[test]
    fn test_default_role_is_communications() {
        assert_eq!(DeviceRole::default(), DeviceRole::Communications);
        assert_eq!(DeviceRole::Communications as u32, 2);
    }
}
