//! Default capture endpoint access through the Windows MMDevice API.
//!
//! Every query creates its own enumerator and releases it before returning, so
//! no COM object outlives the operation that needed it.

use super::device::{AudioError, DeviceQuery, DeviceRole, MicDevice};
use tracing::debug;
use windows::core::HRESULT;
use windows::Win32::Devices::Properties::DEVPKEY_Device_FriendlyName;
use windows::Win32::Foundation::ERROR_NOT_FOUND;
use windows::Win32::Media::Audio::Endpoints::IAudioEndpointVolume;
use windows::Win32::Media::Audio::{
    eCapture, eCommunications, eConsole, eMultimedia, ERole, IMMDevice, IMMDeviceEnumerator,
    MMDeviceEnumerator,
};
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoUninitialize, CLSCTX_ALL, COINIT_APARTMENTTHREADED, STGM,
};
use windows::Win32::UI::Shell::PropertiesSystem::PROPERTYKEY;

/// COM initialization guard that uninitializes COM on drop.
pub struct ComGuard {
    initialized: bool,
}

impl ComGuard {
    /// Initialize COM for the current thread.
    pub fn new() -> Result<Self, AudioError> {
        unsafe {
            // Apartment-threaded: the tray icon and hotkey windows live on this thread
            CoInitializeEx(None, COINIT_APARTMENTTHREADED)
                .ok()
                .map_err(AudioError::ComInitFailed)?;
        }
        Ok(Self { initialized: true })
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        if self.initialized {
            unsafe {
                CoUninitialize();
            }
        }
    }
}

/// Resolves the default capture endpoint for one role.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreAudioQuery {
    role: DeviceRole,
}

impl CoreAudioQuery {
    /// Note: COM must be initialized on the calling thread.
    pub fn new(role: DeviceRole) -> Self {
        Self { role }
    }

    fn resolve(&self) -> Result<EndpointMic, AudioError> {
        unsafe {
            let enumerator: IMMDeviceEnumerator =
                CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL)
                    .map_err(AudioError::EnumerationFailed)?;

            let device = enumerator
                .GetDefaultAudioEndpoint(eCapture, erole(self.role))
                .map_err(|e| {
                    if e.code() == HRESULT::from_win32(ERROR_NOT_FOUND.0) {
                        AudioError::NoDefaultDevice
                    } else {
                        AudioError::EnumerationFailed(e)
                    }
                })?;
            drop(enumerator);

            EndpointMic::open(&device)
        }
    }
}

impl DeviceQuery for CoreAudioQuery {
    type Device = EndpointMic;

    fn default_capture_device(&self) -> Option<EndpointMic> {
        match self.resolve() {
            Ok(device) => Some(device),
            Err(AudioError::NoDefaultDevice) => None,
            Err(e) => {
                debug!(error = %e, role = ?self.role, "Default capture device unavailable");
                None
            }
        }
    }
}

fn erole(role: DeviceRole) -> ERole {
    match role {
        DeviceRole::Console => eConsole,
        DeviceRole::Multimedia => eMultimedia,
        DeviceRole::Communications => eCommunications,
    }
}

/// A resolved capture endpoint with its volume control activated.
pub struct EndpointMic {
    name: String,
    endpoint_volume: IAudioEndpointVolume,
}

impl EndpointMic {
    fn open(device: &IMMDevice) -> Result<Self, AudioError> {
        unsafe {
            let endpoint_volume: IAudioEndpointVolume = device
                .Activate(CLSCTX_ALL, None)
                .map_err(|_| AudioError::VolumeNotAvailable)?;

            Ok(Self {
                name: friendly_name(device).unwrap_or_default(),
                endpoint_volume,
            })
        }
    }
}

impl MicDevice for EndpointMic {
    fn friendly_name(&self) -> &str {
        &self.name
    }

    fn is_muted(&self) -> Result<bool, AudioError> {
        unsafe {
            let muted = self
                .endpoint_volume
                .GetMute()
                .map_err(AudioError::WindowsError)?;
            Ok(muted.as_bool())
        }
    }

    fn set_muted(&self, muted: bool) -> Result<(), AudioError> {
        unsafe {
            self.endpoint_volume
                .SetMute(muted, std::ptr::null())
                .map_err(AudioError::WindowsError)
        }
    }
}

/// Read the device's friendly name from its property store.
fn friendly_name(device: &IMMDevice) -> Option<String> {
    unsafe {
        let props = device.OpenPropertyStore(STGM(0)).ok()?; // STGM_READ

        let key = PROPERTYKEY {
            fmtid: DEVPKEY_Device_FriendlyName.fmtid,
            pid: DEVPKEY_Device_FriendlyName.pid,
        };
        let prop = props.GetValue(&key).ok()?;

        let name = prop.to_string();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}
