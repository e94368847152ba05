//! In-memory stand-ins for the OS collaborators, shared by the unit tests.
//!
//! Every fake is a cheap clone over shared state so a test can hand one copy
//! to the code under test and inspect the other.

use crate::audio::{AudioError, DeviceQuery, MicDevice};
use crate::hotkey::{HotkeyBinding, HotkeyError, HotkeyRegistrar};
use crate::poller::{RefreshTimer, TimerError};
use crate::tray::{TrayError, TrayState, TrayView};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;

struct Endpoint {
    name: String,
    muted: bool,
}

#[derive(Default)]
struct OsState {
    device: Option<Endpoint>,
    fail: bool,
    open_handles: usize,
    queries: usize,
}

/// The audio subsystem: at most one default capture device.
#[derive(Clone, Default)]
pub struct FakeOs(Rc<RefCell<OsState>>);

impl FakeOs {
    pub fn with_device(name: &str, muted: bool) -> Self {
        let os = Self::default();
        os.plug(name, muted);
        os
    }

    pub fn without_device() -> Self {
        Self::default()
    }

    pub fn query(&self) -> FakeQuery {
        FakeQuery { os: self.clone() }
    }

    pub fn plug(&self, name: &str, muted: bool) {
        self.0.borrow_mut().device = Some(Endpoint {
            name: name.to_string(),
            muted,
        });
    }

    pub fn unplug(&self) {
        self.0.borrow_mut().device = None;
    }

    /// Another application changes the mute flag.
    pub fn set_muted_externally(&self, muted: bool) {
        if let Some(device) = self.0.borrow_mut().device.as_mut() {
            device.muted = muted;
        }
    }

    /// Make every volume call on resolved handles fail.
    pub fn fail_calls(&self, fail: bool) {
        self.0.borrow_mut().fail = fail;
    }

    /// Mute flag of the current device, `None` when unplugged.
    pub fn muted(&self) -> Option<bool> {
        self.0.borrow().device.as_ref().map(|d| d.muted)
    }

    pub fn open_handles(&self) -> usize {
        self.0.borrow().open_handles
    }

    pub fn queries(&self) -> usize {
        self.0.borrow().queries
    }
}

pub struct FakeQuery {
    os: FakeOs,
}

impl DeviceQuery for FakeQuery {
    type Device = FakeDevice;

    fn default_capture_device(&self) -> Option<FakeDevice> {
        let mut state = self.os.0.borrow_mut();
        state.queries += 1;
        let name = state.device.as_ref()?.name.clone();
        state.open_handles += 1;
        Some(FakeDevice {
            os: self.os.clone(),
            name,
        })
    }
}

pub struct FakeDevice {
    os: FakeOs,
    name: String,
}

impl MicDevice for FakeDevice {
    fn friendly_name(&self) -> &str {
        &self.name
    }

    fn is_muted(&self) -> Result<bool, AudioError> {
        let state = self.os.0.borrow();
        if state.fail {
            return Err(AudioError::VolumeNotAvailable);
        }
        state
            .device
            .as_ref()
            .map(|d| d.muted)
            .ok_or(AudioError::NoDefaultDevice)
    }

    fn set_muted(&self, muted: bool) -> Result<(), AudioError> {
        let mut state = self.os.0.borrow_mut();
        if state.fail {
            return Err(AudioError::VolumeNotAvailable);
        }
        let device = state.device.as_mut().ok_or(AudioError::NoDefaultDevice)?;
        device.muted = muted;
        Ok(())
    }
}

impl Drop for FakeDevice {
    fn drop(&mut self) {
        self.os.0.borrow_mut().open_handles -= 1;
    }
}

#[derive(Default)]
struct ViewLog {
    applied: Vec<TrayState>,
    hides: usize,
    fail_apply: bool,
}

#[derive(Clone, Default)]
pub struct FakeView(Rc<RefCell<ViewLog>>);

impl FakeView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_apply(&self, fail: bool) {
        self.0.borrow_mut().fail_apply = fail;
    }

    pub fn applied(&self) -> Vec<TrayState> {
        self.0.borrow().applied.clone()
    }

    pub fn hides(&self) -> usize {
        self.0.borrow().hides
    }
}

impl TrayView for FakeView {
    fn apply(&mut self, state: &TrayState) -> Result<(), TrayError> {
        let mut log = self.0.borrow_mut();
        if log.fail_apply {
            return Err(TrayError::UpdateFailed("injected failure".to_string()));
        }
        log.applied.push(state.clone());
        Ok(())
    }

    fn hide(&mut self) -> Result<(), TrayError> {
        self.0.borrow_mut().hides += 1;
        Ok(())
    }
}

#[derive(Default)]
struct RegistrarState {
    occupied: HashSet<u32>,
    registered: Vec<u32>,
    unregistered: Vec<u32>,
}

/// Rejects occupied and duplicate binding ids.
#[derive(Clone, Default)]
pub struct FakeRegistrar(Rc<RefCell<RegistrarState>>);

impl FakeRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend another process already owns the binding with `id`.
    pub fn occupy(&self, id: u32) {
        self.0.borrow_mut().occupied.insert(id);
    }

    pub fn registered(&self) -> Vec<u32> {
        self.0.borrow().registered.clone()
    }

    pub fn unregistered(&self) -> Vec<u32> {
        self.0.borrow().unregistered.clone()
    }
}

impl HotkeyRegistrar for FakeRegistrar {
    fn register(&mut self, binding: &HotkeyBinding) -> Result<(), HotkeyError> {
        let mut state = self.0.borrow_mut();
        if state.occupied.contains(&binding.id) || state.registered.contains(&binding.id) {
            return Err(HotkeyError::RegistrationFailed {
                chord: binding.chord,
                reason: "already registered".to_string(),
            });
        }
        state.registered.push(binding.id);
        Ok(())
    }

    fn unregister(&mut self, id: u32) -> Result<(), HotkeyError> {
        let mut state = self.0.borrow_mut();
        let pos = state
            .registered
            .iter()
            .position(|registered| *registered == id)
            .ok_or(HotkeyError::NotRegistered(id))?;
        state.registered.remove(pos);
        state.unregistered.push(id);
        Ok(())
    }
}

#[derive(Default)]
struct TimerLog {
    starts: Vec<Duration>,
    stops: usize,
    fail_start: bool,
}

#[derive(Clone, Default)]
pub struct FakeTimer(Rc<RefCell<TimerLog>>);

impl FakeTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_start(&self, fail: bool) {
        self.0.borrow_mut().fail_start = fail;
    }

    pub fn starts(&self) -> Vec<Duration> {
        self.0.borrow().starts.clone()
    }

    pub fn stops(&self) -> usize {
        self.0.borrow().stops
    }
}

impl RefreshTimer for FakeTimer {
    fn start(&mut self, interval: Duration) -> Result<(), TimerError> {
        let mut log = self.0.borrow_mut();
        if log.fail_start {
            return Err(TimerError::StartFailed("injected failure".to_string()));
        }
        log.starts.push(interval);
        Ok(())
    }

    fn stop(&mut self) {
        self.0.borrow_mut().stops += 1;
    }
}
