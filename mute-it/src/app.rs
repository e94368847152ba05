//! Application context and event handling.
//!
//! [`MuteIt`] owns the tray presenter, the refresh poller and the hotkey
//! bindings. The message loop hands it every [`AppEvent`]; all state changes
//! happen here, one event at a time.

use crate::audio::{self, DeviceQuery, MicSnapshot};
use crate::config::Settings;
use crate::hotkey::{HotkeyAction, HotkeyBindings, HotkeyRegistrar};
use crate::poller::{RefreshTimer, StatePoller, TimerError};
use crate::tray::{TrayPresenter, TrayState, TrayView};
use thiserror::Error;
use tracing::{debug, info};

/// Events delivered by the message loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// Refresh timer elapsed
    Tick,

    /// A global hotkey fired; carries the binding id
    Hotkey(u32),

    /// Left double-click on the tray icon
    TrayDoubleClick,

    /// Exit chosen from the tray menu
    ExitRequested,
}

/// Whether the message loop should keep running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    ShuttingDown,
}

/// The single owner of the tray icon, refresh timer and hotkeys.
pub struct MuteIt<Q, V, R, T>
where
    Q: DeviceQuery,
    V: TrayView,
    R: HotkeyRegistrar,
    T: RefreshTimer,
{
    query: Q,
    tray: TrayPresenter<V>,
    hotkeys: HotkeyBindings<R>,
    poller: StatePoller<T>,
    phase: Phase,
}

impl<Q, V, R, T> MuteIt<Q, V, R, T>
where
    Q: DeviceQuery,
    V: TrayView,
    R: HotkeyRegistrar,
    T: RefreshTimer,
{
    /// Take ownership of an already visible tray view, show the current device
    /// state, start polling and register the hotkeys.
    ///
    /// If starting fails, everything acquired so far is released before the
    /// error is returned.
    pub fn start(
        query: Q,
        view: V,
        registrar: R,
        timer: T,
        settings: &Settings,
    ) -> Result<Self, AppError> {
        let mut app = Self {
            query,
            tray: TrayPresenter::new(view),
            hotkeys: HotkeyBindings::new(registrar),
            poller: StatePoller::new(timer, settings.refresh_interval),
            phase: Phase::Running,
        };

        app.refresh_state();
        app.poller.start()?;
        let live = app.hotkeys.register_all(&settings.hotkeys);

        info!(
            hotkeys = live,
            interval_ms = settings.refresh_interval.as_millis() as u64,
            "MuteIt running"
        );
        Ok(app)
    }

    /// Dispatch one event.
    pub fn handle(&mut self, event: AppEvent) -> Flow {
        if self.phase != Phase::Running {
            return Flow::Exit;
        }

        match event {
            AppEvent::Tick => self.on_tick(),
            AppEvent::Hotkey(event_id) => match self.hotkeys.action_for(event_id) {
                Some(action) => {
                    debug!(?action, "Hotkey pressed");
                    self.set_mute_state(action.desired_mute());
                }
                None => debug!(event_id, "Ignoring unknown hotkey"),
            },
            AppEvent::TrayDoubleClick => {
                self.toggle_mute_state();
            }
            AppEvent::ExitRequested => return self.shutdown(),
        }

        Flow::Continue
    }

    fn on_tick(&mut self) {
        if !self.poller.begin_tick() {
            return;
        }
        self.refresh_state();
        self.poller.end_tick();
    }

    /// Query the device and update the tray.
    pub fn refresh_state(&mut self) -> &TrayState {
        let device = self.query.default_capture_device();
        let snapshot = MicSnapshot::capture(device.as_ref());
        drop(device);
        self.tray.update(snapshot.as_ref())
    }

    /// Mute or unmute the device, then update the tray.
    pub fn set_mute_state(&mut self, muted: bool) -> &TrayState {
        let device = self.query.default_capture_device();
        audio::set_mute(device.as_ref(), muted);
        let snapshot = MicSnapshot::capture(device.as_ref());
        drop(device);
        self.tray.update(snapshot.as_ref())
    }

    /// Flip the device's mute flag, then update the tray.
    pub fn toggle_mute_state(&mut self) -> &TrayState {
        let device = self.query.default_capture_device();
        audio::toggle_mute(device.as_ref());
        let snapshot = MicSnapshot::capture(device.as_ref());
        drop(device);
        self.tray.update(snapshot.as_ref())
    }

    /// Hide the icon, stop the timer and unregister the hotkeys.
    ///
    /// Only the first call has any effect.
    pub fn shutdown(&mut self) -> Flow {
        if self.phase == Phase::ShuttingDown {
            return Flow::Exit;
        }
        self.phase = Phase::ShuttingDown;
        info!("Shutting down");

        self.tray.hide();
        self.poller.stop();
        self.hotkeys.release();

        Flow::Exit
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn tray_state(&self) -> &TrayState {
        self.tray.state()
    }

    pub fn is_hotkey_registered(&self, action: HotkeyAction) -> bool {
        self.hotkeys.is_registered(action)
    }
}

impl<Q, V, R, T> Drop for MuteIt<Q, V, R, T>
where
    Q: DeviceQuery,
    V: TrayView,
    R: HotkeyRegistrar,
    T: RefreshTimer,
{
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Fatal startup errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Timer(#[from] TimerError),
}
