//! Hidden message window and the UI thread's message loop.
//!
//! The window receives the refresh timer and the wake-up messages posted by
//! the tray and hotkey event handlers. The loop turns both into [`AppEvent`]s
//! and hands them to a single handler, one at a time.

use crate::app::{AppEvent, Flow};
use crate::poller::{RefreshTimer, TimerError};
use std::ffi::c_void;
use std::sync::mpsc::Receiver;
use std::time::Duration;
use tracing::debug;
use windows::core::{w, Error, Result, PCWSTR};
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW, KillTimer,
    MessageBoxW, PostMessageW, RegisterClassExW, SetTimer, TranslateMessage, HWND_MESSAGE,
    MB_ICONERROR, MB_OK, MSG, WINDOW_EX_STYLE, WINDOW_STYLE, WM_APP, WM_TIMER, WNDCLASSEXW,
};

/// Posted to the message window when events are waiting in the channel.
pub const WM_APP_WAKE: u32 = WM_APP + 1;

/// Timer id of the refresh timer on the message window.
pub const REFRESH_TIMER_ID: usize = 1;

const WINDOW_CLASS: PCWSTR = w!("MuteItMessageWindow");

/// Show a modal error box. Used for fatal startup errors; the app has no console.
pub fn show_error(msg: &str) {
    unsafe {
        let msg_wide: Vec<u16> = msg.encode_utf16().chain(std::iter::once(0)).collect();
        let _ = MessageBoxW(
            None,
            PCWSTR(msg_wide.as_ptr()),
            w!("MuteIt"),
            MB_OK | MB_ICONERROR,
        );
    }
}

/// Message-only window owned by the UI thread.
pub struct MessageWindow {
    hwnd: HWND,
}

impl MessageWindow {
    pub fn new() -> Result<Self> {
        unsafe {
            let instance: HINSTANCE = GetModuleHandleW(None)?.into();

            let wc = WNDCLASSEXW {
                cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
                lpfnWndProc: Some(window_proc),
                hInstance: instance,
                lpszClassName: WINDOW_CLASS,
                ..Default::default()
            };
            if RegisterClassExW(&wc) == 0 {
                return Err(Error::from_win32());
            }

            let hwnd = CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                WINDOW_CLASS,
                w!("MuteIt"),
                WINDOW_STYLE::default(),
                0,
                0,
                0,
                0,
                HWND_MESSAGE,
                None,
                instance,
                None,
            )?;

            Ok(Self { hwnd })
        }
    }

    /// A handle other code can use to wake the message loop.
    pub fn waker(&self) -> Waker {
        Waker(self.hwnd.0 as isize)
    }

    /// A refresh timer that ticks on this window.
    pub fn timer(&self) -> WindowTimer {
        WindowTimer {
            hwnd: self.hwnd,
            active: false,
        }
    }

    /// Pump messages until `handler` returns [`Flow::Exit`] or the thread
    /// receives `WM_QUIT`.
    pub fn run<F>(&self, events: &Receiver<AppEvent>, mut handler: F) -> Result<()>
    where
        F: FnMut(AppEvent) -> Flow,
    {
        let mut msg = MSG::default();
        loop {
            let ret = unsafe { GetMessageW(&mut msg, None, 0, 0) };
            match ret.0 {
                0 => {
                    debug!("WM_QUIT received");
                    return Ok(());
                }
                -1 => return Err(Error::from_win32()),
                _ => {}
            }

            if msg.hwnd == self.hwnd {
                let flow = match msg.message {
                    WM_TIMER if msg.wParam.0 == REFRESH_TIMER_ID => handler(AppEvent::Tick),
                    WM_APP_WAKE => drain(events, &mut handler),
                    _ => Flow::Continue,
                };
                if flow == Flow::Exit {
                    return Ok(());
                }
            }

            unsafe {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }
}

impl Drop for MessageWindow {
    fn drop(&mut self) {
        unsafe {
            let _ = DestroyWindow(self.hwnd);
        }
    }
}

fn drain<F>(events: &Receiver<AppEvent>, handler: &mut F) -> Flow
where
    F: FnMut(AppEvent) -> Flow,
{
    while let Ok(event) = events.try_recv() {
        if handler(event) == Flow::Exit {
            return Flow::Exit;
        }
    }
    Flow::Continue
}

/// Wakes the message loop from event handlers.
///
/// Holds the window handle as an integer so it can move into the `Send + Sync`
/// handlers the tray and hotkey crates require.
#[derive(Debug, Clone, Copy)]
pub struct Waker(isize);

impl Waker {
    pub fn wake(&self) {
        unsafe {
            let _ = PostMessageW(
                HWND(self.0 as *mut c_void),
                WM_APP_WAKE,
                WPARAM(0),
                LPARAM(0),
            );
        }
    }
}

/// `SetTimer`-based refresh timer. `WM_TIMER` messages are coalesced by the
/// OS, so ticks never queue up behind a slow one.
pub struct WindowTimer {
    hwnd: HWND,
    active: bool,
}

impl RefreshTimer for WindowTimer {
    fn start(&mut self, interval: Duration) -> std::result::Result<(), TimerError> {
        let millis = u32::try_from(interval.as_millis()).unwrap_or(u32::MAX);
        let id = unsafe { SetTimer(self.hwnd, REFRESH_TIMER_ID, millis, None) };
        if id == 0 {
            return Err(TimerError::StartFailed(Error::from_win32().to_string()));
        }
        self.active = true;
        Ok(())
    }

    fn stop(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        unsafe {
            let _ = KillTimer(self.hwnd, REFRESH_TIMER_ID);
        }
    }
}

impl Drop for WindowTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    DefWindowProcW(hwnd, msg, wparam, lparam)
}
