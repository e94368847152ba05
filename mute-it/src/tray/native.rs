//! Native tray icon backed by the `tray-icon` crate.
//!
//! Owns the notification area icon and its single-entry context menu, and
//! forwards double-clicks and the Exit command into the app's event channel.

use super::{icons, IconVariant, TrayError, TrayState, TrayView};
use crate::app::AppEvent;
use crate::platform::Waker;
use std::sync::mpsc::Sender;
use tracing::info;
use tray_icon::menu::{Menu, MenuEvent, MenuId, MenuItem};
use tray_icon::{Icon, MouseButton, TrayIcon, TrayIconBuilder, TrayIconEvent};

/// The visible tray icon.
pub struct NativeTray {
    tray_icon: TrayIcon,
    exit_item_id: MenuId,
    muted_icon: Icon,
    unmuted_icon: Icon,
}

impl NativeTray {
    /// Create and show the tray icon with `initial` state.
    pub fn new(initial: &TrayState) -> Result<Self, TrayError> {
        let muted_icon = load_icon(IconVariant::Muted)?;
        let unmuted_icon = load_icon(IconVariant::Unmuted)?;

        let menu = Menu::new();
        let exit_item = MenuItem::new("Exit", true, None);
        let exit_item_id = exit_item.id().clone();
        menu.append(&exit_item)
            .map_err(|e| TrayError::MenuFailed(e.to_string()))?;

        let icon = match initial.icon {
            IconVariant::Muted => muted_icon.clone(),
            IconVariant::Unmuted => unmuted_icon.clone(),
        };

        let tray_icon = TrayIconBuilder::new()
            .with_icon(icon)
            .with_tooltip(&initial.tooltip)
            .with_menu(Box::new(menu))
            .with_menu_on_left_click(false)
            .build()
            .map_err(|e| TrayError::CreateFailed(e.to_string()))?;

        info!("System tray icon initialized");

        Ok(Self {
            tray_icon,
            exit_item_id,
            muted_icon,
            unmuted_icon,
        })
    }

    /// Route left double-clicks and the Exit menu entry to `events`.
    ///
    /// Handlers run on the UI thread inside the message pump; `waker` makes the
    /// message loop drain the channel afterwards.
    pub fn forward_events(&self, events: Sender<AppEvent>, waker: Waker) {
        let tray_events = events.clone();
        TrayIconEvent::set_event_handler(Some(move |event: TrayIconEvent| {
            if let TrayIconEvent::DoubleClick {
                button: MouseButton::Left,
                ..
            } = event
            {
                if tray_events.send(AppEvent::TrayDoubleClick).is_ok() {
                    waker.wake();
                }
            }
        }));

        let exit_item_id = self.exit_item_id.clone();
        MenuEvent::set_event_handler(Some(move |event: MenuEvent| {
            if event.id == exit_item_id && events.send(AppEvent::ExitRequested).is_ok() {
                waker.wake();
            }
        }));
    }
}

impl TrayView for NativeTray {
    fn apply(&mut self, state: &TrayState) -> Result<(), TrayError> {
        let icon = match state.icon {
            IconVariant::Muted => self.muted_icon.clone(),
            IconVariant::Unmuted => self.unmuted_icon.clone(),
        };
        self.tray_icon
            .set_icon(Some(icon))
            .map_err(|e| TrayError::UpdateFailed(e.to_string()))?;
        self.tray_icon
            .set_tooltip(Some(&state.tooltip))
            .map_err(|e| TrayError::UpdateFailed(e.to_string()))?;
        Ok(())
    }

    fn hide(&mut self) -> Result<(), TrayError> {
        self.tray_icon
            .set_visible(false)
            .map_err(|e| TrayError::UpdateFailed(e.to_string()))
    }
}

fn load_icon(variant: IconVariant) -> Result<Icon, TrayError> {
    let img = icons::render(variant);
    let (width, height) = img.dimensions();
    Icon::from_rgba(img.into_raw(), width, height)
        .map_err(|e| TrayError::IconLoadFailed(e.to_string()))
}
