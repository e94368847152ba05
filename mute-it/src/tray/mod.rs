//! System tray presentation.
//!
//! Derives what the tray icon should show from a device snapshot and pushes it
//! to a [`TrayView`]. The native view lives in [`native`] on Windows.

pub mod icons;
#[cfg(windows)]
pub mod native;

use crate::audio::MicSnapshot;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Windows notification area tooltips hold at most 127 UTF-16 units.
pub const TOOLTIP_MAX_UTF16: usize = 127;

/// Which icon image is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IconVariant {
    #[default]
    Muted,
    Unmuted,
}

/// What the tray icon currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrayState {
    pub icon: IconVariant,

    /// Device friendly name, or empty when there is no device.
    pub tooltip: String,
}

impl TrayState {
    /// Muted unless a device is present and reports itself unmuted.
    pub fn from_snapshot(snapshot: Option<&MicSnapshot>) -> Self {
        match snapshot {
            Some(mic) => Self {
                icon: if mic.is_muted {
                    IconVariant::Muted
                } else {
                    IconVariant::Unmuted
                },
                tooltip: truncate_tooltip(&mic.name),
            },
            None => Self::default(),
        }
    }

    pub fn is_muted(&self) -> bool {
        self.icon == IconVariant::Muted
    }
}

/// Cut `text` to the tooltip limit without splitting a character.
pub fn truncate_tooltip(text: &str) -> String {
    let mut units = 0;
    let mut end = 0;
    for (idx, ch) in text.char_indices() {
        units += ch.len_utf16();
        if units > TOOLTIP_MAX_UTF16 {
            return text[..end].to_string();
        }
        end = idx + ch.len_utf8();
    }
    text.to_string()
}

/// The OS-facing side of the tray icon.
pub trait TrayView {
    /// Show `state`'s icon variant and tooltip.
    fn apply(&mut self, state: &TrayState) -> Result<(), TrayError>;

    /// Remove the icon from the notification area.
    fn hide(&mut self) -> Result<(), TrayError>;
}

/// Owns the tray view and the state it currently shows.
pub struct TrayPresenter<V: TrayView> {
    view: V,
    state: TrayState,
    applied: bool,
    visible: bool,
}

impl<V: TrayView> TrayPresenter<V> {
    /// Wrap a view that is already visible showing the default (muted, empty) state.
    pub fn new(view: V) -> Self {
        Self {
            view,
            state: TrayState::default(),
            applied: false,
            visible: true,
        }
    }

    /// Re-derive the tray state from `snapshot` and push it to the view if it changed.
    pub fn update(&mut self, snapshot: Option<&MicSnapshot>) -> &TrayState {
        let next = TrayState::from_snapshot(snapshot);
        if !self.visible || (self.applied && next == self.state) {
            return &self.state;
        }

        if self.applied && next.icon != self.state.icon {
            info!(muted = next.is_muted(), device = %next.tooltip, "Microphone state changed");
        } else {
            debug!(muted = next.is_muted(), device = %next.tooltip, "Tray state updated");
        }

        match self.view.apply(&next) {
            Ok(()) => {
                self.state = next;
                self.applied = true;
            }
            Err(e) => warn!(error = %e, "Failed to update tray icon"),
        }

        &self.state
    }

    /// Hide the icon. Only the first call reaches the view.
    pub fn hide(&mut self) {
        if !self.visible {
            return;
        }
        self.visible = false;
        if let Err(e) = self.view.hide() {
            warn!(error = %e, "Failed to hide tray icon");
        }
    }

    pub fn state(&self) -> &TrayState {
        &self.state
    }
}

/// Tray service error types.
#[derive(Debug, Error)]
pub enum TrayError {
    #[error("Failed to create tray icon: {0}")]
    CreateFailed(String),

    #[error("Failed to load icon resource: {0}")]
    IconLoadFailed(String),

    #[error("Failed to update tray icon: {0}")]
    UpdateFailed(String),

    #[error("Failed to create menu: {0}")]
    MenuFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeView;

    fn mic(name: &str, is_muted: bool) -> MicSnapshot {
        MicSnapshot {
            name: name.to_string(),
            is_muted,
        }
    }

    #[test]
    fn test_absent_device_shows_muted_with_empty_tooltip() {
        let state = TrayState::from_snapshot(None);
        assert_eq!(state.icon, IconVariant::Muted);
        assert_eq!(state.tooltip, "");
    }

    #[test]
    fn test_icon_follows_mute_flag() {
        let muted = TrayState::from_snapshot(Some(&mic("Desk Mic", true)));
        assert_eq!(muted.icon, IconVariant::Muted);
        assert_eq!(muted.tooltip, "Desk Mic");

        let live = TrayState::from_snapshot(Some(&mic("Desk Mic", false)));
        assert_eq!(live.icon, IconVariant::Unmuted);
        assert_eq!(live.tooltip, "Desk Mic");
    }

    #[test]
    fn test_tooltip_truncated_on_char_boundary() {
        let short = "Microphone (Realtek Audio)";
        assert_eq!(truncate_tooltip(short), short);

        let long = "é".repeat(200);
        let cut = truncate_tooltip(&long);
        assert_eq!(cut.chars().count(), TOOLTIP_MAX_UTF16);

        // Surrogate pairs take two units each and must not be split.
        let emoji = "🎤".repeat(100);
        let cut = truncate_tooltip(&emoji);
        assert_eq!(cut.encode_utf16().count(), 126);
        assert_eq!(cut.chars().count(), 63);
    }

    #[test]
    fn test_tooltip_limit_boundary() {
        let exact = "a".repeat(TOOLTIP_MAX_UTF16);
        assert_eq!(truncate_tooltip(&exact), exact);

        let over = "a".repeat(TOOLTIP_MAX_UTF16 + 1);
        assert_eq!(truncate_tooltip(&over), exact);

        // A pair straddling the limit is dropped whole.
        let straddle = format!("{}🎤", "a".repeat(126));
        assert_eq!(truncate_tooltip(&straddle), "a".repeat(126));
    }

    #[test]
    fn test_first_update_always_applied() {
        let view = FakeView::new();
        let mut presenter = TrayPresenter::new(view.clone());

        presenter.update(None);
        assert_eq!(view.applied(), vec![TrayState::default()]);
    }

    #[test]
    fn test_unchanged_state_not_reapplied() {
        let view = FakeView::new();
        let mut presenter = TrayPresenter::new(view.clone());

        presenter.update(Some(&mic("Desk Mic", false)));
        presenter.update(Some(&mic("Desk Mic", false)));
        presenter.update(Some(&mic("Desk Mic", true)));

        let applied = view.applied();
        assert_eq!(applied.len(), 2);
        assert_eq!(applied[1].icon, IconVariant::Muted);
        assert_eq!(presenter.state().icon, IconVariant::Muted);
    }

    #[test]
    fn test_failed_apply_retried_on_next_update() {
        let view = FakeView::new();
        let mut presenter = TrayPresenter::new(view.clone());

        view.fail_apply(true);
        presenter.update(Some(&mic("Desk Mic", false)));
        assert!(view.applied().is_empty());

        view.fail_apply(false);
        presenter.update(Some(&mic("Desk Mic", false)));
        assert_eq!(view.applied().len(), 1);
        assert_eq!(presenter.state().icon, IconVariant::Unmuted);
    }

    #[test]
    fn test_hide_reaches_view_once() {
        let view = FakeView::new();
        let mut presenter = TrayPresenter::new(view.clone());

        presenter.hide();
        presenter.hide();
        presenter.update(None);

        assert_eq!(view.hides(), 1);
        assert!(!presenter.visible);
        assert!(view.applied().is_empty());
    }
}
