//! Periodic device state refresh.

use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// The OS-facing timer that produces refresh ticks.
pub trait RefreshTimer {
    /// Start ticking every `interval`.
    fn start(&mut self, interval: Duration) -> Result<(), TimerError>;

    /// Stop ticking.
    fn stop(&mut self);
}

/// Drives a [`RefreshTimer`] and serializes the ticks it produces.
pub struct StatePoller<T: RefreshTimer> {
    timer: T,
    interval: Duration,
    running: bool,
    in_tick: bool,
}

impl<T: RefreshTimer> StatePoller<T> {
    pub fn new(timer: T, interval: Duration) -> Self {
        Self {
            timer,
            interval,
            running: false,
            in_tick: false,
        }
    }

    pub fn start(&mut self) -> Result<(), TimerError> {
        if self.running {
            return Ok(());
        }
        self.timer.start(self.interval)?;
        self.running = true;
        debug!(interval_ms = self.interval.as_millis() as u64, "Refresh timer started");
        Ok(())
    }

    /// Stop the timer. Only a running timer is stopped, and only once.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.timer.stop();
        debug!("Refresh timer stopped");
    }

    /// Claim the current tick. Returns false if the poller is stopped or a
    /// tick is already in progress.
    pub fn begin_tick(&mut self) -> bool {
        if !self.running || self.in_tick {
            return false;
        }
        self.in_tick = true;
        true
    }

    pub fn end_tick(&mut self) {
        self.in_tick = false;
    }
}

/// Timer error types.
#[derive(Debug, Error)]
pub enum TimerError {
    #[error("Failed to start refresh timer: {0}")]
    StartFailed(String),
}
