//! Polling cadence for the verifying client.
//!
//! The client polls at fixed offsets `0, step, 2 * step, ...` up to and
//! including `window`. Both values are kept as named configuration rather than
//! a loop bound, so the default 30 second window at 3 second steps yields
//! eleven polls.

use std::time::Duration;

use thiserror::Error;

use crate::defaults::{DEFAULT_POLL_STEP_SECS, DEFAULT_POLL_WINDOW_SECS};

/// Errors raised while building a [`PollSchedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// A zero step would never advance through the window.
    #[error("poll step must be greater than zero")]
    ZeroStep,
}

/// Total polling window and the step between polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    window: Duration,
    step: Duration,
}

impl PollSchedule {
    /// Builds a schedule, rejecting a zero step.
    pub fn new(window: Duration, step: Duration) -> Result<Self, ScheduleError> {
        if step.is_zero() {
            return Err(ScheduleError::ZeroStep);
        }
        Ok(Self { window, step })
    }

    /// Builds a schedule from whole seconds.
    pub fn from_secs(window_secs: u64, step_secs: u64) -> Result<Self, ScheduleError> {
        Self::new(
            Duration::from_secs(window_secs),
            Duration::from_secs(step_secs),
        )
    }

    /// Total polling window.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Interval between consecutive polls.
    #[must_use]
    pub const fn step(&self) -> Duration {
        self.step
    }

    /// Number of polls, counting both the first offset and the last one that
    /// still fits in the window.
    #[must_use]
    pub fn poll_count(&self) -> u64 {
        let steps = self
            .window
            .as_nanos()
            .checked_div(self.step.as_nanos())
            .unwrap_or(0);
        u64::try_from(steps).map_or(u64::MAX, |steps| steps.saturating_add(1))
    }
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(DEFAULT_POLL_WINDOW_SECS),
            step: Duration::from_secs(DEFAULT_POLL_STEP_SECS),
        }
    }
}
