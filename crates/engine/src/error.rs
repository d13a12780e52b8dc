// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for scheduling operations

use std::time::{Duration, Instant};
use tempo_core::ReactorError;
use thiserror::Error;

/// Errors returned by scheduling entry points and handle operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("reactor rejected the request: {0}")]
    Reactor(#[source] ReactorError),
    #[error("action has been canceled")]
    Canceled,
    #[error("one-shot action has already completed")]
    Released,
    #[error("recurring interval must be non-zero")]
    ZeroInterval,
    #[error("deadline is beyond the clock's range")]
    DeadlineOverflow,
}

impl From<ReactorError> for ScheduleError {
    fn from(error: ReactorError) -> Self {
        match error {
            ReactorError::DeadlineOverflow => ScheduleError::DeadlineOverflow,
            other => ScheduleError::Reactor(other),
        }
    }
}

impl ScheduleError {
    /// Map a reactor error raised while touching a one-shot's timer by id
    pub(crate) fn from_one_shot(error: ReactorError) -> Self {
        match error {
            ReactorError::TimerReleased => ScheduleError::Released,
            other => other.into(),
        }
    }
}

/// `now + delay`, or [`ScheduleError::DeadlineOverflow`] if `Instant` cannot hold it
pub(crate) fn deadline_after(now: Instant, delay: Duration) -> Result<Instant, ScheduleError> {
    now.checked_add(delay).ok_or(ScheduleError::DeadlineOverflow)
}
