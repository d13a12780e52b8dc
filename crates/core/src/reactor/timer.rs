// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exclusively owned reactor timers

use super::Shared;
use crate::error::ReactorError;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Identifier of a timer registered with a reactor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub(crate) u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Why a timer wait was delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    /// The deadline passed
    Expired,
    /// The wait was canceled or superseded by a later arm before it expired
    Canceled,
}

/// A completed timer wait, delivered on the reactor's dispatch path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerEvent {
    pub timer: TimerId,
    pub status: TimerStatus,
    pub(crate) generation: u64,
}

impl TimerEvent {
    pub fn is_expired(&self) -> bool {
        self.status == TimerStatus::Expired
    }
}

/// A one-shot deadline registered with a reactor.
///
/// Owned by exactly one scheduling object. Arming returns immediately; the
/// expiry (or cancellation) is delivered later by [`Reactor::poll`]. Dropping
/// the timer releases it, discarding any pending wait.
///
/// [`Reactor::poll`]: super::Reactor::poll
pub struct Timer {
    id: TimerId,
    shared: Arc<Shared>,
}

impl Timer {
    pub(crate) fn new(id: TimerId, shared: Arc<Shared>) -> Self {
        Self { id, shared }
    }

    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Arm the timer to expire at `deadline`, superseding any pending wait
    pub fn arm_at(&self, deadline: Instant) -> Result<(), ReactorError> {
        self.shared.arm(self.id, deadline)
    }

    /// Arm the timer to expire `duration` from now
    pub fn arm_after(&self, duration: Duration) -> Result<(), ReactorError> {
        let deadline = self
            .shared
            .now()
            .checked_add(duration)
            .ok_or(ReactorError::DeadlineOverflow)?;
        self.arm_at(deadline)
    }

    /// Cancel the pending wait, if any. Idempotent.
    pub fn cancel(&self) -> bool {
        self.shared.cancel(self.id)
    }

    /// The deadline of the pending wait, `None` while idle
    pub fn expires_at(&self) -> Option<Instant> {
        self.shared.expires_at(self.id)
    }

    pub fn is_armed(&self) -> bool {
        self.expires_at().is_some()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.shared.release(self.id);
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("id", &self.id)
            .field("expires_at", &self.expires_at())
            .finish()
    }
}
