// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Caller-facing side of recurring registrations

use crate::command::Command;
use crate::error::ScheduleError;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempo_core::ReactorHandle;

/// Identity of a recurring member, allocated in registration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberId(u64);

impl MemberId {
    pub(crate) fn next(sequence: &AtomicU64) -> Self {
        Self(sequence.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "member-{}", self.0)
    }
}

/// Lifecycle of a recurring member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurringState {
    /// Fires on every tick of its group
    Active,
    /// Still a member, keeps the group timer armed, skipped on ticks
    Paused,
    /// Terminal; the member is (or is about to be) removed from its group
    Canceled,
}

impl RecurringState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => RecurringState::Active,
            1 => RecurringState::Paused,
            _ => RecurringState::Canceled,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            RecurringState::Active => 0,
            RecurringState::Paused => 1,
            RecurringState::Canceled => 2,
        }
    }
}

impl fmt::Display for RecurringState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecurringState::Active => write!(f, "active"),
            RecurringState::Paused => write!(f, "paused"),
            RecurringState::Canceled => write!(f, "canceled"),
        }
    }
}

/// Member state shared between the group record and the caller's handle.
///
/// Pause and unpause only flip this flag, so they are safe from any thread
/// and take effect at the member's next dispatch.
#[derive(Debug)]
pub(crate) struct MemberStatus(AtomicU8);

impl MemberStatus {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(RecurringState::Active.as_u8()))
    }

    pub(crate) fn get(&self) -> RecurringState {
        RecurringState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Move between Active and Paused; Canceled is sticky
    pub(crate) fn set(&self, state: RecurringState) -> Result<(), ScheduleError> {
        let canceled = RecurringState::Canceled.as_u8();
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                (raw != canceled).then_some(state.as_u8())
            })
            .map(|_| ())
            .map_err(|_| ScheduleError::Canceled)
    }

    /// Returns false if it was already canceled
    pub(crate) fn cancel(&self) -> bool {
        self.0.swap(RecurringState::Canceled.as_u8(), Ordering::AcqRel)
            != RecurringState::Canceled.as_u8()
    }
}

/// Caller-held handle to a recurring registration.
///
/// Safe to use from any thread. Dropping the handle leaves the callback
/// scheduled; [`cancel`](Self::cancel) consumes it.
pub struct RecurringHandle {
    interval: Duration,
    member: MemberId,
    status: Arc<MemberStatus>,
    reactor: ReactorHandle<Command>,
}

impl RecurringHandle {
    pub(crate) fn new(
        interval: Duration,
        member: MemberId,
        status: Arc<MemberStatus>,
        reactor: ReactorHandle<Command>,
    ) -> Self {
        Self {
            interval,
            member,
            status,
            reactor,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn id(&self) -> MemberId {
        self.member
    }

    pub fn state(&self) -> RecurringState {
        self.status.get()
    }

    /// Skip this callback on ticks until unpaused. Membership is kept.
    pub fn pause(&self) -> Result<(), ScheduleError> {
        self.status.set(RecurringState::Paused)
    }

    /// Resume callback delivery from the next tick
    pub fn unpause(&self) -> Result<(), ScheduleError> {
        self.status.set(RecurringState::Active)
    }

    /// Leave the group. The callback will not run again, even if a tick is
    /// already in flight; the membership removal is posted to the reactor.
    pub fn cancel(self) -> Result<(), ScheduleError> {
        if !self.status.cancel() {
            return Err(ScheduleError::Canceled);
        }
        self.reactor
            .post(Command::leave(self.interval, self.member))?;
        tracing::debug!(
            member = %self.member,
            interval_ms = self.interval.as_millis() as u64,
            "recurring cancel requested"
        );
        Ok(())
    }
}

impl fmt::Debug for RecurringHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecurringHandle")
            .field("interval", &self.interval)
            .field("member", &self.member)
            .field("state", &self.state())
            .finish()
    }
}

/// View of a recurring member passed to its callback during a tick
pub struct RecurringAction<'a> {
    interval: Duration,
    member: MemberId,
    status: &'a MemberStatus,
}

impl<'a> RecurringAction<'a> {
    pub(crate) fn new(interval: Duration, member: MemberId, status: &'a MemberStatus) -> Self {
        Self {
            interval,
            member,
            status,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn id(&self) -> MemberId {
        self.member
    }

    /// Skip this callback from the next tick on
    pub fn pause(&mut self) {
        let _ = self.status.set(RecurringState::Paused);
    }

    /// Leave the group once the current tick finishes
    pub fn cancel(&mut self) {
        self.status.cancel();
    }
}

#[cfg(test)]
#[path = "recurring_tests.rs"]
mod tests;
