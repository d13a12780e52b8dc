// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot deferred calls
//!
//! A [`DeferredCall`] fires its callback once, at or after its deadline. The
//! callback receives the call by `&mut`, so it may `reset` itself to fire
//! again; a call whose timer is not re-armed by the time the callback returns
//! is removed from the scheduler.

use crate::command::{Command, CommandKind};
use crate::error::{deadline_after, ScheduleError};
use std::fmt;
use std::time::{Duration, Instant};
use tempo_core::{ReactorHandle, Timer, TimerId};

/// User callback for a one-shot action
pub(crate) type OneShotFn = Box<dyn FnMut(&mut DeferredCall) + Send>;

/// Stable identity of a one-shot action within its scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallId(TimerId);

impl CallId {
    pub(crate) fn timer(self) -> TimerId {
        self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "call-{}", self.0)
    }
}

/// Outcome of one expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fired {
    /// The callback re-armed the timer
    Rescheduled,
    /// The callback canceled the call; removal is already posted
    Canceled,
    /// Not re-armed: the call is finished
    Done,
}

/// A pending one-shot invocation, owned by the scheduler's live set
pub struct DeferredCall {
    id: CallId,
    timer: Timer,
    callback: Option<OneShotFn>,
    canceled: bool,
    reactor: ReactorHandle<Command>,
}

impl DeferredCall {
    pub(crate) fn new(
        reactor: ReactorHandle<Command>,
        callback: OneShotFn,
    ) -> Result<Self, ScheduleError> {
        let timer = reactor.timer()?;
        Ok(Self {
            id: CallId(timer.id()),
            timer,
            callback: Some(callback),
            canceled: false,
            reactor,
        })
    }

    pub fn id(&self) -> CallId {
        self.id
    }

    /// Deadline of the pending wait, `None` once fired or canceled
    pub fn deadline(&self) -> Option<Instant> {
        self.timer.expires_at()
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled
    }

    /// Reschedule to fire `delay` from now, superseding any pending wait
    pub fn reset_after(&mut self, delay: Duration) -> Result<(), ScheduleError> {
        self.reset_at(deadline_after(self.reactor.now(), delay)?)
    }

    /// Reschedule to fire at `when`, superseding any pending wait
    pub fn reset_at(&mut self, when: Instant) -> Result<(), ScheduleError> {
        if self.canceled {
            return Err(ScheduleError::Canceled);
        }
        self.timer.arm_at(when)?;
        Ok(())
    }

    /// Reschedule with a new callback
    pub fn reset_after_with<F>(&mut self, delay: Duration, callback: F) -> Result<(), ScheduleError>
    where
        F: FnMut(&mut DeferredCall) + Send + 'static,
    {
        self.reset_after(delay)?;
        self.callback = Some(Box::new(callback));
        Ok(())
    }

    pub fn reset_at_with<F>(&mut self, when: Instant, callback: F) -> Result<(), ScheduleError>
    where
        F: FnMut(&mut DeferredCall) + Send + 'static,
    {
        self.reset_at(when)?;
        self.callback = Some(Box::new(callback));
        Ok(())
    }

    /// Cancel the call and post its removal. Idempotent.
    pub fn cancel(&mut self) -> Result<(), ScheduleError> {
        if self.canceled {
            return Ok(());
        }
        self.canceled = true;
        self.timer.cancel();
        self.reactor.post(Command::remove(self.id))?;
        Ok(())
    }

    pub(crate) fn timer_id(&self) -> TimerId {
        self.timer.id()
    }

    pub(crate) fn arm_at(&self, when: Instant) -> Result<(), ScheduleError> {
        self.timer.arm_at(when)?;
        Ok(())
    }

    pub(crate) fn replace_callback(&mut self, callback: OneShotFn) {
        self.callback = Some(callback);
    }

    /// Invoke the callback for a genuine expiry
    pub(crate) fn fire(&mut self) -> Fired {
        if self.canceled {
            return Fired::Canceled;
        }
        let Some(mut callback) = self.callback.take() else {
            return Fired::Done;
        };

        callback(self);

        // A `reset_*_with` inside the callback installed a replacement
        if self.callback.is_none() {
            self.callback = Some(callback);
        }

        if self.canceled {
            return Fired::Canceled;
        }
        // A deadline still in the past means the callback did not reschedule
        match self.timer.expires_at() {
            Some(deadline) if deadline >= self.reactor.now() => Fired::Rescheduled,
            Some(_) => {
                self.timer.cancel();
                Fired::Done
            }
            None => Fired::Done,
        }
    }
}

impl fmt::Debug for DeferredCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredCall")
            .field("id", &self.id)
            .field("deadline", &self.deadline())
            .field("canceled", &self.canceled)
            .finish()
    }
}

/// Caller-held handle to a one-shot action.
///
/// Safe to use from any thread. Dropping the handle does not cancel the
/// action; [`cancel`](Self::cancel) consumes it.
pub struct OneShotHandle {
    id: CallId,
    reactor: ReactorHandle<Command>,
}

impl OneShotHandle {
    pub(crate) fn new(id: CallId, reactor: ReactorHandle<Command>) -> Self {
        Self { id, reactor }
    }

    pub fn id(&self) -> CallId {
        self.id
    }

    /// Deadline of the pending wait, `None` once fired, canceled, or finished
    pub fn deadline(&self) -> Option<Instant> {
        self.reactor.expires_at(self.id.timer())
    }

    pub fn reset_after(&self, delay: Duration) -> Result<(), ScheduleError> {
        self.reset_at(deadline_after(self.reactor.now(), delay)?)
    }

    /// Reschedule to fire at `when`.
    ///
    /// Fails with [`ScheduleError::Released`] once the action has finished.
    pub fn reset_at(&self, when: Instant) -> Result<(), ScheduleError> {
        self.reactor
            .arm_timer_at(self.id.timer(), when)
            .map_err(ScheduleError::from_one_shot)
    }

    pub fn reset_after_with<F>(&self, delay: Duration, callback: F) -> Result<(), ScheduleError>
    where
        F: FnMut(&mut DeferredCall) + Send + 'static,
    {
        self.reset_at_with(deadline_after(self.reactor.now(), delay)?, callback)
    }

    /// Reschedule with a new callback. The swap is posted ahead of the re-arm,
    /// so the new deadline always runs the new callback.
    pub fn reset_at_with<F>(&self, when: Instant, callback: F) -> Result<(), ScheduleError>
    where
        F: FnMut(&mut DeferredCall) + Send + 'static,
    {
        self.reactor
            .post(Command(CommandKind::Replace(self.id, Box::new(callback))))?;
        self.reset_at(when)
    }

    /// Cancel the action: the timer is canceled now, the removal is posted
    /// to the reactor.
    pub fn cancel(self) -> Result<(), ScheduleError> {
        self.reactor.cancel_timer(self.id.timer());
        self.reactor.post(Command::remove(self.id))?;
        tracing::debug!(id = %self.id, "one-shot cancel requested");
        Ok(())
    }
}

impl fmt::Debug for OneShotHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OneShotHandle")
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(test)]
#[path = "deferred_tests.rs"]
mod tests;
