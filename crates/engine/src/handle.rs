// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduling from outside the reactor thread

use crate::command::{Command, CommandKind};
use crate::deferred::{DeferredCall, OneShotHandle};
use crate::error::{deadline_after, ScheduleError};
use crate::group::Member;
use crate::recurring::{MemberId, RecurringAction, RecurringHandle};
use crate::scheduler::Scheduler;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempo_core::ReactorHandle;

/// Cloneable, `Send` handle to a [`Scheduler`].
///
/// Every structural change is posted to the scheduler's reactor; the
/// returned action handles are usable immediately.
#[derive(Clone)]
pub struct SchedulerHandle {
    reactor: ReactorHandle<Command>,
    members: Arc<AtomicU64>,
}

impl SchedulerHandle {
    pub(crate) fn new(reactor: ReactorHandle<Command>, members: Arc<AtomicU64>) -> Self {
        Self { reactor, members }
    }

    pub fn now(&self) -> Instant {
        self.reactor.now()
    }

    pub fn schedule_once_after<F>(
        &self,
        delay: Duration,
        callback: F,
    ) -> Result<OneShotHandle, ScheduleError>
    where
        F: FnMut(&mut DeferredCall) + Send + 'static,
    {
        self.schedule_once_at(deadline_after(self.now(), delay)?, callback)
    }

    /// Schedule a one-shot from any thread.
    ///
    /// The call is posted to the reactor before its timer is armed, so the
    /// reactor always owns the call by the time the expiry is dispatched.
    pub fn schedule_once_at<F>(
        &self,
        when: Instant,
        callback: F,
    ) -> Result<OneShotHandle, ScheduleError>
    where
        F: FnMut(&mut DeferredCall) + Send + 'static,
    {
        let call = DeferredCall::new(self.reactor.clone(), Box::new(callback))?;
        let id = call.id();
        self.reactor.post(Command(CommandKind::Adopt(call)))?;
        if let Err(e) = self.reactor.arm_timer_at(id.timer(), when) {
            // Already posted; if shutdown also rejects this, the run loop
            // drops the idle call instead
            let _ = self.reactor.post(Command::remove(id));
            return Err(e.into());
        }
        Ok(OneShotHandle::new(id, self.reactor.clone()))
    }

    /// Schedule a recurring callback from any thread.
    ///
    /// The group timer starts counting when the reactor handles the
    /// registration, not when this returns.
    pub fn schedule_recurring<F>(
        &self,
        interval: Duration,
        callback: F,
    ) -> Result<RecurringHandle, ScheduleError>
    where
        F: FnMut(&mut RecurringAction<'_>) + Send + 'static,
    {
        if interval.is_zero() {
            return Err(ScheduleError::ZeroInterval);
        }
        deadline_after(self.now(), interval)?;
        let member = Member::new(MemberId::next(&self.members), Box::new(callback));
        let handle = RecurringHandle::new(
            interval,
            member.id(),
            Arc::clone(member.status()),
            self.reactor.clone(),
        );
        self.reactor
            .post(Command(CommandKind::Join { interval, member }))?;
        Ok(handle)
    }

    /// Run `task` on the reactor with exclusive access to the scheduler
    pub fn post<F>(&self, task: F) -> Result<(), ScheduleError>
    where
        F: FnOnce(&mut Scheduler) + Send + 'static,
    {
        self.reactor.post(Command(CommandKind::Run(Box::new(task))))?;
        Ok(())
    }

    pub fn shutdown(&self) {
        self.reactor.shutdown();
    }

    pub fn is_shut_down(&self) -> bool {
        self.reactor.is_shut_down()
    }
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
