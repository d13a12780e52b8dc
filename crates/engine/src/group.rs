// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interval groups: one timer shared by every recurring callback of a period

use crate::error::ScheduleError;
use crate::recurring::{MemberId, MemberStatus, RecurringAction, RecurringState};
use std::sync::Arc;
use std::time::Duration;
use tempo_core::{Timer, TimerId};

/// User callback for a recurring action
pub(crate) type RecurringFn = Box<dyn FnMut(&mut RecurringAction<'_>) + Send>;

/// A group's record of one recurring registration
pub(crate) struct Member {
    id: MemberId,
    status: Arc<MemberStatus>,
    callback: RecurringFn,
}

impl Member {
    pub(crate) fn new(id: MemberId, callback: RecurringFn) -> Self {
        Self {
            id,
            status: Arc::new(MemberStatus::new()),
            callback,
        }
    }

    pub(crate) fn id(&self) -> MemberId {
        self.id
    }

    pub(crate) fn status(&self) -> &Arc<MemberStatus> {
        &self.status
    }
}

/// Recurring callbacks that share one period and one timer
pub(crate) struct IntervalGroup {
    interval: Duration,
    timer: Timer,
    members: Vec<Member>,
}

impl IntervalGroup {
    pub(crate) fn new(interval: Duration, timer: Timer) -> Self {
        Self {
            interval,
            timer,
            members: Vec::new(),
        }
    }

    pub(crate) fn timer_id(&self) -> TimerId {
        self.timer.id()
    }

    pub(crate) fn len(&self) -> usize {
        self.members.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.timer.is_armed()
    }

    /// Append a member. The first member arms the group timer; later members
    /// ride on the wait already in flight.
    pub(crate) fn add(&mut self, member: Member) -> Result<(), ScheduleError> {
        if self.members.is_empty() {
            if let Err(e) = self.timer.arm_after(self.interval) {
                member.status.cancel();
                return Err(e.into());
            }
        }
        self.members.push(member);
        Ok(())
    }

    /// Erase a member. Returns true when the group is left empty, in which
    /// case the timer has been canceled and the group should be dropped.
    pub(crate) fn remove(&mut self, id: MemberId) -> bool {
        self.members.retain(|m| m.id != id);
        if self.members.is_empty() {
            self.timer.cancel();
            return true;
        }
        false
    }

    /// Run every active member in insertion order and return how many ran.
    ///
    /// Status is read per member at its turn, so a pause or cancel issued by
    /// an earlier callback in the same tick is honored. Canceled members are
    /// swept after the pass.
    pub(crate) fn tick(&mut self) -> usize {
        let mut fired = 0;
        for member in &mut self.members {
            if member.status.get() != RecurringState::Active {
                continue;
            }
            let mut action = RecurringAction::new(self.interval, member.id, &member.status);
            (member.callback)(&mut action);
            fired += 1;
        }
        self.members
            .retain(|m| m.status.get() != RecurringState::Canceled);
        fired
    }

    /// Arm the next tick one interval from now
    pub(crate) fn rearm(&self) -> Result<(), ScheduleError> {
        self.timer.arm_after(self.interval)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "group_tests.rs"]
mod tests;
