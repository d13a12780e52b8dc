// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Messages posted to the scheduler's reactor

use crate::deferred::{CallId, DeferredCall, OneShotFn};
use crate::group::Member;
use crate::recurring::MemberId;
use crate::scheduler::Scheduler;
use std::fmt;
use std::time::Duration;

pub(crate) type Task = Box<dyn FnOnce(&mut Scheduler) + Send>;

/// A structural change to apply on the reactor's dispatch path.
///
/// Handles used outside the reactor never touch the live set or the interval
/// map directly; they post one of these instead.
pub struct Command(pub(crate) CommandKind);

pub(crate) enum CommandKind {
    /// Drop a one-shot from the live set
    Remove(CallId),
    /// Insert a one-shot created by a [`SchedulerHandle`](crate::SchedulerHandle)
    Adopt(DeferredCall),
    /// Swap a one-shot's callback
    Replace(CallId, OneShotFn),
    /// Add a recurring member to the group for `interval`
    Join { interval: Duration, member: Member },
    /// Remove a recurring member from the group for `interval`
    Leave { interval: Duration, member: MemberId },
    /// Run a closure with exclusive access to the scheduler
    Run(Task),
}

impl Command {
    pub(crate) fn remove(id: CallId) -> Self {
        Self(CommandKind::Remove(id))
    }

    pub(crate) fn leave(interval: Duration, member: MemberId) -> Self {
        Self(CommandKind::Leave { interval, member })
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            CommandKind::Remove(id) => write!(f, "Remove({})", id),
            CommandKind::Adopt(call) => write!(f, "Adopt({})", call.id()),
            CommandKind::Replace(id, _) => write!(f, "Replace({})", id),
            CommandKind::Join { interval, member } => {
                write!(f, "Join({:?}, {})", interval, member.id())
            }
            CommandKind::Leave { interval, member } => {
                write!(f, "Leave({:?}, {})", interval, member)
            }
            CommandKind::Run(_) => write!(f, "Run"),
        }
    }
}
