// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The scheduling facade and its dispatch loop

use crate::command::{Command, CommandKind};
use crate::deferred::{CallId, DeferredCall, Fired, OneShotHandle};
use crate::error::{deadline_after, ScheduleError};
use crate::group::{IntervalGroup, Member};
use crate::handle::SchedulerHandle;
use crate::recurring::{MemberId, RecurringAction, RecurringHandle};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempo_core::{
    Clock, Dispatch, Reactor, ReactorHandle, SystemClock, TimerEvent, TimerId, TimerStatus,
};
use tracing::{debug, trace, warn};

/// Which owner a timer expiry belongs to
#[derive(Debug, Clone, Copy)]
enum Route {
    Call(CallId),
    Group(Duration),
}

/// Counts describing the scheduler's current state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// One-shot actions in the live set
    pub one_shots: usize,
    /// Interval groups (one per distinct recurring interval)
    pub groups: usize,
    /// Recurring members across all groups
    pub members: usize,
    /// Timers registered with the reactor
    pub timers: usize,
}

/// Owns the reactor binding, the live one-shot set, and the interval map.
///
/// All structural state is mutated on the thread that drives the scheduler
/// (`turn`, `run_pending`, or `run_until`). Other threads go through a
/// [`SchedulerHandle`] or the handles returned by the `schedule_*` methods.
pub struct Scheduler {
    reactor: Reactor<Command>,
    calls: HashMap<CallId, DeferredCall>,
    groups: BTreeMap<Duration, IntervalGroup>,
    routes: HashMap<TimerId, Route>,
    members: Arc<AtomicU64>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Scheduler on the system monotonic clock
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    pub fn with_clock(clock: impl Clock) -> Self {
        Self {
            reactor: Reactor::new(clock),
            calls: HashMap::new(),
            groups: BTreeMap::new(),
            routes: HashMap::new(),
            members: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The reactor binding used to arm timers and post work
    pub fn reactor_handle(&self) -> &ReactorHandle<Command> {
        self.reactor.handle()
    }

    /// A thread-safe handle for scheduling from other contexts
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle::new(self.reactor.handle().clone(), Arc::clone(&self.members))
    }

    pub fn now(&self) -> Instant {
        self.reactor.now()
    }

    /// Schedule `callback` to run once, `delay` from now
    pub fn schedule_once_after<F>(
        &mut self,
        delay: Duration,
        callback: F,
    ) -> Result<OneShotHandle, ScheduleError>
    where
        F: FnMut(&mut DeferredCall) + Send + 'static,
    {
        let when = deadline_after(self.now(), delay)?;
        self.schedule_once_at(when, callback)
    }

    /// Schedule `callback` to run once at `when`
    pub fn schedule_once_at<F>(
        &mut self,
        when: Instant,
        callback: F,
    ) -> Result<OneShotHandle, ScheduleError>
    where
        F: FnMut(&mut DeferredCall) + Send + 'static,
    {
        let call = DeferredCall::new(self.reactor.handle().clone(), Box::new(callback))?;
        call.arm_at(when)?;
        let id = call.id();
        self.insert(call);
        debug!(id = %id, "one-shot scheduled");
        Ok(OneShotHandle::new(id, self.reactor.handle().clone()))
    }

    /// Schedule `callback` to run every `interval`.
    ///
    /// Registrations with equal intervals share one group and one timer.
    pub fn schedule_recurring<F>(
        &mut self,
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
            self.reactor.handle().clone(),
        );
        self.join(interval, member)?;
        Ok(handle)
    }

    /// Drop a one-shot from the live set. Only called on the dispatch path.
    pub(crate) fn remove(&mut self, id: CallId) -> bool {
        match self.calls.remove(&id) {
            Some(call) => {
                self.routes.remove(&call.timer_id());
                debug!(id = %id, "one-shot removed");
                true
            }
            None => {
                trace!(id = %id, "one-shot already removed");
                false
            }
        }
    }

    fn insert(&mut self, call: DeferredCall) {
        self.routes.insert(call.timer_id(), Route::Call(call.id()));
        self.calls.insert(call.id(), call);
    }

    fn join(&mut self, interval: Duration, member: Member) -> Result<(), ScheduleError> {
        if let Some(group) = self.groups.get_mut(&interval) {
            trace!(member = %member.id(), members = group.len() + 1, "joined existing group");
            return group.add(member);
        }

        let timer = match self.reactor.handle().timer() {
            Ok(timer) => timer,
            Err(e) => {
                member.status().cancel();
                return Err(e.into());
            }
        };
        let mut group = IntervalGroup::new(interval, timer);
        group.add(member)?;
        self.routes.insert(group.timer_id(), Route::Group(interval));
        self.groups.insert(interval, group);
        debug!(interval_ms = interval.as_millis() as u64, "interval group created");
        Ok(())
    }

    fn leave(&mut self, interval: Duration, member: MemberId) {
        let Some(group) = self.groups.get_mut(&interval) else {
            trace!(member = %member, "group already gone");
            return;
        };
        if group.remove(member) {
            self.drop_group(interval);
        }
    }

    fn drop_group(&mut self, interval: Duration) {
        if let Some(group) = self.groups.remove(&interval) {
            self.routes.remove(&group.timer_id());
            debug!(interval_ms = interval.as_millis() as u64, "interval group torn down");
        }
    }

    /// Dispatch one batch of ready work. Returns the number of items handled.
    pub fn turn(&mut self) -> usize {
        let batch = self.reactor.poll();
        let handled = batch.len();
        for item in batch {
            match item {
                Dispatch::Message(Command(kind)) => self.apply(kind),
                Dispatch::Timer(event) => self.on_timer(event),
            }
        }
        if self.reactor.handle().is_shut_down() {
            self.drop_idle_calls();
        }
        handled
    }

    /// After shutdown nothing can re-arm, so one-shots without a pending
    /// wait will never fire again.
    fn drop_idle_calls(&mut self) {
        let idle: Vec<CallId> = self
            .calls
            .values()
            .filter(|call| call.deadline().is_none())
            .map(DeferredCall::id)
            .collect();
        for id in idle {
            self.remove(id);
        }
    }

    /// Turn until nothing is ready at the current time.
    ///
    /// A callback that keeps re-arming itself for "now" keeps this looping.
    pub fn run_pending(&mut self) -> usize {
        let mut total = 0;
        loop {
            let handled = self.turn();
            if handled == 0 {
                return total;
            }
            total += handled;
        }
    }

    /// Drive the scheduler until `stop` resolves or the reactor shuts down
    pub async fn run_until<F>(&mut self, stop: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(stop);
        loop {
            self.run_pending();
            if self.reactor.handle().is_shut_down() {
                debug!("reactor shut down, leaving run loop");
                return;
            }
            tokio::select! {
                _ = &mut stop => return,
                _ = self.reactor.wait() => {}
            }
        }
    }

    /// Reject further scheduling and wake the run loop
    pub fn shutdown(&self) {
        self.reactor.handle().shutdown();
    }

    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            one_shots: self.calls.len(),
            groups: self.groups.len(),
            members: self.groups.values().map(IntervalGroup::len).sum(),
            timers: self.reactor.handle().timer_count(),
        }
    }

    /// Member count of the group for `interval`, if one exists
    pub fn group_len(&self, interval: Duration) -> Option<usize> {
        self.groups.get(&interval).map(IntervalGroup::len)
    }

    /// Whether the group for `interval` has its timer armed
    pub fn group_armed(&self, interval: Duration) -> bool {
        self.groups.get(&interval).is_some_and(IntervalGroup::is_armed)
    }

    pub fn contains(&self, id: CallId) -> bool {
        self.calls.contains_key(&id)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.reactor.handle().next_deadline()
    }

    /// No one-shots and no recurring groups remain
    pub fn is_idle(&self) -> bool {
        self.calls.is_empty() && self.groups.is_empty()
    }

    fn apply(&mut self, kind: CommandKind) {
        match kind {
            CommandKind::Remove(id) => {
                self.remove(id);
            }
            CommandKind::Adopt(call) => {
                trace!(id = %call.id(), "one-shot adopted");
                self.insert(call);
            }
            CommandKind::Replace(id, callback) => match self.calls.get_mut(&id) {
                Some(call) => call.replace_callback(callback),
                None => trace!(id = %id, "callback swap for finished one-shot"),
            },
            CommandKind::Join { interval, member } => {
                let id = member.id();
                if let Err(e) = self.join(interval, member) {
                    warn!(member = %id, error = %e, "posted recurring registration failed");
                }
            }
            CommandKind::Leave { interval, member } => self.leave(interval, member),
            CommandKind::Run(task) => task(self),
        }
    }

    fn on_timer(&mut self, event: TimerEvent) {
        if event.status == TimerStatus::Canceled {
            trace!(timer = %event.timer, "wait canceled");
            return;
        }
        if !self.reactor.handle().is_current(&event) {
            trace!(timer = %event.timer, "stale expiry ignored");
            return;
        }
        match self.routes.get(&event.timer).copied() {
            Some(Route::Call(id)) => self.fire_call(id),
            Some(Route::Group(interval)) => self.tick_group(interval),
            None => trace!(timer = %event.timer, "expiry without owner"),
        }
    }

    fn fire_call(&mut self, id: CallId) {
        let Some(call) = self.calls.get_mut(&id) else {
            return;
        };
        let span = tracing::debug_span!("call.fire", id = %id);
        let _guard = span.enter();

        match call.fire() {
            Fired::Rescheduled => trace!("one-shot rescheduled itself"),
            Fired::Canceled => trace!("one-shot canceled itself"),
            Fired::Done => {
                self.remove(id);
            }
        }
    }

    fn tick_group(&mut self, interval: Duration) {
        let Some(group) = self.groups.get_mut(&interval) else {
            return;
        };
        let span = tracing::debug_span!("group.tick", interval_ms = interval.as_millis() as u64);
        let _guard = span.enter();

        let fired = group.tick();
        if group.is_empty() {
            self.drop_group(interval);
            return;
        }
        if let Err(e) = group.rearm() {
            warn!(error = %e, "failed to rearm group timer");
        }
        trace!(fired, members = group.len(), "tick dispatched");
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
