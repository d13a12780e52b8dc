// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-threaded reactor: timer expirations and posted messages
//!
//! The [`Reactor`] is owned by whatever drives the event loop. It hands out
//! [`ReactorHandle`]s that may be used from any thread to arm and cancel
//! timers or to post messages. Everything a handle produces is delivered
//! back to the owner, serially, by [`Reactor::poll`].

mod queue;
mod timer;

pub use timer::{Timer, TimerEvent, TimerId, TimerStatus};

use crate::clock::Clock;
use crate::error::ReactorError;
use queue::TimerQueue;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Notify};

type NowFn = Box<dyn Fn() -> Instant + Send + Sync>;

/// State shared by the reactor, its handles, and its timers
pub(crate) struct Shared {
    timers: Mutex<TimerQueue>,
    wake: Notify,
    now: NowFn,
}

impl Shared {
    fn queue(&self) -> MutexGuard<'_, TimerQueue> {
        self.timers.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn now(&self) -> Instant {
        (self.now)()
    }

    pub(crate) fn arm(&self, id: TimerId, deadline: Instant) -> Result<(), ReactorError> {
        self.queue().arm(id, deadline)?;
        self.wake.notify_one();
        Ok(())
    }

    pub(crate) fn cancel(&self, id: TimerId) -> bool {
        let canceled = self.queue().cancel(id);
        if canceled {
            self.wake.notify_one();
        }
        canceled
    }

    pub(crate) fn release(&self, id: TimerId) {
        self.queue().release(id);
    }

    pub(crate) fn expires_at(&self, id: TimerId) -> Option<Instant> {
        self.queue().expires_at(id)
    }
}

/// One unit of work delivered by [`Reactor::poll`]
#[derive(Debug)]
pub enum Dispatch<M> {
    /// A message posted through a [`ReactorHandle`]
    Message(M),
    /// A timer wait completed (expired or canceled)
    Timer(TimerEvent),
}

/// Thread-safe binding to a reactor
pub struct ReactorHandle<M> {
    shared: Arc<Shared>,
    outbox: mpsc::UnboundedSender<M>,
}

impl<M> Clone for ReactorHandle<M> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            outbox: self.outbox.clone(),
        }
    }
}

impl<M> ReactorHandle<M> {
    /// Current monotonic time as seen by the reactor's clock
    pub fn now(&self) -> Instant {
        self.shared.now()
    }

    /// Register a new idle timer
    pub fn timer(&self) -> Result<Timer, ReactorError> {
        let id = self.shared.queue().register()?;
        Ok(Timer::new(id, Arc::clone(&self.shared)))
    }

    /// Arm a timer by id, for callers that do not own the [`Timer`]
    pub fn arm_timer_at(&self, id: TimerId, deadline: Instant) -> Result<(), ReactorError> {
        self.shared.arm(id, deadline)
    }

    pub fn arm_timer_after(&self, id: TimerId, duration: Duration) -> Result<(), ReactorError> {
        let deadline = self
            .now()
            .checked_add(duration)
            .ok_or(ReactorError::DeadlineOverflow)?;
        self.arm_timer_at(id, deadline)
    }

    /// Cancel a timer's pending wait by id. Safe from any thread; idempotent.
    pub fn cancel_timer(&self, id: TimerId) -> bool {
        self.shared.cancel(id)
    }

    pub fn expires_at(&self, id: TimerId) -> Option<Instant> {
        self.shared.expires_at(id)
    }

    /// Whether `event` still describes its timer's latest wait.
    ///
    /// An expiry collected in a batch goes stale if the timer is re-armed,
    /// canceled, or released before the batch reaches it.
    pub fn is_current(&self, event: &TimerEvent) -> bool {
        self.shared.queue().is_current(event)
    }

    /// Post a message to be delivered on the reactor's dispatch path
    pub fn post(&self, message: M) -> Result<(), ReactorError> {
        if self.is_shut_down() {
            tracing::warn!("post rejected: reactor is shut down");
            return Err(ReactorError::Shutdown);
        }
        self.outbox
            .send(message)
            .map_err(|_| ReactorError::Shutdown)?;
        self.shared.wake.notify_one();
        Ok(())
    }

    /// Stop accepting timers and posts, and wake the driver
    pub fn shutdown(&self) {
        self.shared.queue().close();
        self.shared.wake.notify_one();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.queue().is_closed() || self.outbox.is_closed()
    }

    /// Number of timers currently registered (armed or idle)
    pub fn timer_count(&self) -> usize {
        self.shared.queue().registered()
    }

    /// Number of timers with a pending wait
    pub fn armed_count(&self) -> usize {
        self.shared.queue().armed()
    }

    /// Earliest pending deadline, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        self.shared.queue().next_deadline()
    }
}

/// The event-dispatch loop's owning side
pub struct Reactor<M> {
    handle: ReactorHandle<M>,
    inbox: mpsc::UnboundedReceiver<M>,
}

impl<M> Reactor<M> {
    pub fn new(clock: impl Clock) -> Self {
        let (outbox, inbox) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            timers: Mutex::new(TimerQueue::default()),
            wake: Notify::new(),
            now: Box::new(move || clock.now()),
        });
        Self {
            handle: ReactorHandle { shared, outbox },
            inbox,
        }
    }

    pub fn handle(&self) -> &ReactorHandle<M> {
        &self.handle
    }

    pub fn now(&self) -> Instant {
        self.handle.now()
    }

    /// Collect one batch of ready work.
    ///
    /// Due timers are collected before posted messages are drained, so a
    /// message posted before a timer was armed is always part of the same
    /// batch or an earlier one. The batch lists posted messages first (FIFO),
    /// then canceled waits, then expirations ordered by deadline and arm order.
    pub fn poll(&mut self) -> Vec<Dispatch<M>> {
        let now = self.handle.now();
        let timers = self.handle.shared.queue().collect(now);

        let mut batch = Vec::with_capacity(timers.len());
        while let Ok(message) = self.inbox.try_recv() {
            batch.push(Dispatch::Message(message));
        }
        batch.extend(timers.into_iter().map(Dispatch::Timer));
        batch
    }

    /// Whether `poll` would return anything right now
    pub fn has_ready(&self) -> bool {
        if !self.inbox.is_empty() {
            return true;
        }
        let now = self.handle.now();
        let queue = self.handle.shared.queue();
        queue.has_aborted() || queue.next_deadline().is_some_and(|d| d <= now)
    }

    /// Suspend until the next deadline passes or a handle posts, arms,
    /// cancels, or shuts down.
    pub async fn wait(&self) {
        if self.has_ready() {
            return;
        }
        let wake = self.handle.shared.wake.notified();
        match self.handle.next_deadline() {
            Some(deadline) => {
                let delay = deadline.saturating_duration_since(self.handle.now());
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = wake => {}
                }
            }
            None => wake.await,
        }
    }
}

#[cfg(test)]
#[path = "reactor_tests.rs"]
mod tests;
