// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deadline-ordered timer queue

use super::timer::{TimerEvent, TimerId, TimerStatus};
use crate::error::ReactorError;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::time::Instant;

/// Stale waits tolerated beyond one per registered timer before compacting
const STALE_SLACK: usize = 64;

/// One outstanding wait. Earliest deadline first, ties broken by arm order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct PendingWait {
    deadline: Instant,
    seq: u64,
    id: TimerId,
    generation: u64,
}

#[derive(Debug, Default)]
struct TimerSlot {
    armed: Option<Instant>,
    /// Bumped on every arm and cancel; waits from older generations are stale
    generation: u64,
}

/// Registered timers plus their pending waits
#[derive(Debug, Default)]
pub(crate) struct TimerQueue {
    slots: HashMap<TimerId, TimerSlot>,
    waits: BinaryHeap<Reverse<PendingWait>>,
    aborted: VecDeque<TimerId>,
    next_id: u64,
    next_seq: u64,
    closed: bool,
}

impl TimerQueue {
    pub(crate) fn register(&mut self) -> Result<TimerId, ReactorError> {
        if self.closed {
            return Err(ReactorError::Shutdown);
        }
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.slots.insert(id, TimerSlot::default());
        Ok(id)
    }

    pub(crate) fn arm(&mut self, id: TimerId, deadline: Instant) -> Result<(), ReactorError> {
        if self.closed {
            return Err(ReactorError::Shutdown);
        }
        let slot = self
            .slots
            .get_mut(&id)
            .ok_or(ReactorError::TimerReleased)?;

        if slot.armed.is_some() {
            self.aborted.push_back(id);
        }
        slot.generation += 1;
        slot.armed = Some(deadline);

        let seq = self.next_seq;
        self.next_seq += 1;
        self.waits.push(Reverse(PendingWait {
            deadline,
            seq,
            id,
            generation: slot.generation,
        }));
        self.compact();
        Ok(())
    }

    /// Cancel the pending wait. Returns true if a wait was pending.
    ///
    /// The generation is bumped even for an idle timer, so an expiry already
    /// collected into the batch being dispatched goes stale.
    pub(crate) fn cancel(&mut self, id: TimerId) -> bool {
        let Some(slot) = self.slots.get_mut(&id) else {
            return false;
        };
        slot.generation += 1;
        let was_armed = slot.armed.take().is_some();
        if was_armed {
            self.aborted.push_back(id);
        }
        self.compact();
        was_armed
    }

    /// Forget a timer. Its queued waits become stale and are dropped silently.
    pub(crate) fn release(&mut self, id: TimerId) {
        self.slots.remove(&id);
        self.compact();
    }

    /// Drop superseded waits once they outnumber the live ones.
    ///
    /// Each timer has at most one live wait, so anything past
    /// `slots.len()` is stale. Rebuilding only after the slack doubles keeps
    /// re-arming amortized O(log n).
    fn compact(&mut self) {
        if self.waits.len() <= 2 * self.slots.len() + STALE_SLACK {
            return;
        }
        let slots = &self.slots;
        self.waits.retain(|Reverse(wait)| {
            slots
                .get(&wait.id)
                .is_some_and(|slot| slot.generation == wait.generation && slot.armed.is_some())
        });
    }

    #[cfg(test)]
    pub(crate) fn pending_waits(&self) -> usize {
        self.waits.len()
    }

    pub(crate) fn expires_at(&self, id: TimerId) -> Option<Instant> {
        self.slots.get(&id).and_then(|slot| slot.armed)
    }

    /// Whether `event` still describes the timer's latest wait
    pub(crate) fn is_current(&self, event: &TimerEvent) -> bool {
        self.slots
            .get(&event.timer)
            .is_some_and(|slot| slot.generation == event.generation)
    }

    pub(crate) fn registered(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn armed(&self) -> usize {
        self.slots.values().filter(|s| s.armed.is_some()).count()
    }

    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.slots.values().filter_map(|s| s.armed).min()
    }

    pub(crate) fn has_aborted(&self) -> bool {
        !self.aborted.is_empty()
    }

    /// Drain aborted-wait notices, then every wait due at `now` in deadline order
    pub(crate) fn collect(&mut self, now: Instant) -> Vec<TimerEvent> {
        let mut events: Vec<TimerEvent> = Vec::new();

        while let Some(id) = self.aborted.pop_front() {
            let generation = self.slots.get(&id).map_or(0, |slot| slot.generation);
            events.push(TimerEvent {
                timer: id,
                status: TimerStatus::Canceled,
                generation,
            });
        }

        while let Some(Reverse(head)) = self.waits.peek() {
            if head.deadline > now {
                break;
            }
            let Some(Reverse(wait)) = self.waits.pop() else {
                break;
            };
            match self.slots.get_mut(&wait.id) {
                Some(slot) if slot.generation == wait.generation && slot.armed.is_some() => {
                    slot.armed = None;
                    events.push(TimerEvent {
                        timer: wait.id,
                        status: TimerStatus::Expired,
                        generation: wait.generation,
                    });
                }
                // Superseded, canceled, or released
                _ => {}
            }
        }

        events
    }

    pub(crate) fn close(&mut self) {
        self.closed = true;
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
