// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time sources the reactor reads deadlines against
//!
//! The reactor never calls `Instant::now()` itself. It is handed a [`Clock`]
//! at construction, so the same scheduler runs on wall time in production,
//! on tokio's pausable clock in async tests, and on a hand-stepped
//! [`FakeClock`] in synchronous ones.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of "now" for deadline comparisons. Must never run backwards.
pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> Instant;
}

/// `std::time::Instant::now()`
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Reads tokio's time driver, so `tokio::time::pause` freezes timers too
#[derive(Clone, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

/// Hand-stepped clock. Clones share one timeline.
///
/// Time is an offset from a fixed origin, stored in nanoseconds so readers
/// on the reactor thread never contend with the test thread stepping it.
#[derive(Clone)]
pub struct FakeClock {
    origin: Instant,
    elapsed_nanos: Arc<AtomicU64>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Step every clone forward by `step`
    pub fn advance(&self, step: Duration) {
        self.elapsed_nanos
            .fetch_add(saturating_nanos(step), Ordering::SeqCst);
    }

    /// Jump to `instant`. Instants before the clock's origin clamp to it.
    pub fn set(&self, instant: Instant) {
        let offset = instant.saturating_duration_since(self.origin);
        self.elapsed_nanos
            .store(saturating_nanos(offset), Ordering::SeqCst);
    }
}

fn saturating_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        let offset = Duration::from_nanos(self.elapsed_nanos.load(Ordering::SeqCst));
        self.origin + offset
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
