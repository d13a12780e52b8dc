//! Shared helpers for scheduler specs

#![allow(dead_code)]

pub use similar_asserts::assert_eq;
pub use std::sync::{Arc, Mutex};
pub use std::time::Duration;
pub use tempo_engine::{
    DeferredCall, FakeClock, RecurringAction, RecurringState, ScheduleError, Scheduler,
};

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// A scheduler on simulated time plus a log of callback labels
pub struct Sim {
    pub clock: FakeClock,
    pub scheduler: Scheduler,
    log: Arc<Mutex<Vec<String>>>,
}

impl Sim {
    pub fn new() -> Self {
        let clock = FakeClock::new();
        Self {
            scheduler: Scheduler::with_clock(clock.clone()),
            clock,
            log: Arc::default(),
        }
    }

    /// Advance time and dispatch everything that became ready
    pub fn advance(&mut self, by: Duration) {
        self.clock.advance(by);
        self.scheduler.run_pending();
    }

    /// Callback that records `label` each time a recurring tick runs it
    pub fn every(&self, label: &str) -> impl FnMut(&mut RecurringAction<'_>) + Send + 'static {
        let log = Arc::clone(&self.log);
        let label = label.to_string();
        move |_| log.lock().unwrap().push(label.clone())
    }

    /// Callback that records `label` when a one-shot fires
    pub fn once(&self, label: &str) -> impl FnMut(&mut DeferredCall) + Send + 'static {
        let log = Arc::clone(&self.log);
        let label = label.to_string();
        move |_| log.lock().unwrap().push(label.clone())
    }

    pub fn log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.log)
    }

    /// Labels recorded since the last call
    pub fn fired(&self) -> Vec<String> {
        std::mem::take(&mut *self.log.lock().unwrap())
    }
}

pub fn labels(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
