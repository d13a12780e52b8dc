// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-entry firing counts collected while a plan runs

use serde::Serialize;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tempo_engine::{EntryKind, Firing, Installed, SchedulePlan, SchedulerStats};

/// Firing count and final state of one plan entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryReport {
    pub name: String,
    pub kind: EntryKind,
    pub period: String,
    pub fired: u64,
    pub state: String,
}

/// Collects firings from the scheduler's callbacks
pub struct Tally {
    entries: Mutex<Vec<EntryReport>>,
}

impl Tally {
    /// One zeroed row per plan entry, in plan order
    pub fn for_plan(plan: &SchedulePlan) -> Self {
        let recurring = plan
            .recurring
            .iter()
            .map(|e| report(&e.name, EntryKind::Recurring, e.interval, "active"));
        let once = plan
            .once
            .iter()
            .map(|e| report(&e.name, EntryKind::Once, e.after, "pending"));
        Self {
            entries: Mutex::new(recurring.chain(once).collect()),
        }
    }

    pub fn record(&self, firing: &Firing) {
        let mut entries = self.lock();
        match entries.iter_mut().find(|e| e.name == firing.name) {
            Some(entry) => entry.fired = entry.fired.max(firing.count),
            None => tracing::warn!(name = %firing.name, "firing for unknown entry"),
        }
    }

    /// Fill in each entry's state from the handles left after the run
    pub fn settle(&self, installed: &Installed) {
        let mut entries = self.lock();
        for (name, handle) in &installed.recurring {
            if let Some(entry) = entries.iter_mut().find(|e| &e.name == name) {
                entry.state = handle.state().to_string();
            }
        }
        for (name, handle) in &installed.once {
            if let Some(entry) = entries.iter_mut().find(|e| &e.name == name) {
                entry.state = if handle.deadline().is_some() {
                    "pending".to_string()
                } else {
                    "done".to_string()
                };
            }
        }
    }

    pub fn snapshot(&self) -> Vec<EntryReport> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<EntryReport>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn report(name: &str, kind: EntryKind, period: Duration, state: &str) -> EntryReport {
    EntryReport {
        name: name.to_string(),
        kind,
        period: humantime::format_duration(period).to_string(),
        fired: 0,
        state: state.to_string(),
    }
}

/// What `tempo run` prints when the run ends
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub ran_for: String,
    pub groups: usize,
    pub timers: usize,
    pub entries: Vec<EntryReport>,
}

impl RunSummary {
    pub fn new(ran_for: Duration, stats: SchedulerStats, entries: Vec<EntryReport>) -> Self {
        // Millisecond resolution is plenty for a human-readable summary
        let ran_for = Duration::from_millis(ran_for.as_millis() as u64);
        Self {
            ran_for: humantime::format_duration(ran_for).to_string(),
            groups: stats.groups,
            timers: stats.timers,
            entries,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<24} {:<10} {:<10} {:>6}  STATE",
            "NAME", "KIND", "PERIOD", "FIRED"
        )?;
        for e in &self.entries {
            writeln!(
                f,
                "{:<24} {:<10} {:<10} {:>6}  {}",
                e.name, e.kind, e.period, e.fired, e.state
            )?;
        }
        writeln!(
            f,
            "ran for {}, {} group timer(s) live",
            self.ran_for, self.groups
        )
    }
}

#[cfg(test)]
#[path = "tally_tests.rs"]
mod tests;
