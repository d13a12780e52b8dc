// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative schedule plans loaded from TOML
//!
//! ```toml
//! [run]
//! duration = "2s"
//!
//! [[recurring]]
//! name = "telemetry"
//! interval = "100ms"
//!
//! [[once]]
//! name = "handshake-timeout"
//! after = "250ms"
//! ```

use crate::deferred::OneShotHandle;
use crate::error::ScheduleError;
use crate::recurring::RecurringHandle;
use crate::scheduler::Scheduler;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors from loading or validating a plan
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse schedule plan: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid schedule plan: {0}")]
    Invalid(String),
}

/// How long the driver runs the plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(1),
        }
    }
}

/// A named callback fired every `interval`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecurringEntry {
    pub name: String,
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// Register paused
    #[serde(default)]
    pub paused: bool,
    /// Cancel after this many firings
    #[serde(default)]
    pub limit: Option<u64>,
}

/// A named callback fired once `after` from install
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OnceEntry {
    pub name: String,
    #[serde(with = "humantime_serde")]
    pub after: Duration,
    /// Re-arm from inside the callback this many extra times
    #[serde(default)]
    pub repeat: u32,
}

/// A full schedule: recurring and one-shot entries plus run settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulePlan {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub recurring: Vec<RecurringEntry>,
    #[serde(default)]
    pub once: Vec<OnceEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Recurring,
    Once,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Recurring => write!(f, "recurring"),
            EntryKind::Once => write!(f, "once"),
        }
    }
}

/// One callback invocation reported to a [`FiringSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Firing {
    pub name: String,
    pub kind: EntryKind,
    /// 1-based count of this entry's firings
    pub count: u64,
}

/// Receives every firing of an installed plan
pub type FiringSink = Arc<dyn Fn(&Firing) + Send + Sync>;

/// Handles for every entry of an installed plan, in plan order
#[derive(Debug, Default)]
pub struct Installed {
    pub recurring: Vec<(String, RecurringHandle)>,
    pub once: Vec<(String, OneShotHandle)>,
}

fn within_clock_range(duration: Duration) -> bool {
    Instant::now().checked_add(duration).is_some()
}

impl SchedulePlan {
    /// Read, parse, and validate a plan file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse and validate plan text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let plan: SchedulePlan = toml::from_str(content)?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.run.duration.is_zero() {
            return Err(ConfigError::Invalid("run duration must be non-zero".into()));
        }
        if !within_clock_range(self.run.duration) {
            return Err(ConfigError::Invalid(
                "run duration is beyond the clock's range".into(),
            ));
        }

        let mut names = HashSet::new();
        let all_names = self
            .recurring
            .iter()
            .map(|e| &e.name)
            .chain(self.once.iter().map(|e| &e.name));
        for name in all_names {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid("entry name must not be empty".into()));
            }
            if !names.insert(name.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate entry name: {}", name)));
            }
        }

        for entry in &self.recurring {
            if entry.interval.is_zero() {
                return Err(ConfigError::Invalid(format!(
                    "recurring entry {} has a zero interval",
                    entry.name
                )));
            }
            if entry.limit == Some(0) {
                return Err(ConfigError::Invalid(format!(
                    "recurring entry {} has a zero limit",
                    entry.name
                )));
            }
            if !within_clock_range(entry.interval) {
                return Err(ConfigError::Invalid(format!(
                    "recurring entry {} has an interval beyond the clock's range",
                    entry.name
                )));
            }
        }

        for entry in &self.once {
            if !within_clock_range(entry.after) {
                return Err(ConfigError::Invalid(format!(
                    "one-shot entry {} has a delay beyond the clock's range",
                    entry.name
                )));
            }
        }
        Ok(())
    }

    /// Number of distinct recurring intervals, i.e. group timers the plan needs
    pub fn distinct_intervals(&self) -> usize {
        self.recurring
            .iter()
            .map(|e| e.interval)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Register every entry with `scheduler`, reporting firings to `sink`
    pub fn install(
        &self,
        scheduler: &mut Scheduler,
        sink: FiringSink,
    ) -> Result<Installed, ScheduleError> {
        let mut installed = Installed::default();

        for entry in &self.recurring {
            let name = entry.name.clone();
            let limit = entry.limit;
            let sink = Arc::clone(&sink);
            let mut count = 0u64;
            let handle = scheduler.schedule_recurring(entry.interval, move |action| {
                count += 1;
                sink(&Firing {
                    name: name.clone(),
                    kind: EntryKind::Recurring,
                    count,
                });
                if limit.is_some_and(|limit| count >= limit) {
                    action.cancel();
                }
            })?;
            if entry.paused {
                handle.pause()?;
            }
            tracing::debug!(name = %entry.name, interval = ?entry.interval, "recurring entry installed");
            installed.recurring.push((entry.name.clone(), handle));
        }

        for entry in &self.once {
            let name = entry.name.clone();
            let after = entry.after;
            let mut remaining = entry.repeat;
            let sink = Arc::clone(&sink);
            let mut count = 0u64;
            let handle = scheduler.schedule_once_after(after, move |call| {
                count += 1;
                sink(&Firing {
                    name: name.clone(),
                    kind: EntryKind::Once,
                    count,
                });
                if remaining > 0 {
                    remaining -= 1;
                    if let Err(e) = call.reset_after(after) {
                        tracing::warn!(name = %name, error = %e, "failed to re-arm one-shot");
                    }
                }
            })?;
            tracing::debug!(name = %entry.name, after = ?entry.after, "one-shot entry installed");
            installed.once.push((entry.name.clone(), handle));
        }

        Ok(installed)
    }
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
