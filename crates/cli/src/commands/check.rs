// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tempo check <plan>` - Validate a plan and list its entries

use crate::output::{self, OutputFormat};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tempo_engine::{EntryKind, SchedulePlan};

#[derive(Args)]
pub struct CheckArgs {
    /// Plan file (TOML)
    pub plan: PathBuf,

    /// Print the listing as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct PlanRow {
    name: String,
    kind: EntryKind,
    period: String,
}

#[derive(Serialize)]
struct PlanListing {
    run_for: String,
    group_timers: usize,
    entries: Vec<PlanRow>,
}

impl PlanListing {
    fn new(plan: &SchedulePlan) -> Self {
        let recurring = plan.recurring.iter().map(|e| PlanRow {
            name: e.name.clone(),
            kind: EntryKind::Recurring,
            period: humantime::format_duration(e.interval).to_string(),
        });
        let once = plan.once.iter().map(|e| PlanRow {
            name: e.name.clone(),
            kind: EntryKind::Once,
            period: humantime::format_duration(e.after).to_string(),
        });
        Self {
            run_for: humantime::format_duration(plan.run.duration).to_string(),
            group_timers: plan.distinct_intervals(),
            entries: recurring.chain(once).collect(),
        }
    }
}

impl fmt::Display for PlanListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return writeln!(f, "No entries");
        }
        writeln!(f, "{:<24} {:<10} PERIOD", "NAME", "KIND")?;
        for row in &self.entries {
            writeln!(f, "{:<24} {:<10} {}", row.name, row.kind, row.period)?;
        }
        writeln!(
            f,
            "{} entries, {} group timer(s), runs for {}",
            self.entries.len(),
            self.group_timers,
            self.run_for
        )
    }
}

pub fn check(args: CheckArgs) -> Result<()> {
    let plan = SchedulePlan::load(&args.plan)?;
    tracing::debug!(path = %args.plan.display(), "plan is valid");
    output::print(
        &PlanListing::new(&plan),
        OutputFormat::from_json_flag(args.json),
    )
}
