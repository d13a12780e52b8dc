// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tempo run <plan>` - Install a plan and drive it

use crate::output::{self, OutputFormat};
use crate::tally::{RunSummary, Tally};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempo_engine::{Firing, SchedulePlan, Scheduler};
use tracing::info;

#[derive(Args)]
pub struct RunArgs {
    /// Plan file (TOML)
    pub plan: PathBuf,

    /// How long to run, overriding the plan's `[run] duration` (e.g. "2s")
    #[arg(long, value_parser = humantime::parse_duration)]
    pub duration: Option<Duration>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: RunArgs) -> Result<()> {
    let plan = SchedulePlan::load(&args.plan)?;
    let duration = args.duration.unwrap_or(plan.run.duration);

    let mut scheduler = Scheduler::new();
    let tally = Arc::new(Tally::for_plan(&plan));
    let sink = Arc::clone(&tally);
    let installed = plan.install(&mut scheduler, Arc::new(move |f: &Firing| sink.record(f)))?;

    let stats = scheduler.stats();
    info!(
        path = %args.plan.display(),
        one_shots = stats.one_shots,
        groups = stats.groups,
        members = stats.members,
        "plan installed, running for {}",
        humantime::format_duration(duration)
    );

    let started = scheduler.now();
    scheduler
        .run_until(async {
            tokio::select! {
                _ = tokio::time::sleep(duration) => {}
                _ = tokio::signal::ctrl_c() => info!("interrupted"),
            }
        })
        .await;
    let ran_for = scheduler.now().saturating_duration_since(started);

    tally.settle(&installed);
    let summary = RunSummary::new(ran_for, scheduler.stats(), tally.snapshot());
    scheduler.shutdown();

    output::print(&summary, OutputFormat::from_json_flag(args.json))
}
