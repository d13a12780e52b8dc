// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tempo-engine: one-shot and interval-coalesced recurring callbacks
//!
//! A [`Scheduler`] owns a reactor, the live set of one-shot
//! [`DeferredCall`]s and one interval group per distinct recurring
//! interval, so any number of recurring callbacks sharing a period cost a
//! single timer.

mod command;
mod deferred;
mod error;
mod group;
mod handle;
pub mod plan;
mod recurring;
mod scheduler;

pub use command::Command;
pub use deferred::{CallId, DeferredCall, OneShotHandle};
pub use error::ScheduleError;
pub use handle::SchedulerHandle;
pub use plan::{ConfigError, EntryKind, Firing, FiringSink, Installed, SchedulePlan};
pub use recurring::{MemberId, RecurringAction, RecurringHandle, RecurringState};
pub use scheduler::{Scheduler, SchedulerStats};

pub use tempo_core::{Clock, FakeClock, ReactorError, ReactorHandle, SystemClock, TokioClock};
