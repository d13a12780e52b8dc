// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tempo-core: time source and single-threaded reactor for the tempo scheduler
//!
//! This crate provides:
//! - A clock abstraction with a manually advanced fake for simulated time
//! - Exclusively owned timers with asynchronous expiry notification
//! - A reactor that delivers timer expirations and posted messages serially

pub mod clock;
pub mod error;
pub mod reactor;

pub use clock::{Clock, FakeClock, SystemClock, TokioClock};
pub use error::ReactorError;
pub use reactor::{Dispatch, Reactor, ReactorHandle, Timer, TimerEvent, TimerId, TimerStatus};
