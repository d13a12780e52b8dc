// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the reactor binding

use thiserror::Error;

/// Errors returned when the reactor rejects new work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReactorError {
    /// The reactor was shut down (or dropped) and accepts no more timers or posts
    #[error("reactor is shut down")]
    Shutdown,
    /// The timer was released by its owner and can no longer be armed
    #[error("timer has been released")]
    TimerReleased,
    /// The requested delay pushes the deadline past what `Instant` can hold
    #[error("deadline is beyond the clock's range")]
    DeadlineOverflow,
}
