// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test utilities for CLI integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

/// A temporary directory holding one plan file
pub struct PlanDir {
    pub dir: TempDir,
    pub plan: PathBuf,
}

impl PlanDir {
    pub fn new(content: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let plan = dir.path().join("plan.toml");
        std::fs::write(&plan, content).expect("Failed to write plan");
        Self { dir, plan }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// The `tempo` binary with logging quieted
pub fn tempo() -> Command {
    let mut cmd = Command::cargo_bin("tempo").expect("tempo binary should be built");
    cmd.env("RUST_LOG", "warn");
    cmd
}

pub const SHORT_PLAN: &str = r#"
[run]
duration = "400ms"

[[recurring]]
name = "poll"
interval = "50ms"
limit = 3

[[recurring]]
name = "audit"
interval = "50ms"
paused = true

[[once]]
name = "timeout"
after = "100ms"
"#;
