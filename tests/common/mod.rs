//! Common helpers for bound integration tests
//!
//! Projects and fixtures come from `bound_cli::test_utils`; this module adds
//! ways to drive the compiled binary against them.

// Not every helper is used by every test module
#![allow(dead_code)]

use anyhow::{Context, Result};
use assert_cmd::Command;
use std::path::Path;

pub use bound_cli::test_utils::{ContractFixture, SpecFixture, TestProject};

/// The `bound` binary, run from `dir` with colors and `RUST_LOG` disabled.
pub fn bound(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bound").expect("bound binary is built for integration tests");
    cmd.current_dir(dir).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

/// Captured result of one invocation.
#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

/// Run `bound` in the project directory and capture its output.
pub fn run_bound(project: &TestProject, args: &[&str]) -> Result<CommandOutput> {
    let output = bound(project.path()).args(args).output().context("Failed to run bound")?;

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        success: output.status.success(),
        code: output.status.code(),
    })
}

/// A project with the given fixture as `spec.yaml` and the users contract
/// at `api/openapi.yaml`.
pub fn project_with(fixture: &SpecFixture) -> Result<TestProject> {
    let project = TestProject::new()?;
    project.write_spec(fixture)?;
    ContractFixture::users().write_to(project.path(), "api/openapi.yaml")?;
    Ok(project)
}
