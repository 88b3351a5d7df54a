//! Integration test suite for bound
//!
//! End-to-end tests that drive the compiled `bound` binary against temporary
//! projects.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **compile**: Full pipeline, output layout, incremental cache, `--force`
//! - **config**: `bound.toml` handling and CLI overrides
//! - **error_scenarios**: Invalid specifications and their diagnostics
//! - **graph**: Dependency order and trees
//! - **init**: Starter projects
//! - **validate**: Text and JSON validation output

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod compile;
mod config;
mod error_scenarios;
mod graph;
mod init;
mod validate;
