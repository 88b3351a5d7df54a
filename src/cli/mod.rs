//! Command-line interface for bound.
//!
//! Each command lives in its own module with a clap `Args` struct and an
//! `execute` method. All commands are synchronous.
//!
//! # Available Commands
//!
//! - `compile` - Run the full pipeline and write generated files
//! - `validate` - Check a specification without generating anything
//! - `graph` - Print the dependency order, a dependency tree, or transitive dependencies
//! - `init` - Write a starter specification
//!
//! # Global Options
//!
//! - `--verbose` - Debug logging and per-file output
//! - `--quiet` - Only errors are logged
//!
//! `RUST_LOG` takes precedence over both when set.
//!
//! # Example
//!
//! ```bash
//! bound init my-service
//! bound validate my-service/spec.yaml
//! bound compile my-service/spec.yaml --output build/
//! bound graph my-service/spec.yaml --tree usecase.create-user
//! ```

mod compile;
mod graph;
mod init;
pub mod validate;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "bound",
    about = "Compile architecture specifications into an IR and generated artifacts",
    version,
    long_about = "bound reads a component specification, resolves its references and \
                  OpenAPI bindings, validates it, and generates artifacts from the result."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a specification into generated artifacts
    Compile(compile::CompileCommand),

    /// Validate a specification
    Validate(validate::ValidateCommand),

    /// Show the component dependency graph
    Graph(graph::GraphCommand),

    /// Create a starter specification
    Init(init::InitCommand),
}

impl Cli {
    pub fn execute(self) -> Result<()> {
        let verbose = self.verbose;
        match self.command {
            Commands::Compile(cmd) => cmd.execute(verbose),
            Commands::Validate(cmd) => cmd.execute(),
            Commands::Graph(cmd) => cmd.execute(),
            Commands::Init(cmd) => cmd.execute(),
        }
    }

    /// Default log filter for the chosen verbosity.
    #[must_use]
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }
}
