//! Validate a specification without generating anything.
//!
//! Runs every stage up to IR validation: parse, schema, semantic, IR build
//! (including binding resolution against OpenAPI contracts), and IR checks.
//! The first failing stage reports all of its diagnostics.
//!
//! ```bash
//! bound validate spec.yaml
//! bound validate spec.yaml --format json
//! ```
//!
//! With `--format json` a single JSON object is printed to stdout whether or
//! not validation succeeds, and the exit status still reflects the outcome.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use crate::config::CompilerConfig;
use crate::core::{BoundError, ErrorCategory, Position};
use crate::pipeline::{Context, Pipeline};

#[derive(Args)]
pub struct ValidateCommand {
    /// Path to the specification file
    pub spec: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Colored, human-readable output.
    Text,
    /// One JSON object on stdout.
    Json,
}

/// Machine-readable outcome of `bound validate --format json`.
#[derive(Debug, Default, Serialize)]
pub struct ValidationResults {
    pub valid: bool,
    pub spec: String,
    /// Stage that failed, if any.
    pub stage: Option<String>,
    pub components: usize,
    pub edges: usize,
    pub errors: Vec<ErrorEntry>,
}

#[derive(Debug, Serialize)]
pub struct ErrorEntry {
    pub category: Option<ErrorCategory>,
    pub component: Option<String>,
    pub message: String,
    pub position: Option<Position>,
}

impl ValidationResults {
    fn from_failure(spec: String, error: &anyhow::Error) -> Self {
        let mut results = Self {
            spec,
            ..Self::default()
        };

        match error.downcast_ref::<BoundError>() {
            Some(BoundError::StageFailed { stage, errors, .. }) => {
                results.stage = Some(stage.clone());
                results.errors = errors
                    .iter()
                    .map(|e| ErrorEntry {
                        category: Some(e.category()),
                        component: e.component_id().map(String::from),
                        message: e.to_string(),
                        position: e.position().cloned(),
                    })
                    .collect();
            }
            _ => results.errors.push(ErrorEntry {
                category: None,
                component: None,
                message: error.to_string(),
                position: None,
            }),
        }
        results
    }
}

impl ValidateCommand {
    pub fn execute(self) -> Result<()> {
        let spec = self.spec.display().to_string();
        let config = CompilerConfig::for_spec(&self.spec)?;
        let mut ctx = Context::new(&self.spec, config);

        let outcome = Pipeline::validation().run(&mut ctx);

        let results = match &outcome {
            Ok(()) => {
                let ir = ctx.ir()?;
                ValidationResults {
                    valid: true,
                    spec,
                    components: ir.components.len(),
                    edges: ir.edges.len(),
                    ..ValidationResults::default()
                }
            }
            Err(e) => ValidationResults::from_failure(spec, e),
        };

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
            OutputFormat::Text => print_text(&results),
        }

        outcome
    }
}

fn print_text(results: &ValidationResults) {
    if results.valid {
        println!(
            "{} {} is valid ({} components, {} edges)",
            "✓".green(),
            results.spec,
            results.components,
            results.edges
        );
        return;
    }

    let stage = results.stage.as_deref().unwrap_or("load");
    println!("{} {} failed at stage {}:", "✗".red(), results.spec, stage.bold());
    for error in &results.errors {
        println!("  {} {}", "•".red(), error.message);
    }
}
