//! Compile a specification and write generated artifacts.
//!
//! ```bash
//! bound compile spec.yaml
//! bound compile spec.yaml --output build/ --no-cache
//! bound compile spec.yaml --force
//! ```
//!
//! The output directory and cache settings come from `bound.toml` next to the
//! specification when present; the flags here override it.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::codegen::PluginRegistry;
use crate::config::{CliOverrides, CompilerConfig};
use crate::pipeline::{Context, Pipeline};

#[derive(Args)]
pub struct CompileCommand {
    /// Path to the specification file
    pub spec: PathBuf,

    /// Output directory (overrides bound.toml)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Disable the incremental cache
    #[arg(long)]
    pub no_cache: bool,

    /// Regenerate files for unchanged components
    #[arg(long)]
    pub force: bool,
}

impl CompileCommand {
    pub fn execute(self, verbose: bool) -> Result<()> {
        let overrides = CliOverrides {
            output_dir: self.output,
            no_cache: self.no_cache,
        };
        let config = CompilerConfig::for_spec(&self.spec)?.merge_cli(&overrides);

        let mut ctx = Context::new(&self.spec, config).with_force(self.force);
        Pipeline::compile(PluginRegistry::builtin()?).run(&mut ctx)?;

        let stats = &ctx.stats;
        println!(
            "{} Generated {} files ({} written, {} preserved) in {}",
            "✓".green(),
            stats.total(),
            stats.written.len(),
            stats.skipped.len(),
            ctx.output_dir().display()
        );

        if verbose {
            for path in &stats.written {
                println!("  {} {}", "→".cyan(), path);
            }
            for path in &stats.skipped {
                println!("  {} {} (preserved)", "=".dimmed(), path);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BoundError;
    use crate::test_utils::{SpecFixture, TestProject};

    fn command(project: &TestProject) -> CompileCommand {
        CompileCommand {
            spec: project.spec_path(),
            output: None,
            no_cache: false,
            force: false,
        }
    }

    #[test]
    fn test_compile_writes_into_default_output() {
        let project = TestProject::with_basic_spec().unwrap();

        command(&project).execute(false).unwrap();

        assert!(project.file_exists("generated/.bound/ir.json"));
        assert!(project.file_exists("generated/.bound/cache.json"));
        assert!(project.file_exists("generated/docs/usecases/usecase.create-user.md"));
    }

    #[test]
    fn test_compile_respects_output_and_no_cache() {
        let project = TestProject::with_basic_spec().unwrap();
        let out = project.path().join("build");

        CompileCommand {
            output: Some(out.clone()),
            no_cache: true,
            ..command(&project)
        }
        .execute(true)
        .unwrap();

        assert!(out.join(".bound/ir.json").exists());
        assert!(!out.join(".bound/cache.json").exists());
        assert!(!project.file_exists("generated"));
    }

    #[test]
    fn test_compile_stops_on_invalid_spec() {
        let project = TestProject::new().unwrap();
        project.write_spec(&SpecFixture::missing_auth_database()).unwrap();

        let err = command(&project).execute(false).unwrap_err();
        match err.downcast_ref::<BoundError>() {
            Some(BoundError::StageFailed { stage, .. }) => assert_eq!(stage, "validate-ir"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!project.file_exists("generated"));
    }
}
