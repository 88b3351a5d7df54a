//! The compile pipeline.
//!
//! A [`Pipeline`] is an ordered list of [`Stage`]s sharing one [`Context`].
//! Stages run in order and the first failure stops the run. Stages that
//! collect diagnostics fail with [`BoundError::StageFailed`] carrying the
//! full list, so a user sees every problem a layer found in one go.
//!
//! | Stage | Reads | Writes |
//! |-------|-------|--------|
//! | `parse` | spec path | document |
//! | `validate-schema` | document | |
//! | `validate-semantic` | document | |
//! | `build-ir` | document | IR |
//! | `validate-ir` | IR | |
//! | `generate` | IR | artifacts |
//! | `write` | IR, artifacts | files, cache, stats |
//!
//! Generation only ever sees an IR that passed every earlier stage.

mod stages;
mod writer;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::codegen::{Artifact, PluginRegistry};
use crate::config::CompilerConfig;
use crate::core::BoundError;
use crate::ir::Ir;
use crate::spec::SpecDocument;

pub use stages::{
    BuildIrStage, GenerateStage, ParseStage, ValidateIrStage, ValidateSchemaStage,
    ValidateSemanticStage, WriteStage,
};
pub use writer::{ArtifactWriter, WriteStats};

/// State carried between stages.
#[derive(Debug)]
pub struct Context {
    pub spec_path: PathBuf,
    pub config: CompilerConfig,
    /// Regenerate cached components even if unchanged.
    pub force: bool,
    pub document: Option<SpecDocument>,
    pub ir: Option<Ir>,
    pub artifacts: Vec<Artifact>,
    pub stats: WriteStats,
}

impl Context {
    pub fn new(spec_path: impl Into<PathBuf>, config: CompilerConfig) -> Self {
        Self {
            spec_path: spec_path.into(),
            config,
            force: false,
            document: None,
            ir: None,
            artifacts: Vec::new(),
            stats: WriteStats::default(),
        }
    }

    #[must_use]
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    /// The parsed document; an error if no parse stage ran.
    pub fn document(&self) -> Result<&SpecDocument, BoundError> {
        self.document.as_ref().ok_or_else(|| BoundError::Other {
            message: "no specification has been parsed".to_string(),
        })
    }

    /// The built IR; an error if no build stage ran.
    pub fn ir(&self) -> Result<&Ir, BoundError> {
        self.ir.as_ref().ok_or_else(|| BoundError::Other {
            message: "no IR has been built".to_string(),
        })
    }
}

/// One step of the pipeline.
pub trait Stage {
    fn name(&self) -> &str;

    fn run(&self, ctx: &mut Context) -> Result<()>;
}

/// Ordered stages over one context.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Everything up to and including IR validation.
    #[must_use]
    pub fn validation() -> Self {
        Self::new()
            .stage(ParseStage)
            .stage(ValidateSchemaStage)
            .stage(ValidateSemanticStage)
            .stage(BuildIrStage::default())
            .stage(ValidateIrStage)
    }

    /// The full compile: validation, generation, and writing.
    #[must_use]
    pub fn compile(registry: PluginRegistry) -> Self {
        Self::validation().stage(GenerateStage::new(registry)).stage(WriteStage)
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage in order, stopping at the first error.
    pub fn run(&self, ctx: &mut Context) -> Result<()> {
        for stage in &self.stages {
            debug!("Running stage {}", stage.name());
            stage.run(ctx)?;
        }
        Ok(())
    }
}
