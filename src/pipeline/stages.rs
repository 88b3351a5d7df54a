use anyhow::{Context as _, Result};
use tracing::{debug, info};

use super::writer::ArtifactWriter;
use super::{Context, Stage};
use crate::codegen::{ArtifactPlanner, PluginRegistry};
use crate::contract::{ContractParser, OpenApiParser};
use crate::core::{BoundError, CompileError, sort_diagnostics};
use crate::ir::Builder;
use crate::spec::SpecDocument;
use crate::validator::{validate_ir, validate_schema, validate_semantic};

fn check(stage: &str, what: &str, mut errors: Vec<CompileError>) -> Result<()> {
    if errors.is_empty() {
        return Ok(());
    }
    sort_diagnostics(&mut errors);
    Err(BoundError::StageFailed {
        stage: stage.to_string(),
        message: format!("{what} failed with {} error(s)", errors.len()),
        errors,
    }
    .into())
}

/// Reads the specification file.
#[derive(Debug, Default)]
pub struct ParseStage;

impl Stage for ParseStage {
    fn name(&self) -> &str {
        "parse"
    }

    fn run(&self, ctx: &mut Context) -> Result<()> {
        let document = SpecDocument::load(&ctx.spec_path)?;
        debug!("Parsed {} components from {}", document.components.len(), ctx.spec_path.display());
        ctx.document = Some(document);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ValidateSchemaStage;

impl Stage for ValidateSchemaStage {
    fn name(&self) -> &str {
        "validate-schema"
    }

    // Schema errors keep document order.
    fn run(&self, ctx: &mut Context) -> Result<()> {
        let errors = validate_schema(&ctx.document()?.raw);
        if errors.is_empty() {
            return Ok(());
        }
        Err(BoundError::StageFailed {
            stage: self.name().to_string(),
            message: format!("schema validation failed with {} error(s)", errors.len()),
            errors,
        }
        .into())
    }
}

#[derive(Debug, Default)]
pub struct ValidateSemanticStage;

impl Stage for ValidateSemanticStage {
    fn name(&self) -> &str {
        "validate-semantic"
    }

    fn run(&self, ctx: &mut Context) -> Result<()> {
        check(self.name(), "semantic validation", validate_semantic(ctx.document()?))
    }
}

/// Runs the four builder phases. The IR is stored only when they succeed.
pub struct BuildIrStage {
    contract_parser: Box<dyn Fn() -> Box<dyn ContractParser>>,
}

impl Default for BuildIrStage {
    fn default() -> Self {
        Self {
            contract_parser: Box::new(|| Box::new(OpenApiParser::new())),
        }
    }
}

impl BuildIrStage {
    /// Use a different contract parser, mostly for tests.
    pub fn with_contract_parser<P, F>(factory: F) -> Self
    where
        F: Fn() -> P + 'static,
        P: ContractParser + 'static,
    {
        Self {
            contract_parser: Box::new(move || Box::new(factory())),
        }
    }
}

impl Stage for BuildIrStage {
    fn name(&self) -> &str {
        "build-ir"
    }

    fn run(&self, ctx: &mut Context) -> Result<()> {
        let document = ctx.document()?;
        let builder = Builder::new()
            .with_base_dir(document.base_dir())
            .with_boxed_contract_parser((self.contract_parser)());

        let (ir, errors) = builder.build(document);
        check(self.name(), "IR build", errors)?;
        ctx.ir = Some(ir);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ValidateIrStage;

impl Stage for ValidateIrStage {
    fn name(&self) -> &str {
        "validate-ir"
    }

    fn run(&self, ctx: &mut Context) -> Result<()> {
        check(self.name(), "IR validation", validate_ir(ctx.ir()?))
    }
}

/// Runs every enabled generator and merges their outputs.
#[derive(Debug)]
pub struct GenerateStage {
    registry: PluginRegistry,
}

impl GenerateStage {
    #[must_use]
    pub fn new(registry: PluginRegistry) -> Self {
        Self { registry }
    }
}

impl Stage for GenerateStage {
    fn name(&self) -> &str {
        "generate"
    }

    fn run(&self, ctx: &mut Context) -> Result<()> {
        let ir = ctx.ir()?;
        let mut planner = ArtifactPlanner::new();

        for generator in self.registry.generators_for(ir) {
            let output = generator
                .generate(ir)
                .with_context(|| format!("Generator {} failed", generator.name()))?;
            debug!("Generator {} produced {} files", generator.name(), output.len());
            planner.add_output(generator.name(), output)?;
        }

        info!("Planned {} artifacts", planner.len());
        ctx.artifacts = planner.into_artifacts();
        Ok(())
    }
}

/// Writes planned artifacts and refreshes the cache.
#[derive(Debug, Default)]
pub struct WriteStage;

impl Stage for WriteStage {
    fn name(&self) -> &str {
        "write"
    }

    fn run(&self, ctx: &mut Context) -> Result<()> {
        let writer = ArtifactWriter::new(ctx.output_dir())
            .with_cache(ctx.config.cache.then(|| ctx.config.cache_path()))
            .with_force(ctx.force);

        let stats = writer.write(ctx.ir()?, &ctx.artifacts)?;
        ctx.stats = stats;
        Ok(())
    }
}
