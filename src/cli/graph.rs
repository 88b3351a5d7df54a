//! Print the component dependency graph.
//!
//! Without `--tree` the components are listed in dependency order, each one
//! after everything it depends on. With `--tree ID` the dependencies of a
//! single component are drawn as a tree, and `--transitive ID` lists every
//! component it reaches directly or indirectly, one per line.
//!
//! IR-level validation is skipped so a cyclic specification can still be
//! inspected with `--tree`.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::config::CompilerConfig;
use crate::ir::Ir;
use crate::pipeline::{
    BuildIrStage, Context, ParseStage, Pipeline, ValidateSchemaStage, ValidateSemanticStage,
};

#[derive(Args)]
pub struct GraphCommand {
    /// Path to the specification file
    pub spec: PathBuf,

    /// Show the dependency tree of one component
    #[arg(long, value_name = "ID")]
    pub tree: Option<String>,

    /// List everything one component depends on, directly or indirectly
    #[arg(long, value_name = "ID", conflicts_with = "tree")]
    pub transitive: Option<String>,
}

impl GraphCommand {
    pub fn execute(self) -> Result<()> {
        let config = CompilerConfig::for_spec(&self.spec)?;
        let mut ctx = Context::new(&self.spec, config);

        Pipeline::new()
            .stage(ParseStage)
            .stage(ValidateSchemaStage)
            .stage(ValidateSemanticStage)
            .stage(BuildIrStage::default())
            .run(&mut ctx)?;

        let ir = ctx.ir()?;
        let output = match (&self.tree, &self.transitive) {
            (Some(id), _) => ir.dependency_tree(id)?,
            (None, Some(id)) => render_transitive(ir, id)?,
            (None, None) => render_order(ir)?,
        };
        print!("{output}");
        Ok(())
    }
}

fn render_order(ir: &Ir) -> Result<String> {
    let order = ir.topological_sort()?;
    let width = order.len().to_string().len();

    let mut out = String::new();
    for (i, component) in order.iter().enumerate() {
        out.push_str(&format!(
            "{:>width$}. {} {}\n",
            i + 1,
            component.id,
            format!("({})", component.kind()).dimmed()
        ));
    }
    Ok(out)
}

fn render_transitive(ir: &Ir, id: &str) -> Result<String> {
    let deps = ir.transitive_dependencies(id)?;
    Ok(deps.iter().map(|dep| format!("{dep}\n")).collect())
}
