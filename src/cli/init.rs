//! Create a starter project.
//!
//! `bound init my-service` creates `my-service/` with a `spec.yaml` describing
//! one server and one use-case, plus the OpenAPI contract it binds to, so the
//! result compiles straight away.
//!
//! ```bash
//! bound init my-service
//! bound init my-service --dir projects/
//! bound init my-service --force
//! ```

use anyhow::{Result, anyhow};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::utils::safe_write;

const STARTER_SPEC: &str = r"version: 1.0.0
name: {{name}}
description: Starter specification
components:
  - id: server.api
    kind: http.server
    spec:
      framework: hono
      port: 3000
      openapi: ./api/openapi.yaml
  - id: usecase.health
    kind: usecase
    spec:
      binds_to: server.api:GET:/health
      goal: Report that the service is up
      actor: operator
      acceptance_criteria:
        - responds with 200 while the service is running
";

const STARTER_CONTRACT: &str = r#"openapi: "3.0.3"
info:
  title: {{name}}
  version: 1.0.0
paths:
  /health:
    get:
      operationId: getHealth
      summary: Health check
      responses:
        "200":
          description: OK
"#;

#[derive(Args)]
pub struct InitCommand {
    /// Project name, used as the directory name and the spec name
    pub name: String,

    /// Parent directory for the project (defaults to the current directory)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Overwrite existing files
    #[arg(short, long)]
    pub force: bool,
}

impl InitCommand {
    pub fn execute(self) -> Result<()> {
        validate_name(&self.name)?;

        let project_dir = self.dir.unwrap_or_else(|| PathBuf::from(".")).join(&self.name);
        let spec_path = project_dir.join("spec.yaml");

        if spec_path.exists() && !self.force {
            return Err(anyhow!(
                "Specification already exists at {}. Use --force to overwrite",
                spec_path.display()
            ));
        }

        let files = [
            ("spec.yaml", STARTER_SPEC),
            ("api/openapi.yaml", STARTER_CONTRACT),
        ];
        for (relative, template) in files {
            write_starter(&project_dir, relative, &template.replace("{{name}}", &self.name))?;
            println!("  {} {}", "→".cyan(), relative);
        }

        println!("\n{} Initialized {} at {}", "✓".green(), self.name, project_dir.display());

        println!("\n{}", "Next steps:".cyan());
        println!("  Check the specification with {}:", "bound validate".bright_white());
        println!("    bound validate {}", spec_path.display());
        println!("\n  Then run {} to generate artifacts", "bound compile".bright_white());

        Ok(())
    }
}

/// A project name must be a single, plain path component.
fn validate_name(name: &str) -> Result<()> {
    let plain = !name.is_empty()
        && !name.contains("..")
        && !name.contains(['/', '\\'])
        && !Path::new(name).is_absolute();
    if plain {
        Ok(())
    } else {
        Err(anyhow!("invalid project name {name:?}: must be a simple directory name"))
    }
}

fn write_starter(project_dir: &Path, relative: &str, content: &str) -> Result<()> {
    safe_write(&project_dir.join(relative), content)
}
