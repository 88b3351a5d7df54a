//! Writes the compiled IR as JSON for downstream tooling.

use anyhow::{Context, Result};
use serde_json::{Value, json};

use crate::codegen::{GeneratedFile, Generator, GeneratorOutput};
use crate::ir::Ir;

/// Emits `.bound/ir.json`, shared by the whole specification.
#[derive(Debug, Default)]
pub struct IrSnapshotGenerator;

impl IrSnapshotGenerator {
    pub const NAME: &'static str = "ir-snapshot";
    pub const PATH: &'static str = ".bound/ir.json";

    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Generator for IrSnapshotGenerator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn generate(&self, ir: &Ir) -> Result<GeneratorOutput> {
        let components: Vec<Value> = ir
            .components
            .values()
            .map(|c| {
                json!({
                    "id": c.id,
                    "kind": c.kind(),
                    "spec": c.spec,
                    "dependencies": c.dependencies,
                    "dependents": c.dependents,
                })
            })
            .collect();

        let snapshot = json!({
            "metadata": ir.metadata,
            "components": components,
            "edges": ir.edges,
        });

        let mut content =
            serde_json::to_string_pretty(&snapshot).context("Failed to serialize IR snapshot")?;
        content.push('\n');

        let mut output = GeneratorOutput::new();
        output.add_file(Self::PATH, GeneratedFile::overwrite(content));
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::WriteStrategy;
    use crate::ir::{Component, ComponentSpec, EdgeType, MiddlewareSpec, ServerSpec, SpecMetadata};

    #[test]
    fn test_snapshot_contents() {
        let mut ir = Ir::new(
            SpecMetadata {
                version: "1.0.0".to_string(),
                name: "shop".to_string(),
                ..SpecMetadata::default()
            },
            "",
        );
        ir.components.insert(
            "server.api".to_string(),
            Component::new(
                "server.api",
                ComponentSpec::Server(ServerSpec {
                    framework: "hono".to_string(),
                    port: 3000,
                    middleware: Some(vec!["mw.auth".to_string()]),
                    ..ServerSpec::default()
                }),
            ),
        );
        ir.components.insert(
            "mw.auth".to_string(),
            Component::new("mw.auth", ComponentSpec::Middleware(MiddlewareSpec::default())),
        );
        ir.connect("server.api", "mw.auth", EdgeType::Middleware);

        let output = IrSnapshotGenerator::new().generate(&ir).unwrap();
        let file = &output.files[IrSnapshotGenerator::PATH];
        assert_eq!(file.strategy, WriteStrategy::Overwrite);
        assert!(file.component_id.is_none());

        let parsed: Value = serde_json::from_slice(&file.content).unwrap();
        assert_eq!(parsed["metadata"]["name"], "shop");
        assert_eq!(parsed["components"][1]["kind"], "http.server");
        assert_eq!(parsed["components"][1]["spec"]["port"], 3000);
        assert_eq!(parsed["components"][0]["dependents"][0], "server.api");
        assert_eq!(parsed["edges"][0]["type"], "middleware");
    }
}
