//! Markdown documentation stubs, one per use-case.
//!
//! Each file starts from the use-case's declared goal, route, middleware, and
//! acceptance criteria. Files are write-once: after the first run they belong
//! to the user, who is expected to flesh them out.

use anyhow::{Context, Result};
use serde::Serialize;
use tera::{Context as TeraContext, Tera};

use crate::codegen::{GeneratedFile, Generator, GeneratorOutput};
use crate::ir::{Component, Ir, UsecaseSpec};

const TEMPLATE: &str = r"# {{ id }}

**Goal:** {{ goal }}
{% if actor %}
**Actor:** {{ actor }}
{% endif %}
## Route

`{{ method }} {{ path }}` on `{{ server }}`
{% if operation_id %}
Contract operation: `{{ operation_id }}`{% if summary %} ({{ summary }}){% endif %}
{% endif %}
## Middleware
{% if middleware %}
{% for name in middleware %}- `{{ name }}`
{% endfor %}{% else %}
None.
{% endif %}{% for section in sections %}
## {{ section.title }}

{% for item in section.items %}- {{ item }}
{% endfor %}{% endfor %}";

#[derive(Debug, Serialize)]
struct UsecaseDoc<'a> {
    id: &'a str,
    goal: &'a str,
    actor: &'a str,
    server: &'a str,
    method: String,
    path: &'a str,
    operation_id: Option<&'a str>,
    summary: Option<&'a str>,
    middleware: Vec<String>,
    sections: Vec<Section<'a>>,
}

#[derive(Debug, Serialize)]
struct Section<'a> {
    title: &'static str,
    items: &'a [String],
}

/// Emits `docs/usecases/<id>.md` for every use-case.
#[derive(Debug, Default)]
pub struct UsecaseDocsGenerator;

impl UsecaseDocsGenerator {
    pub const NAME: &'static str = "usecase-docs";

    #[must_use]
    pub fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn path_for(id: &str) -> String {
        format!("docs/usecases/{id}.md")
    }

    fn render(ir: &Ir, component: &Component, usecase: &UsecaseSpec) -> Result<String> {
        let (server, method, path) = match &usecase.binding {
            Some(binding) => (binding.server_id.as_str(), binding.method.to_string(), binding.path.as_str()),
            None => {
                let mut parts = usecase.binds_to.splitn(3, ':');
                let server = parts.next().unwrap_or_default();
                let method = parts.next().unwrap_or_default().to_string();
                (server, method, parts.next().unwrap_or_default())
            }
        };
        let operation = usecase.binding.as_ref().and_then(|b| b.operation.as_ref());

        let sections = [
            ("Preconditions", &usecase.preconditions),
            ("Acceptance Criteria", &usecase.acceptance_criteria),
            ("Postconditions", &usecase.postconditions),
        ]
        .into_iter()
        .filter_map(|(title, items)| {
            items.as_deref().filter(|items| !items.is_empty()).map(|items| Section { title, items })
        })
        .collect();

        let doc = UsecaseDoc {
            id: &component.id,
            goal: &usecase.goal,
            actor: &usecase.actor,
            server,
            method,
            path,
            operation_id: operation.and_then(|op| op.operation_id.as_deref()),
            summary: operation.map(|op| op.summary.as_str()).filter(|s| !s.is_empty()),
            middleware: ir.effective_middleware(usecase),
            sections,
        };

        let context = TeraContext::from_serialize(&doc)
            .with_context(|| format!("Failed to build template context for {}", component.id))?;

        let mut tera = Tera::default();
        tera.render_str(TEMPLATE, &context)
            .with_context(|| format!("Failed to render documentation for {}", component.id))
    }
}

impl Generator for UsecaseDocsGenerator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn generate(&self, ir: &Ir) -> Result<GeneratorOutput> {
        let mut output = GeneratorOutput::new();

        for component in ir.components.values() {
            let Some(usecase) = component.as_usecase() else {
                continue;
            };
            let content = Self::render(ir, component, usecase)?;
            output.add_file(
                Self::path_for(&component.id),
                GeneratedFile::write_once(content).owned_by(&component.id),
            );
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::WriteStrategy;
    use crate::contract::{HttpMethod, Operation};
    use crate::ir::{Binding, ComponentSpec, ServerSpec, SpecMetadata};

    fn ir() -> Ir {
        let mut ir = Ir::new(SpecMetadata::default(), "");
        ir.components.insert(
            "server.api".to_string(),
            Component::new(
                "server.api",
                ComponentSpec::Server(ServerSpec {
                    framework: "hono".to_string(),
                    port: 3000,
                    middleware: Some(vec!["mw.authn".to_string()]),
                    ..ServerSpec::default()
                }),
            ),
        );

        let mut operation = Operation::new(HttpMethod::Post, "/users");
        operation.operation_id = Some("createUser".to_string());
        operation.summary = "Create a user".to_string();

        ir.components.insert(
            "usecase.create-user".to_string(),
            Component::new(
                "usecase.create-user",
                ComponentSpec::Usecase(UsecaseSpec {
                    binds_to: "server.api:POST:/users".to_string(),
                    goal: "Register a new account".to_string(),
                    actor: "visitor".to_string(),
                    acceptance_criteria: Some(vec!["returns 201".to_string(), "stores the user".to_string()]),
                    preconditions: Some(Vec::new()),
                    binding: Some(Binding {
                        server_id: "server.api".to_string(),
                        method: HttpMethod::Post,
                        path: "/users".to_string(),
                        operation: Some(operation),
                    }),
                    ..UsecaseSpec::default()
                }),
            ),
        );
        ir.components.insert(
            "usecase.health".to_string(),
            Component::new(
                "usecase.health",
                ComponentSpec::Usecase(UsecaseSpec {
                    binds_to: "server.api:GET:/health".to_string(),
                    goal: "Report liveness".to_string(),
                    middleware: Some(Vec::new()),
                    ..UsecaseSpec::default()
                }),
            ),
        );
        ir
    }

    fn render(output: &GeneratorOutput, id: &str) -> String {
        String::from_utf8(output.files[&UsecaseDocsGenerator::path_for(id)].content.clone()).unwrap()
    }

    #[test]
    fn test_one_write_once_file_per_usecase() {
        let output = UsecaseDocsGenerator::new().generate(&ir()).unwrap();
        assert_eq!(output.len(), 2);

        let file = &output.files["docs/usecases/usecase.health.md"];
        assert_eq!(file.strategy, WriteStrategy::WriteOnce);
        assert_eq!(file.component_id.as_deref(), Some("usecase.health"));
    }

    #[test]
    fn test_rendered_document() {
        let output = UsecaseDocsGenerator::new().generate(&ir()).unwrap();
        let doc = render(&output, "usecase.create-user");

        assert!(doc.starts_with("# usecase.create-user\n"));
        assert!(doc.contains("**Goal:** Register a new account"));
        assert!(doc.contains("**Actor:** visitor"));
        assert!(doc.contains("`POST /users` on `server.api`"));
        assert!(doc.contains("Contract operation: `createUser` (Create a user)"));
        assert!(doc.contains("- `mw.authn`"));
        assert!(doc.contains("## Acceptance Criteria\n\n- returns 201\n- stores the user\n"));
        assert!(!doc.contains("## Preconditions"));
    }

    #[test]
    fn test_unbound_usecase_without_middleware() {
        let output = UsecaseDocsGenerator::new().generate(&ir()).unwrap();
        let doc = render(&output, "usecase.health");

        assert!(doc.contains("`GET /health` on `server.api`"));
        assert!(doc.contains("None."));
        assert!(!doc.contains("**Actor:**"));
        assert!(!doc.contains("Contract operation"));
    }
}
