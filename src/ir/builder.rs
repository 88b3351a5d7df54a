//! Four-phase IR construction.
//!
//! 1. **Typing**: parse each component's kind and lift its untyped `spec` map
//!    into the matching typed struct; define its ID in the symbol table.
//! 2. **Contracts**: parse the OpenAPI document of every server that names one.
//! 3. **References**: turn `middleware` and `depends_on` entries into edges.
//! 4. **Bindings**: parse each use-case's `binds_to`, resolve the server and
//!    match the route against the server's contract.
//!
//! Diagnostics accumulate across phases and are returned with the (possibly
//! partial) IR. Any typing error stops the build after phase 1, since later
//! phases would only report noise about components that do not exist.

use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::{debug, warn};

use super::{
    Component, ComponentSpec, DatabaseSpec, EdgeType, Ir, MiddlewareSpec, ServerSpec,
    SpecMetadata, UsecaseSpec, parse_binding,
};
use crate::contract::{ContractParser, OpenApiParser};
use crate::core::{CompileError, Kind};
use crate::spec::SpecDocument;

/// Builds an [`Ir`] from a loaded specification.
pub struct Builder {
    base_dir: PathBuf,
    contract_parser: Box<dyn ContractParser>,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    /// A builder resolving contract paths against the current directory with
    /// the OpenAPI parser.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_dir: PathBuf::new(),
            contract_parser: Box::new(OpenApiParser::new()),
        }
    }

    /// Directory relative contract paths are resolved against.
    #[must_use]
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_contract_parser(mut self, parser: impl ContractParser + 'static) -> Self {
        self.contract_parser = Box::new(parser);
        self
    }

    #[must_use]
    pub fn with_boxed_contract_parser(mut self, parser: Box<dyn ContractParser>) -> Self {
        self.contract_parser = parser;
        self
    }

    pub fn build(&self, document: &SpecDocument) -> (Ir, Vec<CompileError>) {
        let metadata = SpecMetadata {
            version: document.version.clone(),
            name: document.name.clone(),
            description: document.description.clone(),
            file: document.file.clone(),
        };
        let mut ir = Ir::new(metadata, self.base_dir.clone());

        let mut errors = self.type_components(&mut ir, document);
        if !errors.is_empty() {
            debug!("Typing produced {} errors, skipping resolution", errors.len());
            return (ir, errors);
        }

        errors.extend(self.attach_contracts(&mut ir));
        errors.extend(resolve_references(&mut ir));
        errors.extend(resolve_bindings(&mut ir));

        debug!(
            "Built IR: {} components, {} edges, {} errors",
            ir.components.len(),
            ir.edges.len(),
            errors.len()
        );
        (ir, errors)
    }

    fn type_components(&self, ir: &mut Ir, document: &SpecDocument) -> Vec<CompileError> {
        let mut errors = Vec::new();

        for raw in &document.components {
            let kind = match raw.kind.parse::<Kind>() {
                Ok(kind) => kind,
                Err(_) => {
                    errors.push(CompileError::UnknownKind {
                        component: raw.id.clone(),
                        kind: raw.kind.clone(),
                        position: raw.position.clone(),
                    });
                    continue;
                }
            };

            if let Err(mut err) = ir.symbols.define(&raw.id, kind, &raw.id) {
                if let CompileError::DuplicateSymbol { position, .. } = &mut err {
                    position.clone_from(&raw.position);
                }
                errors.push(err);
                continue;
            }

            let mut component = Component::new(raw.id.clone(), type_spec(kind, &raw.spec));
            component.position = raw.position.clone();
            ir.components.insert(raw.id.clone(), component);
        }

        errors
    }

    fn attach_contracts(&self, ir: &mut Ir) -> Vec<CompileError> {
        let mut errors = Vec::new();

        for component in ir.components.values_mut() {
            let ComponentSpec::Server(server) = &mut component.spec else {
                continue;
            };
            if server.openapi.is_empty() {
                continue;
            }

            let path = self.base_dir.join(&server.openapi);
            match self.contract_parser.parse_file(&path) {
                Ok(contract) => server.contract = Some(contract),
                Err(e) => {
                    warn!("Failed to parse contract for {}: {e:#}", component.id);
                    errors.push(CompileError::ContractParse {
                        component: component.id.clone(),
                        path: server.openapi.clone(),
                        reason: format!("{e:#}"),
                        position: component.position.clone(),
                    });
                }
            }
        }

        errors
    }
}

fn resolve_references(ir: &mut Ir) -> Vec<CompileError> {
    let mut references = Vec::new();
    for component in ir.components.values() {
        let mut add = |refs: &Option<Vec<String>>, edge_type: EdgeType| {
            for target in refs.iter().flatten() {
                references.push((component.id.clone(), target.clone(), edge_type));
            }
        };
        match &component.spec {
            ComponentSpec::Server(server) => {
                add(&server.middleware, EdgeType::Middleware);
                add(&server.depends_on, EdgeType::Dependency);
            }
            ComponentSpec::Middleware(middleware) => {
                add(&middleware.depends_on, EdgeType::Dependency);
            }
            ComponentSpec::Usecase(usecase) => {
                add(&usecase.middleware, EdgeType::Middleware);
            }
            ComponentSpec::Database(_) => {}
        }
    }

    let mut errors = Vec::new();
    for (from, to, edge_type) in references {
        if ir.symbols.lookup(&to).is_some() {
            ir.connect(&from, &to, edge_type);
        } else {
            errors.push(CompileError::UnresolvedReference {
                position: ir.component(&from).and_then(|c| c.position.clone()),
                component: from,
                reference: to,
            });
        }
    }
    errors
}

fn resolve_bindings(ir: &mut Ir) -> Vec<CompileError> {
    let mut errors = Vec::new();
    let usecases: Vec<(String, String)> = ir
        .components
        .values()
        .filter_map(|c| c.as_usecase().map(|u| (c.id.clone(), u.binds_to.clone())))
        .filter(|(_, binds_to)| !binds_to.is_empty())
        .collect();

    for (id, binds_to) in usecases {
        let position = ir.component(&id).and_then(|c| c.position.clone());

        let mut binding = match parse_binding(&binds_to) {
            Ok(binding) => binding,
            Err(message) => {
                errors.push(CompileError::Format {
                    component: id,
                    message: format!("invalid binds_to: {message}"),
                    position,
                });
                continue;
            }
        };

        let Some(server_kind) = ir.symbols.lookup(&binding.server_id).map(|s| s.kind) else {
            errors.push(CompileError::UnresolvedReference {
                component: id,
                reference: binding.server_id,
                position,
            });
            continue;
        };

        if server_kind != Kind::Server {
            errors.push(CompileError::TypeMismatch {
                component: id,
                field: "binds_to".to_string(),
                reference: binding.server_id,
                expected: Kind::Server,
                actual: server_kind,
                position,
            });
            continue;
        }

        ir.connect(&id, &binding.server_id, EdgeType::Binding);

        let contract = ir
            .component(&binding.server_id)
            .and_then(|c| c.as_server())
            .and_then(|s| s.contract.as_ref());

        if let Some(contract) = contract {
            match contract.find_operation(binding.method, &binding.path) {
                Some(operation) => binding.operation = Some(operation.clone()),
                None => {
                    errors.push(CompileError::OperationNotFound {
                        component: id,
                        server: binding.server_id.clone(),
                        method: binding.method.to_string(),
                        path: binding.path.clone(),
                        position,
                    });
                    continue;
                }
            }
        }

        if let Some(Component {
            spec: ComponentSpec::Usecase(usecase),
            ..
        }) = ir.components.get_mut(&id)
        {
            usecase.binding = Some(binding);
        }
    }

    errors
}

/// Lift an untyped spec map into the typed struct for `kind`.
///
/// Missing or mistyped fields are left at their zero value; the validators
/// report them.
fn type_spec(kind: Kind, spec: &Map<String, Value>) -> ComponentSpec {
    match kind {
        Kind::Server => ComponentSpec::Server(ServerSpec {
            framework: str_field(spec, "framework"),
            port: port_field(spec),
            openapi: str_field(spec, "openapi"),
            middleware: list_field(spec, "middleware"),
            depends_on: list_field(spec, "depends_on"),
            contract: None,
        }),
        Kind::Middleware => ComponentSpec::Middleware(MiddlewareSpec {
            provider: str_field(spec, "provider"),
            config: str_field(spec, "config"),
            model: str_field(spec, "model"),
            policy: str_field(spec, "policy"),
            depends_on: list_field(spec, "depends_on"),
        }),
        Kind::Database => ComponentSpec::Database(DatabaseSpec {
            provider: str_field(spec, "provider"),
            schema: str_field(spec, "schema"),
        }),
        Kind::Usecase => ComponentSpec::Usecase(UsecaseSpec {
            binds_to: str_field(spec, "binds_to"),
            goal: str_field(spec, "goal"),
            actor: str_field(spec, "actor"),
            middleware: list_field(spec, "middleware"),
            preconditions: list_field(spec, "preconditions"),
            acceptance_criteria: list_field(spec, "acceptance_criteria"),
            postconditions: list_field(spec, "postconditions"),
            binding: None,
        }),
    }
}

fn str_field(spec: &Map<String, Value>, key: &str) -> String {
    spec.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

/// Integer or float; floats are truncated.
#[allow(clippy::cast_possible_truncation)]
fn port_field(spec: &Map<String, Value>) -> i64 {
    match spec.get("port") {
        Some(value) => value.as_i64().or_else(|| value.as_f64().map(|f| f as i64)).unwrap_or(0),
        None => 0,
    }
}

/// Non-string entries are dropped; a non-list value counts as absent.
fn list_field(spec: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    spec.get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(String::from).collect())
}
