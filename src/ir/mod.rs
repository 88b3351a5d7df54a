//! The intermediate representation.
//!
//! The [`Ir`] is what the compiler produces from a specification: every
//! component typed by its [`Kind`], every string reference resolved into an
//! [`Edge`], and every use-case's route resolved into a [`Binding`]. It is
//! built once per run by the [`Builder`], checked by the IR validator, and
//! then handed read-only to code generators.
//!
//! # Ownership
//!
//! The IR owns all components in a map keyed by ID. Components refer to each
//! other by ID only (`dependencies`, `dependents`, edge endpoints), so there
//! are no reference cycles to manage even when the *graph* is cyclic.
//!
//! # Lifecycle
//!
//! 1. Phase 1 creates components and the symbol table.
//! 2. Phase 2 attaches parsed API contracts to servers.
//! 3. Phase 3 appends edges (and the matching dependency/dependent IDs).
//! 4. Phase 4 attaches bindings to use-cases.
//!
//! Nothing mutates the IR after the builder returns.

mod binding;
mod builder;
mod graph;
mod symbols;

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::contract::ApiContract;
use crate::core::{Kind, Position};

pub use binding::{Binding, binding_server, parse_binding};
pub use builder::Builder;
pub use graph::CycleError;
pub use symbols::{Symbol, SymbolTable};

/// Top-level metadata of the document an IR was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpecMetadata {
    pub version: String,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip)]
    pub file: String,
}

/// The compiled specification.
#[derive(Debug, Clone, Default)]
pub struct Ir {
    pub metadata: SpecMetadata,
    pub components: BTreeMap<String, Component>,
    pub edges: Vec<Edge>,
    pub symbols: SymbolTable,
    /// Directory relative paths in the specification are resolved against.
    pub base_dir: PathBuf,
}

impl Ir {
    #[must_use]
    pub fn new(metadata: SpecMetadata, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            metadata,
            components: BTreeMap::new(),
            edges: Vec::new(),
            symbols: SymbolTable::new(),
            base_dir: base_dir.into(),
        }
    }

    #[must_use]
    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.get(id)
    }

    /// Components of one kind, in ID order.
    pub fn components_of_kind(&self, kind: Kind) -> impl Iterator<Item = &Component> {
        self.components.values().filter(move |c| c.kind() == kind)
    }

    /// Outgoing edges of a component.
    pub fn edges_from<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().filter(move |e| e.from == id)
    }

    /// Middleware applied to a use-case.
    ///
    /// An explicit `middleware` list wins, including an empty one. When the
    /// field is absent the use-case inherits the middleware of the server it
    /// is bound to.
    #[must_use]
    pub fn effective_middleware(&self, usecase: &UsecaseSpec) -> Vec<String> {
        if let Some(explicit) = &usecase.middleware {
            return explicit.clone();
        }

        usecase
            .binding
            .as_ref()
            .map(|b| b.server_id.as_str())
            .or_else(|| binding_server(&usecase.binds_to))
            .and_then(|server_id| self.component(server_id))
            .and_then(Component::as_server)
            .and_then(|server| server.middleware.clone())
            .unwrap_or_default()
    }

    /// Record an edge and the matching back references.
    ///
    /// Both endpoints must already be in the component map.
    pub(crate) fn connect(&mut self, from: &str, to: &str, edge_type: EdgeType) {
        if let Some(component) = self.components.get_mut(from) {
            component.dependencies.push(to.to_string());
        }
        if let Some(component) = self.components.get_mut(to) {
            component.dependents.push(from.to_string());
        }
        self.edges.push(Edge {
            from: from.to_string(),
            to: to.to_string(),
            edge_type,
        });
    }
}

/// A typed component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    pub id: String,
    #[serde(skip)]
    pub position: Option<Position>,
    pub spec: ComponentSpec,
    /// IDs this component points at, one entry per edge.
    pub dependencies: Vec<String>,
    /// IDs pointing at this component, one entry per edge.
    pub dependents: Vec<String>,
}

impl Component {
    pub fn new(id: impl Into<String>, spec: ComponentSpec) -> Self {
        Self {
            id: id.into(),
            position: None,
            spec,
            dependencies: Vec::new(),
            dependents: Vec::new(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.spec.kind()
    }

    #[must_use]
    pub fn as_server(&self) -> Option<&ServerSpec> {
        match &self.spec {
            ComponentSpec::Server(spec) => Some(spec),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_middleware(&self) -> Option<&MiddlewareSpec> {
        match &self.spec {
            ComponentSpec::Middleware(spec) => Some(spec),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_database(&self) -> Option<&DatabaseSpec> {
        match &self.spec {
            ComponentSpec::Database(spec) => Some(spec),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_usecase(&self) -> Option<&UsecaseSpec> {
        match &self.spec {
            ComponentSpec::Usecase(spec) => Some(spec),
            _ => None,
        }
    }
}

/// Kind-specific fields. The variant *is* the component's kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ComponentSpec {
    Server(ServerSpec),
    Middleware(MiddlewareSpec),
    Database(DatabaseSpec),
    Usecase(UsecaseSpec),
}

impl ComponentSpec {
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Server(_) => Kind::Server,
            Self::Middleware(_) => Kind::Middleware,
            Self::Database(_) => Kind::Database,
            Self::Usecase(_) => Kind::Usecase,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServerSpec {
    pub framework: String,
    /// Zero when absent.
    pub port: i64,
    /// Path to the OpenAPI contract, relative to the specification.
    pub openapi: String,
    pub middleware: Option<Vec<String>>,
    pub depends_on: Option<Vec<String>>,
    /// Attached in builder phase 2.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract: Option<ApiContract>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MiddlewareSpec {
    pub provider: String,
    pub config: String,
    pub model: String,
    pub policy: String,
    pub depends_on: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatabaseSpec {
    pub provider: String,
    pub schema: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsecaseSpec {
    pub binds_to: String,
    pub goal: String,
    pub actor: String,
    /// `None` inherits the bound server's middleware; `Some([])` means none.
    pub middleware: Option<Vec<String>>,
    pub preconditions: Option<Vec<String>>,
    pub acceptance_criteria: Option<Vec<String>>,
    pub postconditions: Option<Vec<String>>,
    /// Attached in builder phase 4.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<Binding>,
}

/// A directed relationship between two components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    /// `depends_on`
    Dependency,
    /// A `middleware` list entry.
    Middleware,
    /// A use-case's `binds_to` server.
    Binding,
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Dependency => "dependency",
            Self::Middleware => "middleware",
            Self::Binding => "binding",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ir_with(components: Vec<Component>) -> Ir {
        let mut ir = Ir::new(SpecMetadata::default(), "");
        for component in components {
            ir.components.insert(component.id.clone(), component);
        }
        ir
    }

    fn server(middleware: Option<Vec<&str>>) -> Component {
        Component::new(
            "server.api",
            ComponentSpec::Server(ServerSpec {
                middleware: middleware.map(|m| m.into_iter().map(String::from).collect()),
                ..ServerSpec::default()
            }),
        )
    }

    #[test]
    fn test_kind_follows_variant() {
        let component = Component::new("db.main", ComponentSpec::Database(DatabaseSpec::default()));
        assert_eq!(component.kind(), Kind::Database);
        assert!(component.as_database().is_some());
        assert!(component.as_server().is_none());
    }

    #[test]
    fn test_connect_is_bidirectional() {
        let mut ir = ir_with(vec![
            server(None),
            Component::new("mw.auth", ComponentSpec::Middleware(MiddlewareSpec::default())),
        ]);
        ir.connect("server.api", "mw.auth", EdgeType::Middleware);

        assert_eq!(ir.component("server.api").unwrap().dependencies, vec!["mw.auth"]);
        assert_eq!(ir.component("mw.auth").unwrap().dependents, vec!["server.api"]);
        assert_eq!(ir.edges_from("server.api").count(), 1);
        assert_eq!(ir.edges[0].edge_type.to_string(), "middleware");
    }

    #[test]
    fn test_effective_middleware_inherits_from_server() {
        let ir = ir_with(vec![server(Some(vec!["mw.authn", "mw.authz"]))]);

        let inherit = UsecaseSpec {
            binds_to: "server.api:GET:/x".to_string(),
            ..UsecaseSpec::default()
        };
        assert_eq!(ir.effective_middleware(&inherit), vec!["mw.authn", "mw.authz"]);

        let explicit_none = UsecaseSpec {
            binds_to: "server.api:GET:/x".to_string(),
            middleware: Some(vec![]),
            ..UsecaseSpec::default()
        };
        assert!(ir.effective_middleware(&explicit_none).is_empty());

        let unbound = UsecaseSpec::default();
        assert!(ir.effective_middleware(&unbound).is_empty());
    }
}
