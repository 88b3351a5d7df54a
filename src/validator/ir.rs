//! Validation of a built IR.
//!
//! Runs after the builder and checks what only makes sense on typed,
//! resolved components: cycles, required fields per kind, provider-specific
//! fields, the kinds that references resolve to, and requirements that span
//! several components. Everything is collected; nothing stops early.

use crate::constants::{MAX_PORT, MIN_PORT, PROVIDER_BETTER_AUTH, PROVIDER_CASBIN, PROVIDER_DRIZZLE};
use crate::core::{CompileError, Kind, sort_diagnostics};
use crate::ir::{
    Component, ComponentSpec, DatabaseSpec, Ir, MiddlewareSpec, ServerSpec, UsecaseSpec,
    binding_server, parse_binding,
};

/// Every IR-layer diagnostic, sorted by component ID.
pub fn validate_ir(ir: &Ir) -> Vec<CompileError> {
    let mut errors: Vec<CompileError> = ir
        .detect_cycles()
        .into_iter()
        .map(|cycle| CompileError::Cycle {
            cycle,
        })
        .collect();

    for component in ir.components.values() {
        let mut checker = ComponentChecker {
            ir,
            component,
            errors: &mut errors,
        };
        match &component.spec {
            ComponentSpec::Server(server) => checker.server(server),
            ComponentSpec::Middleware(middleware) => checker.middleware(middleware),
            ComponentSpec::Database(database) => checker.database(database),
            ComponentSpec::Usecase(usecase) => checker.usecase(usecase),
        }
    }

    errors.extend(validate_cross_component(ir));
    sort_diagnostics(&mut errors);
    errors
}

struct ComponentChecker<'a> {
    ir: &'a Ir,
    component: &'a Component,
    errors: &'a mut Vec<CompileError>,
}

impl ComponentChecker<'_> {
    fn server(&mut self, server: &ServerSpec) {
        self.require("framework", &server.framework, None);

        if server.port == 0 {
            self.missing("port", None);
        } else if !(MIN_PORT..=MAX_PORT).contains(&server.port) {
            self.errors.push(CompileError::Range {
                component: self.component.id.clone(),
                field: "port".to_string(),
                value: server.port,
                min: MIN_PORT,
                max: MAX_PORT,
                position: self.component.position.clone(),
            });
        }

        self.middleware_refs(&server.middleware);
    }

    fn middleware(&mut self, middleware: &MiddlewareSpec) {
        self.require("provider", &middleware.provider, None);

        match middleware.provider.as_str() {
            PROVIDER_BETTER_AUTH => {
                self.require("config", &middleware.config, Some("better-auth provider"));
            }
            PROVIDER_CASBIN => {
                self.require("model", &middleware.model, Some("casbin provider"));
                self.require("policy", &middleware.policy, Some("casbin provider"));
            }
            _ => {}
        }
    }

    fn database(&mut self, database: &DatabaseSpec) {
        self.require("provider", &database.provider, None);
        self.require("schema", &database.schema, None);
    }

    fn usecase(&mut self, usecase: &UsecaseSpec) {
        if usecase.binds_to.is_empty() {
            self.missing("binds_to", None);
        } else {
            if let Err(message) = parse_binding(&usecase.binds_to) {
                self.errors.push(CompileError::Format {
                    component: self.component.id.clone(),
                    message: format!("invalid binds_to: {message}"),
                    position: self.component.position.clone(),
                });
            }

            if let Some(server_id) = binding_server(&usecase.binds_to) {
                self.expect_kind("binds_to", server_id, Kind::Server);
            }
        }

        self.require("goal", &usecase.goal, None);
        self.middleware_refs(&usecase.middleware);
    }

    /// Unresolved references were already reported by the builder; only the
    /// kind of resolved ones is checked here.
    fn middleware_refs(&mut self, refs: &Option<Vec<String>>) {
        for reference in refs.iter().flatten() {
            self.expect_kind("middleware", reference, Kind::Middleware);
        }
    }

    fn expect_kind(&mut self, field: &str, reference: &str, expected: Kind) {
        if let Some(symbol) = self.ir.symbols.lookup(reference)
            && symbol.kind != expected
        {
            self.errors.push(CompileError::TypeMismatch {
                component: self.component.id.clone(),
                field: field.to_string(),
                reference: reference.to_string(),
                expected,
                actual: symbol.kind,
                position: self.component.position.clone(),
            });
        }
    }

    fn require(&mut self, field: &str, value: &str, required_by: Option<&str>) {
        if value.is_empty() {
            self.missing(field, required_by);
        }
    }

    fn missing(&mut self, field: &str, required_by: Option<&str>) {
        self.errors.push(CompileError::MissingField {
            component: self.component.id.clone(),
            field: field.to_string(),
            required_by: required_by.map(String::from),
            position: self.component.position.clone(),
        });
    }
}

/// A `better-auth` middleware that some server or use-case actually uses
/// needs a server to mount on and a drizzle-backed database for its tables.
///
/// Errors are attributed to the first such middleware by ID.
pub fn validate_cross_component(ir: &Ir) -> Vec<CompileError> {
    let is_better_auth = |id: &str| {
        ir.component(id)
            .and_then(Component::as_middleware)
            .is_some_and(|m| m.provider == PROVIDER_BETTER_AUTH)
    };

    let referenced = ir.components.values().flat_map(|component| {
        let refs = match &component.spec {
            ComponentSpec::Server(server) => server.middleware.as_deref(),
            ComponentSpec::Usecase(usecase) => usecase.middleware.as_deref(),
            _ => None,
        };
        refs.unwrap_or_default().iter()
    });

    let Some(auth_id) = referenced.filter(|id| is_better_auth(id)).min() else {
        return Vec::new();
    };

    let has_server = ir.components_of_kind(Kind::Server).next().is_some();
    let has_drizzle = ir
        .components_of_kind(Kind::Database)
        .filter_map(Component::as_database)
        .any(|db| db.provider == PROVIDER_DRIZZLE);

    let mut errors = Vec::new();
    if !has_server {
        errors.push(CompileError::CrossComponentRequirement {
            component: auth_id.clone(),
            message: "better-auth middleware requires at least one http.server component"
                .to_string(),
        });
    }
    if !has_drizzle {
        errors.push(CompileError::CrossComponentRequirement {
            component: auth_id.clone(),
            message: format!(
                "better-auth middleware requires a postgres component with provider \"{PROVIDER_DRIZZLE}\""
            ),
        });
    }
    errors
}
