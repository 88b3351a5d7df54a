//! Structural schema validation of the raw document.
//!
//! Checks the untyped document against the shape every specification must
//! have, before anything is typed. Each violation is reported with a JSON
//! pointer into the document (`/components/2/spec/port`). A document that
//! fails here never reaches the builder.

use regex::Regex;
use serde_json::{Map, Value};

use crate::constants::{MAX_PORT, MIN_PORT};
use crate::core::{CompileError, Kind};

const COMPONENT_ID_PATTERN: &str = r"^[a-z][a-z0-9_-]*(\.[a-z0-9_-]+)+$";
const BINDS_TO_PATTERN: &str = r"^[^:]+:(GET|POST|PUT|PATCH|DELETE|HEAD|OPTIONS):/.*$";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldType {
    String,
    StringArray,
    Port,
    Binding,
}

#[derive(Debug, Clone, Copy)]
struct FieldRule {
    name: &'static str,
    field_type: FieldType,
    required: bool,
}

const fn field(name: &'static str, field_type: FieldType, required: bool) -> FieldRule {
    FieldRule {
        name,
        field_type,
        required,
    }
}

const SERVER_FIELDS: &[FieldRule] = &[
    field("framework", FieldType::String, true),
    field("port", FieldType::Port, true),
    field("openapi", FieldType::String, false),
    field("middleware", FieldType::StringArray, false),
    field("depends_on", FieldType::StringArray, false),
];

const MIDDLEWARE_FIELDS: &[FieldRule] = &[
    field("provider", FieldType::String, true),
    field("config", FieldType::String, false),
    field("model", FieldType::String, false),
    field("policy", FieldType::String, false),
    field("depends_on", FieldType::StringArray, false),
];

const DATABASE_FIELDS: &[FieldRule] = &[
    field("provider", FieldType::String, true),
    field("schema", FieldType::String, true),
];

const USECASE_FIELDS: &[FieldRule] = &[
    field("binds_to", FieldType::Binding, true),
    field("goal", FieldType::String, true),
    field("actor", FieldType::String, false),
    field("middleware", FieldType::StringArray, false),
    field("preconditions", FieldType::StringArray, false),
    field("acceptance_criteria", FieldType::StringArray, false),
    field("postconditions", FieldType::StringArray, false),
];

const fn fields_for(kind: Kind) -> &'static [FieldRule] {
    match kind {
        Kind::Server => SERVER_FIELDS,
        Kind::Middleware => MIDDLEWARE_FIELDS,
        Kind::Database => DATABASE_FIELDS,
        Kind::Usecase => USECASE_FIELDS,
    }
}

/// Validate a raw document, returning violations in document order.
pub fn validate_schema(document: &Value) -> Vec<CompileError> {
    SchemaWalker::new().walk(document)
}

struct SchemaWalker {
    id_regex: Option<Regex>,
    binds_to_regex: Option<Regex>,
    errors: Vec<CompileError>,
}

impl SchemaWalker {
    fn new() -> Self {
        Self {
            id_regex: Regex::new(COMPONENT_ID_PATTERN).ok(),
            binds_to_regex: Regex::new(BINDS_TO_PATTERN).ok(),
            errors: Vec::new(),
        }
    }

    fn violation(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(CompileError::SchemaViolation {
            path: path.into(),
            message: message.into(),
        });
    }

    fn walk(mut self, document: &Value) -> Vec<CompileError> {
        let Some(root) = document.as_object() else {
            self.errors.push(CompileError::Structural {
                message: format!("expected a mapping at the root, got {}", type_name(document)),
            });
            return self.errors;
        };

        for key in root.keys() {
            if !matches!(key.as_str(), "version" | "name" | "description" | "components") {
                self.violation(format!("/{}", escape(key)), format!("additional property '{key}' not allowed"));
            }
        }

        match root.get("version") {
            None => self.violation("", "missing property 'version'"),
            Some(Value::String(version)) => {
                if semver::Version::parse(version).is_err() {
                    self.violation("/version", format!("'{version}' is not a valid semantic version"));
                }
            }
            Some(other) => self.type_mismatch("/version", "string", other),
        }

        match root.get("name") {
            None => self.violation("", "missing property 'name'"),
            Some(Value::String(name)) if name.is_empty() => {
                self.violation("/name", "name must not be empty");
            }
            Some(Value::String(_)) => {}
            Some(other) => self.type_mismatch("/name", "string", other),
        }

        if let Some(description) = root.get("description")
            && !description.is_string()
        {
            self.type_mismatch("/description", "string", description);
        }

        match root.get("components") {
            None => self.violation("", "missing property 'components'"),
            Some(Value::Array(components)) => {
                for (index, component) in components.iter().enumerate() {
                    self.component(&format!("/components/{index}"), component);
                }
            }
            Some(other) => self.type_mismatch("/components", "array", other),
        }

        self.errors
    }

    fn component(&mut self, path: &str, value: &Value) {
        let Some(component) = value.as_object() else {
            self.type_mismatch(path, "object", value);
            return;
        };

        for key in component.keys() {
            if !matches!(key.as_str(), "id" | "kind" | "spec") {
                self.violation(
                    format!("{path}/{}", escape(key)),
                    format!("additional property '{key}' not allowed"),
                );
            }
        }

        match component.get("id") {
            None => self.violation(path, "missing property 'id'"),
            Some(Value::String(id)) => {
                if !self.id_regex.as_ref().is_some_and(|re| re.is_match(id)) {
                    self.violation(
                        format!("{path}/id"),
                        format!("'{id}' does not match pattern '{COMPONENT_ID_PATTERN}'"),
                    );
                }
            }
            Some(other) => self.type_mismatch(&format!("{path}/id"), "string", other),
        }

        let kind = match component.get("kind") {
            None => {
                self.violation(path, "missing property 'kind'");
                None
            }
            Some(Value::String(kind)) => match kind.parse::<Kind>() {
                Ok(kind) => Some(kind),
                Err(_) => {
                    self.violation(
                        format!("{path}/kind"),
                        format!(
                            "value must be one of {}, got '{kind}'",
                            Kind::accepted_spellings().join(", ")
                        ),
                    );
                    None
                }
            },
            Some(other) => {
                self.type_mismatch(&format!("{path}/kind"), "string", other);
                None
            }
        };

        match component.get("spec") {
            None => self.violation(path, "missing property 'spec'"),
            Some(Value::Object(spec)) => {
                if let Some(kind) = kind {
                    self.spec(&format!("{path}/spec"), kind, spec);
                }
            }
            Some(other) => self.type_mismatch(&format!("{path}/spec"), "object", other),
        }
    }

    fn spec(&mut self, path: &str, kind: Kind, spec: &Map<String, Value>) {
        let rules = fields_for(kind);

        for key in spec.keys() {
            if !rules.iter().any(|rule| rule.name == key) {
                self.violation(
                    format!("{path}/{}", escape(key)),
                    format!("additional property '{key}' not allowed for {kind}"),
                );
            }
        }

        for rule in rules {
            let field_path = format!("{path}/{}", rule.name);
            let Some(value) = spec.get(rule.name) else {
                if rule.required {
                    self.violation(path, format!("missing property '{}'", rule.name));
                }
                continue;
            };

            match rule.field_type {
                FieldType::String => {
                    if !value.is_string() {
                        self.type_mismatch(&field_path, "string", value);
                    }
                }
                FieldType::StringArray => self.string_array(&field_path, value),
                FieldType::Port => match value.as_i64() {
                    Some(port) if (MIN_PORT..=MAX_PORT).contains(&port) => {}
                    Some(port) => self.violation(
                        &field_path,
                        format!("port must be between {MIN_PORT} and {MAX_PORT}, got {port}"),
                    ),
                    None => self.type_mismatch(&field_path, "integer", value),
                },
                FieldType::Binding => match value.as_str() {
                    Some(binds_to) => {
                        if !self.binds_to_regex.as_ref().is_some_and(|re| re.is_match(binds_to)) {
                            self.violation(
                                &field_path,
                                format!("'{binds_to}' does not match pattern '{BINDS_TO_PATTERN}'"),
                            );
                        }
                    }
                    None => self.type_mismatch(&field_path, "string", value),
                },
            }
        }
    }

    fn string_array(&mut self, path: &str, value: &Value) {
        let Some(items) = value.as_array() else {
            self.type_mismatch(path, "array", value);
            return;
        };
        for (index, item) in items.iter().enumerate() {
            if !item.is_string() {
                self.type_mismatch(&format!("{path}/{index}"), "string", item);
            }
        }
    }

    fn type_mismatch(&mut self, path: &str, expected: &str, actual: &Value) {
        self.violation(path, format!("expected {expected}, but got {}", type_name(actual)));
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// JSON pointer escaping (RFC 6901).
fn escape(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}
