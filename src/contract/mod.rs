//! API contracts.
//!
//! A server component may point at an OpenAPI 3.x document through its
//! `openapi` field. The builder parses that document into an [`ApiContract`],
//! which is nothing more than a table of [`Operation`]s keyed by
//! `METHOD:/path`. Use-case bindings are matched against that table.
//!
//! Parsing sits behind the [`ContractParser`] trait so tests (and other
//! contract formats) can inject their own implementation; [`OpenApiParser`] is
//! the default.

mod parser;

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub use parser::{ContractParser, OpenApiParser};

/// HTTP methods accepted in bindings and contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    #[must_use]
    pub const fn all() -> &'static [HttpMethod] {
        &[
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Patch,
            HttpMethod::Delete,
            HttpMethod::Head,
            HttpMethod::Options,
        ]
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    /// Methods are upper-case only; `get` is not a method.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::all()
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("invalid HTTP method {s:?}"))
    }
}

/// Lookup key for an operation, e.g. `GET:/users/{id}`.
#[must_use]
pub fn operation_key(method: HttpMethod, path: &str) -> String {
    format!("{method}:{path}")
}

/// A parsed API contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApiContract {
    pub title: String,
    pub version: String,
    /// Keyed by [`operation_key`].
    pub operations: BTreeMap<String, Operation>,
}

impl ApiContract {
    /// Exact match on method and path. Path templates are compared literally.
    #[must_use]
    pub fn find_operation(&self, method: HttpMethod, path: &str) -> Option<&Operation> {
        self.operations.get(&operation_key(method, path))
    }

    pub fn insert(&mut self, operation: Operation) {
        self.operations.insert(operation.key(), operation);
    }
}

/// One endpoint of a contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    pub method: HttpMethod,
    pub path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Keyed by status code.
    pub responses: BTreeMap<String, Response>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Operation {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            operation_id: None,
            method,
            path: path.into(),
            summary: String::new(),
            description: String::new(),
            parameters: Vec::new(),
            request_body: None,
            responses: BTreeMap::new(),
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn key(&self) -> String {
        operation_key(self.method, &self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    /// `path`, `query`, `header` or `cookie`.
    pub location: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBody {
    pub required: bool,
    /// Keyed by media type.
    pub content: BTreeMap<String, Option<Schema>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub description: String,
    pub content: BTreeMap<String, Option<Schema>>,
}

/// A simplified JSON schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,
}

impl Schema {
    /// Type name of a `$ref` (`#/components/schemas/User` becomes `User`).
    #[must_use]
    pub fn ref_name(&self) -> Option<&str> {
        self.reference.as_deref().map(|r| r.rsplit('/').next().unwrap_or(r))
    }
}
