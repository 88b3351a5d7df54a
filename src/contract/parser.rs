use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use super::{ApiContract, HttpMethod, Operation, Parameter, RequestBody, Response, Schema};

/// Turns a contract file into an [`ApiContract`].
pub trait ContractParser {
    /// Parse the contract at `path`. Relative paths have already been
    /// resolved by the caller.
    fn parse_file(&self, path: &Path) -> Result<ApiContract>;
}

/// Parser for OpenAPI 3.x documents in YAML or JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenApiParser;

impl OpenApiParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse an OpenAPI document from text.
    pub fn parse_str(&self, source: &str) -> Result<ApiContract> {
        // JSON is a subset of YAML, so one deserializer covers both.
        let document: RawDocument =
            serde_yaml::from_str(source).context("failed to parse OpenAPI document")?;

        if !document.openapi.starts_with("3.") {
            bail!("unsupported OpenAPI version {:?}, expected 3.x", document.openapi);
        }

        let mut contract = ApiContract::default();
        if let Some(info) = document.info {
            contract.title = info.title;
            contract.version = info.version;
        }

        for (path, item) in document.paths {
            let shared = item.parameters.clone();
            for (method, raw) in item.into_operations() {
                contract.insert(convert_operation(method, &path, raw, &shared));
            }
        }

        Ok(contract)
    }
}

impl ContractParser for OpenApiParser {
    fn parse_file(&self, path: &Path) -> Result<ApiContract> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let contract = self.parse_str(&source)?;
        debug!(
            "Parsed OpenAPI contract {} ({} operations)",
            path.display(),
            contract.operations.len()
        );
        Ok(contract)
    }
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    openapi: String,
    info: Option<RawInfo>,
    #[serde(default)]
    paths: BTreeMap<String, RawPathItem>,
}

#[derive(Debug, Deserialize)]
struct RawInfo {
    #[serde(default)]
    title: String,
    #[serde(default)]
    version: String,
}

#[derive(Debug, Deserialize)]
struct RawPathItem {
    get: Option<RawOperation>,
    post: Option<RawOperation>,
    put: Option<RawOperation>,
    patch: Option<RawOperation>,
    delete: Option<RawOperation>,
    head: Option<RawOperation>,
    options: Option<RawOperation>,
    /// Path-level parameters shared by all operations.
    #[serde(default)]
    parameters: Vec<RawParameter>,
}

impl RawPathItem {
    fn into_operations(self) -> Vec<(HttpMethod, RawOperation)> {
        [
            (HttpMethod::Get, self.get),
            (HttpMethod::Post, self.post),
            (HttpMethod::Put, self.put),
            (HttpMethod::Patch, self.patch),
            (HttpMethod::Delete, self.delete),
            (HttpMethod::Head, self.head),
            (HttpMethod::Options, self.options),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.map(|op| (method, op)))
        .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOperation {
    operation_id: Option<String>,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    parameters: Vec<RawParameter>,
    request_body: Option<RawRequestBody>,
    #[serde(default)]
    responses: BTreeMap<String, RawResponse>,
}

/// Either an inline parameter or a `$ref`; references are not followed.
#[derive(Debug, Clone, Deserialize)]
struct RawParameter {
    #[serde(default)]
    name: String,
    #[serde(rename = "in", default)]
    location: String,
    #[serde(default)]
    required: bool,
    schema: Option<RawSchema>,
}

#[derive(Debug, Deserialize)]
struct RawRequestBody {
    #[serde(default)]
    required: bool,
    #[serde(default)]
    content: BTreeMap<String, RawMediaType>,
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(default)]
    description: String,
    #[serde(default)]
    content: BTreeMap<String, RawMediaType>,
}

#[derive(Debug, Deserialize)]
struct RawMediaType {
    schema: Option<RawSchema>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawSchema {
    #[serde(rename = "type")]
    schema_type: Option<RawSchemaType>,
    format: Option<String>,
    #[serde(rename = "$ref")]
    reference: Option<String>,
    #[serde(default)]
    properties: BTreeMap<String, RawSchema>,
    items: Option<Box<RawSchema>>,
    #[serde(default)]
    required: Vec<String>,
    #[serde(rename = "enum", default)]
    enum_values: Vec<serde_json::Value>,
    #[serde(default)]
    nullable: bool,
}

/// OpenAPI 3.1 allows `type: [string, "null"]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawSchemaType {
    Single(String),
    Multiple(Vec<String>),
}

fn convert_operation(
    method: HttpMethod,
    path: &str,
    raw: RawOperation,
    shared: &[RawParameter],
) -> Operation {
    let mut operation = Operation::new(method, path);
    operation.operation_id = raw.operation_id;
    operation.summary = raw.summary;
    operation.description = raw.description;
    operation.tags = raw.tags;

    // Operation-level parameters override path-level ones with the same name
    // and location.
    let mut parameters: Vec<Parameter> = Vec::new();
    for param in raw.parameters.iter().chain(shared.iter()) {
        if param.name.is_empty() {
            continue;
        }
        let duplicate = parameters
            .iter()
            .any(|p| p.name == param.name && p.location == param.location);
        if !duplicate {
            parameters.push(Parameter {
                name: param.name.clone(),
                location: param.location.clone(),
                required: param.required,
                schema: param.schema.clone().map(convert_schema),
            });
        }
    }
    operation.parameters = parameters;

    operation.request_body = raw.request_body.map(|body| RequestBody {
        required: body.required,
        content: convert_content(body.content),
    });

    operation.responses = raw
        .responses
        .into_iter()
        .map(|(status, response)| {
            (
                status,
                Response {
                    description: response.description,
                    content: convert_content(response.content),
                },
            )
        })
        .collect();

    operation
}

fn convert_content(content: BTreeMap<String, RawMediaType>) -> BTreeMap<String, Option<Schema>> {
    content
        .into_iter()
        .map(|(media_type, media)| (media_type, media.schema.map(convert_schema)))
        .collect()
}

fn convert_schema(raw: RawSchema) -> Schema {
    if raw.reference.is_some() {
        return Schema {
            reference: raw.reference,
            ..Schema::default()
        };
    }

    let (schema_type, nullable) = match raw.schema_type {
        Some(RawSchemaType::Single(t)) => (Some(t), raw.nullable),
        Some(RawSchemaType::Multiple(types)) => {
            let nullable = raw.nullable || types.iter().any(|t| t == "null");
            (types.into_iter().find(|t| t != "null"), nullable)
        }
        None => (None, raw.nullable),
    };

    Schema {
        schema_type,
        format: raw.format,
        reference: None,
        properties: raw.properties.into_iter().map(|(k, v)| (k, convert_schema(v))).collect(),
        items: raw.items.map(|items| Box::new(convert_schema(*items))),
        required: raw.required,
        enum_values: raw.enum_values,
        nullable,
    }
}
