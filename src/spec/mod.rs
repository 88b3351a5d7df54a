//! Specification document loading.
//!
//! A specification is a single YAML (or JSON) document:
//!
//! ```yaml
//! version: "1.0.0"
//! name: my-app
//! description: optional
//! components:
//!   - id: server.api
//!     kind: http.server
//!     spec:
//!       framework: hono
//!       port: 3000
//! ```
//!
//! Loading is deliberately shallow. The document is parsed into an untyped
//! [`serde_json::Value`] (kept as [`SpecDocument::raw`] for the schema layer)
//! and the top-level metadata and component list are lifted out leniently:
//! wrong-typed values become empty strings and empty maps instead of errors.
//! Deciding what is *wrong* with a document is the validators' job; the loader
//! only fails when the text is not a mapping at all.

mod position;

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

use crate::core::{BoundError, Position};

pub use position::locate_components;

/// A loaded specification document.
#[derive(Debug, Clone, Default)]
pub struct SpecDocument {
    pub version: String,
    pub name: String,
    pub description: String,
    pub components: Vec<RawComponent>,
    /// File the document was read from (empty when parsed from a string).
    pub file: String,
    /// The untyped document, as parsed.
    pub raw: Value,
}

/// A component as written in the document, before typing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawComponent {
    pub id: String,
    pub kind: String,
    pub spec: Map<String, Value>,
    pub position: Option<Position>,
}

impl RawComponent {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, spec: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            spec,
            position: None,
        }
    }
}

impl SpecDocument {
    /// Read and parse a specification file.
    ///
    /// # Errors
    ///
    /// [`BoundError::SpecNotFound`] if the file does not exist, or
    /// [`BoundError::SpecParse`] if it cannot be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BoundError::SpecNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read specification: {}", path.display()))?;
        let file = path.display().to_string();
        let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let raw = if is_json {
            serde_json::from_str(&source).map_err(|e| BoundError::SpecParse {
                file: file.clone(),
                reason: e.to_string(),
            })?
        } else {
            parse_yaml(&source, &file)?
        };

        let document = Self::from_value(raw, &file, Some(&source))?;
        debug!("Loaded specification {} with {} components", file, document.components.len());
        Ok(document)
    }

    /// Parse a YAML (or JSON) string.
    ///
    /// # Errors
    ///
    /// [`BoundError::SpecParse`] if the text is not a YAML mapping.
    pub fn parse(source: &str, file: &str) -> Result<Self> {
        let raw = parse_yaml(source, file)?;
        Self::from_value(raw, file, Some(source))
    }

    /// Lift metadata and components out of an already parsed document.
    ///
    /// When `source` is given, component positions are recovered from it.
    ///
    /// # Errors
    ///
    /// [`BoundError::SpecParse`] if the root is not a mapping.
    pub fn from_value(raw: Value, file: &str, source: Option<&str>) -> Result<Self> {
        let Some(root) = raw.as_object() else {
            return Err(BoundError::SpecParse {
                file: file.to_string(),
                reason: "expected mapping at root".to_string(),
            }
            .into());
        };

        let mut components: Vec<RawComponent> = root
            .get("components")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(raw_component).collect())
            .unwrap_or_default();

        if let Some(source) = source {
            let ids: Vec<&str> = components.iter().map(|c| c.id.as_str()).collect();
            let positions = locate_components(source, file, &ids);
            for (component, position) in components.iter_mut().zip(positions) {
                component.position = position;
            }
        }

        Ok(Self {
            version: string_field(root, "version"),
            name: string_field(root, "name"),
            description: string_field(root, "description"),
            components,
            file: file.to_string(),
            raw,
        })
    }

    /// Directory the document lives in, used to resolve relative paths.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        Path::new(&self.file).parent().unwrap_or_else(|| Path::new(""))
    }
}

fn parse_yaml(source: &str, file: &str) -> Result<Value> {
    serde_yaml::from_str::<Value>(source).map_err(|e| {
        BoundError::SpecParse {
            file: file.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

fn raw_component(value: &Value) -> Option<RawComponent> {
    let map = value.as_object()?;
    Some(RawComponent {
        id: string_field(map, "id"),
        kind: string_field(map, "kind"),
        spec: map.get("spec").and_then(Value::as_object).cloned().unwrap_or_default(),
        position: None,
    })
}

fn string_field(map: &Map<String, Value>, key: &str) -> String {
    map.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}
