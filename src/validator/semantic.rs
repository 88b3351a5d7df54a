//! Document-level semantic checks that need no typing.

use std::collections::HashMap;

use crate::core::{CompileError, sort_diagnostics};
use crate::spec::SpecDocument;

/// Duplicate component IDs and missing top-level metadata, sorted.
pub fn validate_semantic(document: &SpecDocument) -> Vec<CompileError> {
    let mut errors = Vec::new();
    let mut seen: HashMap<&str, &str> = HashMap::new();

    for component in &document.components {
        if let Some(existing_kind) = seen.get(component.id.as_str()) {
            errors.push(CompileError::DuplicateSymbol {
                name: component.id.clone(),
                existing_kind: (*existing_kind).to_string(),
                position: component.position.clone(),
            });
        } else {
            seen.insert(&component.id, &component.kind);
        }
    }

    if document.version.is_empty() {
        errors.push(CompileError::MissingMetadata {
            field: "version".to_string(),
        });
    }
    if document.name.is_empty() {
        errors.push(CompileError::MissingMetadata {
            field: "name".to_string(),
        });
    }

    sort_diagnostics(&mut errors);
    errors
}
