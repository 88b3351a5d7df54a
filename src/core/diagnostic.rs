//! Compile diagnostics.
//!
//! Everything the builder and the validators find wrong with a specification is
//! reported as a [`CompileError`]. Diagnostics are *accumulated*: a single run
//! returns every problem it can see instead of stopping at the first one, so
//! these values are plain data (`Clone`, comparable by category) rather than
//! control flow.
//!
//! Each per-component variant carries the offending component ID and, when the
//! loader could locate it, a source [`Position`].

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

use super::Kind;

/// A location in the source document (1-indexed).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file.is_empty() {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            write!(f, "{}:{}:{}", self.file, self.line, self.column)
        }
    }
}

/// The diagnostic taxonomy, used to filter and count errors by class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Structural,
    SchemaViolation,
    UnknownKind,
    UnresolvedReference,
    DuplicateSymbol,
    Format,
    TypeMismatch,
    MissingField,
    Range,
    CrossComponentRequirement,
    Cycle,
    Contract,
}

/// A single accumulated compile diagnostic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The document could not be read as a specification at all.
    #[error("malformed specification: {message}")]
    Structural { message: String },

    /// The raw document does not match the structural schema.
    #[error("{message} (at {path})")]
    SchemaViolation { path: String, message: String },

    #[error("component \"{component}\": unknown kind: {kind}{}", at(.position))]
    UnknownKind {
        component: String,
        kind: String,
        position: Option<Position>,
    },

    #[error("unresolved reference \"{reference}\" in component \"{component}\"{}", at(.position))]
    UnresolvedReference {
        component: String,
        reference: String,
        position: Option<Position>,
    },

    #[error("symbol \"{name}\" already defined as {existing_kind}{}", at(.position))]
    DuplicateSymbol {
        name: String,
        existing_kind: String,
        position: Option<Position>,
    },

    /// Malformed binding grammar, method or path.
    #[error("{component}: {message}{}", at(.position))]
    Format {
        component: String,
        message: String,
        position: Option<Position>,
    },

    /// A reference resolved, but to a component of the wrong kind.
    #[error(
        "{component}: {field} reference \"{reference}\" points to {actual}, expected {expected}{}",
        at(.position)
    )]
    TypeMismatch {
        component: String,
        field: String,
        reference: String,
        expected: Kind,
        actual: Kind,
        position: Option<Position>,
    },

    #[error("{component}: missing required field: {field}{}{}", required_by_suffix(.required_by), at(.position))]
    MissingField {
        component: String,
        field: String,
        /// Set when the field is only required because of another value,
        /// e.g. a specific middleware provider.
        required_by: Option<String>,
        position: Option<Position>,
    },

    /// Top-level document metadata (`version`, `name`) is absent.
    #[error("specification {field} is required")]
    MissingMetadata { field: String },

    #[error("{component}: {field} must be between {min} and {max}, got {value}{}", at(.position))]
    Range {
        component: String,
        field: String,
        value: i64,
        min: i64,
        max: i64,
        position: Option<Position>,
    },

    #[error("{component}: {message}")]
    CrossComponentRequirement { component: String, message: String },

    #[error("dependency cycle: {}", format_cycle(.cycle))]
    Cycle { cycle: Vec<String> },

    #[error(
        "component \"{component}\": failed to parse API contract \"{path}\": {reason}{}",
        at(.position)
    )]
    ContractParse {
        component: String,
        path: String,
        reason: String,
        position: Option<Position>,
    },

    #[error(
        "component \"{component}\": operation {method}:{path} not found in \"{server}\"'s API contract{}",
        at(.position)
    )]
    OperationNotFound {
        component: String,
        server: String,
        method: String,
        path: String,
        position: Option<Position>,
    },
}

impl CompileError {
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Structural { .. } => ErrorCategory::Structural,
            Self::SchemaViolation { .. } => ErrorCategory::SchemaViolation,
            Self::UnknownKind { .. } => ErrorCategory::UnknownKind,
            Self::UnresolvedReference { .. } => ErrorCategory::UnresolvedReference,
            Self::DuplicateSymbol { .. } => ErrorCategory::DuplicateSymbol,
            Self::Format { .. } => ErrorCategory::Format,
            Self::TypeMismatch { .. } => ErrorCategory::TypeMismatch,
            Self::MissingField { .. } | Self::MissingMetadata { .. } => ErrorCategory::MissingField,
            Self::Range { .. } => ErrorCategory::Range,
            Self::CrossComponentRequirement { .. } => ErrorCategory::CrossComponentRequirement,
            Self::Cycle { .. } => ErrorCategory::Cycle,
            Self::ContractParse { .. } | Self::OperationNotFound { .. } => ErrorCategory::Contract,
        }
    }

    /// The component this diagnostic is about, if it concerns one.
    ///
    /// For cycles this is the first component on the cycle.
    #[must_use]
    pub fn component_id(&self) -> Option<&str> {
        match self {
            Self::Structural { .. } | Self::SchemaViolation { .. } | Self::MissingMetadata { .. } => {
                None
            }
            Self::UnknownKind { component, .. }
            | Self::UnresolvedReference { component, .. }
            | Self::Format { component, .. }
            | Self::TypeMismatch { component, .. }
            | Self::MissingField { component, .. }
            | Self::Range { component, .. }
            | Self::CrossComponentRequirement { component, .. }
            | Self::ContractParse { component, .. }
            | Self::OperationNotFound { component, .. } => Some(component),
            Self::DuplicateSymbol { name, .. } => Some(name),
            Self::Cycle { cycle } => cycle.first().map(String::as_str),
        }
    }

    #[must_use]
    pub fn position(&self) -> Option<&Position> {
        match self {
            Self::UnknownKind { position, .. }
            | Self::UnresolvedReference { position, .. }
            | Self::DuplicateSymbol { position, .. }
            | Self::Format { position, .. }
            | Self::TypeMismatch { position, .. }
            | Self::MissingField { position, .. }
            | Self::Range { position, .. }
            | Self::ContractParse { position, .. }
            | Self::OperationNotFound { position, .. } => position.as_ref(),
            _ => None,
        }
    }
}

/// Sort diagnostics for display: by component ID, then source position, then
/// message.
///
/// Diagnostics without a component sort first; within one component,
/// diagnostics without a position sort last.
pub fn sort_diagnostics(errors: &mut [CompileError]) {
    errors.sort_by(|a, b| {
        a.component_id()
            .cmp(&b.component_id())
            .then_with(|| position_order(a.position(), b.position()))
            .then_with(|| a.to_string().cmp(&b.to_string()))
    });
}

fn position_order(a: Option<&Position>, b: Option<&Position>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => (&a.file, a.line, a.column).cmp(&(&b.file, b.line, b.column)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Render a cycle as `a -> b -> a`.
#[must_use]
pub fn format_cycle(cycle: &[String]) -> String {
    match cycle.first() {
        Some(first) => format!("{} -> {first}", cycle.join(" -> ")),
        None => String::new(),
    }
}

fn at(position: &Option<Position>) -> String {
    position.as_ref().map(|p| format!(" (at {p})")).unwrap_or_default()
}

fn required_by_suffix(source: &Option<String>) -> String {
    source.as_ref().map(|s| format!(" (required by {s})")).unwrap_or_default()
}
