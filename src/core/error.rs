//! Error handling for bound
//!
//! Two kinds of failure exist in the compiler:
//!
//! - **Diagnostics** ([`CompileError`]) are problems with the specification
//!   itself. They are accumulated by the builder and the validators and
//!   reported together.
//! - **Fatal errors** ([`BoundError`]) stop a run: the document could not be
//!   read, a pipeline stage produced diagnostics, an artifact path escaped the
//!   output directory, and so on.
//!
//! [`ErrorContext`] wraps a [`BoundError`] with details and an actionable
//! suggestion, and [`user_friendly_error`] turns any [`anyhow::Error`] into one
//! for CLI display.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bound_cli::core::{BoundError, ErrorContext, user_friendly_error};
//!
//! let context = ErrorContext::new(BoundError::SpecNotFound {
//!     path: "spec.yaml".to_string(),
//! })
//! .with_suggestion("Run 'bound init my-app' to create a starter specification");
//! context.display();
//!
//! let friendly = user_friendly_error(anyhow::anyhow!("something went wrong"));
//! println!("{friendly}");
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use super::CompileError;

/// Fatal errors for bound operations.
#[derive(Error, Debug, Clone)]
pub enum BoundError {
    /// The specification file does not exist.
    #[error("Specification file not found: {path}")]
    SpecNotFound { path: String },

    /// The specification file exists but is not a readable YAML/JSON document.
    #[error("Failed to parse specification {file}: {reason}")]
    SpecParse { file: String, reason: String },

    /// A pipeline stage reported diagnostics.
    #[error("Stage '{stage}' failed: {message}")]
    StageFailed {
        stage: String,
        message: String,
        errors: Vec<CompileError>,
    },

    #[error("Component '{id}' not found")]
    ComponentNotFound { id: String },

    /// Two generators planned the same output path.
    #[error("artifact path conflict for \"{path}\": already planned by \"{existing}\", attempted by \"{attempted}\"")]
    ArtifactConflict {
        path: String,
        existing: String,
        attempted: String,
    },

    /// An artifact path would be written outside the output directory.
    #[error("Artifact path '{path}' escapes output directory")]
    PathTraversal { path: String },

    #[error("Cache error: {message}")]
    CacheError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("{message}")]
    Other { message: String },
}

impl BoundError {
    /// Diagnostics carried by a failed stage, empty for every other variant.
    #[must_use]
    pub fn diagnostics(&self) -> &[CompileError] {
        match self {
            Self::StageFailed { errors, .. } => errors,
            _ => &[],
        }
    }
}

/// A [`BoundError`] plus optional details and a suggestion for the user.
#[derive(Debug)]
pub struct ErrorContext {
    pub error: BoundError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(error: BoundError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error (shown in green).
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error (shown in yellow).
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details and suggestion to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`].
///
/// [`BoundError`] values get tailored suggestions; I/O and TOML errors get
/// generic filesystem and syntax guidance; anything else is shown with its
/// full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(bound_error) = error.downcast_ref::<BoundError>() {
        return create_error_context(bound_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(BoundError::Other {
                    message: error.to_string(),
                })
                .with_suggestion("Check file ownership and permissions of the output directory");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(BoundError::Other {
                    message: error.to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(BoundError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax in bound.toml");
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(BoundError::Other {
        message,
    })
}

fn create_error_context(error: BoundError) -> ErrorContext {
    match &error {
        BoundError::SpecNotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Check the path, or run 'bound init <name>' to create a starter specification"),

        BoundError::SpecParse { .. } => ErrorContext::new(error)
            .with_suggestion("Check the YAML/JSON syntax: indentation, quoting and list markers")
            .with_details("A specification must be a mapping with version, name and components"),

        BoundError::StageFailed { errors, .. } => {
            let details = errors.iter().map(|e| format!("  - {e}")).collect::<Vec<_>>().join("\n");
            let context = ErrorContext::new(error.clone())
                .with_suggestion("Fix the reported problems and run 'bound validate' again");
            if details.is_empty() {
                context
            } else {
                context.with_details(format!("\n{details}"))
            }
        }

        BoundError::ArtifactConflict { .. } => ErrorContext::new(error)
            .with_details("Every output path may be produced by exactly one generator"),

        BoundError::PathTraversal { .. } => ErrorContext::new(error)
            .with_details("Generated files must stay inside the output directory"),

        BoundError::CacheError { .. } => ErrorContext::new(error)
            .with_suggestion("Delete the cache file or run with --no-cache"),

        BoundError::ConfigError { .. } => {
            ErrorContext::new(error).with_suggestion("Check the values in bound.toml")
        }

        _ => ErrorContext::new(error),
    }
}
