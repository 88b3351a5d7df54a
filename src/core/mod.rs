//! Core types shared by every stage of the compiler.
//!
//! - [`Kind`] is the closed set of component types.
//! - [`CompileError`] is an accumulated diagnostic about the specification,
//!   classified by [`ErrorCategory`] and optionally located by [`Position`].
//! - [`BoundError`] is a fatal error that stops a run, and [`ErrorContext`] /
//!   [`user_friendly_error`] render it for the terminal.
//!
//! # Examples
//!
//! ```rust
//! use bound_cli::core::{BoundError, CompileError, ErrorCategory};
//!
//! let diagnostic = CompileError::MissingMetadata { field: "name".to_string() };
//! assert_eq!(diagnostic.category(), ErrorCategory::MissingField);
//!
//! let fatal = BoundError::StageFailed {
//!     stage: "validate-semantic".to_string(),
//!     message: "1 error".to_string(),
//!     errors: vec![diagnostic],
//! };
//! assert_eq!(fatal.diagnostics().len(), 1);
//! ```

pub mod diagnostic;
pub mod error;
pub mod kind;

pub use diagnostic::{CompileError, ErrorCategory, Position, format_cycle, sort_diagnostics};
pub use error::{BoundError, ErrorContext, user_friendly_error};
pub use kind::{Kind, UnknownKind};
