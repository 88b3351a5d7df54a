//! Specification validation.
//!
//! Validation runs in three layers, each in its own pipeline stage:
//!
//! | Layer | Input | Finds |
//! |-------|-------|-------|
//! | [`validate_schema`] | raw document value | shape, types, patterns, unknown keys |
//! | [`validate_semantic`] | [`SpecDocument`](crate::spec::SpecDocument) | duplicate IDs, missing metadata |
//! | [`validate_ir`] | [`Ir`](crate::ir::Ir) | cycles, per-kind fields, reference kinds, cross-component rules |
//!
//! Every layer collects all of its diagnostics rather than stopping at the
//! first. The pipeline decides whether a non-empty result aborts the run.
//!
//! # Example
//!
//! ```
//! use bound_cli::validator::validate_schema;
//! use serde_json::json;
//!
//! let document = json!({
//!     "version": "1.0.0",
//!     "name": "shop",
//!     "components": [
//!         {"id": "server.api", "kind": "http.server", "spec": {"framework": "hono", "port": 3000}}
//!     ]
//! });
//! assert!(validate_schema(&document).is_empty());
//! ```

mod ir;
mod schema;
mod semantic;

pub use ir::{validate_cross_component, validate_ir};
pub use schema::validate_schema;
pub use semantic::validate_semantic;
