//! bound - an architecture specification compiler
//!
//! bound reads a declarative specification of a system's components (HTTP
//! servers, middleware, databases, and business use-cases), resolves every
//! reference between them, binds use-cases to operations in the servers'
//! OpenAPI contracts, validates the result, and hands a typed intermediate
//! representation (IR) to code generators.
//!
//! # Architecture Overview
//!
//! A compile runs as a pipeline of stages over one shared context:
//!
//! ```text
//! spec.yaml ─► parse ─► validate-schema ─► validate-semantic
//!                                                │
//!     files ◄─ write ◄─ generate ◄─ validate-ir ◄┴─ build-ir ◄─ openapi.yaml
//! ```
//!
//! - Diagnostics are accumulated: each layer reports every problem it finds
//!   before the pipeline stops.
//! - The IR is an arena keyed by component ID. Edges and dependency lists hold
//!   IDs, never references, so cyclic specifications are representable and
//!   reported instead of looping.
//! - Generated files land in one output directory. A content-addressed cache
//!   lets unchanged components keep their files between runs.
//!
//! # Core Modules
//!
//! - [`spec`] - Loading the specification document (YAML or JSON)
//! - [`contract`] - OpenAPI contract parsing and operation lookup
//! - [`ir`] - The IR, its symbol table, dependency graph, and builder
//! - [`validator`] - Schema, semantic, and IR validation layers
//! - [`codegen`] - Generator contract, plugin registry, artifact planner
//! - [`cache`] - Content hashes for incremental generation
//! - [`pipeline`] - Stages, context, and the artifact writer
//!
//! ## Supporting Modules
//!
//! - [`cli`] - The `bound` command line
//! - [`config`] - Optional `bound.toml` project configuration
//! - [`core`] - Component kinds, diagnostics, and fatal errors
//! - [`utils`] - Atomic writes and output path validation
//!
//! # Example
//!
//! ```rust,no_run
//! use bound_cli::config::CompilerConfig;
//! use bound_cli::pipeline::{Context, Pipeline};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let spec = Path::new("spec.yaml");
//! let mut ctx = Context::new(spec, CompilerConfig::for_spec(spec)?);
//! Pipeline::validation().run(&mut ctx)?;
//!
//! for component in ctx.ir()?.topological_sort()? {
//!     println!("{} ({})", component.id, component.kind());
//! }
//! # Ok(())
//! # }
//! ```

// Core functionality modules
pub mod cache;
pub mod cli;
pub mod config;
pub mod core;

// Compiler front end
pub mod contract;
pub mod ir;
pub mod spec;
pub mod validator;

// Generation
pub mod codegen;
pub mod pipeline;

// Supporting modules
pub mod constants;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
