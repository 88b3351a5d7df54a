//! Filesystem helpers shared by the cache, the writer, and the CLI.
//!
//! - [`fs`] - atomic writes and directory creation
//! - [`path_validation`] - keeping artifact paths inside the output directory

pub mod fs;
pub mod path_validation;

pub use fs::{atomic_write, ensure_dir, ensure_parent_dir, normalize_path, safe_write};
pub use path_validation::{is_safe_path, validate_artifact_path};
