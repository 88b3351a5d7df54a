//! Path checks for generated artifacts.
//!
//! Generators return paths relative to the output directory. Before anything
//! is written, each path must stay inside that directory.

use std::path::{Component, Path};

use crate::core::BoundError;
use crate::utils::fs::normalize_path;

/// Checks that `path`, resolved against `base`, stays within `base`.
///
/// Purely lexical; neither path has to exist.
///
/// ```
/// use bound_cli::utils::is_safe_path;
/// use std::path::Path;
///
/// let base = Path::new("/project/generated");
/// assert!(is_safe_path(base, Path::new("docs/usecases/a.md")));
/// assert!(!is_safe_path(base, Path::new("../../etc/passwd")));
/// assert!(!is_safe_path(base, Path::new("/etc/passwd")));
/// ```
#[must_use]
pub fn is_safe_path(base: &Path, path: &Path) -> bool {
    let normalized_base = normalize_path(base);
    let normalized_path = if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    };

    normalized_path.starts_with(normalized_base)
}

/// Validates an artifact path as planned by a generator.
///
/// The path must be relative and must not climb out of the output
/// directory at any point, even if a later segment would climb back in.
pub fn validate_artifact_path(path: &str) -> Result<(), BoundError> {
    let traversal = || BoundError::PathTraversal {
        path: path.to_string(),
    };

    let candidate = Path::new(path);
    if candidate.is_absolute() || path.starts_with('/') || path.starts_with('\\') {
        return Err(traversal());
    }

    let mut depth: usize = 0;
    for component in candidate.components() {
        match component {
            Component::ParentDir => {
                depth = depth.checked_sub(1).ok_or_else(traversal)?;
            }
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => return Err(traversal()),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_artifact_paths() {
        for path in ["docs/usecases/a.md", ".bound/ir.json", "./a/../b.txt", "a"] {
            assert!(validate_artifact_path(path).is_ok(), "{path}");
        }
    }

    #[test]
    fn test_traversal_rejected() {
        for path in ["../x", "a/../../x", "/etc/passwd", "..", "\\x"] {
            let err = validate_artifact_path(path).unwrap_err();
            assert!(matches!(err, BoundError::PathTraversal { .. }), "{path}");
        }
    }

    #[test]
    fn test_is_safe_path() {
        let base = Path::new("/out");
        assert!(is_safe_path(base, Path::new("a/b")));
        assert!(is_safe_path(base, Path::new("a/../b")));
        assert!(!is_safe_path(base, Path::new("../b")));
    }
}
