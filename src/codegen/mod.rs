//! Code generation from a validated IR.
//!
//! A [`Generator`] reads the IR and returns a [`GeneratorOutput`]: a set of
//! files keyed by path relative to the output directory. Generators never
//! mutate the IR and never touch the filesystem; the writer stage does that.
//!
//! Every [`GeneratedFile`] declares a [`WriteStrategy`] and, optionally, the
//! component that owns it. Ownership ties the file to that component's cache
//! entry, so the writer can skip it when the component is unchanged.
//!
//! Outputs from all generators are merged by the [`ArtifactPlanner`], which
//! refuses two generators claiming the same path. The [`PluginRegistry`]
//! decides which generators run for a given IR.

pub mod generators;
mod planner;
mod registry;

use anyhow::Result;
use std::collections::BTreeMap;

use crate::ir::Ir;

pub use planner::{Artifact, ArtifactPlanner};
pub use registry::{GeneratorPlugin, PluginRegistry};

/// Produces files from an IR.
pub trait Generator {
    /// Stable name, used as the artifact owner in conflict reports.
    fn name(&self) -> &str;

    fn generate(&self, ir: &Ir) -> Result<GeneratorOutput>;
}

/// Whether a file may be replaced on later runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteStrategy {
    /// Regenerated whenever its owner changes.
    #[default]
    Overwrite,
    /// Written once; an existing file is user-owned from then on.
    WriteOnce,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub content: Vec<u8>,
    pub strategy: WriteStrategy,
    /// `None` for files shared by the whole specification.
    pub component_id: Option<String>,
}

impl GeneratedFile {
    pub fn overwrite(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
            strategy: WriteStrategy::Overwrite,
            component_id: None,
        }
    }

    pub fn write_once(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
            strategy: WriteStrategy::WriteOnce,
            component_id: None,
        }
    }

    #[must_use]
    pub fn owned_by(mut self, component_id: impl Into<String>) -> Self {
        self.component_id = Some(component_id.into());
        self
    }
}

/// Files produced by one generator, keyed by relative path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorOutput {
    pub files: BTreeMap<String, GeneratedFile>,
}

impl GeneratorOutput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, replacing an earlier one at the same path.
    pub fn add_file(&mut self, path: impl Into<String>, file: GeneratedFile) {
        self.files.insert(path.into(), file);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_file_builders() {
        let file = GeneratedFile::write_once("x").owned_by("usecase.a");
        assert_eq!(file.strategy, WriteStrategy::WriteOnce);
        assert_eq!(file.component_id.as_deref(), Some("usecase.a"));
        assert_eq!(file.content, b"x");

        let shared = GeneratedFile::overwrite(vec![1, 2]);
        assert_eq!(shared.strategy, WriteStrategy::Overwrite);
        assert!(shared.component_id.is_none());
    }

    #[test]
    fn test_output_replaces_same_path() {
        let mut output = GeneratorOutput::new();
        assert!(output.is_empty());
        output.add_file("a.txt", GeneratedFile::overwrite("one"));
        output.add_file("a.txt", GeneratedFile::overwrite("two"));
        assert_eq!(output.len(), 1);
        assert_eq!(output.files["a.txt"].content, b"two");
    }
}
