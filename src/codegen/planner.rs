use std::collections::BTreeMap;

use super::{GeneratedFile, GeneratorOutput, WriteStrategy};
use crate::core::BoundError;

/// One file scheduled for writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Name of the generator that planned it.
    pub owner: String,
    pub path: String,
    pub content: Vec<u8>,
    pub strategy: WriteStrategy,
    pub component_id: Option<String>,
}

/// Merges generator outputs into one plan keyed by path.
#[derive(Debug, Default)]
pub struct ArtifactPlanner {
    by_path: BTreeMap<String, Artifact>,
}

impl ArtifactPlanner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan a single file. Fails on an empty path or a path already planned.
    pub fn add(&mut self, owner: &str, path: &str, file: GeneratedFile) -> Result<(), BoundError> {
        if path.is_empty() {
            return Err(BoundError::Other {
                message: format!("generator \"{owner}\" planned an artifact with an empty path"),
            });
        }

        if let Some(existing) = self.by_path.get(path) {
            return Err(BoundError::ArtifactConflict {
                path: path.to_string(),
                existing: existing.owner.clone(),
                attempted: owner.to_string(),
            });
        }

        self.by_path.insert(
            path.to_string(),
            Artifact {
                owner: owner.to_string(),
                path: path.to_string(),
                content: file.content,
                strategy: file.strategy,
                component_id: file.component_id,
            },
        );
        Ok(())
    }

    /// Plan every file of a generator's output, in path order.
    pub fn add_output(&mut self, owner: &str, output: GeneratorOutput) -> Result<(), BoundError> {
        for (path, file) in output.files {
            self.add(owner, &path, file)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// All planned artifacts, sorted by path.
    #[must_use]
    pub fn into_artifacts(self) -> Vec<Artifact> {
        self.by_path.into_values().collect()
    }
}
