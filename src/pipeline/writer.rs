//! Writes planned artifacts to the output directory.
//!
//! Decision per artifact, in order:
//!
//! 1. The path must stay inside the output directory, or nothing is written.
//! 2. A write-once file that already exists is preserved.
//! 3. A file owned by a component the cache says is unchanged is preserved
//!    if it exists, unless forced.
//! 4. Everything else is written atomically.
//!
//! Afterwards the cache is refreshed with current hashes and the artifact
//! paths each component owns.

use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::cache::Cache;
use crate::codegen::{Artifact, WriteStrategy};
use crate::core::BoundError;
use crate::ir::Ir;
use crate::utils::{atomic_write, is_safe_path, validate_artifact_path};

/// Paths written and preserved by one run, relative to the output directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteStats {
    pub written: Vec<String>,
    pub skipped: Vec<String>,
}

impl WriteStats {
    #[must_use]
    pub fn total(&self) -> usize {
        self.written.len() + self.skipped.len()
    }
}

#[derive(Debug)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
    cache_path: Option<PathBuf>,
    force: bool,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            cache_path: None,
            force: false,
        }
    }

    /// Enable incremental writes backed by the cache file at `path`.
    #[must_use]
    pub fn with_cache(mut self, path: Option<PathBuf>) -> Self {
        self.cache_path = path;
        self
    }

    #[must_use]
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn write(&self, ir: &Ir, artifacts: &[Artifact]) -> Result<WriteStats> {
        for artifact in artifacts {
            validate_artifact_path(&artifact.path)?;
            if !is_safe_path(&self.output_dir, Path::new(&artifact.path)) {
                return Err(BoundError::PathTraversal {
                    path: artifact.path.clone(),
                }
                .into());
            }
        }

        let mut cache = match &self.cache_path {
            Some(path) => Cache::load(path)?,
            None => Cache::new(),
        };
        let stale: Option<BTreeSet<String>> =
            if self.cache_path.is_some() { Some(cache.stale_components(ir)?) } else { None };

        let mut stats = WriteStats::default();
        let mut owned: BTreeMap<&str, Vec<String>> = BTreeMap::new();

        for artifact in artifacts {
            let target = self.output_dir.join(&artifact.path);

            if let Some(id) = &artifact.component_id {
                owned.entry(id.as_str()).or_default().push(artifact.path.clone());
            }

            if self.should_preserve(artifact, &target, stale.as_ref()) {
                debug!("Preserving {}", artifact.path);
                stats.skipped.push(artifact.path.clone());
                continue;
            }

            atomic_write(&target, &artifact.content)
                .with_context(|| format!("Failed to write artifact {}", artifact.path))?;
            debug!("Wrote {}", artifact.path);
            stats.written.push(artifact.path.clone());
        }

        if let Some(path) = &self.cache_path {
            cache.update(ir)?;
            for (id, paths) in owned {
                cache.set_artifacts(id, paths);
            }
            cache.save(path)?;
        }

        info!("Wrote {} files, preserved {}", stats.written.len(), stats.skipped.len());
        Ok(stats)
    }

    fn should_preserve(&self, artifact: &Artifact, target: &Path, stale: Option<&BTreeSet<String>>) -> bool {
        if !target.exists() {
            return false;
        }
        if artifact.strategy == WriteStrategy::WriteOnce {
            return true;
        }
        if self.force {
            return false;
        }

        match (&artifact.component_id, stale) {
            (Some(id), Some(stale)) => !stale.contains(id),
            _ => false,
        }
    }
}
