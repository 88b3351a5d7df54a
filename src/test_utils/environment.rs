//! Temporary project directories.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::fixtures::{ContractFixture, SpecFixture};

/// A throwaway project with a spec, contracts, and an output directory.
pub struct TestProject {
    pub temp_dir: TempDir,
    pub project_dir: PathBuf,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        super::init_test_logging(None);

        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("project");
        fs::create_dir_all(&project_dir)?;

        Ok(Self {
            temp_dir,
            project_dir,
        })
    }

    /// The basic fixture with its contract in place.
    pub fn with_basic_spec() -> Result<Self> {
        let project = Self::new()?;
        project.write_spec(&SpecFixture::basic())?;
        ContractFixture::users().write_to(&project.project_dir, "api/openapi.yaml")?;
        Ok(project)
    }

    pub fn write_spec(&self, fixture: &SpecFixture) -> Result<PathBuf> {
        fixture.write_to(&self.project_dir)
    }

    pub fn spec_path(&self) -> PathBuf {
        self.project_dir.join("spec.yaml")
    }

    /// Default output directory when no `bound.toml` overrides it.
    pub fn output_dir(&self) -> PathBuf {
        self.project_dir.join("generated")
    }

    pub fn write_file(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.project_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn read_file(&self, relative: &str) -> Result<String> {
        let path = self.project_dir.join(relative);
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }

    pub fn file_exists(&self, relative: &str) -> bool {
        self.project_dir.join(relative).exists()
    }

    pub fn path(&self) -> &Path {
        &self.project_dir
    }
}
