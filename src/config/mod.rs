//! Project configuration.
//!
//! A project may place a `bound.toml` next to its specification. Every key is
//! optional; a missing file means all defaults.
//!
//! ```toml
//! # Where generated files go, relative to bound.toml
//! output_dir = "generated"
//!
//! # Incremental regeneration
//! cache = true
//! cache_file = ".bound/cache.json"   # relative to output_dir
//! ```
//!
//! Command-line flags win over the file: see [`CompilerConfig::merge_cli`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{CONFIG_FILE_NAME, DEFAULT_CACHE_FILE, DEFAULT_OUTPUT_DIR};
use crate::core::BoundError;

/// Settings for one compile run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    pub output_dir: PathBuf,
    /// Skip unchanged components on later runs.
    pub cache: bool,
    pub cache_file: PathBuf,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            cache: true,
            cache_file: PathBuf::from(DEFAULT_CACHE_FILE),
        }
    }
}

/// Flags from the command line that override the file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub output_dir: Option<PathBuf>,
    pub no_cache: bool,
}

impl CompilerConfig {
    /// Load `bound.toml` from `dir`, or defaults when there is none.
    ///
    /// A relative `output_dir` in the file is resolved against `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, dir.display());
            let mut config = Self::default();
            config.output_dir = dir.join(&config.output_dir);
            return Ok(config);
        }

        let mut config: Self = parse_config(&path)?;
        if config.output_dir.is_relative() {
            config.output_dir = dir.join(&config.output_dir);
        }
        config.validate()?;
        debug!("Loaded {}", path.display());
        Ok(config)
    }

    /// Configuration for a specification file: looks next to it.
    pub fn for_spec(spec_path: &Path) -> Result<Self> {
        let dir = spec_path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        Self::load_from_dir(dir)
    }

    /// Apply command-line overrides. A CLI `--output` is taken as given.
    #[must_use]
    pub fn merge_cli(mut self, overrides: &CliOverrides) -> Self {
        if let Some(output_dir) = &overrides.output_dir {
            self.output_dir.clone_from(output_dir);
        }
        if overrides.no_cache {
            self.cache = false;
        }
        self
    }

    /// Absolute or spec-relative location of the cache file.
    #[must_use]
    pub fn cache_path(&self) -> PathBuf {
        self.output_dir.join(&self.cache_file)
    }

    fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(BoundError::ConfigError {
                message: "output_dir must not be empty".to_string(),
            }
            .into());
        }
        if self.cache_file.as_os_str().is_empty() || self.cache_file.is_absolute() {
            return Err(BoundError::ConfigError {
                message: format!(
                    "cache_file must be a relative path inside output_dir, got {:?}",
                    self.cache_file
                ),
            }
            .into());
        }
        Ok(())
    }
}

/// Parse a TOML file into any deserializable type, with the path in errors.
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}
