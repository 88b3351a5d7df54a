//! Content-addressed compilation cache.
//!
//! The cache records a hash of the whole specification and one hash per
//! component, together with the artifacts each component owns. On the next
//! run the writer compares fresh hashes against the cache and skips
//! artifacts whose owning component has not changed.
//!
//! Hashes are semantic: they are computed over a canonical JSON rendering
//! (sorted keys, sorted lists) of the meaningful fields only, so comments,
//! whitespace, source positions, field order, and list order in the input
//! never change a hash.
//!
//! # File Format
//!
//! ```json
//! {
//!   "cache_version": "1.0",
//!   "specHash": "9f86d081…",
//!   "components": {
//!     "server.api": { "hash": "2c26b46b…", "artifacts": [".bound/ir.json"] }
//!   }
//! }
//! ```
//!
//! A cache with a missing or unknown `cache_version` is discarded rather than
//! migrated.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::constants::CACHE_VERSION;
use crate::core::BoundError;
use crate::ir::{Component, ComponentSpec, Ir};
use crate::utils::fs::atomic_write;

/// The on-disk cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cache {
    #[serde(rename = "cache_version", default)]
    pub version: String,
    #[serde(rename = "specHash", default)]
    pub spec_hash: String,
    #[serde(default)]
    pub components: BTreeMap<String, CachedComponent>,
}

/// Hash and owned artifacts of one component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedComponent {
    pub hash: String,
    #[serde(default)]
    pub artifacts: Vec<String>,
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

impl Cache {
    /// An empty cache at the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: CACHE_VERSION.to_string(),
            spec_hash: String::new(),
            components: BTreeMap::new(),
        }
    }

    /// Load the cache at `path`.
    ///
    /// A missing file yields an empty cache. Malformed JSON is an error. A
    /// readable cache with a missing or unknown version is discarded.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No cache at {}, starting empty", path.display());
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read cache: {}", path.display()))?;

        let parse_error = |e: serde_json::Error| BoundError::CacheError {
            message: format!("failed to parse cache {}: {e}", path.display()),
        };

        // The version decides the layout, so it is read on its own first.
        let raw: Value = serde_json::from_str(&content).map_err(parse_error)?;
        let version = raw.get("cache_version").and_then(Value::as_str);
        if version != Some(CACHE_VERSION) {
            warn!(
                "Discarding cache {} with version {:?} (expected {CACHE_VERSION})",
                path.display(),
                version
            );
            return Ok(Self::new());
        }

        let cache: Self = serde_json::from_value(raw).map_err(parse_error)?;

        debug!("Loaded cache with {} components from {}", cache.components.len(), path.display());
        Ok(cache)
    }

    /// Write the cache as pretty JSON through an atomic rename.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize cache")?;
        atomic_write(path, content.as_bytes())
            .with_context(|| format!("Failed to write cache: {}", path.display()))?;
        debug!("Saved cache to {}", path.display());
        Ok(())
    }

    /// Recompute every hash from `ir`.
    ///
    /// Components that are gone from the IR are dropped. Components whose
    /// hash is unchanged keep their artifact lists; all others start empty.
    pub fn update(&mut self, ir: &Ir) -> Result<()> {
        self.spec_hash = compute_spec_hash(ir)?;

        let mut components = BTreeMap::new();
        for (id, component) in &ir.components {
            let hash = compute_component_hash(component)
                .with_context(|| format!("Failed to compute hash for component {id}"))?;
            let artifacts = match self.components.get(id) {
                Some(cached) if cached.hash == hash => cached.artifacts.clone(),
                _ => Vec::new(),
            };
            components.insert(id.clone(), CachedComponent { hash, artifacts });
        }
        self.components = components;
        Ok(())
    }

    /// Record the artifacts owned by a component. Unknown IDs are ignored.
    pub fn set_artifacts(&mut self, component_id: &str, artifacts: Vec<String>) {
        if let Some(cached) = self.components.get_mut(component_id) {
            cached.artifacts = artifacts;
        }
    }

    #[must_use]
    pub fn component_hash(&self, component_id: &str) -> Option<&str> {
        self.components.get(component_id).map(|c| c.hash.as_str())
    }

    #[must_use]
    pub fn has_component(&self, component_id: &str) -> bool {
        self.components.contains_key(component_id)
    }

    /// Whether a component must be regenerated given fresh hashes.
    #[must_use]
    pub fn is_stale(&self, spec_hash: &str, component_id: &str, component_hash: &str) -> bool {
        self.spec_hash != spec_hash || self.component_hash(component_id) != Some(component_hash)
    }

    /// IDs of every stale component in `ir`.
    pub fn stale_components(&self, ir: &Ir) -> Result<BTreeSet<String>> {
        let spec_hash = compute_spec_hash(ir)?;
        let mut stale = BTreeSet::new();
        for (id, component) in &ir.components {
            if self.is_stale(&spec_hash, id, &compute_component_hash(component)?) {
                stale.insert(id.clone());
            }
        }
        Ok(stale)
    }
}

/// SHA-256 over the specification's identity: metadata plus the sorted
/// `(id, kind)` list. Component contents are hashed separately.
pub fn compute_spec_hash(ir: &Ir) -> Result<String> {
    let components: Vec<Value> = ir
        .components
        .values()
        .map(|c| json!({ "id": c.id, "kind": c.kind().as_str() }))
        .collect();

    let canonical = json!({
        "version": ir.metadata.version,
        "name": ir.metadata.name,
        "description": ir.metadata.description,
        "components": components,
    });

    hash_value(&canonical).context("Failed to hash specification")
}

/// SHA-256 over a component's ID, kind, and kind-specific fields.
///
/// List fields are sorted first. An absent list hashes as `null` and an
/// empty one as `[]`, so the two stay distinguishable.
pub fn compute_component_hash(component: &Component) -> Result<String> {
    let spec = match &component.spec {
        ComponentSpec::Server(s) => json!({
            "framework": s.framework,
            "port": s.port,
            "openapi": s.openapi,
            "middleware": sorted(s.middleware.as_deref()),
            "depends_on": sorted(s.depends_on.as_deref()),
        }),
        ComponentSpec::Middleware(m) => json!({
            "provider": m.provider,
            "config": m.config,
            "model": m.model,
            "policy": m.policy,
            "depends_on": sorted(m.depends_on.as_deref()),
        }),
        ComponentSpec::Database(d) => json!({
            "provider": d.provider,
            "schema": d.schema,
        }),
        ComponentSpec::Usecase(u) => json!({
            "binds_to": u.binds_to,
            "goal": u.goal,
            "actor": u.actor,
            "middleware": sorted(u.middleware.as_deref()),
            "preconditions": sorted(u.preconditions.as_deref()),
            "acceptance_criteria": sorted(u.acceptance_criteria.as_deref()),
            "postconditions": sorted(u.postconditions.as_deref()),
        }),
    };

    let canonical = json!({
        "id": component.id,
        "kind": component.kind().as_str(),
        "spec": spec,
    });

    hash_value(&canonical)
}

fn sorted(items: Option<&[String]>) -> Option<Vec<&str>> {
    items.map(|items| {
        let mut copy: Vec<&str> = items.iter().map(String::as_str).collect();
        copy.sort_unstable();
        copy
    })
}

// serde_json's default map is ordered by key, which makes the output canonical.
fn hash_value(value: &Value) -> Result<String> {
    let bytes = serde_json::to_vec(value)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}
