use anyhow::{Result, bail};
use std::collections::HashSet;
use std::fmt;

use super::Generator;
use super::generators::{IrSnapshotGenerator, UsecaseDocsGenerator};
use crate::core::Kind;
use crate::ir::Ir;

type GeneratorFactory = Box<dyn Fn() -> Box<dyn Generator>>;

/// A named generator with kind-based activation.
pub struct GeneratorPlugin {
    pub name: String,
    factory: GeneratorFactory,
    /// Kinds that switch the plugin on. Empty means always on.
    pub supports: Vec<Kind>,
}

impl GeneratorPlugin {
    pub fn new<F, G>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> G + 'static,
        G: Generator + 'static,
    {
        Self {
            name: name.into(),
            factory: Box::new(move || Box::new(factory())),
            supports: Vec::new(),
        }
    }

    #[must_use]
    pub fn supporting(mut self, kinds: &[Kind]) -> Self {
        self.supports = kinds.to_vec();
        self
    }

    fn enabled_for(&self, ir: &Ir) -> bool {
        self.supports.is_empty()
            || ir.components.values().any(|c| self.supports.contains(&c.kind()))
    }
}

impl fmt::Debug for GeneratorPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorPlugin")
            .field("name", &self.name)
            .field("supports", &self.supports)
            .finish_non_exhaustive()
    }
}

/// Ordered set of generator plugins.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    plugins: Vec<GeneratorPlugin>,
    names: HashSet<String>,
}

impl PluginRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The generators shipped with the compiler.
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();
        registry.register(GeneratorPlugin::new(IrSnapshotGenerator::NAME, IrSnapshotGenerator::new))?;
        registry.register(
            GeneratorPlugin::new(UsecaseDocsGenerator::NAME, UsecaseDocsGenerator::new)
                .supporting(&[Kind::Usecase]),
        )?;
        Ok(registry)
    }

    /// Append a plugin. Names must be non-empty and unique.
    pub fn register(&mut self, plugin: GeneratorPlugin) -> Result<()> {
        if plugin.name.is_empty() {
            bail!("plugin name cannot be empty");
        }
        if self.names.contains(&plugin.name) {
            bail!("plugin {:?} already registered", plugin.name);
        }

        self.names.insert(plugin.name.clone());
        self.plugins.push(plugin);
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(|p| p.name.as_str())
    }

    /// Fresh generators for every plugin enabled by `ir`, in registration order.
    #[must_use]
    pub fn generators_for(&self, ir: &Ir) -> Vec<Box<dyn Generator>> {
        self.plugins.iter().filter(|p| p.enabled_for(ir)).map(|p| (p.factory)()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::GeneratorOutput;
    use crate::ir::{Component, ComponentSpec, DatabaseSpec, SpecMetadata};

    struct Named(&'static str);

    impl Generator for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn generate(&self, _ir: &Ir) -> Result<GeneratorOutput> {
            Ok(GeneratorOutput::new())
        }
    }

    fn database_only() -> Ir {
        let mut ir = Ir::new(SpecMetadata::default(), "");
        ir.components.insert(
            "db.main".to_string(),
            Component::new("db.main", ComponentSpec::Database(DatabaseSpec::default())),
        );
        ir
    }

    #[test]
    fn test_registration_order_and_activation() {
        let mut registry = PluginRegistry::new();
        registry.register(GeneratorPlugin::new("always", || Named("always"))).unwrap();
        registry
            .register(GeneratorPlugin::new("usecases", || Named("usecases")).supporting(&[Kind::Usecase]))
            .unwrap();
        registry
            .register(GeneratorPlugin::new("db", || Named("db")).supporting(&[Kind::Database, Kind::Server]))
            .unwrap();

        let names: Vec<_> = registry
            .generators_for(&database_only())
            .iter()
            .map(|g| g.name().to_string())
            .collect();
        assert_eq!(names, vec!["always", "db"]);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["always", "usecases", "db"]);
    }

    #[test]
    fn test_duplicate_and_empty_names_rejected() {
        let mut registry = PluginRegistry::new();
        registry.register(GeneratorPlugin::new("a", || Named("a"))).unwrap();

        let err = registry.register(GeneratorPlugin::new("a", || Named("a"))).unwrap_err();
        assert!(err.to_string().contains("already registered"));

        let err = registry.register(GeneratorPlugin::new("", || Named(""))).unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_builtin_registry() {
        let registry = PluginRegistry::builtin().unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["ir-snapshot", "usecase-docs"]);
        assert_eq!(registry.generators_for(&database_only()).len(), 1);
    }
}
