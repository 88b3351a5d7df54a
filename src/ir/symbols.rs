//! The per-compile symbol table.

use std::collections::BTreeMap;

use crate::core::{CompileError, Kind};

/// A named entity: a component ID, its kind, and the component that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: Kind,
    /// ID of the owning component in the IR's component map.
    pub component: String,
}

/// Write-once registry of names. Entries are never replaced or removed.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: BTreeMap<String, Symbol>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Define `name`. Fails with [`CompileError::DuplicateSymbol`] when the
    /// name is taken; the existing definition is kept.
    pub fn define(
        &mut self,
        name: &str,
        kind: Kind,
        component: &str,
    ) -> Result<(), CompileError> {
        if let Some(existing) = self.symbols.get(name) {
            return Err(CompileError::DuplicateSymbol {
                name: name.to_string(),
                existing_kind: existing.kind.to_string(),
                position: None,
            });
        }

        self.symbols.insert(
            name.to_string(),
            Symbol {
                name: name.to_string(),
                kind,
                component: component.to_string(),
            },
        );
        Ok(())
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    /// All symbols, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
