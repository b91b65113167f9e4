//! Module-level name table.

use rustc_hash::FxHashMap;

use crate::{ExternId, FunctionId, Module, Name};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Symbol {
    Function(FunctionId),
    Extern(ExternId),
}

/// Resolves callee names to module items.
///
/// Only top-level names are recorded. Locals and parameters shadow entries
/// here; callers check their own scopes first.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    symbols: FxHashMap<Name, Symbol>,
}

impl SymbolTable {
    /// Build the table for `module`. Later definitions of a name win, which
    /// matches what a later `@name` declaration does in source.
    pub fn build(module: &Module) -> Self {
        let mut symbols = FxHashMap::default();
        for (i, ext) in module.externs.iter().enumerate() {
            let id = ExternId::new(crate::expr_id::next_index(i));
            symbols.insert(ext.name, Symbol::Extern(id));
        }
        for (id, func) in module.function_ids().zip(&module.functions) {
            symbols.insert(func.name, Symbol::Function(id));
        }
        SymbolTable { symbols }
    }

    #[inline]
    pub fn resolve(&self, name: Name) -> Option<Symbol> {
        self.symbols.get(&name).copied()
    }

    pub fn function(&self, name: Name) -> Option<FunctionId> {
        match self.resolve(name)? {
            Symbol::Function(id) => Some(id),
            Symbol::Extern(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
