//! The immutable program shared by every task.

#![allow(
    clippy::disallowed_types,
    reason = "host functions are shared with task threads"
)]

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use ori_capabilities::CapabilityAnnotations;
use ori_ir::{ExprArena, ExternId, FunctionId, Module, Name, SharedInterner, SymbolTable};

use crate::Value;

/// Host implementation of an `extern` function.
pub type HostFn = dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync;

/// Host implementations of externs, keyed by extern name.
#[derive(Clone, Default)]
pub struct HostFunctions {
    table: FxHashMap<String, Arc<HostFn>>,
}

impl HostFunctions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.register(name, f);
        self
    }

    pub fn register<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.table.insert(name.to_string(), Arc::new(f));
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl fmt::Debug for HostFunctions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.table.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("HostFunctions").field("names", &names).finish()
    }
}

/// Pre-interned pattern property names.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PropNames {
    pub body: Name,
    pub duration: Name,
    pub condition: Name,
    pub base: Name,
    pub step: Name,
    pub memo: Name,
    pub key: Name,
    pub operation: Name,
    pub ttl: Name,
    pub acquire: Name,
    pub action: Name,
    pub release: Name,
    pub over: Name,
    pub match_: Name,
    pub default: Name,
    pub map: Name,
}

impl PropNames {
    fn new(interner: &SharedInterner) -> Self {
        PropNames {
            body: interner.intern("body"),
            duration: interner.intern("duration"),
            condition: interner.intern("condition"),
            base: interner.intern("base"),
            step: interner.intern("step"),
            memo: interner.intern("memo"),
            key: interner.intern("key"),
            operation: interner.intern("operation"),
            ttl: interner.intern("ttl"),
            acquire: interner.intern("acquire"),
            action: interner.intern("action"),
            release: interner.intern("release"),
            over: interner.intern("over"),
            match_: interner.intern("match"),
            default: interner.intern("default"),
            map: interner.intern("map"),
        }
    }
}

/// A checked, contract-compiled module ready to run.
pub struct Program {
    pub(crate) module: Module,
    pub(crate) arena: ExprArena,
    pub(crate) interner: SharedInterner,
    pub(crate) symbols: SymbolTable,
    pub(crate) annotations: CapabilityAnnotations,
    pub(crate) host: FxHashMap<ExternId, Arc<HostFn>>,
    pub(crate) props: PropNames,
}

impl Program {
    /// Bind `host` implementations to the module's externs by name.
    /// Externs without a host implementation fail when called.
    pub fn new(
        module: Module,
        arena: ExprArena,
        interner: SharedInterner,
        annotations: CapabilityAnnotations,
        host: &HostFunctions,
    ) -> Self {
        let symbols = SymbolTable::build(&module);
        let host = module
            .externs
            .iter()
            .enumerate()
            .filter_map(|(index, ext)| {
                let f = host.table.get(interner.lookup(ext.name))?;
                Some((ExternId::new(u32::try_from(index).ok()?), Arc::clone(f)))
            })
            .collect();
        let props = PropNames::new(&interner);
        Program {
            module,
            arena,
            interner,
            symbols,
            annotations,
            host,
            props,
        }
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn arena(&self) -> &ExprArena {
        &self.arena
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn annotations(&self) -> &CapabilityAnnotations {
        &self.annotations
    }

    pub fn find_function(&self, name: &str) -> Option<FunctionId> {
        let name = self.interner.get(name)?;
        self.module.find_function(name)
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("functions", &self.module.functions.len())
            .field("externs", &self.module.externs.len())
            .field("nodes", &self.arena.len())
            .field("host", &self.host.len())
            .finish_non_exhaustive()
    }
}
