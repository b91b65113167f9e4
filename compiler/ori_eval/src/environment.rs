//! Variable scoping for one interpreter.
//!
//! A stack of scopes; bindings are immutable once defined, and a later
//! definition of the same name in the same scope shadows the earlier one.
//! Closures and child tasks take a flattened snapshot with
//! [`Environment::capture`].

use rustc_hash::FxHashMap;

use ori_ir::Name;

use crate::Value;

#[derive(Clone, Debug, Default)]
struct Scope {
    bindings: FxHashMap<Name, Value>,
}

#[derive(Clone, Debug)]
pub struct Environment {
    scopes: Vec<Scope>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            scopes: vec![Scope::default()],
        }
    }

    /// An environment whose only scope holds `captures`.
    pub fn from_captures(captures: FxHashMap<Name, Value>) -> Self {
        Environment {
            scopes: vec![Scope {
                bindings: captures,
            }],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Pop the innermost scope. The outermost scope is never popped.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn define(&mut self, name: Name, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.bindings.insert(name, value);
        }
    }

    pub fn lookup(&self, name: Name) -> Option<&Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.bindings.get(&name))
    }

    /// Every visible binding, inner scopes winning.
    pub fn capture(&self) -> FxHashMap<Name, Value> {
        let mut out = FxHashMap::default();
        for scope in &self.scopes {
            for (name, value) in &scope.bindings {
                out.insert(*name, value.clone());
            }
        }
        out
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
