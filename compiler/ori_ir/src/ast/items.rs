//! Top-level items: functions, extern declarations, modules.

use crate::{CapabilitySet, ExprId, ExternId, FunctionId, Name, Span, Spanned};

/// A function parameter.
///
/// `fn_capabilities` is `Some` for function-typed parameters and holds the
/// `uses` clause of the parameter's function type, e.g. `f: () -> int uses
/// Async` carries `{Async}`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Param {
    pub name: Name,
    pub span: Span,
    pub fn_capabilities: Option<CapabilitySet>,
}

impl Param {
    pub fn value(name: Name, span: Span) -> Self {
        Param {
            name,
            span,
            fn_capabilities: None,
        }
    }

    pub fn function(name: Name, uses: CapabilitySet, span: Span) -> Self {
        Param {
            name,
            span,
            fn_capabilities: Some(uses),
        }
    }

    #[inline]
    pub fn is_function(&self) -> bool {
        self.fn_capabilities.is_some()
    }
}

/// `@name (params) -> T uses Caps = body`
///
/// `capabilities` is the declared upper bound; the checker computes the
/// actual requirement of `body` and rejects anything outside it.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FunctionSignature {
    pub name: Name,
    pub params: Vec<Param>,
    pub capabilities: CapabilitySet,
    pub body: ExprId,
    pub span: Span,
}

impl FunctionSignature {
    pub fn param(&self, name: Name) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }
}

impl Spanned for FunctionSignature {
    fn span(&self) -> Span {
        self.span
    }
}

/// A function declared in an `extern` block and bound to a host function.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ExternFunction {
    pub name: Name,
    pub params: Vec<Name>,
    pub capabilities: CapabilitySet,
    pub span: Span,
}

impl Spanned for ExternFunction {
    fn span(&self) -> Span {
        self.span
    }
}

/// A compilation unit.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Module {
    pub functions: Vec<FunctionSignature>,
    pub externs: Vec<ExternFunction>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_function(&mut self, func: FunctionSignature) -> FunctionId {
        let id = FunctionId::new(crate::expr_id::next_index(self.functions.len()));
        self.functions.push(func);
        id
    }

    pub fn add_extern(&mut self, ext: ExternFunction) -> ExternId {
        let id = ExternId::new(crate::expr_id::next_index(self.externs.len()));
        self.externs.push(ext);
        id
    }

    #[inline]
    pub fn function(&self, id: FunctionId) -> &FunctionSignature {
        &self.functions[id.index()]
    }

    #[inline]
    pub fn extern_fn(&self, id: ExternId) -> &ExternFunction {
        &self.externs[id.index()]
    }

    pub fn function_ids(&self) -> impl Iterator<Item = FunctionId> + '_ {
        (0..self.functions.len()).map(|i| FunctionId::new(crate::expr_id::next_index(i)))
    }

    pub fn find_function(&self, name: Name) -> Option<FunctionId> {
        self.functions
            .iter()
            .position(|f| f.name == name)
            .map(|i| FunctionId::new(crate::expr_id::next_index(i)))
    }
}
