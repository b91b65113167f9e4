//! Checker output consumed by the contract compiler and the runtime.

use rustc_hash::FxHashMap;

use ori_ir::{CapabilitySet, ExprId, FunctionId, Name};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FunctionCapabilities {
    /// Inferred requirement of the body.
    pub required: CapabilitySet,
    /// The signature's `uses` clause.
    pub declared: CapabilitySet,
}

/// Capabilities at one pattern or intrinsic node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeCapabilities {
    /// Demanded by the node itself.
    pub required: CapabilitySet,
    /// Declared by the enclosing function plus any `with` in scope.
    pub available: CapabilitySet,
}

#[derive(Clone, Debug, Default)]
pub struct CapabilityAnnotations {
    functions: Vec<FunctionCapabilities>,
    nodes: FxHashMap<ExprId, NodeCapabilities>,
}

impl CapabilityAnnotations {
    pub(crate) fn new(
        functions: Vec<FunctionCapabilities>,
        nodes: FxHashMap<ExprId, NodeCapabilities>,
    ) -> Self {
        CapabilityAnnotations { functions, nodes }
    }

    pub fn function(&self, id: FunctionId) -> Option<&FunctionCapabilities> {
        self.functions.get(id.index())
    }

    pub fn required(&self, id: FunctionId) -> Option<&CapabilitySet> {
        self.function(id).map(|f| &f.required)
    }

    pub fn node(&self, id: ExprId) -> Option<&NodeCapabilities> {
        self.nodes.get(&id)
    }

    /// Whether code running on behalf of `id` may block on a channel,
    /// `sleep`, or a child task.
    pub fn may_suspend(&self, id: FunctionId) -> bool {
        self.function(id)
            .is_some_and(|f| f.declared.contains(Name::ASYNC))
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
