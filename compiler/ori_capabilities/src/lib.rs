//! Capability inference and checking.
//!
//! For every function the checker computes the set of capabilities its body
//! needs and verifies it against the signature's `uses` clause:
//!
//! 1. **Collect** (per function, in parallel): sites that demand a
//!    capability directly (`parallel`, `spawn`, `timeout`, channel
//!    intrinsics and `sleep` need `Async`; `cache` needs `Cache`; externs
//!    need `FFI` plus their own `uses`; calls through function-typed
//!    parameters need that parameter's `uses`) and edges to other module
//!    functions. `with C = ... in body` discharges `C` inside `body`.
//! 2. **Solve**: propagate requirements backwards along call edges to a
//!    fixed point; recursion is handled by the worklist.
//! 3. **Verify**: every capability in `required − declared` is an error,
//!    reported at the deepest uncovered site with the call chain that led
//!    there.
//!
//! A missing capability is always a hard error. On success the tree is
//! untouched; the result is a [`CapabilityAnnotations`] side table.

mod annotations;
mod collect;
mod errors;
mod solve;

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use ori_ir::{ExprArena, FunctionId, Module, Name, Span, StringInterner, SymbolTable};
use ori_patterns::PatternRegistry;

pub use annotations::{CapabilityAnnotations, FunctionCapabilities, NodeCapabilities};
pub use collect::SiteOrigin;
pub use errors::{CapabilityError, ChainLink, ChainStep};

use collect::{Collector, FunctionFacts};
use solve::{Provenance, Solution};

/// Infer and check capabilities for every function in `module`.
///
/// `arena` must already be classified: pattern calls are recognized only as
/// `ExprKind::Pattern`/`ExprKind::Intrinsic` nodes. Errors are sorted by
/// span.
#[tracing::instrument(level = "debug", skip_all, fields(functions = module.functions.len()))]
pub fn check_module(
    module: &Module,
    arena: &ExprArena,
    interner: &StringInterner,
) -> Result<CapabilityAnnotations, Vec<CapabilityError>> {
    let symbols = SymbolTable::build(module);
    let registry = PatternRegistry::new();
    let collector = Collector {
        arena,
        module,
        symbols: &symbols,
        registry: &registry,
    };

    let facts: Vec<FunctionFacts> = module
        .functions
        .par_iter()
        .map(|sig| collector.collect(sig))
        .collect();

    let solution = solve::solve(&facts);
    debug!(iterations = solution.iterations, "capability fixed point reached");

    let mut errors: Vec<CapabilityError> = facts
        .iter()
        .flat_map(|f| f.errors.iter().cloned())
        .collect();

    for (id, sig) in module.function_ids().zip(&module.functions) {
        let missing = solution.required[id.index()].difference(&sig.capabilities);
        for cap in &missing {
            let (span, chain) = explain(module, &facts, &solution, id, cap);
            debug!(
                function = interner.lookup(sig.name),
                capability = interner.lookup(cap),
                "missing capability"
            );
            errors.push(CapabilityError::Missing {
                function: sig.name,
                capability: cap,
                span,
                declared: sig.capabilities.clone(),
                chain,
            });
        }
    }

    if !errors.is_empty() {
        errors.sort_by_key(|e| (e.span().start, e.span().end));
        return Err(errors);
    }

    let functions = module
        .functions
        .iter()
        .zip(solution.required)
        .map(|(sig, required)| FunctionCapabilities {
            required,
            declared: sig.capabilities.clone(),
        })
        .collect();
    let nodes: FxHashMap<_, _> = facts.into_iter().flat_map(|f| f.nodes).collect();
    Ok(CapabilityAnnotations::new(functions, nodes))
}

/// Span of the deepest uncovered site for `cap` in `root`, and the chain
/// from `root` to the site that introduced `cap`.
fn explain(
    module: &Module,
    facts: &[FunctionFacts],
    solution: &Solution,
    root: FunctionId,
    cap: Name,
) -> (Span, Vec<ChainLink>) {
    let root_facts = &facts[root.index()];

    // Deepest contributing site or edge in the root function; ties go to
    // the earliest in source order.
    let mut best: Option<(u32, Span, Provenance)> = None;
    let mut consider = |depth: u32, span: Span, prov: Provenance| {
        let better = match best {
            None => true,
            Some((d, s, _)) => depth > d || (depth == d && span.start < s.start),
        };
        if better {
            best = Some((depth, span, prov));
        }
    };
    for (i, site) in root_facts.sites.iter().enumerate() {
        if site.caps.contains(cap) {
            consider(site.depth, site.span, Provenance::Site(i));
        }
    }
    for (i, edge) in root_facts.edges.iter().enumerate() {
        let reaches = edge.callee != root
            && solution.required[edge.callee.index()].contains(cap)
            && !edge.discharged.contains(cap);
        if reaches {
            consider(edge.depth, edge.span, Provenance::Edge(i));
        }
    }

    let Some((_, span, first)) = best else {
        return (module.function(root).span, Vec::new());
    };

    let mut chain = Vec::new();
    let mut visited = FxHashSet::default();
    let mut current = root;
    let mut step = Some(first);
    while let Some(prov) = step {
        if !visited.insert(current) {
            break;
        }
        let f = &facts[current.index()];
        let function = module.function(current).name;
        match prov {
            Provenance::Site(i) => {
                let site = &f.sites[i];
                chain.push(ChainLink {
                    function,
                    span: site.span,
                    step: ChainStep::Requires(site.origin),
                });
                step = None;
            }
            Provenance::Edge(i) => {
                let edge = &f.edges[i];
                chain.push(ChainLink {
                    function,
                    span: edge.span,
                    step: ChainStep::Calls(module.function(edge.callee).name),
                });
                current = edge.callee;
                step = solution.provenance.get(&(current, cap)).copied();
            }
        }
    }
    (span, chain)
}
