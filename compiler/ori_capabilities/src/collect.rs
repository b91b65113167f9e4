//! Direct requirements of one function body.
//!
//! A single walk records every site that demands a capability by itself
//! (patterns, intrinsics, externs, calls through function values whose
//! capabilities come from a parameter's type) and every edge to another
//! module function. Edges are resolved later by the fixed point in
//! [`crate::solve`].
//!
//! Names are resolved lexically, the way the interpreter sees them: a `let`
//! inside `run`/`try` covers the elements after it (and the post checks),
//! lambda parameters cover the lambda body, arm bindings cover the arm
//! body. Only a name with no local binding in scope refers to a module
//! item.

use ori_ir::visitor::{walk_expr, walk_pattern, Visitor};
use ori_ir::{
    is_marker_capability, BindingPattern, CapabilitySet, ExprArena, ExprId, ExprKind,
    FunctionSignature, Intrinsic, MatchPattern, Module, Name, PatternKind, PatternNode, Span,
    Symbol, SymbolTable,
};
use ori_patterns::PatternRegistry;
use ori_stack::ensure_sufficient_stack;

use crate::{CapabilityError, NodeCapabilities};

/// What made a site demand capabilities.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SiteOrigin {
    Pattern(PatternKind),
    Intrinsic(Intrinsic),
    /// Call or reference to an extern function.
    Extern(Name),
    /// Call through a function-typed parameter.
    Parameter(Name),
    /// Call through a local whose value may come from a function-typed
    /// parameter.
    Local(Name),
    /// Call through a computed callee such as `make()()`.
    Indirect,
}

#[derive(Clone, Debug)]
pub(crate) struct Site {
    pub span: Span,
    pub depth: u32,
    /// Demand after `with` discharges in scope.
    pub caps: CapabilitySet,
    pub origin: SiteOrigin,
}

/// A call to, or reference of, a module function.
#[derive(Clone, Debug)]
pub(crate) struct CallEdge {
    pub callee: ori_ir::FunctionId,
    pub span: Span,
    pub depth: u32,
    /// Capabilities provided by enclosing `with` nodes.
    pub discharged: CapabilitySet,
}

#[derive(Debug, Default)]
pub(crate) struct FunctionFacts {
    pub sites: Vec<Site>,
    pub edges: Vec<CallEdge>,
    pub nodes: Vec<(ExprId, NodeCapabilities)>,
    pub errors: Vec<CapabilityError>,
}

pub(crate) struct Collector<'a> {
    pub arena: &'a ExprArena,
    pub module: &'a Module,
    pub symbols: &'a SymbolTable,
    pub registry: &'a PatternRegistry,
}

impl<'a> Collector<'a> {
    pub fn collect(&self, sig: &'a FunctionSignature) -> FunctionFacts {
        let mut walk = BodyWalk::new(self, sig);
        walk.visit_function(sig, self.arena);
        walk.facts
    }
}

/// A name bound inside the body.
struct Local {
    name: Name,
    /// Capabilities a call through this name may need.
    calls: CapabilitySet,
    param: bool,
}

struct BodyWalk<'c, 'a> {
    cx: &'c Collector<'a>,
    sig: &'a FunctionSignature,
    facts: FunctionFacts,
    /// Innermost binding last.
    locals: Vec<Local>,
    /// What a value of unknown origin may need when called: the union of
    /// every function-typed parameter's `uses`.
    opaque: CapabilitySet,
    depth: u32,
    discharged: CapabilitySet,
}

impl<'c, 'a> BodyWalk<'c, 'a> {
    fn new(cx: &'c Collector<'a>, sig: &'a FunctionSignature) -> Self {
        let mut opaque = CapabilitySet::new();
        let mut locals: Vec<Local> = sig
            .params
            .iter()
            .map(|p| {
                let calls = p.fn_capabilities.clone().unwrap_or_default();
                opaque = opaque.union(&calls);
                Local {
                    name: p.name,
                    calls,
                    param: true,
                }
            })
            .collect();
        // Inside `recurse`, `self` names the enclosing function.
        locals.push(Local {
            name: Name::SELF_FN,
            calls: CapabilitySet::new(),
            param: false,
        });
        BodyWalk {
            cx,
            sig,
            facts: FunctionFacts::default(),
            locals,
            opaque,
            depth: 0,
            discharged: CapabilitySet::new(),
        }
    }

    fn local(&self, name: Name) -> Option<&Local> {
        self.locals.iter().rev().find(|l| l.name == name)
    }

    fn bind(&mut self, name: Name, calls: CapabilitySet) {
        self.locals.push(Local {
            name,
            calls,
            param: false,
        });
    }

    /// Run `f` one level deeper; locals it binds go out of scope after.
    fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        let mark = self.locals.len();
        self.depth += 1;
        f(self);
        self.depth -= 1;
        self.locals.truncate(mark);
    }

    /// Record `demand` minus what enclosing `with` nodes provide, if
    /// anything is left.
    fn site(&mut self, span: Span, demand: &CapabilitySet, origin: SiteOrigin) {
        let caps = demand.difference(&self.discharged);
        if !caps.is_empty() {
            self.facts.sites.push(Site {
                span,
                depth: self.depth,
                caps,
                origin,
            });
        }
    }

    fn record_node(&mut self, id: ExprId, demand: CapabilitySet) {
        let available = self.sig.capabilities.union(&self.discharged);
        self.facts.nodes.push((
            id,
            NodeCapabilities {
                required: demand,
                available,
            },
        ));
    }

    /// A reference to `name` that is not a call through a local.
    fn reference(&mut self, name: Name, span: Span) {
        if self.local(name).is_some() {
            return;
        }
        match self.cx.symbols.resolve(name) {
            Some(Symbol::Function(callee)) => self.facts.edges.push(CallEdge {
                callee,
                span,
                depth: self.depth,
                discharged: self.discharged.clone(),
            }),
            Some(Symbol::Extern(ext)) => {
                let mut demand = self.cx.module.extern_fn(ext).capabilities.clone();
                demand.insert(Name::FFI);
                self.site(span, &demand, SiteOrigin::Extern(name));
            }
            None => {}
        }
    }

    fn call(&mut self, id: ExprId, func: ExprId, arena: &'a ExprArena) {
        let span = arena.span(id);
        let ExprKind::Call { args, .. } = arena.kind(id) else {
            return;
        };
        if let ExprKind::Ident(name) = *arena.kind(func) {
            match self.local(name) {
                Some(local) => {
                    let origin = if local.param {
                        SiteOrigin::Parameter(name)
                    } else {
                        SiteOrigin::Local(name)
                    };
                    let calls = local.calls.clone();
                    self.site(span, &calls, origin);
                }
                None => self.reference(name, span),
            }
            self.nested(|this| {
                for arg in args {
                    this.visit_expr(arg.value, arena);
                }
            });
            return;
        }
        let calls = self.mentioned_calls(func, arena);
        self.site(span, &calls, SiteOrigin::Indirect);
        self.nested(|this| walk_expr(this, id, arena));
    }

    /// Union of what calls through any local named in `id` may need.
    fn mentioned_calls(&self, id: ExprId, arena: &'a ExprArena) -> CapabilitySet {
        let mut mentions = Mentions {
            walk: self,
            calls: CapabilitySet::new(),
        };
        mentions.visit_expr(id, arena);
        mentions.calls
    }

    fn bind_pattern(&mut self, pattern: &BindingPattern, calls: &CapabilitySet) {
        match pattern {
            BindingPattern::Name(name) => self.bind(*name, calls.clone()),
            BindingPattern::Tuple(names) => {
                for name in names {
                    self.bind(*name, calls.clone());
                }
            }
            BindingPattern::Wildcard => {}
        }
    }

    /// `run`/`try`: each `let` covers the rest of the sequence.
    fn sequence(&mut self, node: &'a PatternNode, arena: &'a ExprArena) {
        let checks = node.checks.as_ref();
        for cond in checks.and_then(|c| c.pre.as_ref()).into_iter().flat_map(|g| g.as_slice()) {
            self.visit_expr(cond.expr, arena);
        }
        for arg in &node.args {
            self.visit_expr(arg.value, arena);
            if let ExprKind::Let { pattern, value } = arena.kind(arg.value) {
                let calls = self.mentioned_calls(*value, arena);
                self.bind_pattern(pattern, &calls);
            }
        }
        for cond in checks.and_then(|c| c.post.as_ref()).into_iter().flat_map(|g| g.as_slice()) {
            self.visit_expr(cond.expr, arena);
        }
    }
}

impl<'a> Visitor<'a> for BodyWalk<'_, 'a> {
    fn visit_expr(&mut self, id: ExprId, arena: &'a ExprArena) {
        ensure_sufficient_stack(|| {
            let span = arena.span(id);
            match arena.kind(id) {
                ExprKind::Pattern(pid) => self.visit_pattern(id, arena.pattern(*pid), arena),
                ExprKind::Intrinsic { op, .. } => {
                    let demand = if op.is_async() {
                        CapabilitySet::single(Name::ASYNC)
                    } else {
                        CapabilitySet::new()
                    };
                    self.site(span, &demand, SiteOrigin::Intrinsic(*op));
                    self.record_node(id, demand);
                    self.nested(|this| walk_expr(this, id, arena));
                }
                ExprKind::Call { func, .. } => self.call(id, *func, arena),
                ExprKind::Ident(name) => self.reference(*name, span),
                ExprKind::Lambda { params, body } => self.nested(|this| {
                    for param in params {
                        this.bind(*param, this.opaque.clone());
                    }
                    this.visit_expr(*body, arena);
                }),
                ExprKind::Arm { pattern, body } => self.nested(|this| {
                    if let MatchPattern::Binding(name)
                    | MatchPattern::Some(name)
                    | MatchPattern::Ok(name)
                    | MatchPattern::Err(name) = pattern
                    {
                        this.bind(*name, this.opaque.clone());
                    }
                    this.visit_expr(*body, arena);
                }),
                ExprKind::WithCapability {
                    capability,
                    provider,
                    body,
                } => {
                    let provided = !is_marker_capability(*capability);
                    if !provided {
                        self.facts.errors.push(CapabilityError::NotProvidable {
                            capability: *capability,
                            span,
                        });
                    }
                    self.nested(|this| {
                        this.visit_expr(*provider, arena);
                        let outer = this.discharged.clone();
                        if provided {
                            this.discharged.insert(*capability);
                        }
                        this.visit_expr(*body, arena);
                        this.discharged = outer;
                    });
                }
                _ => self.nested(|this| walk_expr(this, id, arena)),
            }
        });
    }

    fn visit_pattern(&mut self, id: ExprId, node: &'a PatternNode, arena: &'a ExprArena) {
        let demand: CapabilitySet = self
            .cx
            .registry
            .get(node.kind)
            .capabilities()
            .iter()
            .copied()
            .collect();
        self.site(arena.span(id), &demand, SiteOrigin::Pattern(node.kind));
        self.record_node(id, demand);
        self.nested(|this| match node.kind {
            PatternKind::Run | PatternKind::Try => this.sequence(node, arena),
            _ => walk_pattern(this, node, arena),
        });
    }
}

/// Collects the call capabilities of every local an expression names.
///
/// Shadowing inside the expression is ignored, which can only widen the
/// result.
struct Mentions<'w, 'c, 'a> {
    walk: &'w BodyWalk<'c, 'a>,
    calls: CapabilitySet,
}

impl<'a> Visitor<'a> for Mentions<'_, '_, 'a> {
    fn visit_expr(&mut self, id: ExprId, arena: &'a ExprArena) {
        ensure_sufficient_stack(|| {
            if let ExprKind::Ident(name) = arena.kind(id) {
                if let Some(local) = self.walk.local(*name) {
                    self.calls = self.calls.union(&local.calls);
                }
            }
            walk_expr(self, id, arena);
        });
    }
}
