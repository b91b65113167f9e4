//! Programmatic AST construction.
//!
//! Parsing is outside this workspace; `AstBuilder` is how embedders and
//! tests hand the pattern core a module. Every allocated node gets a
//! distinct one-byte span in allocation order, so diagnostics can be
//! matched back to the node that produced them.

use crate::{
    BinaryOp, BindingPattern, CallArg, CapabilitySet, ExprArena, ExprId, ExprKind, ExternFunction,
    ExternId, FunctionId, FunctionSignature, MatchPattern, Module, Name, Param, SharedInterner,
    Span, UnaryOp,
};

#[derive(Debug)]
pub struct AstBuilder {
    interner: SharedInterner,
    arena: ExprArena,
    module: Module,
    offset: u32,
}

impl AstBuilder {
    pub fn new(interner: SharedInterner) -> Self {
        AstBuilder {
            interner,
            arena: ExprArena::new(),
            module: Module::new(),
            offset: 0,
        }
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn arena(&self) -> &ExprArena {
        &self.arena
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn finish(self) -> (Module, ExprArena) {
        (self.module, self.arena)
    }

    #[inline]
    pub fn name(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    fn next_span(&mut self) -> Span {
        let span = Span::new(self.offset, self.offset + 1);
        self.offset += 1;
        span
    }

    /// Allocate a node with a fresh span.
    pub fn expr(&mut self, kind: ExprKind) -> ExprId {
        let span = self.next_span();
        self.arena.alloc(kind, span)
    }

    pub fn int(&mut self, value: i64) -> ExprId {
        self.expr(ExprKind::Int(value))
    }

    pub fn bool(&mut self, value: bool) -> ExprId {
        self.expr(ExprKind::Bool(value))
    }

    pub fn str(&mut self, text: &str) -> ExprId {
        let name = self.name(text);
        self.expr(ExprKind::Str(name))
    }

    pub fn unit(&mut self) -> ExprId {
        self.expr(ExprKind::Unit)
    }

    pub fn duration_ms(&mut self, millis: u64) -> ExprId {
        self.expr(ExprKind::Duration(millis.saturating_mul(1_000_000)))
    }

    pub fn ident(&mut self, text: &str) -> ExprId {
        let name = self.name(text);
        self.expr(ExprKind::Ident(name))
    }

    pub fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        self.expr(ExprKind::Binary { op, left, right })
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ExprId) -> ExprId {
        self.expr(ExprKind::Unary { op, operand })
    }

    pub fn list(&mut self, items: Vec<ExprId>) -> ExprId {
        self.expr(ExprKind::List(items))
    }

    pub fn tuple(&mut self, items: Vec<ExprId>) -> ExprId {
        self.expr(ExprKind::Tuple(items))
    }

    pub fn lambda(&mut self, params: &[&str], body: ExprId) -> ExprId {
        let params = params.iter().map(|p| self.name(p)).collect();
        self.expr(ExprKind::Lambda { params, body })
    }

    pub fn pos(&self, value: ExprId) -> CallArg {
        CallArg::positional(value, self.arena.span(value))
    }

    pub fn named(&self, name: &str, value: ExprId) -> CallArg {
        CallArg::named(self.name(name), value, self.arena.span(value))
    }

    /// `callee(args...)` with arbitrary argument shape.
    pub fn call_with(&mut self, callee: &str, args: Vec<CallArg>) -> ExprId {
        let func = self.ident(callee);
        self.expr(ExprKind::Call { func, args })
    }

    /// `callee(a, b, ...)`, all positional.
    pub fn call(&mut self, callee: &str, args: Vec<ExprId>) -> ExprId {
        let args = args.into_iter().map(|a| self.pos(a)).collect();
        self.call_with(callee, args)
    }

    /// `callee(name: value, ...)`, all named.
    pub fn call_named(&mut self, callee: &str, args: &[(&str, ExprId)]) -> ExprId {
        let args = args.iter().map(|&(n, v)| self.named(n, v)).collect();
        self.call_with(callee, args)
    }

    /// Call through an arbitrary callee expression.
    pub fn call_expr(&mut self, func: ExprId, args: Vec<ExprId>) -> ExprId {
        let args = args.into_iter().map(|a| self.pos(a)).collect();
        self.expr(ExprKind::Call { func, args })
    }

    pub fn let_(&mut self, name: &str, value: ExprId) -> ExprId {
        let pattern = BindingPattern::Name(self.name(name));
        self.expr(ExprKind::Let { pattern, value })
    }

    pub fn let_tuple(&mut self, names: &[&str], value: ExprId) -> ExprId {
        let pattern = BindingPattern::Tuple(names.iter().map(|n| self.name(n)).collect());
        self.expr(ExprKind::Let { pattern, value })
    }

    pub fn if_(&mut self, cond: ExprId, then_branch: ExprId, else_branch: ExprId) -> ExprId {
        self.expr(ExprKind::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    pub fn arm(&mut self, pattern: MatchPattern, body: ExprId) -> ExprId {
        self.expr(ExprKind::Arm { pattern, body })
    }

    pub fn check_message(&mut self, cond: ExprId, message: &str) -> ExprId {
        let message = self.name(message);
        self.expr(ExprKind::CheckMessage { cond, message })
    }

    pub fn with_capability(&mut self, capability: &str, provider: ExprId, body: ExprId) -> ExprId {
        let capability = self.name(capability);
        self.expr(ExprKind::WithCapability {
            capability,
            provider,
            body,
        })
    }

    pub fn caps(&self, names: &[&str]) -> CapabilitySet {
        names.iter().map(|n| self.name(n)).collect()
    }

    pub fn param(&self, name: &str) -> Param {
        Param::value(self.name(name), Span::DUMMY)
    }

    /// Function-typed parameter whose type carries `uses <caps>`.
    pub fn fn_param(&self, name: &str, uses: &[&str]) -> Param {
        Param::function(self.name(name), self.caps(uses), Span::DUMMY)
    }

    /// `@name (params) uses <uses> = body`
    pub fn function(
        &mut self,
        name: &str,
        params: Vec<Param>,
        uses: &[&str],
        body: ExprId,
    ) -> FunctionId {
        let sig = FunctionSignature {
            name: self.name(name),
            params,
            capabilities: self.caps(uses),
            body,
            span: self.arena.span(body),
        };
        self.module.add_function(sig)
    }

    pub fn extern_fn(&mut self, name: &str, params: &[&str], uses: &[&str]) -> ExternId {
        let span = self.next_span();
        let ext = ExternFunction {
            name: self.name(name),
            params: params.iter().map(|p| self.name(p)).collect(),
            capabilities: self.caps(uses),
            span,
        };
        self.module.add_extern(ext)
    }
}

impl Default for AstBuilder {
    fn default() -> Self {
        Self::new(SharedInterner::new())
    }
}
