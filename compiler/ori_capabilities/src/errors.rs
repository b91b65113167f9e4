//! Capability errors.

use ori_diagnostic::{Diagnostic, ErrorCode};
use ori_ir::{CapabilitySet, Name, Span, StringInterner};

use crate::SiteOrigin;

/// One step from a function towards the site that introduced a capability.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainLink {
    /// Function containing this step.
    pub function: Name,
    pub span: Span,
    pub step: ChainStep,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChainStep {
    /// Calls (or references) another module function.
    Calls(Name),
    /// The site itself.
    Requires(SiteOrigin),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CapabilityError {
    /// E2014: `required ⊄ declared`.
    Missing {
        function: Name,
        capability: Name,
        /// Deepest uncovered site in `function`.
        span: Span,
        declared: CapabilitySet,
        /// From `function` down to the introducing site.
        chain: Vec<ChainLink>,
    },
    /// E2019: `with` on a marker capability.
    NotProvidable { capability: Name, span: Span },
}

impl CapabilityError {
    pub fn span(&self) -> Span {
        match self {
            CapabilityError::Missing { span, .. } | CapabilityError::NotProvidable { span, .. } => {
                *span
            }
        }
    }

    pub fn capability(&self) -> Name {
        match self {
            CapabilityError::Missing { capability, .. }
            | CapabilityError::NotProvidable { capability, .. } => *capability,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CapabilityError::Missing { .. } => ErrorCode::E2014,
            CapabilityError::NotProvidable { .. } => ErrorCode::E2019,
        }
    }

    pub fn into_diagnostic(self, interner: &StringInterner) -> Diagnostic {
        match self {
            CapabilityError::Missing {
                function,
                capability,
                span,
                declared,
                chain,
            } => {
                let func = interner.lookup(function);
                let cap = interner.lookup(capability);
                let label = chain
                    .first()
                    .map_or_else(|| format!("requires `{cap}`"), |link| describe(link, interner, cap));
                let mut diag = Diagnostic::error(ErrorCode::E2014)
                    .with_message(format!(
                        "`{func}` requires capability `{cap}` but does not declare it"
                    ))
                    .with_label(span, label);
                for link in chain.iter().skip(1) {
                    diag = diag.with_secondary_label(link.span, describe(link, interner, cap));
                }
                if chain.len() > 1 {
                    let path: Vec<&str> = chain.iter().map(|l| interner.lookup(l.function)).collect();
                    diag = diag.with_note(format!("call chain: {}", path.join(" -> ")));
                }
                let suggestion = if declared.is_empty() {
                    format!("add `uses {cap}` to `{func}`")
                } else {
                    let mut all = declared;
                    all.insert(capability);
                    let names: Vec<&str> = all.iter().map(|n| interner.lookup(n)).collect();
                    format!("change the signature of `{func}` to `uses {}`", names.join(", "))
                };
                diag.with_suggestion(suggestion)
            }
            CapabilityError::NotProvidable { capability, span } => {
                let cap = interner.lookup(capability);
                Diagnostic::error(ErrorCode::E2019)
                    .with_message(format!("capability `{cap}` cannot be provided with `with`"))
                    .with_label(span, format!("`{cap}` is a marker capability"))
                    .with_note("`Async` and `FFI` describe the function itself and can only be declared with `uses`")
            }
        }
    }
}

fn describe(link: &ChainLink, interner: &StringInterner, cap: &str) -> String {
    match link.step {
        ChainStep::Calls(callee) => {
            format!("calls `{}`, which requires `{cap}`", interner.lookup(callee))
        }
        ChainStep::Requires(SiteOrigin::Pattern(kind)) => {
            format!("`{}` requires `{cap}`", kind.name())
        }
        ChainStep::Requires(SiteOrigin::Intrinsic(op)) => {
            format!("`{}` requires `{cap}`", op.name())
        }
        ChainStep::Requires(SiteOrigin::Extern(name)) => {
            format!("extern `{}` requires `{cap}`", interner.lookup(name))
        }
        ChainStep::Requires(SiteOrigin::Parameter(name)) => {
            format!("calling parameter `{}` requires `{cap}`", interner.lookup(name))
        }
        ChainStep::Requires(SiteOrigin::Local(name)) => {
            format!("calling `{}` requires `{cap}`", interner.lookup(name))
        }
        ChainStep::Requires(SiteOrigin::Indirect) => {
            format!("calling a computed function value requires `{cap}`")
        }
    }
}
