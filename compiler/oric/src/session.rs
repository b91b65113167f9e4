//! Compilation session: classify, check capabilities, compile contracts.
//!
//! ```text
//! Module + ExprArena
//!     │
//!     ▼
//! classify_module ──► PatternNode / Intrinsic nodes     (E3001-E3004)
//!     │
//!     ▼
//! check_module ──► CapabilityAnnotations                (E2014, E2019)
//!     │
//!     ▼
//! compile_contracts ──► guard nodes per CheckMode
//!     │
//!     ▼
//! CompiledModule ──► Program ──► Runtime
//! ```
//!
//! Every phase reports into one [`DiagnosticQueue`]; the first phase that
//! produced errors ends compilation.

#![allow(
    clippy::disallowed_types,
    reason = "compiled programs are shared with task threads"
)]

use std::sync::Arc;

use tracing::{debug, info};

use ori_canon::ContractStats;
use ori_capabilities::CapabilityAnnotations;
use ori_diagnostic::{Diagnostic, DiagnosticQueue, ErrorGuaranteed};
use ori_eval::{HostFunctions, Program, RunOutcome, Runtime, RuntimeConfig, Value};
use ori_ir::{AstBuilder, CheckMode, ExprArena, Module, SharedInterner};

use crate::config::{CompilerConfig, ConfigError};

/// A module that passed every check, with contracts compiled.
#[derive(Debug)]
pub struct CompiledModule {
    module: Module,
    arena: ExprArena,
    interner: SharedInterner,
    annotations: CapabilityAnnotations,
    check_mode: CheckMode,
    contracts: ContractStats,
    patterns: usize,
}

impl CompiledModule {
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

    pub fn check_mode(&self) -> CheckMode {
        self.check_mode
    }

    pub fn contract_stats(&self) -> ContractStats {
        self.contracts
    }

    /// Pattern invocations found by the classifier.
    pub fn pattern_count(&self) -> usize {
        self.patterns
    }

    pub fn into_program(self, host: &HostFunctions) -> Program {
        Program::new(self.module, self.arena, self.interner, self.annotations, host)
    }
}

/// Compilation stopped with errors.
#[derive(Debug, thiserror::Error)]
#[error("compilation failed with {} error(s)", .diagnostics.len())]
pub struct CompileFailure {
    /// Sorted by primary span.
    pub diagnostics: Vec<Diagnostic>,
    /// Errors beyond the configured limit.
    pub dropped: usize,
    pub guarantee: ErrorGuaranteed,
}

impl CompileFailure {
    fn from_queue(queue: &mut DiagnosticQueue, guarantee: ErrorGuaranteed) -> Self {
        let dropped = queue.dropped_count();
        CompileFailure {
            diagnostics: queue.flush(),
            dropped,
            guarantee,
        }
    }
}

/// Configuration plus host bindings for compiling and running modules.
#[derive(Debug, Default)]
pub struct Session {
    config: CompilerConfig,
    runtime: RuntimeConfig,
    host: HostFunctions,
}

impl Session {
    pub fn new(config: CompilerConfig) -> Self {
        Session {
            config,
            ..Self::default()
        }
    }

    /// Session configured from `ORI_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        CompilerConfig::from_env().map(Self::new)
    }

    #[must_use]
    pub fn with_runtime_config(mut self, runtime: RuntimeConfig) -> Self {
        self.runtime = runtime;
        self
    }

    /// Host implementations for `extern` functions.
    #[must_use]
    pub fn with_host(mut self, host: HostFunctions) -> Self {
        self.host = host;
        self
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile everything `builder` produced.
    pub fn compile_builder(&self, builder: AstBuilder) -> Result<CompiledModule, CompileFailure> {
        let interner = builder.interner().clone();
        let (module, arena) = builder.finish();
        self.compile(module, arena, interner)
    }

    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(functions = module.functions.len(), mode = %self.config.check_mode)
    )]
    pub fn compile(
        &self,
        module: Module,
        mut arena: ExprArena,
        interner: SharedInterner,
    ) -> Result<CompiledModule, CompileFailure> {
        let mut queue = DiagnosticQueue::with_config(self.config.diagnostic_config());

        let classified = ori_patterns::classify_module(&module, &mut arena, &interner);
        queue.extend(
            classified
                .errors
                .into_iter()
                .map(|err| err.into_diagnostic(&interner)),
        );
        if let Some(guarantee) = queue.has_errors() {
            debug!(errors = queue.error_count(), "pattern classification failed");
            return Err(CompileFailure::from_queue(&mut queue, guarantee));
        }

        let annotations = match ori_capabilities::check_module(&module, &arena, &interner) {
            Ok(annotations) => annotations,
            Err(errors) => {
                queue.extend(errors.into_iter().map(|err| err.into_diagnostic(&interner)));
                CapabilityAnnotations::default()
            }
        };
        if let Some(guarantee) = queue.has_errors() {
            debug!(errors = queue.error_count(), "capability check failed");
            return Err(CompileFailure::from_queue(&mut queue, guarantee));
        }

        let contracts = ori_canon::compile_contracts(&mut arena, self.config.check_mode);
        if cfg!(debug_assertions) {
            ori_canon::validate(&arena);
        }
        info!(
            patterns = classified.patterns,
            contracts = contracts.lowered,
            "module compiled"
        );

        Ok(CompiledModule {
            module,
            arena,
            interner,
            annotations,
            check_mode: self.config.check_mode,
            contracts,
            patterns: classified.patterns,
        })
    }

    /// A runtime for `compiled` with this session's host functions.
    pub fn runtime(&self, compiled: CompiledModule) -> Runtime {
        let program = Arc::new(compiled.into_program(&self.host));
        Runtime::new(program, self.runtime)
    }

    /// Run `entry` of `compiled` to completion.
    pub fn run(&self, compiled: CompiledModule, entry: &str, args: Vec<Value>) -> RunOutcome {
        self.runtime(compiled).run(entry, args)
    }
}
