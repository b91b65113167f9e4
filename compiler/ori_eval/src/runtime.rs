//! Running a program: the root task, outcomes, and runtime-wide state.

#![allow(
    clippy::disallowed_types,
    reason = "runtime state is shared with task threads"
)]

use std::sync::Arc;
use std::time::Instant;

use crossbeam::channel::{unbounded, Receiver};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, info_span};

use ori_ir::{CheckPhase, Span};
use ori_stack::RecursionGuard;

use crate::errors::undefined_function;
use crate::interpreter::Interpreter;
use crate::scheduler::{Scheduler, TaskEvent, TaskId, TaskOrigin, TaskSnapshot, TaskState};
use crate::{EvalError, Program, RuntimeConfig, Value};

/// A check that failed under `observe`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObservedViolation {
    pub phase: CheckPhase,
    /// Zero-based index of the failing condition.
    pub index: usize,
    pub message: String,
    pub span: Span,
    pub task: TaskId,
}

/// Result of running an entry point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Done(Value),
    Failed(EvalError),
    Cancelled,
}

impl RunOutcome {
    /// Process exit status: 0 done, 1 failed, 2 cancelled.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Done(_) => 0,
            RunOutcome::Failed(_) => 1,
            RunOutcome::Cancelled => 2,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            RunOutcome::Done(value) => Some(value),
            RunOutcome::Failed(_) | RunOutcome::Cancelled => None,
        }
    }

    pub fn error(&self) -> Option<&EvalError> {
        match self {
            RunOutcome::Failed(err) => Some(err),
            RunOutcome::Done(_) | RunOutcome::Cancelled => None,
        }
    }
}

pub(crate) struct CacheEntry {
    pub value: Value,
    pub expires: Option<Instant>,
}

impl CacheEntry {
    pub fn is_live(&self, now: Instant) -> bool {
        self.expires.map_or(true, |at| now < at)
    }
}

/// State shared by every task of one runtime.
pub(crate) struct Shared {
    pub program: Arc<Program>,
    pub config: RuntimeConfig,
    pub scheduler: Arc<Scheduler>,
    pub cache: Mutex<FxHashMap<Value, CacheEntry>>,
    pub violations: Mutex<Vec<ObservedViolation>>,
}

/// Runs entry points of one [`Program`].
///
/// A finished run's task tree stays inspectable until the next run starts
/// with no task still live. `cache` contents and observed violations
/// accumulate across runs.
pub struct Runtime {
    shared: Arc<Shared>,
    events: Receiver<TaskEvent>,
}

impl Runtime {
    pub fn new(program: Arc<Program>, config: RuntimeConfig) -> Self {
        let (tx, rx) = unbounded();
        let scheduler = Arc::new(Scheduler::new(tx, config.poll_interval));
        Runtime {
            shared: Arc::new(Shared {
                program,
                config,
                scheduler,
                cache: Mutex::new(FxHashMap::default()),
                violations: Mutex::new(Vec::new()),
            }),
            events: rx,
        }
    }

    pub fn program(&self) -> &Program {
        &self.shared.program
    }

    /// Call `entry` with `args` as the root task and wait for the whole
    /// task tree under it.
    pub fn run(&self, entry: &str, args: Vec<Value>) -> RunOutcome {
        let program = &self.shared.program;
        let Some(function) = program.find_function(entry) else {
            return RunOutcome::Failed(undefined_function(entry));
        };
        let name = program.module.function(function).name;
        let _span = info_span!("run", entry).entered();

        let scheduler = &self.shared.scheduler;
        scheduler.reclaim();
        let (root, token) = scheduler.enter(None, TaskOrigin::Root(name));
        let guard = RecursionGuard::new(self.shared.config.recursion_limit);
        let result = {
            let mut interpreter = Interpreter::new(&self.shared, root, token, &guard);
            interpreter.call_function_by_id(function, args, Span::DUMMY)
        };
        scheduler.complete(root, result);
        scheduler.join_all();

        let outcome = match scheduler.state(root) {
            Some(TaskState::Done(value)) => RunOutcome::Done(value),
            Some(TaskState::Failed(err)) => RunOutcome::Failed(err),
            _ => RunOutcome::Cancelled,
        };
        debug!(exit_code = outcome.exit_code(), "run finished");
        outcome
    }

    /// Termination events of every task, in completion order.
    pub fn events(&self) -> &Receiver<TaskEvent> {
        &self.events
    }

    pub fn observed_violations(&self) -> Vec<ObservedViolation> {
        self.shared.violations.lock().clone()
    }

    /// Entries currently held by `cache`, expired or not.
    pub fn cached_entries(&self) -> usize {
        self.shared.cache.lock().len()
    }

    pub fn tasks(&self) -> Vec<TaskSnapshot> {
        self.shared.scheduler.snapshot()
    }

    pub fn task_state(&self, id: TaskId) -> Option<TaskState> {
        self.shared.scheduler.state(id)
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("program", &self.shared.program)
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}
