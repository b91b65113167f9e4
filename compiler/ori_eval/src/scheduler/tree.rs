//! The task tree.
//!
//! An arena of [`TaskRecord`]s indexed by [`TaskId`]. Parents own the ids of
//! their children in creation order; a child keeps only its parent's id.
//! States move `Pending -> Running -> {Done, Cancelled, Failed}` and never
//! leave a terminal state.
//!
//! Ids are never reused: once every task is terminal the records can be
//! reclaimed, and numbering continues after the last id handed out.

#![allow(
    clippy::disallowed_types,
    reason = "cancel flags and channels are shared with task threads"
)]

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ori_ir::Name;

use crate::channel::Channel;
use crate::{EvalError, Value};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct TaskId(u32);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// Cooperative cancellation flag of one task.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Why a task exists.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TaskOrigin {
    /// Entry point of a run.
    Root(Name),
    /// One named branch of `parallel`.
    Branch(Name),
    Spawn,
    TimeoutBody,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Done(Value),
    Cancelled,
    Failed(EvalError),
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Done(_) | TaskState::Cancelled | TaskState::Failed(_)
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            TaskState::Pending => "pending",
            TaskState::Running => "running",
            TaskState::Done(_) => "done",
            TaskState::Cancelled => "cancelled",
            TaskState::Failed(_) => "failed",
        }
    }
}

#[derive(Debug)]
pub struct TaskRecord {
    pub id: TaskId,
    pub parent: Option<TaskId>,
    pub origin: TaskOrigin,
    pub state: TaskState,
    pub children: Vec<TaskId>,
    pub(crate) cancel: CancelToken,
    channels: Vec<Arc<Channel>>,
}

impl TaskRecord {
    pub fn is_cancel_requested(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[derive(Debug, Default)]
pub struct TaskTree {
    tasks: Vec<TaskRecord>,
    /// Id of `tasks[0]`.
    base: u32,
}

impl TaskTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `Pending` task under `parent`.
    ///
    /// A task created under a parent that is already being cancelled starts
    /// out cancelled.
    pub fn create(&mut self, parent: Option<TaskId>, origin: TaskOrigin) -> TaskId {
        let offset = u32::try_from(self.tasks.len()).unwrap_or(u32::MAX);
        let id = TaskId(self.base.saturating_add(offset));
        let cancel = CancelToken::new();
        if let Some(parent) = parent.and_then(|p| self.get_mut(p)) {
            parent.children.push(id);
            if parent.cancel.is_cancelled() {
                cancel.cancel();
            }
        }
        self.tasks.push(TaskRecord {
            id,
            parent,
            origin,
            state: TaskState::Pending,
            children: Vec::new(),
            cancel,
            channels: Vec::new(),
        });
        id
    }

    fn slot(&self, id: TaskId) -> Option<usize> {
        id.0.checked_sub(self.base).map(|offset| offset as usize)
    }

    pub fn get(&self, id: TaskId) -> Option<&TaskRecord> {
        self.tasks.get(self.slot(id)?)
    }

    fn get_mut(&mut self, id: TaskId) -> Option<&mut TaskRecord> {
        let slot = self.slot(id)?;
        self.tasks.get_mut(slot)
    }

    pub fn state(&self, id: TaskId) -> Option<&TaskState> {
        self.get(id).map(|t| &t.state)
    }

    pub fn is_terminal(&self, id: TaskId) -> bool {
        self.state(id).map_or(true, TaskState::is_terminal)
    }

    pub fn token(&self, id: TaskId) -> Option<CancelToken> {
        self.get(id).map(|t| t.cancel.clone())
    }

    /// `Pending -> Running`. Returns false for any other starting state.
    pub fn start(&mut self, id: TaskId) -> bool {
        match self.get_mut(id) {
            Some(task) if task.state == TaskState::Pending => {
                task.state = TaskState::Running;
                true
            }
            _ => false,
        }
    }

    /// Move a running task to its terminal state and close its channels.
    ///
    /// A cancellation signal ends as `Cancelled`, and so does a successful
    /// result of a task whose cancellation was requested. Returns the new
    /// state, or `None` if the task was not running.
    pub fn finish(&mut self, id: TaskId, result: Result<Value, EvalError>) -> Option<&TaskState> {
        let task = self.get_mut(id)?;
        if task.state != TaskState::Running {
            return None;
        }
        task.state = match result {
            Err(err) if err.is_cancelled() => TaskState::Cancelled,
            Err(err) => TaskState::Failed(err),
            Ok(_) if task.cancel.is_cancelled() => TaskState::Cancelled,
            Ok(value) => TaskState::Done(value),
        };
        for channel in task.channels.drain(..) {
            channel.close();
        }
        Some(&task.state)
    }

    /// Request cancellation of `id` and every non-terminal descendant.
    ///
    /// Idempotent. Returns how many tasks were newly flagged.
    pub fn cancel(&mut self, id: TaskId) -> usize {
        let mut flagged = 0usize;
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let Some(task) = self.get(next) else {
                continue;
            };
            if !task.state.is_terminal() && !task.cancel.is_cancelled() {
                task.cancel.cancel();
                flagged = flagged.saturating_add(1);
            }
            stack.extend(task.children.iter().copied());
        }
        flagged
    }

    /// Register a channel to be closed when `id` terminates.
    pub fn own_channel(&mut self, id: TaskId, channel: Arc<Channel>) {
        if let Some(task) = self.get_mut(id) {
            task.channels.push(channel);
        }
    }

    pub fn children(&self, id: TaskId) -> &[TaskId] {
        self.get(id).map_or(&[], |t| t.children.as_slice())
    }

    /// Drop every record if all tasks are terminal. Returns how many were
    /// dropped; nothing is dropped while any task is still live.
    pub fn reclaim(&mut self) -> usize {
        if !self.tasks.iter().all(|t| t.state.is_terminal()) {
            return 0;
        }
        let dropped = self.tasks.len();
        let offset = u32::try_from(dropped).unwrap_or(u32::MAX);
        self.base = self.base.saturating_add(offset);
        self.tasks.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskRecord> {
        self.tasks.iter()
    }
}
