//! Structured concurrency scheduler.
//!
//! Every task runs on its own OS thread. All coordination goes through one
//! `Mutex<TaskTree>` and one `Condvar`: any state change notifies all
//! waiters, and every wait is sliced by the poll interval so cancellation
//! flags are re-read even without a notification.
//!
//! A task is done only when its body has finished *and* all of its children
//! are terminal. A body that fails or is cancelled cancels its children
//! first.

#![allow(
    clippy::disallowed_types,
    reason = "the scheduler is shared with task threads"
)]

mod events;
mod tree;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::Sender;
use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, trace, warn};

use crate::channel::Channel;
use crate::errors::{cancelled, panic_called, task_spawn_failed};
use crate::EvalResult;

pub use events::{TaskEvent, TaskOutcome};
pub use tree::{CancelToken, TaskId, TaskOrigin, TaskRecord, TaskState, TaskTree};

/// Read-only view of one task, for callers outside the runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskSnapshot {
    pub id: TaskId,
    pub parent: Option<TaskId>,
    pub origin: TaskOrigin,
    pub state: TaskState,
    pub children: Vec<TaskId>,
}

pub(crate) struct Scheduler {
    tree: Mutex<TaskTree>,
    changed: Condvar,
    events: Sender<TaskEvent>,
    threads: Mutex<Vec<JoinHandle<()>>>,
    poll: Duration,
}

impl Scheduler {
    pub fn new(events: Sender<TaskEvent>, poll: Duration) -> Self {
        Scheduler {
            tree: Mutex::new(TaskTree::new()),
            changed: Condvar::new(),
            events,
            threads: Mutex::new(Vec::new()),
            poll,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll
    }

    /// Create a task and move it to `Running` on the calling thread.
    pub fn enter(&self, parent: Option<TaskId>, origin: TaskOrigin) -> (TaskId, CancelToken) {
        let mut tree = self.tree.lock();
        let id = tree.create(parent, origin);
        tree.start(id);
        let token = tree.token(id).unwrap_or_default();
        (id, token)
    }

    /// Start `body` as a child of `parent` on a new thread.
    ///
    /// `body` runs once the task is `Running`; the task reaches its terminal
    /// state after `body` returns and every child is terminal.
    pub fn spawn<F>(self: &Arc<Self>, parent: TaskId, origin: TaskOrigin, body: F) -> TaskId
    where
        F: FnOnce(TaskId, CancelToken) -> EvalResult + Send + 'static,
    {
        let (id, token) = {
            let mut tree = self.tree.lock();
            let id = tree.create(Some(parent), origin);
            (id, tree.token(id).unwrap_or_default())
        };
        trace!(%id, %parent, ?origin, "spawning task");

        let scheduler = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name(format!("ori-{id}"))
            .spawn(move || {
                scheduler.tree.lock().start(id);
                let result = catch_unwind(AssertUnwindSafe(|| body(id, token)))
                    .unwrap_or_else(|_| Err(panic_called("task thread panicked")));
                scheduler.complete(id, result);
            });

        match spawned {
            Ok(handle) => self.threads.lock().push(handle),
            Err(err) => {
                self.tree.lock().start(id);
                self.complete(id, Err(task_spawn_failed(err.to_string())));
            }
        }
        id
    }

    /// Finish a task whose body returned `result`.
    pub fn complete(&self, id: TaskId, result: EvalResult) {
        let mut tree = self.tree.lock();
        if result.is_err() {
            for child in tree.children(id).to_vec() {
                tree.cancel(child);
            }
            self.changed.notify_all();
        }
        self.wait_until(&mut tree, |tree| {
            tree.children(id).iter().all(|c| tree.is_terminal(*c))
        });

        let Some(state) = tree.finish(id, result).cloned() else {
            return;
        };
        let record = tree.get(id);
        let parent = record.and_then(|t| t.parent);
        let origin = record.map(|t| t.origin);

        debug!(%id, state = state.name(), "task finished");
        if let (TaskState::Failed(err), Some(TaskOrigin::Spawn)) = (&state, origin) {
            warn!(%id, error = %err, "spawned task failed");
        }
        // Sent under the tree lock so events arrive in completion order: a
        // waiting parent cannot finish before this event is queued.
        if let (Some(origin), Some(outcome)) = (origin, TaskOutcome::from_state(&state)) {
            // Nobody listening is fine.
            let _ = self.events.send(TaskEvent {
                task: id,
                parent,
                origin,
                outcome,
            });
        }
        drop(tree);
        self.changed.notify_all();
    }

    /// Request cancellation of `id` and its descendants.
    pub fn cancel(&self, id: TaskId) {
        let flagged = self.tree.lock().cancel(id);
        if flagged > 0 {
            trace!(%id, flagged, "cancellation requested");
            self.changed.notify_all();
        }
    }

    /// Wait for every task in `ids` to terminate.
    ///
    /// With `fail_fast`, the first failure cancels every task in `ids` that
    /// is still running. States are returned in the order of `ids`.
    pub fn wait_all(&self, ids: &[TaskId], fail_fast: bool) -> Vec<TaskState> {
        let mut tree = self.tree.lock();
        let mut cancelled_siblings = false;
        loop {
            if fail_fast
                && !cancelled_siblings
                && ids
                    .iter()
                    .any(|id| matches!(tree.state(*id), Some(TaskState::Failed(_))))
            {
                for id in ids {
                    tree.cancel(*id);
                }
                cancelled_siblings = true;
                self.changed.notify_all();
            }
            if ids.iter().all(|id| tree.is_terminal(*id)) {
                break;
            }
            self.changed.wait_for(&mut tree, self.poll);
        }
        ids.iter()
            .map(|id| tree.state(*id).cloned().unwrap_or(TaskState::Cancelled))
            .collect()
    }

    /// Wait for `id` to terminate or for `deadline` to pass.
    ///
    /// `None` means the deadline came first; the task is left running.
    pub fn race(&self, id: TaskId, deadline: Instant) -> Option<TaskState> {
        let mut tree = self.tree.lock();
        loop {
            if let Some(state) = tree.state(id).filter(|s| s.is_terminal()) {
                return Some(state.clone());
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let slice = deadline.saturating_duration_since(now).min(self.poll);
            self.changed.wait_for(&mut tree, slice);
        }
    }

    /// Suspend until `deadline` unless `token` is cancelled first.
    pub fn sleep_until(&self, deadline: Instant, token: &CancelToken) -> EvalResult<()> {
        let mut tree = self.tree.lock();
        loop {
            if token.is_cancelled() {
                return Err(cancelled());
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            let slice = deadline.saturating_duration_since(now).min(self.poll);
            self.changed.wait_for(&mut tree, slice);
        }
    }

    pub fn own_channel(&self, id: TaskId, channel: Arc<Channel>) {
        self.tree.lock().own_channel(id, channel);
    }

    pub fn state(&self, id: TaskId) -> Option<TaskState> {
        self.tree.lock().state(id).cloned()
    }

    pub fn snapshot(&self) -> Vec<TaskSnapshot> {
        self.tree
            .lock()
            .iter()
            .map(|t| TaskSnapshot {
                id: t.id,
                parent: t.parent,
                origin: t.origin,
                state: t.state.clone(),
                children: t.children.clone(),
            })
            .collect()
    }

    /// Forget finished task trees if no task is live.
    pub fn reclaim(&self) {
        let dropped = self.tree.lock().reclaim();
        if dropped > 0 {
            trace!(dropped, "reclaimed finished tasks");
        }
    }

    /// Join every task thread started so far.
    pub fn join_all(&self) {
        loop {
            let Some(handle) = self.threads.lock().pop() else {
                break;
            };
            // Task panics were already turned into failures.
            let _ = handle.join();
        }
    }

    fn wait_until(&self, tree: &mut MutexGuard<'_, TaskTree>, done: impl Fn(&TaskTree) -> bool) {
        while !done(tree) {
            self.changed.wait_for(tree, self.poll);
        }
    }
}

#[cfg(test)]
mod tests;
