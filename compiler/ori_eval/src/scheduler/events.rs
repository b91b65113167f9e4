//! Task termination events.

use crate::scheduler::{TaskId, TaskOrigin, TaskState};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskOutcome {
    Done,
    Cancelled,
    Failed(String),
}

impl TaskOutcome {
    pub(crate) fn from_state(state: &TaskState) -> Option<Self> {
        match state {
            TaskState::Done(_) => Some(TaskOutcome::Done),
            TaskState::Cancelled => Some(TaskOutcome::Cancelled),
            TaskState::Failed(err) => Some(TaskOutcome::Failed(err.message.clone())),
            TaskState::Pending | TaskState::Running => None,
        }
    }
}

/// Sent once per task when it reaches a terminal state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskEvent {
    pub task: TaskId,
    pub parent: Option<TaskId>,
    pub origin: TaskOrigin,
    pub outcome: TaskOutcome,
}
