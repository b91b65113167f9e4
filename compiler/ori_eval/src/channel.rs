//! Channels between tasks.
//!
//! A channel is owned by the task that created it. The producer side may be
//! closed explicitly with `close`; the scheduler closes every channel a task
//! owns when that task terminates. Waiting is done in slices of the
//! runtime's poll interval so cancellation is observed while blocked.

use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::scheduler::CancelToken;
use crate::Value;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Capacity {
    Unbounded,
    Bounded(NonZeroUsize),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChannelError {
    /// `send` after the channel was closed.
    Closed,
    /// The waiting task was cancelled.
    Cancelled,
}

#[derive(Debug, Default)]
struct ChannelState {
    queue: VecDeque<Value>,
    closed: bool,
}

#[derive(Debug)]
pub struct Channel {
    capacity: Capacity,
    state: Mutex<ChannelState>,
    changed: Condvar,
}

impl Channel {
    pub fn new(capacity: Capacity) -> Self {
        Channel {
            capacity,
            state: Mutex::new(ChannelState::default()),
            changed: Condvar::new(),
        }
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Enqueue `value`, waiting while a bounded channel is full.
    pub fn send(&self, value: Value, cancel: &CancelToken, poll: Duration) -> Result<(), ChannelError> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(ChannelError::Closed);
            }
            if cancel.is_cancelled() {
                return Err(ChannelError::Cancelled);
            }
            let full = match self.capacity {
                Capacity::Unbounded => false,
                Capacity::Bounded(n) => state.queue.len() >= n.get(),
            };
            if !full {
                state.queue.push_back(value);
                self.changed.notify_all();
                return Ok(());
            }
            self.changed.wait_for(&mut state, poll);
        }
    }

    /// Dequeue the next value; `None` once closed and drained.
    pub fn recv(&self, cancel: &CancelToken, poll: Duration) -> Result<Option<Value>, ChannelError> {
        let mut state = self.state.lock();
        loop {
            if let Some(value) = state.queue.pop_front() {
                self.changed.notify_all();
                return Ok(Some(value));
            }
            if state.closed {
                return Ok(None);
            }
            if cancel.is_cancelled() {
                return Err(ChannelError::Cancelled);
            }
            self.changed.wait_for(&mut state, poll);
        }
    }

    /// Close the channel. Idempotent; queued values stay receivable.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if !state.closed {
            state.closed = true;
            self.changed.notify_all();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn len(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests;
