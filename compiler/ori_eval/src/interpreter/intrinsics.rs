//! Channel, `sleep` and `panic` intrinsics.

#![allow(
    clippy::disallowed_types,
    reason = "channels are shared between task threads"
)]

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ori_ir::Intrinsic;

use super::Interpreter;
use crate::channel::{Capacity, Channel, ChannelError};
use crate::errors::{
    cancelled, channel_closed, invalid_capacity, panic_called, type_mismatch, EvalError,
    EvalResult,
};
use crate::Value;

/// Slice length for a `sleep` whose deadline does not fit in an `Instant`.
const SLEEP_SLICE: Duration = Duration::from_secs(3600);

impl Interpreter<'_> {
    pub(super) fn eval_intrinsic(&mut self, op: Intrinsic, args: Vec<Value>) -> EvalResult {
        if op.may_suspend() {
            self.ensure_may_suspend(op.name())?;
        }
        let mut args = args.into_iter();
        let mut next = || args.next().unwrap_or(Value::Unit);

        match op {
            Intrinsic::Channel => {
                let capacity = match next() {
                    Value::Unit => Capacity::Unbounded,
                    Value::Int(n) => usize::try_from(n)
                        .ok()
                        .and_then(NonZeroUsize::new)
                        .map(Capacity::Bounded)
                        .ok_or_else(|| invalid_capacity(n))?,
                    other => return Err(type_mismatch("int", other.type_name())),
                };
                let channel = Arc::new(Channel::new(capacity));
                self.shared
                    .scheduler
                    .own_channel(self.task, Arc::clone(&channel));
                Ok(Value::tuple(vec![
                    Value::Producer(Arc::clone(&channel)),
                    Value::Consumer(channel),
                ]))
            }
            Intrinsic::Send => {
                let channel = match next() {
                    Value::Producer(channel) => channel,
                    other => return Err(type_mismatch("producer", other.type_name())),
                };
                let value = next();
                let poll = self.shared.scheduler.poll_interval();
                channel
                    .send(value, &self.wait_token(), poll)
                    .map_err(channel_error)?;
                Ok(Value::Unit)
            }
            Intrinsic::Recv => {
                let channel = match next() {
                    Value::Consumer(channel) => channel,
                    other => return Err(type_mismatch("consumer", other.type_name())),
                };
                let poll = self.shared.scheduler.poll_interval();
                let received = channel
                    .recv(&self.wait_token(), poll)
                    .map_err(channel_error)?;
                Ok(received.map_or(Value::None, Value::some))
            }
            Intrinsic::Close => {
                let channel = match next() {
                    Value::Producer(channel) => channel,
                    other => return Err(type_mismatch("producer", other.type_name())),
                };
                channel.close();
                Ok(Value::Unit)
            }
            Intrinsic::Sleep => {
                let duration = match next() {
                    Value::Duration(ns) => Duration::from_nanos(ns),
                    other => return Err(type_mismatch("Duration", other.type_name())),
                };
                let token = self.wait_token();
                match Instant::now().checked_add(duration) {
                    Some(deadline) => self.shared.scheduler.sleep_until(deadline, &token),
                    // Effectively forever: only cancellation ends it.
                    None => loop {
                        let now = Instant::now();
                        let far = now.checked_add(SLEEP_SLICE).unwrap_or(now);
                        self.shared.scheduler.sleep_until(far, &token)?;
                    },
                }?;
                Ok(Value::Unit)
            }
            Intrinsic::Panic => Err(panic_called(next().to_string())),
        }
    }
}

fn channel_error(err: ChannelError) -> EvalError {
    match err {
        ChannelError::Closed => channel_closed(),
        ChannelError::Cancelled => cancelled(),
    }
}
