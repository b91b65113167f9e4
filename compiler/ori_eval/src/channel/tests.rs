#![allow(
    clippy::disallowed_types,
    reason = "tests share channels between threads"
)]

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use pretty_assertions::assert_eq;

use super::*;

const POLL: Duration = Duration::from_millis(1);

fn bounded(n: usize) -> Channel {
    Channel::new(Capacity::Bounded(NonZeroUsize::new(n).unwrap()))
}

#[test]
fn values_arrive_in_order_then_none_after_close() {
    let ch = Channel::new(Capacity::Unbounded);
    let token = CancelToken::new();
    ch.send(Value::Int(1), &token, POLL).unwrap();
    ch.send(Value::Int(2), &token, POLL).unwrap();
    ch.close();

    assert_eq!(ch.recv(&token, POLL), Ok(Some(Value::Int(1))));
    assert_eq!(ch.recv(&token, POLL), Ok(Some(Value::Int(2))));
    assert_eq!(ch.recv(&token, POLL), Ok(None));
}

#[test]
fn send_after_close_fails() {
    let ch = Channel::new(Capacity::Unbounded);
    ch.close();
    ch.close();
    assert_eq!(
        ch.send(Value::Unit, &CancelToken::new(), POLL),
        Err(ChannelError::Closed)
    );
}

#[test]
fn bounded_send_waits_for_room() {
    let ch = Arc::new(bounded(1));
    let token = CancelToken::new();
    ch.send(Value::Int(1), &token, POLL).unwrap();

    let consumer = Arc::clone(&ch);
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        consumer.recv(&CancelToken::new(), POLL)
    });

    let start = Instant::now();
    ch.send(Value::Int(2), &token, POLL).unwrap();
    assert!(start.elapsed() >= Duration::from_millis(10));
    assert_eq!(handle.join().unwrap(), Ok(Some(Value::Int(1))));
    assert_eq!(ch.len(), 1);
}

#[test]
fn blocked_recv_observes_cancellation() {
    let ch = Channel::new(Capacity::Unbounded);
    let token = CancelToken::new();
    let canceller = token.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        canceller.cancel();
    });

    assert_eq!(ch.recv(&token, POLL), Err(ChannelError::Cancelled));
    handle.join().unwrap();
}

#[test]
fn queued_values_outlive_close() {
    let ch = bounded(2);
    let token = CancelToken::new();
    ch.send(Value::string("a"), &token, POLL).unwrap();
    ch.close();
    assert!(ch.is_closed());
    assert!(!ch.is_empty());
    assert_eq!(ch.recv(&token, POLL), Ok(Some(Value::string("a"))));
    assert!(ch.is_empty());
}
