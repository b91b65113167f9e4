use pretty_assertions::assert_eq;

use crossbeam::channel::{unbounded, Receiver};
use ori_ir::Name;

use super::*;
use crate::errors::division_by_zero;
use crate::Value;

const POLL: Duration = Duration::from_millis(1);

fn after(delay: Duration) -> Instant {
    Instant::now().checked_add(delay).unwrap()
}

fn scheduler() -> (Arc<Scheduler>, Receiver<TaskEvent>) {
    let (tx, rx) = unbounded();
    (Arc::new(Scheduler::new(tx, POLL)), rx)
}

#[test]
fn tree_states_are_monotonic() {
    let mut tree = TaskTree::new();
    let root = tree.create(None, TaskOrigin::Root(Name::EMPTY));
    assert_eq!(tree.state(root), Some(&TaskState::Pending));
    assert!(tree.start(root));
    assert!(!tree.start(root));

    assert_eq!(
        tree.finish(root, Ok(Value::Int(1))),
        Some(&TaskState::Done(Value::Int(1)))
    );
    assert_eq!(tree.finish(root, Err(division_by_zero())), None);
    assert!(!tree.start(root));
    assert_eq!(tree.state(root), Some(&TaskState::Done(Value::Int(1))));
}

#[test]
fn cancel_is_top_down_and_idempotent() {
    let mut tree = TaskTree::new();
    let root = tree.create(None, TaskOrigin::Root(Name::EMPTY));
    let a = tree.create(Some(root), TaskOrigin::Spawn);
    let b = tree.create(Some(a), TaskOrigin::Spawn);
    let sibling = tree.create(Some(root), TaskOrigin::Spawn);

    assert_eq!(tree.cancel(a), 2);
    assert_eq!(tree.cancel(a), 0);
    assert!(tree.get(b).is_some_and(TaskRecord::is_cancel_requested));
    assert!(!tree.get(sibling).is_some_and(TaskRecord::is_cancel_requested));
    assert!(!tree.get(root).is_some_and(TaskRecord::is_cancel_requested));

    // Created under a cancelled parent: born cancelled.
    let late = tree.create(Some(a), TaskOrigin::Spawn);
    assert!(tree.get(late).is_some_and(TaskRecord::is_cancel_requested));
    assert_eq!(tree.children(root), &[a, sibling]);
}

#[test]
fn cancelled_success_ends_cancelled() {
    let mut tree = TaskTree::new();
    let id = tree.create(None, TaskOrigin::Spawn);
    tree.start(id);
    tree.cancel(id);
    assert_eq!(tree.finish(id, Ok(Value::Unit)), Some(&TaskState::Cancelled));
}

#[test]
fn reclaim_waits_for_every_task_and_keeps_ids_fresh() {
    let mut tree = TaskTree::new();
    let root = tree.create(None, TaskOrigin::Root(Name::EMPTY));
    let child = tree.create(Some(root), TaskOrigin::Spawn);
    tree.start(root);
    tree.start(child);
    tree.finish(root, Ok(Value::Unit));
    assert_eq!(tree.reclaim(), 0);
    assert_eq!(tree.len(), 2);

    tree.finish(child, Ok(Value::Unit));
    assert_eq!(tree.reclaim(), 2);
    assert!(tree.is_empty());
    assert_eq!(tree.state(root), None);

    let next = tree.create(None, TaskOrigin::Root(Name::EMPTY));
    assert!(next > child);
    assert_eq!(tree.state(next), Some(&TaskState::Pending));
}

#[test]
fn finishing_closes_owned_channels() {
    let mut tree = TaskTree::new();
    let id = tree.create(None, TaskOrigin::Spawn);
    let channel = Arc::new(Channel::new(crate::channel::Capacity::Unbounded));
    tree.own_channel(id, Arc::clone(&channel));
    tree.start(id);
    tree.finish(id, Ok(Value::Unit));
    assert!(channel.is_closed());
}

#[test]
fn completion_waits_for_children() {
    let (sched, rx) = scheduler();
    let (root, _) = sched.enter(None, TaskOrigin::Root(Name::EMPTY));
    let child = sched.spawn(root, TaskOrigin::Spawn, |_, _| {
        thread::sleep(Duration::from_millis(20));
        Ok(Value::Int(7))
    });

    sched.complete(root, Ok(Value::Unit));
    assert_eq!(sched.state(child), Some(TaskState::Done(Value::Int(7))));
    assert_eq!(sched.state(root), Some(TaskState::Done(Value::Unit)));
    sched.join_all();

    let events: Vec<TaskId> = rx.try_iter().map(|e| e.task).collect();
    assert_eq!(events, vec![child, root]);
}

#[test]
fn events_arrive_in_completion_order() {
    for _ in 0..50 {
        let (sched, rx) = scheduler();
        let (root, _) = sched.enter(None, TaskOrigin::Root(Name::EMPTY));
        let children: Vec<TaskId> = (0..3)
            .map(|i| sched.spawn(root, TaskOrigin::Spawn, move |_, _| Ok(Value::Int(i))))
            .collect();

        sched.complete(root, Ok(Value::Unit));
        sched.join_all();

        let events: Vec<TaskId> = rx.try_iter().map(|e| e.task).collect();
        assert_eq!(events.len(), 4);
        assert_eq!(events.last(), Some(&root));
        for child in &children {
            assert!(events[..3].contains(child));
        }
    }
}

#[test]
fn failing_body_cancels_its_children() {
    let (sched, _rx) = scheduler();
    let (root, _) = sched.enter(None, TaskOrigin::Root(Name::EMPTY));
    let child = sched.spawn(root, TaskOrigin::Spawn, |_, token| {
        let deadline = after(Duration::from_secs(5));
        sched_sleep(&token, deadline)
    });

    sched.complete(root, Err(division_by_zero()));
    assert_eq!(sched.state(child), Some(TaskState::Cancelled));
    assert_eq!(
        sched.state(root),
        Some(TaskState::Failed(division_by_zero()))
    );
    sched.join_all();
}

/// Busy wait standing in for a suspension point.
fn sched_sleep(token: &CancelToken, deadline: Instant) -> EvalResult {
    while Instant::now() < deadline {
        if token.is_cancelled() {
            return Err(cancelled());
        }
        thread::sleep(POLL);
    }
    Ok(Value::Unit)
}

#[test]
fn wait_all_fail_fast_cancels_siblings() {
    let (sched, _rx) = scheduler();
    let (root, _) = sched.enter(None, TaskOrigin::Root(Name::EMPTY));
    let slow = sched.spawn(root, TaskOrigin::Branch(Name::EMPTY), |_, token| {
        sched_sleep(&token, after(Duration::from_secs(5)))
    });
    let failing = sched.spawn(root, TaskOrigin::Branch(Name::EMPTY), |_, _| {
        Err(division_by_zero())
    });

    let states = sched.wait_all(&[slow, failing], true);
    assert_eq!(
        states,
        vec![TaskState::Cancelled, TaskState::Failed(division_by_zero())]
    );
    sched.complete(root, Ok(Value::Unit));
    sched.join_all();
}

#[test]
fn race_reports_the_deadline() {
    let (sched, _rx) = scheduler();
    let (root, _) = sched.enter(None, TaskOrigin::Root(Name::EMPTY));
    let body = sched.spawn(root, TaskOrigin::TimeoutBody, |_, token| {
        sched_sleep(&token, after(Duration::from_secs(5)))
    });

    let outcome = sched.race(body, after(Duration::from_millis(10)));
    assert_eq!(outcome, None);
    sched.cancel(body);
    assert_eq!(sched.wait_all(&[body], false), vec![TaskState::Cancelled]);
    sched.complete(root, Ok(Value::Unit));
    sched.join_all();
}

#[test]
fn sleep_is_cancellable() {
    let (sched, _rx) = scheduler();
    let token = CancelToken::new();
    let canceller = token.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        canceller.cancel();
    });
    let start = Instant::now();
    let result = sched.sleep_until(start.checked_add(Duration::from_secs(5)).unwrap(), &token);
    assert!(result.is_err_and(|e| e.is_cancelled()));
    assert!(start.elapsed() < Duration::from_secs(1));
    handle.join().unwrap();
}
