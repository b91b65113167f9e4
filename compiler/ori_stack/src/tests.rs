use super::*;

#[test]
fn deep_native_recursion_does_not_overflow() {
    fn deep_recurse(n: u64) -> u64 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { deep_recurse(n - 1) + 1 })
    }

    // Would overflow a typical 8MB stack without growth.
    assert_eq!(deep_recurse(100_000), 100_000);
}

#[test]
fn guard_tracks_depth_and_restores_it() {
    let guard = RecursionGuard::new(4);
    let inner = guard.enter(|| guard.enter(|| guard.depth()));
    assert_eq!(inner, Ok(Ok(2)));
    assert_eq!(guard.depth(), 0);
}

#[test]
fn guard_rejects_past_the_limit() {
    fn count(guard: &RecursionGuard, n: u32) -> Result<u32, DepthExceeded> {
        if n == 0 {
            return Ok(0);
        }
        guard.enter(|| count(guard, n - 1).map(|d| d + 1))?
    }

    let guard = RecursionGuard::new(50);
    assert_eq!(count(&guard, 50), Ok(50));
    assert_eq!(count(&guard, 51), Err(DepthExceeded { limit: 50 }));
    assert_eq!(guard.depth(), 0);
}

#[test]
fn depth_is_restored_after_a_panic() {
    let guard = RecursionGuard::new(8);
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _ = guard.enter(|| panic!("boom"));
    }));
    assert!(result.is_err());
    assert_eq!(guard.depth(), 0);
}

#[test]
fn limit_error_message() {
    assert_eq!(
        DepthExceeded { limit: 3 }.to_string(),
        "recursion limit of 3 exceeded"
    );
}
