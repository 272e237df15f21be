// Unit tests for RetryPolicy and its schedule

use crate::transport::{DEFAULT_RETRY_INTERVAL, RetryPolicy};

use std::thread::sleep;
use std::time::Duration;

#[test]
fn given_default_policy_when_inspected_then_unbounded_one_second() {
    let policy = RetryPolicy::default();

    assert_eq!(policy, RetryPolicy::unbounded());
    assert_eq!(policy.interval, DEFAULT_RETRY_INTERVAL);
    assert_eq!(policy.interval, Duration::from_secs(1));
    assert!(!policy.is_bounded());
}

#[test]
fn given_unbounded_policy_when_many_attempts_then_can_always_attempt() {
    let mut schedule = RetryPolicy::unbounded().schedule();

    for _ in 0..1_000 {
        schedule.record_attempt();
    }

    assert!(schedule.can_attempt());
    assert_eq!(schedule.attempts(), 1_000);
}

/// **VALUE**: Verifies `max_attempts` counts every attempt, the first included.
///
/// **WHY THIS MATTERS**: A caller asking for three attempts must see three
/// connect calls, not four.
///
/// **BUG THIS CATCHES**: Would catch an off-by-one in `can_attempt`.
#[test]
fn given_max_attempts_when_recording_then_stops_at_limit() {
    // GIVEN: A three-attempt policy
    let mut schedule = RetryPolicy::unbounded().with_max_attempts(3).schedule();

    // WHEN / THEN: Two attempts leave room, the third exhausts it
    schedule.record_attempt();
    assert!(schedule.can_attempt());
    schedule.record_attempt();
    assert!(schedule.can_attempt());
    schedule.record_attempt();
    assert!(!schedule.can_attempt());
}

#[test]
fn given_interval_when_asking_delays_then_delay_is_constant() {
    // GIVEN: A 50ms interval
    let interval = Duration::from_millis(50);
    let mut schedule = RetryPolicy::unbounded().with_interval(interval).schedule();

    // WHEN / THEN: No growth and no jitter across calls
    for _ in 0..5 {
        assert_eq!(schedule.next_delay(), Some(interval));
    }
}

#[test]
fn given_elapsed_budget_when_spent_then_no_more_delays() {
    // GIVEN: A tiny elapsed budget
    let mut schedule = RetryPolicy::unbounded()
        .with_interval(Duration::from_millis(5))
        .with_max_elapsed(Duration::from_millis(20))
        .schedule();

    // WHEN: The budget runs out
    sleep(Duration::from_millis(40));

    // THEN: The schedule gives up
    assert_eq!(schedule.next_delay(), None);
}

#[test]
fn given_builders_when_chained_then_policy_is_bounded() {
    let policy = RetryPolicy::unbounded()
        .with_interval(Duration::from_millis(10))
        .with_max_elapsed(Duration::from_secs(2));

    assert!(policy.is_bounded());
    assert_eq!(policy.max_attempts, None);
    assert_eq!(policy.max_elapsed, Some(Duration::from_secs(2)));
}
