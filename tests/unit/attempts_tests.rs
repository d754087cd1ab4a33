// ===========================
// tests/unit/attempts_tests.rs
// ===========================
//! Unit tests for failed-login tracking
use std::sync::Arc;

use authcore_lib::auth::{LockoutPolicy, LoginAttemptState, LoginAttemptTracker};
use authcore_lib::clock::{Clock, ManualClock};
use chrono::Duration;

fn tracker() -> (LoginAttemptTracker, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::starting_now());
    (LoginAttemptTracker::new(LockoutPolicy::default(), clock.clone()), clock)
}

#[test]
fn test_policy_decision_is_pure() {
    let policy = LockoutPolicy::default();
    let now = ManualClock::starting_now().now();

    let below = LoginAttemptState {
        failed_count: 4,
        last_attempt_at: Some(now),
        manual_lock: false,
    };
    assert!(!policy.is_locked(&below, now));

    let at_threshold = LoginAttemptState {
        failed_count: 5,
        ..below.clone()
    };
    assert!(policy.is_locked(&at_threshold, now));
    assert!(policy.is_locked(&at_threshold, now + Duration::seconds(899)));
    assert!(!policy.is_locked(&at_threshold, now + Duration::seconds(900)));

    let manual = LoginAttemptState {
        manual_lock: true,
        ..LoginAttemptState::default()
    };
    assert!(policy.is_locked(&manual, now));
}

#[test]
fn test_attempts_are_tracked_per_login() {
    let (tracker, _) = tracker();
    for _ in 0..5 {
        tracker.record_attempt("operator", false);
    }
    tracker.record_attempt("admin", false);

    assert!(tracker.is_locked("operator"));
    assert!(!tracker.is_locked("admin"));
    assert_eq!(tracker.failed_attempts("admin"), 1);
    assert_eq!(tracker.len(), 2);
}

#[test]
fn test_locked_failures_keep_counting() {
    let (tracker, _) = tracker();
    for _ in 0..7 {
        tracker.record_attempt("operator", false);
    }

    assert_eq!(tracker.failed_attempts("operator"), 7);
    assert!(tracker.is_locked("operator"));
}

#[test]
fn test_success_records_last_attempt() {
    let (tracker, clock) = tracker();
    tracker.record_attempt("admin", true);

    let state = tracker.state("admin").unwrap();
    assert_eq!(state.failed_count, 0);
    assert_eq!(state.last_attempt_at, Some(clock.now()));
}

#[test]
fn test_unlock_unknown_login_is_noop() {
    let (tracker, _) = tracker();
    tracker.unlock("nobody");
    assert!(tracker.is_empty());
}

#[test]
fn test_prune_never_changes_lock_answers() {
    let (tracker, clock) = tracker();
    for _ in 0..5 {
        tracker.record_attempt("operator", false);
    }
    tracker.record_attempt("admin", false);

    clock.advance(Duration::seconds(300));
    let before = (tracker.is_locked("operator"), tracker.is_locked("admin"));
    tracker.prune(Duration::seconds(60));
    let after = (tracker.is_locked("operator"), tracker.is_locked("admin"));

    assert_eq!(before, after);
    assert!(tracker.state("admin").is_none());
}
