// ===========================
// tests/unit/session_tests.rs
// ===========================
//! Unit tests for the session registry
use std::sync::Arc;

use authcore_lib::auth::SessionRegistry;
use authcore_lib::clock::ManualClock;
use chrono::Duration;

const TIMEOUT_SECS: i64 = 3600;

fn registry() -> (SessionRegistry, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::starting_now());
    (SessionRegistry::new(Duration::seconds(TIMEOUT_SECS), clock.clone()), clock)
}

#[test]
fn test_session_ids_are_opaque_and_long() {
    let (registry, _) = registry();
    let id = registry.create("admin");

    // 32 random bytes, URL-safe base64 without padding
    assert_eq!(id.len(), 43);
    assert!(id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
}

#[test]
fn test_valid_before_and_invalid_after_timeout() {
    let (registry, clock) = registry();
    let id = registry.create("admin");

    clock.advance(Duration::seconds(TIMEOUT_SECS) - Duration::milliseconds(1));
    assert!(registry.validate(&id));

    clock.advance(Duration::milliseconds(2));
    assert!(!registry.validate(&id));
}

#[test]
fn test_refresh_moves_the_deadline() {
    let (registry, clock) = registry();
    let id = registry.create("admin");

    clock.advance(Duration::seconds(3000));
    assert!(registry.refresh(&id));

    // Past the original deadline, inside the refreshed one
    clock.advance(Duration::seconds(TIMEOUT_SECS) - Duration::milliseconds(1));
    assert!(registry.validate(&id));
}

#[test]
fn test_sessions_are_independent() {
    let (registry, _) = registry();
    let a = registry.create("admin");
    let b = registry.create("admin");

    assert!(registry.destroy(&a));
    assert!(!registry.validate(&a));
    assert!(registry.validate(&b));
}

#[test]
fn test_info_does_not_extend_session() {
    let (registry, clock) = registry();
    let id = registry.create("operator");

    clock.advance(Duration::seconds(100));
    let first = registry.info(&id).unwrap();
    clock.advance(Duration::seconds(100));
    let second = registry.info(&id).unwrap();

    assert_eq!(first.expires_at, second.expires_at);
    assert_eq!(second.seconds_left, TIMEOUT_SECS - 200);
    assert_eq!(second.last_activity_at, second.created_at);
}

#[test]
fn test_purge_matches_lazy_answers() {
    let (registry, clock) = registry();
    let ids: Vec<_> = (0..3).map(|_| registry.create("admin")).collect();

    clock.advance(Duration::seconds(TIMEOUT_SECS + 1));
    assert_eq!(registry.len(), 3);
    assert_eq!(registry.purge_expired(), 3);
    assert_eq!(registry.purge_expired(), 0);
    assert!(ids.iter().all(|id| !registry.validate(id)));
}
