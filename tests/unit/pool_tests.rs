// ========================
// tests/unit/pool_tests.rs
// ========================
//! Unit tests for the connection pool
use std::collections::HashSet;
use std::sync::Arc;

use authcore_lib::clock::ManualClock;
use authcore_lib::error::AppError;
use authcore_lib::pool::{ConnectionPool, MAIN_CONNECTION};

use crate::test_utils::CountingConnector;

fn pool(connector: &CountingConnector, capacity: usize) -> ConnectionPool<CountingConnector> {
    ConnectionPool::new(connector, capacity, Arc::new(ManualClock::starting_now())).unwrap()
}

#[test]
fn test_capacity_n_hands_out_n_distinct_slots() {
    let connector = CountingConnector::default();
    let pool = pool(&connector, 4);

    let leases: Vec<_> = (0..4).map(|_| pool.acquire().unwrap()).collect();
    let indices: HashSet<_> = leases.iter().map(|lease| lease.index).collect();
    assert_eq!(indices.len(), 4);
    assert!(pool.acquire().is_none());

    pool.release(leases[2].index).unwrap();
    assert!(pool.acquire().is_some());
    assert!(pool.acquire().is_none());
}

#[test]
fn test_construction_opens_main_plus_pool() {
    let connector = CountingConnector::default();
    let pool = pool(&connector, 3);

    assert_eq!(connector.opened(), 4);
    let main = pool.main().unwrap();
    assert_eq!(main.name, MAIN_CONNECTION);
    assert_eq!(main.serial, 0);
}

#[test]
fn test_handles_are_shared_not_reopened() {
    let connector = CountingConnector::default();
    let pool = pool(&connector, 1);

    let first = pool.acquire().unwrap();
    pool.release(first.index).unwrap();
    let second = pool.acquire().unwrap();

    assert_eq!(connector.opened(), 2);
    assert_eq!(first.handle.unwrap().serial, second.handle.unwrap().serial);
}

#[test]
fn test_release_errors_leave_state_alone() {
    let connector = CountingConnector::default();
    let pool = pool(&connector, 2);
    pool.acquire().unwrap();
    let before = pool.stats();

    assert!(matches!(
        pool.release(99),
        Err(AppError::InvalidPoolIndex { index: 99, capacity: 2 })
    ));
    assert!(matches!(pool.release(1), Err(AppError::SlotNotCheckedOut(1))));
    assert_eq!(pool.stats(), before);
}

#[test]
fn test_refused_connection_is_reported_in_lease() {
    let connector = CountingConnector::refusing("pool_conn_0");
    let pool = pool(&connector, 2);

    let lease = pool.acquire().unwrap();
    assert_eq!(lease.index, 0);
    assert!(!lease.connected);
    assert!(lease.handle.is_none());

    let stats = pool.stats();
    assert_eq!(stats.total_count, 2);
    assert!(stats.main_connected);
}
