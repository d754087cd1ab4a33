// ============================
// authcore-lib/src/pool.rs
// ============================
//! Fixed-size connection pool.
//!
//! The pool owns identity and availability only. Opening the actual
//! connection is delegated to a [`Connector`]. `acquire` never waits: an
//! exhausted pool answers `None` and retry policy belongs to the caller.
use std::sync::Arc;

use authcore_common::PoolStats;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::clock::Clock;
use crate::error::AppError;
use crate::metrics;

/// Name of the reserved connection outside the rotation
pub const MAIN_CONNECTION: &str = "main_conn";

/// Default pool capacity
pub const DEFAULT_POOL_SIZE: usize = 3;

/// Establishes driver-level connections for the pool
pub trait Connector: Send + Sync {
    type Handle: Send + Sync;

    /// Open one connection; `name` is for diagnostics only
    fn connect(&self, name: &str) -> Result<Self::Handle, AppError>;
}

/// One slot of the pool
#[derive(Debug)]
pub struct PooledConnection<H> {
    /// Stable identity within the pool
    pub index: usize,
    /// Driver handle, absent when establishment failed
    pub handle: Option<Arc<H>>,
    pub connected: bool,
    pub available: bool,
    pub last_activity: Option<DateTime<Utc>>,
}

/// A checked-out slot. Hand `index` back to [`ConnectionPool::release`].
#[derive(Debug)]
pub struct PoolLease<H> {
    pub index: usize,
    pub handle: Option<Arc<H>>,
    pub connected: bool,
}

/// Fixed-capacity allocator of reusable connections
pub struct ConnectionPool<C: Connector> {
    main: Option<Arc<C::Handle>>,
    slots: Mutex<Vec<PooledConnection<C::Handle>>>,
    clock: Arc<dyn Clock>,
}

impl<C: Connector> ConnectionPool<C> {
    /// Open the main connection plus `capacity` pooled ones.
    ///
    /// A connection that fails to open is logged and kept as a
    /// disconnected slot; only a zero capacity is an error.
    pub fn new(connector: &C, capacity: usize, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        if capacity == 0 {
            return Err(AppError::InvalidInput(
                "pool capacity must be greater than zero".to_string(),
            ));
        }

        tracing::info!(capacity, "initializing connection pool");
        let main = open(connector, MAIN_CONNECTION);

        let now = clock.now();
        let slots = (0..capacity)
            .map(|index| {
                let handle = open(connector, &format!("pool_conn_{index}"));
                PooledConnection {
                    index,
                    connected: handle.is_some(),
                    handle,
                    available: true,
                    last_activity: Some(now),
                }
            })
            .collect::<Vec<_>>();

        let established = slots.iter().filter(|slot| slot.connected).count();
        tracing::info!(
            main_connected = main.is_some(),
            established,
            capacity,
            "connection pool ready"
        );

        Ok(Self {
            main,
            slots: Mutex::new(slots),
            clock,
        })
    }

    /// Claim the first available slot, or `None` if all are in use
    pub fn acquire(&self) -> Option<PoolLease<C::Handle>> {
        let now = self.clock.now();
        let mut slots = self.slots.lock();

        let Some(slot) = slots.iter_mut().find(|slot| slot.available) else {
            ::metrics::counter!(metrics::POOL_EXHAUSTED).increment(1);
            tracing::warn!("no pooled connections available");
            return None;
        };

        slot.available = false;
        slot.last_activity = Some(now);
        let lease = PoolLease {
            index: slot.index,
            handle: slot.handle.clone(),
            connected: slot.connected,
        };
        let in_use = slots.iter().filter(|slot| !slot.available).count();
        drop(slots);

        ::metrics::gauge!(metrics::POOL_IN_USE).set(in_use as f64);
        tracing::debug!(index = lease.index, "pooled connection acquired");
        Some(lease)
    }

    /// Return a slot to the pool
    pub fn release(&self, index: usize) -> Result<(), AppError> {
        let mut slots = self.slots.lock();
        let capacity = slots.len();

        let Some(slot) = slots.get_mut(index) else {
            tracing::warn!(index, capacity, "release of invalid pool index");
            return Err(AppError::InvalidPoolIndex { index, capacity });
        };
        if slot.available {
            tracing::warn!(index, "release of a slot that is not checked out");
            return Err(AppError::SlotNotCheckedOut(index));
        }

        slot.available = true;
        let in_use = slots.iter().filter(|slot| !slot.available).count();
        drop(slots);

        ::metrics::gauge!(metrics::POOL_IN_USE).set(in_use as f64);
        tracing::debug!(index, "pooled connection returned");
        Ok(())
    }

    /// Availability snapshot
    pub fn stats(&self) -> PoolStats {
        let slots = self.slots.lock();
        let total_count = slots.len();
        let available_count = slots.iter().filter(|slot| slot.available).count();
        PoolStats {
            active_count: total_count - available_count,
            available_count,
            total_count,
            main_connected: self.main.is_some(),
        }
    }

    /// The reserved main connection, if it was established
    pub fn main(&self) -> Option<Arc<C::Handle>> {
        self.main.clone()
    }

    /// Fixed number of pooled slots
    pub fn capacity(&self) -> usize {
        self.slots.lock().len()
    }

    /// Last checkout time of a slot
    pub fn last_activity(&self, index: usize) -> Option<DateTime<Utc>> {
        self.slots.lock().get(index).and_then(|slot| slot.last_activity)
    }
}

fn open<C: Connector>(connector: &C, name: &str) -> Option<Arc<C::Handle>> {
    match connector.connect(name) {
        Ok(handle) => {
            tracing::debug!(connection = name, "connection established");
            Some(Arc::new(handle))
        },
        Err(err) => {
            tracing::error!(connection = name, error = %err, "connection failed");
            None
        },
    }
}
