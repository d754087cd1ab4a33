// ============================
// authcore-lib/src/lib.rs
// ============================
//! Authentication and session security core.

pub mod auth;
pub mod clock;
pub mod config;
pub mod credentials;
pub mod error;
pub mod metrics;
pub mod pool;
pub mod users;

use std::sync::Arc;

use crate::auth::DefaultAuth;
use crate::clock::{Clock, SystemClock};
use crate::config::Settings;
use crate::error::AppError;
use crate::pool::{ConnectionPool, Connector};
use crate::users::UserStore;

/// Components shared by every caller of the core
pub struct AppState<S> {
    /// Authentication service
    pub auth: Arc<DefaultAuth<S>>,
    /// Settings the state was built from
    pub settings: Arc<Settings>,
    /// Time source shared by all components
    pub clock: Arc<dyn Clock>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            auth: Arc::clone(&self.auth),
            settings: Arc::clone(&self.settings),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: UserStore> AppState<S> {
    /// Create a new application state
    pub fn new(store: S, settings: Settings, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        let auth = DefaultAuth::from_settings(Arc::new(store), &settings, Arc::clone(&clock))?;
        Ok(Self {
            auth: Arc::new(auth),
            settings: Arc::new(settings),
            clock,
        })
    }

    /// Create a new application state on the system clock with settings
    /// loaded from the default sources
    pub fn new_default(store: S) -> Result<Self, AppError> {
        let settings = Settings::load()?;
        Self::new(store, settings, Arc::new(SystemClock))
    }

    /// Open a connection pool sized by `pool.size`, on the shared clock
    pub fn open_pool<C: Connector>(&self, connector: &C) -> Result<ConnectionPool<C>, AppError> {
        ConnectionPool::new(connector, self.settings.pool.size, Arc::clone(&self.clock))
    }
}
