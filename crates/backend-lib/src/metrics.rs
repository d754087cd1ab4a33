// ==============
// crates/backend-lib/src/metrics.rs
// ==============
//! Central place for metric keys.
//!
//! The core only emits through the `metrics` facade; installing an exporter
//! is up to the embedding application.
pub const AUTH_SUCCEEDED: &str = "auth.login.succeeded";
pub const AUTH_FAILED: &str = "auth.login.failed";
pub const LOCKOUT_TRIGGERED: &str = "auth.lockout.triggered";
pub const LOCKED_REJECTED: &str = "auth.lockout.rejected";
pub const SESSION_CREATED: &str = "session.created";
pub const SESSION_EXPIRED: &str = "session.expired";
pub const SESSION_DESTROYED: &str = "session.destroyed";
pub const SESSION_ACTIVE: &str = "session.active";
pub const POOL_EXHAUSTED: &str = "pool.exhausted";
pub const POOL_IN_USE: &str = "pool.in_use";
