// ============================
// crates/backend-lib/src/auth/attempts.rs
// ============================
//! Failed-login tracking and account lockout.
//!
//! A login is locked when it was locked manually, or when it has at least
//! `max_attempts` failures and the last attempt is younger than the lockout
//! window. The window slides: every new failure restarts it.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::clock::Clock;
use crate::metrics;

/// Default number of failed attempts before lockout
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default lockout window in seconds (15 minutes)
pub const DEFAULT_LOCKOUT_SECS: i64 = 15 * 60;

/// Threshold and window for automatic lockout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    /// Failed attempts that lock the account
    pub max_attempts: u32,
    /// How long the lock lasts after the most recent attempt
    pub window: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, Duration::seconds(DEFAULT_LOCKOUT_SECS))
    }
}

impl LockoutPolicy {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
        }
    }

    /// Pure lock decision over a state snapshot
    pub fn is_locked(&self, state: &LoginAttemptState, now: DateTime<Utc>) -> bool {
        if state.manual_lock {
            return true;
        }
        if state.failed_count < self.max_attempts {
            return false;
        }
        // A window end past the representable range keeps the lock.
        state.last_attempt_at.is_some_and(|last| {
            last.checked_add_signed(self.window)
                .map_or(true, |until| now < until)
        })
    }
}

/// Per-login attempt bookkeeping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginAttemptState {
    /// Consecutive failures since the last success
    pub failed_count: u32,
    /// Time of the most recent recorded attempt
    pub last_attempt_at: Option<DateTime<Utc>>,
    /// Sticky administrative lock
    pub manual_lock: bool,
}

/// Tracks login attempts per account name
#[derive(Clone)]
pub struct LoginAttemptTracker {
    /// Map of login names to attempt state
    attempts: Arc<DashMap<String, LoginAttemptState>>,
    policy: LockoutPolicy,
    clock: Arc<dyn Clock>,
}

impl LoginAttemptTracker {
    /// Create a new tracker
    pub fn new(policy: LockoutPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            attempts: Arc::new(DashMap::new()),
            policy,
            clock,
        }
    }

    /// The active lockout policy
    pub fn policy(&self) -> LockoutPolicy {
        self.policy
    }

    /// Record the outcome of an authentication attempt.
    ///
    /// Returns the failure count after the update.
    pub fn record_attempt(&self, login: &str, success: bool) -> u32 {
        let now = self.clock.now();

        // The entry guard holds the shard lock, so updates for the same
        // login serialize.
        let mut entry = self.attempts.entry(login.to_string()).or_default();
        entry.last_attempt_at = Some(now);

        if success {
            if entry.failed_count > 0 {
                tracing::debug!(login, previous = entry.failed_count, "failed attempts reset");
            }
            entry.failed_count = 0;
            return 0;
        }

        entry.failed_count = entry.failed_count.saturating_add(1);
        let failed = entry.failed_count;
        drop(entry);

        ::metrics::counter!(metrics::AUTH_FAILED).increment(1);
        if failed == self.policy.max_attempts {
            ::metrics::counter!(metrics::LOCKOUT_TRIGGERED).increment(1);
            tracing::warn!(
                login,
                failed_attempts = failed,
                window_secs = self.policy.window.num_seconds(),
                "account auto-locked after too many failed attempts"
            );
        } else {
            tracing::debug!(login, failed_attempts = failed, "failed login attempt recorded");
        }

        failed
    }

    /// Check whether a login is currently locked
    pub fn is_locked(&self, login: &str) -> bool {
        let now = self.clock.now();
        self.attempts
            .get(login)
            .is_some_and(|state| self.policy.is_locked(&state, now))
    }

    /// Failures recorded since the last success
    pub fn failed_attempts(&self, login: &str) -> u32 {
        self.attempts
            .get(login)
            .map_or(0, |state| state.failed_count)
    }

    /// Snapshot of the state for a login, if any attempt was seen
    pub fn state(&self, login: &str) -> Option<LoginAttemptState> {
        self.attempts.get(login).map(|state| state.value().clone())
    }

    /// Lock an account until [`unlock`](Self::unlock) is called
    pub fn lock(&self, login: &str) {
        self.attempts.entry(login.to_string()).or_default().manual_lock = true;
        tracing::warn!(login, "account locked manually");
    }

    /// Clear a manual lock. Failure counts are left alone.
    pub fn unlock(&self, login: &str) {
        if let Some(mut state) = self.attempts.get_mut(login) {
            if state.manual_lock {
                state.manual_lock = false;
                tracing::info!(login, "manual lock cleared");
            }
        }
    }

    /// Drop entries that are unlocked and idle for longer than `max_idle`.
    ///
    /// Returns the number of entries removed.
    pub fn prune(&self, max_idle: Duration) -> usize {
        let now = self.clock.now();
        let before = self.attempts.len();

        self.attempts.retain(|_, state| {
            if self.policy.is_locked(state, now) || state.manual_lock {
                return true;
            }
            state
                .last_attempt_at
                .is_some_and(|last| now.signed_duration_since(last) < max_idle)
        });

        before.saturating_sub(self.attempts.len())
    }

    /// Number of tracked logins
    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    /// Returns `true` if no login has been tracked yet
    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }
}
