// ============================
// authcore-lib/src/auth/session.rs
// ============================
//! Session token handling and management.
//!
//! Expiry is reconciled lazily: an expired entry is removed the first time
//! anyone asks about it. [`SessionRegistry::purge_expired`] is an optional
//! sweep that gives the same answers, only sooner.
use std::{collections::HashMap, sync::Arc};

use authcore_common::SessionInfo;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

use super::token_generator::{generate_session_id, short_id};
use crate::clock::Clock;
use crate::metrics;

/// Default session lifetime (1 hour)
pub const DEFAULT_SESSION_TIMEOUT_SECS: i64 = 60 * 60;

/// Session information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub session_id: String,
    pub owner_login: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl Session {
    /// A session is valid up to and including its expiry instant
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at
    }

    fn info_at(&self, now: DateTime<Utc>) -> SessionInfo {
        // Whole seconds, rounded up: a live session never reports zero.
        let left = self.expires_at.signed_duration_since(now);
        let whole = left.num_seconds();
        let seconds_left = if left > Duration::seconds(whole) { whole + 1 } else { whole };
        SessionInfo {
            login: self.owner_login.clone(),
            created_at: self.created_at,
            expires_at: self.expires_at,
            last_activity_at: self.last_activity_at,
            seconds_left: seconds_left.max(0),
            is_valid: self.is_valid_at(now),
        }
    }
}

/// Registry of live sessions keyed by session id
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl SessionRegistry {
    /// Create a new registry; `timeout` applies to every session
    pub fn new(timeout: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            timeout,
            clock,
        }
    }

    /// Configured session lifetime
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Create a new session for `login` and return its id
    pub fn create(&self, login: &str) -> String {
        let session_id = generate_session_id();
        let now = self.clock.now();
        let session = Session {
            session_id: session_id.clone(),
            owner_login: login.to_string(),
            created_at: now,
            expires_at: deadline(now, self.timeout),
            last_activity_at: now,
        };
        let expires_at = session.expires_at;

        let mut sessions = self.sessions.write();
        sessions.insert(session_id.clone(), session);
        let active = sessions.len();
        drop(sessions);

        ::metrics::counter!(metrics::SESSION_CREATED).increment(1);
        ::metrics::gauge!(metrics::SESSION_ACTIVE).set(active as f64);
        tracing::info!(
            login,
            session = short_id(&session_id),
            expires_at = %expires_at,
            "session created"
        );

        session_id
    }

    /// Check a session id, evicting it if it has expired
    pub fn validate(&self, session_id: &str) -> bool {
        let now = self.clock.now();
        let mut sessions = self.sessions.write();
        let valid = match sessions.get(session_id) {
            Some(session) => session.is_valid_at(now),
            None => return false,
        };
        if !valid {
            evict(&mut sessions, session_id);
        }
        valid
    }

    /// Push the expiry of a live session forward by the full timeout.
    ///
    /// Returns `false` for unknown ids. An expired session is evicted, not
    /// revived.
    pub fn refresh(&self, session_id: &str) -> bool {
        let now = self.clock.now();
        let mut sessions = self.sessions.write();
        let Some(session) = sessions.get_mut(session_id) else {
            return false;
        };
        if !session.is_valid_at(now) {
            evict(&mut sessions, session_id);
            return false;
        }

        session.last_activity_at = now;
        session.expires_at = deadline(now, self.timeout);
        tracing::debug!(session = short_id(session_id), "session refreshed");
        true
    }

    /// Remove a session. Safe to call repeatedly.
    pub fn destroy(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.write();
        let removed = sessions.remove(session_id);
        let active = sessions.len();
        drop(sessions);

        match removed {
            Some(session) => {
                ::metrics::counter!(metrics::SESSION_DESTROYED).increment(1);
                ::metrics::gauge!(metrics::SESSION_ACTIVE).set(active as f64);
                tracing::info!(login = %session.owner_login, session = short_id(session_id), "session destroyed");
                true
            },
            None => false,
        }
    }

    /// Metadata for a live session; expired sessions are evicted instead
    pub fn info(&self, session_id: &str) -> Option<SessionInfo> {
        let now = self.clock.now();
        let mut sessions = self.sessions.write();
        let session = sessions.get(session_id)?;
        if session.is_valid_at(now) {
            return Some(session.info_at(now));
        }
        evict(&mut sessions, session_id);
        None
    }

    /// Remove every expired session, returning how many were dropped
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, session| session.is_valid_at(now));
        let removed = before - sessions.len();

        if removed > 0 {
            ::metrics::counter!(metrics::SESSION_EXPIRED).increment(removed as u64);
            ::metrics::gauge!(metrics::SESSION_ACTIVE).set(sessions.len() as f64);
            tracing::debug!(removed, "expired sessions purged");
        }
        removed
    }

    /// Number of stored sessions, expired-but-unobserved included
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Returns `true` if there are no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

// A deadline past the representable range never arrives.
fn deadline(now: DateTime<Utc>, timeout: Duration) -> DateTime<Utc> {
    now.checked_add_signed(timeout)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn evict(sessions: &mut HashMap<String, Session>, session_id: &str) {
    if let Some(session) = sessions.remove(session_id) {
        ::metrics::counter!(metrics::SESSION_EXPIRED).increment(1);
        ::metrics::gauge!(metrics::SESSION_ACTIVE).set(sessions.len() as f64);
        tracing::info!(
            login = %session.owner_login,
            session = short_id(session_id),
            "session expired"
        );
    }
}
