use std::sync::Arc;

use authcore_common::SessionInfo;

use super::password::verify_password;
use super::token_generator::short_id;
use crate::auth::{
    AuthService, Authenticated, LoginAttemptTracker, SessionRegistry,
};
use crate::clock::Clock;
use crate::config::Settings;
use crate::error::AppError;
use crate::metrics;
use crate::users::UserStore;

/// Credential checked when the login does not exist, so an unknown login
/// costs the same KDF work as a wrong password.
const DUMMY_CREDENTIAL: &str =
    "BwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwc=$7u6fCqD5xk2eoQMFXygxxkX9VGwqzDE+ZNlbE/S2too=";

/// Default [`AuthService`]: attempt tracking, password check, session issue
pub struct DefaultAuth<S> {
    store: Arc<S>,
    attempts: LoginAttemptTracker,
    sessions: SessionRegistry,
}

impl<S: UserStore> DefaultAuth<S> {
    pub fn new(store: Arc<S>, attempts: LoginAttemptTracker, sessions: SessionRegistry) -> Self {
        Self {
            store,
            attempts,
            sessions,
        }
    }

    /// Wire a tracker and a registry from validated settings, sharing one
    /// clock
    pub fn from_settings(
        store: Arc<S>,
        settings: &Settings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        settings.validate()?;
        let attempts = LoginAttemptTracker::new(settings.lockout_policy(), clock.clone());
        let sessions = SessionRegistry::new(settings.session_timeout(), clock);
        Ok(Self::new(store, attempts, sessions))
    }

    /// The attempt tracker, for lock administration
    pub fn attempts(&self) -> &LoginAttemptTracker {
        &self.attempts
    }

    /// The session registry
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// The backing user store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn reject(&self, login: &str) -> AppError {
        let failed = self.attempts.record_attempt(login, false);
        let max = self.attempts.policy().max_attempts;
        tracing::info!(
            login,
            attempt = failed,
            remaining = max.saturating_sub(failed),
            "authentication failed"
        );
        AppError::InvalidCredentials
    }
}

impl<S: UserStore> AuthService for DefaultAuth<S> {
    fn authenticate(&self, login: &str, password: &str) -> Result<Authenticated, AppError> {
        tracing::debug!(login, "authentication attempt");

        // Lock precedence: the password is never looked at.
        if self.attempts.is_locked(login) {
            ::metrics::counter!(metrics::LOCKED_REJECTED).increment(1);
            tracing::warn!(
                login,
                failed_attempts = self.attempts.failed_attempts(login),
                "authentication rejected, account locked"
            );
            return Err(self.reject(login));
        }

        let user = match self.store.get(login) {
            Ok(user) => user,
            Err(err) => {
                tracing::error!(login, error = %err, "user store lookup failed");
                return Err(err);
            },
        };

        let Some(user) = user else {
            verify_password(password, DUMMY_CREDENTIAL);
            tracing::debug!(login, "unknown login");
            return Err(self.reject(login));
        };

        if !verify_password(password, &user.password) {
            return Err(self.reject(login));
        }

        self.attempts.record_attempt(login, true);
        let session_id = self.sessions.create(login);
        ::metrics::counter!(metrics::AUTH_SUCCEEDED).increment(1);
        tracing::info!(login, role = %user.role, session = short_id(&session_id), "authentication successful");

        Ok(Authenticated {
            session_id,
            login: user.login,
            role: user.role,
        })
    }

    fn validate_session(&self, session_id: &str) -> bool {
        self.sessions.validate(session_id)
    }

    fn refresh_session(&self, session_id: &str) -> bool {
        self.sessions.refresh(session_id)
    }

    fn logout(&self, session_id: &str) -> bool {
        self.sessions.destroy(session_id)
    }

    fn session_info(&self, session_id: &str) -> Option<SessionInfo> {
        self.sessions.info(session_id)
    }

    fn is_locked(&self, login: &str) -> bool {
        self.attempts.is_locked(login)
    }
}
