use authcore_common::{Role, SessionInfo};

use crate::error::AppError;

/// A successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    /// Token standing in for the credentials until it expires
    pub session_id: String,
    pub login: String,
    pub role: Role,
}

/// Login and session operations exposed to the application
pub trait AuthService: Send + Sync {
    /// Check credentials and open a session.
    ///
    /// Unknown logins, wrong passwords and locked accounts all fail with
    /// [`AppError::InvalidCredentials`].
    fn authenticate(&self, login: &str, password: &str) -> Result<Authenticated, AppError>;
    fn validate_session(&self, session_id: &str) -> bool;
    fn refresh_session(&self, session_id: &str) -> bool;
    fn logout(&self, session_id: &str) -> bool;
    fn session_info(&self, session_id: &str) -> Option<SessionInfo>;
    fn is_locked(&self, login: &str) -> bool;
}
