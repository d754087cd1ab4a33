// ================
// common/src/lib.rs
// ================
//! Common types shared between the authentication core, the `authcore`
//! command-line tool and external collaborators (user stores, persistence
//! layers, UI glue).
//!
//! Everything here is plain data with an explicit serde shape so that the
//! records handed to or received from the core are typed rather than
//! loosely keyed dictionaries.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a user account.
///
/// Serialized as its integer code (`0` admin, `1` operator, `2` guest) to
/// stay compatible with existing user lists. A missing role, or a code
/// outside the known range, deserializes to [`Role::Operator`] so one odd
/// entry never rejects a whole list.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(from = "i64", into = "u8")]
pub enum Role {
    Admin,
    #[default]
    Operator,
    Guest,
}

impl From<Role> for u8 {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => 0,
            Role::Operator => 1,
            Role::Guest => 2,
        }
    }
}

impl From<i64> for Role {
    fn from(code: i64) -> Self {
        match code {
            0 => Role::Admin,
            1 => Role::Operator,
            2 => Role::Guest,
            other => {
                tracing::warn!(code = other, "unknown role code, using operator");
                Role::Operator
            },
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "admin",
            Role::Operator => "operator",
            Role::Guest => "guest",
        };
        f.write_str(name)
    }
}

/// A user account as handed over by a user store.
///
/// Only `login` is required. Every other string field defaults to empty,
/// `role` defaults to [`Role::Operator`]. Unknown fields (printer paths,
/// SMTP settings, UI style, ...) are ignored.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Unique login name
    pub login: String,
    /// Encoded credential, `<salt>$<digest>` once migrated
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub role: Role,
}

impl UserRecord {
    /// Create a record with the given login and encoded credential and
    /// default profile fields.
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
            first_name: String::new(),
            last_name: String::new(),
            position: String::new(),
            email: String::new(),
            phone: String::new(),
            role: Role::default(),
        }
    }

    /// Builder-style role override
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// "First Last", trimmed when either half is missing
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

// The credential never ends up in logs through `{:?}`.
impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("position", &self.position)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("role", &self.role)
            .finish()
    }
}

/// Observability view of a live session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    /// Owner of the session
    pub login: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    /// Whole seconds until expiry, never negative
    pub seconds_left: i64,
    pub is_valid: bool,
}

/// Connection pool bookkeeping snapshot.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Pooled connections currently checked out
    pub active_count: usize,
    /// Pooled connections ready to be acquired
    pub available_count: usize,
    /// Fixed pool capacity (the main connection is not counted)
    pub total_count: usize,
    /// Whether the reserved main connection was established
    pub main_connected: bool,
}

/// Result of scanning a user list for credential hygiene.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialAudit {
    pub total: usize,
    /// Entries holding a well-formed `<salt>$<digest>` credential
    pub hashed: usize,
    /// Entries still holding a plaintext password
    pub plaintext: usize,
    /// Entries that look hashed but cannot be verified
    pub malformed: usize,
    pub plaintext_logins: Vec<String>,
    pub malformed_logins: Vec<String>,
}

impl CredentialAudit {
    /// True when every entry carries a usable hashed credential
    pub fn is_clean(&self) -> bool {
        self.plaintext == 0 && self.malformed == 0
    }
}
