// ============================
// authcore-lib/src/users.rs
// ============================
//! User store abstraction with an in-memory implementation.
//!
//! Where user lists live and how they are loaded is the embedding
//! application's concern; the core only needs lookups.
use std::collections::HashMap;

use authcore_common::UserRecord;
use parking_lot::RwLock;

use crate::error::AppError;

/// Trait for user store backends
pub trait UserStore: Send + Sync {
    /// Look up a user by login
    fn get(&self, login: &str) -> Result<Option<UserRecord>, AppError>;

    /// All users, in store order
    fn list_all(&self) -> Result<Vec<UserRecord>, AppError>;
}

/// In-memory implementation of the `UserStore` trait
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Users>,
}

#[derive(Debug, Default)]
struct Users {
    records: Vec<UserRecord>,
    by_login: HashMap<String, usize>,
}

impl InMemoryUserStore {
    /// Build a store from records. A repeated login keeps the last record.
    pub fn new(records: Vec<UserRecord>) -> Self {
        let store = Self::default();
        for record in records {
            store.insert(record);
        }
        store
    }

    /// Parse a JSON array of user objects
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let records: Vec<UserRecord> = serde_json::from_str(json)?;
        tracing::debug!(count = records.len(), "users parsed");
        Ok(Self::new(records))
    }

    /// Add a user, or replace the one with the same login in place
    pub fn insert(&self, record: UserRecord) {
        let mut users = self.inner.write();
        if let Some(&idx) = users.by_login.get(&record.login) {
            users.records[idx] = record;
            return;
        }
        let idx = users.records.len();
        users.by_login.insert(record.login.clone(), idx);
        users.records.push(record);
    }

    /// Number of users
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    /// Returns `true` if the store holds no users
    pub fn is_empty(&self) -> bool {
        self.inner.read().records.is_empty()
    }
}

impl UserStore for InMemoryUserStore {
    fn get(&self, login: &str) -> Result<Option<UserRecord>, AppError> {
        let users = self.inner.read();
        Ok(users
            .by_login
            .get(login)
            .map(|&idx| users.records[idx].clone()))
    }

    fn list_all(&self) -> Result<Vec<UserRecord>, AppError> {
        Ok(self.inner.read().records.clone())
    }
}
