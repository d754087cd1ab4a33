// ============================
// authcore-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod attempts;
pub mod password;
mod service;
mod service_impl;
pub mod session;
pub mod token_generator;

pub use attempts::{LockoutPolicy, LoginAttemptState, LoginAttemptTracker};
pub use password::{
    hash_password, hash_password_secure, hash_password_with_salt, is_encoded_hash,
    verify_password,
};
pub use service::{AuthService, Authenticated};
pub use service_impl::DefaultAuth;
pub use session::{Session, SessionRegistry};
