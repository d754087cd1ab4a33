// ===============================
// tests/unit/credentials_tests.rs
// ===============================
//! Unit tests for the credential audit and migration
use authcore_common::UserRecord;
use authcore_lib::auth::verify_password;
use authcore_lib::credentials::{audit, migrate_plaintext, verify_migration};
use authcore_lib::error::AppError;
use authcore_lib::users::{InMemoryUserStore, UserStore};

use crate::test_utils::ADMIN_HASH;

const LEGACY_USERS: &str = r#"[
    {"login": "admin", "password": "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8=$OMm8mL4Oe0q/N7aUWXAWqr5ERXGvpZp+dEynKUKciCk=", "role": 0},
    {"login": "operator", "password": "operator123", "role": 1, "printerPath": "/dev/lp0"},
    {"login": "guest", "role": 2}
]"#;

fn legacy_users() -> Vec<UserRecord> {
    InMemoryUserStore::from_json(LEGACY_USERS)
        .unwrap()
        .list_all()
        .unwrap()
}

#[test]
fn test_audit_of_legacy_file() {
    let report = audit(&legacy_users());

    assert_eq!(report.total, 3);
    assert_eq!(report.hashed, 1);
    // A missing password is an empty plaintext one
    assert_eq!(report.plaintext_logins, vec!["operator", "guest"]);
    assert_eq!(report.malformed, 0);
}

#[test]
fn test_migrated_users_log_in_with_old_passwords() {
    let mut users = legacy_users();

    assert_eq!(migrate_plaintext(&mut users).unwrap(), 2);
    verify_migration(&users).unwrap();

    assert_eq!(users[0].password, ADMIN_HASH);
    assert!(verify_password("operator123", &users[1].password));
    assert!(verify_password("", &users[2].password));
    assert!(audit(&users).is_clean());
}

#[test]
fn test_malformed_entries_survive_migration() {
    let mut users = vec![UserRecord::new("broken", "c2FsdA==$short")];

    assert_eq!(migrate_plaintext(&mut users).unwrap(), 0);
    assert_eq!(users[0].password, "c2FsdA==$short");
    assert!(verify_migration(&users).is_ok());
    assert_eq!(audit(&users).malformed_logins, vec!["broken"]);
}

#[test]
fn test_unhashed_error_names_logins() {
    let err = verify_migration(&legacy_users()).unwrap_err();

    assert_eq!(err.error_code(), "CRED_001");
    assert!(matches!(err, AppError::UnhashedCredentials(ref logins) if logins.len() == 2));
    assert_eq!(err.to_string(), "Unhashed credentials for: operator, guest");
}
