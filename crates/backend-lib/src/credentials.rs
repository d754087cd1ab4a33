// ============================
// authcore-lib/src/credentials.rs
// ============================
//! Stored-credential audit and plaintext migration.
use authcore_common::{CredentialAudit, UserRecord};

use crate::auth::password::{hash_password_secure, is_encoded_hash, HASH_SEPARATOR};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CredentialKind {
    Hashed,
    Plaintext,
    Malformed,
}

fn classify(password: &str) -> CredentialKind {
    if !password.contains(HASH_SEPARATOR) {
        CredentialKind::Plaintext
    } else if is_encoded_hash(password) {
        CredentialKind::Hashed
    } else {
        CredentialKind::Malformed
    }
}

/// Classify every stored credential without any KDF work
pub fn audit(users: &[UserRecord]) -> CredentialAudit {
    let mut report = CredentialAudit {
        total: users.len(),
        ..CredentialAudit::default()
    };

    for user in users {
        match classify(&user.password) {
            CredentialKind::Hashed => report.hashed += 1,
            CredentialKind::Plaintext => {
                report.plaintext += 1;
                report.plaintext_logins.push(user.login.clone());
            },
            CredentialKind::Malformed => {
                report.malformed += 1;
                report.malformed_logins.push(user.login.clone());
            },
        }
    }

    tracing::info!(
        total = report.total,
        hashed = report.hashed,
        plaintext = report.plaintext,
        malformed = report.malformed,
        "credential audit complete"
    );
    report
}

/// Hash every plaintext password in place.
///
/// Hashed and malformed entries are left untouched. Returns how many
/// records were rewritten.
pub fn migrate_plaintext(users: &mut [UserRecord]) -> Result<usize, AppError> {
    let mut migrated = 0;
    for user in users.iter_mut() {
        if classify(&user.password) != CredentialKind::Plaintext {
            continue;
        }
        // The plaintext is wiped before the record takes the hash.
        user.password = hash_password_secure(&mut user.password, None)?;
        migrated += 1;
        tracing::info!(login = %user.login, "password migrated to hashed form");
    }
    Ok(migrated)
}

/// Fail if any record still carries a plaintext password
pub fn verify_migration(users: &[UserRecord]) -> Result<(), AppError> {
    let leftovers: Vec<String> = users
        .iter()
        .filter(|user| classify(&user.password) == CredentialKind::Plaintext)
        .map(|user| user.login.clone())
        .collect();

    if leftovers.is_empty() {
        return Ok(());
    }
    tracing::error!(count = leftovers.len(), "plaintext credentials remain after migration");
    Err(AppError::UnhashedCredentials(leftovers))
}
