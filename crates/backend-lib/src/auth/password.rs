// ============================
// authcore-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
//!
//! Stored credentials look like `<salt>$<digest>`:
//! - `salt` is standard base64 text,
//! - `digest` is standard base64 of PBKDF2-HMAC-SHA256 over the UTF-8
//!   password with the salt *text* bytes, 10,000 rounds, 32 bytes out.
//!
//! Existing user lists depend on these exact parameters.
use base64::{engine::general_purpose::STANDARD, Engine as _};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroize;

use super::token_generator::generate_salt;
use crate::error::AppError;

/// PBKDF2 iteration count
pub const PBKDF2_ITERATIONS: u32 = 10_000;

/// Digest length in bytes
pub const DIGEST_LEN: usize = 32;

/// Separator between salt and digest
pub const HASH_SEPARATOR: char = '$';

/// Hash a password with a freshly generated salt
pub fn hash_password(plain: &str) -> Result<String, AppError> {
    hash_password_with_salt(plain, &generate_salt())
}

/// Hash a password with a caller-supplied salt text
pub fn hash_password_with_salt(plain: &str, salt: &str) -> Result<String, AppError> {
    if salt.is_empty() {
        return Err(AppError::InvalidInput("salt must not be empty".to_string()));
    }
    if salt.contains(HASH_SEPARATOR) {
        return Err(AppError::InvalidInput(format!(
            "salt must not contain '{HASH_SEPARATOR}'"
        )));
    }
    if STANDARD.decode(salt).is_err() {
        return Err(AppError::InvalidInput(
            "salt must be standard base64".to_string(),
        ));
    }

    let digest = derive(plain, salt);
    Ok(format!("{salt}{HASH_SEPARATOR}{}", STANDARD.encode(digest)))
}

/// Verify a password against an encoded credential.
///
/// Any malformed input yields `false`.
pub fn verify_password(plain: &str, encoded: &str) -> bool {
    let Some((salt, expected)) = split_encoded(encoded) else {
        return false;
    };
    let expected = match STANDARD.decode(expected) {
        Ok(bytes) if bytes.len() == DIGEST_LEN => bytes,
        _ => return false,
    };

    let actual = derive(plain, salt);
    constant_time_eq(&actual, &expected)
}

/// Structural check of an encoded credential, without running the KDF
pub fn is_encoded_hash(encoded: &str) -> bool {
    let Some((_, digest)) = split_encoded(encoded) else {
        return false;
    };
    matches!(STANDARD.decode(digest), Ok(bytes) if bytes.len() == DIGEST_LEN)
}

/// Hash a password, then zeroize the plaintext.
///
/// Uses `salt` when given, a fresh one otherwise. On error the input is
/// left intact.
pub fn hash_password_secure(plain: &mut String, salt: Option<&str>) -> Result<String, AppError> {
    let hash = match salt {
        Some(salt) => hash_password_with_salt(plain, salt)?,
        None => hash_password(plain)?,
    };
    plain.zeroize();
    Ok(hash)
}

/// Compare two byte strings without short-circuiting on the first mismatch
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

// Both halves non-empty, salt decodable.
fn split_encoded(encoded: &str) -> Option<(&str, &str)> {
    let (salt, digest) = encoded.split_once(HASH_SEPARATOR)?;
    if salt.is_empty() || digest.is_empty() {
        return None;
    }
    STANDARD.decode(salt).ok()?;
    Some((salt, digest))
}

fn derive(plain: &str, salt: &str) -> [u8; DIGEST_LEN] {
    let mut digest = [0u8; DIGEST_LEN];
    pbkdf2_hmac::<Sha256>(plain.as_bytes(), salt.as_bytes(), PBKDF2_ITERATIONS, &mut digest);
    digest
}
