// ============================
// crates/backend-lib/src/auth/token_generator.rs
// ============================
/*! Secure random material for authentication
Session ids and password salts both come from here. The generator is the
thread-local CSPRNG from `rand`, reseeded from OS entropy. */
use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};
use rand::RngCore;

/// Session id size in bytes (32 bytes = 256 bits of entropy)
pub const SESSION_ID_BYTES: usize = 32;

/// Salt size in bytes
pub const SALT_BYTES: usize = 32;

/// Fill a fresh buffer of `len` bytes with secure random data
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut buffer = vec![0u8; len];
    rand::rng().fill_bytes(&mut buffer);
    buffer
}

/** Generate an opaque session id
# Returns
A base64 URL-safe encoded string without padding */
pub fn generate_session_id() -> String {
    URL_SAFE_NO_PAD.encode(random_bytes(SESSION_ID_BYTES))
}

/** Generate a password salt
# Returns
Standard base64 (with padding), the text form stored in front of the `$` */
pub fn generate_salt() -> String {
    STANDARD.encode(random_bytes(SALT_BYTES))
}

/// First eight characters of a token, for log lines
pub fn short_id(token: &str) -> &str {
    let end = token
        .char_indices()
        .nth(8)
        .map_or(token.len(), |(idx, _)| idx);
    &token[..end]
}
