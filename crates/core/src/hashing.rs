//! Random token and SHA-1 digest helpers.
//!
//! Used for generating opaque identifiers (API secrets, session tokens)
//! where uniqueness matters and cryptographic strength does not.

use rand::Rng;
use sha1::{Digest, Sha1};

/// Number of random characters hashed by [`new_sha1_hash`].
pub const DEFAULT_RANDOM_LENGTH: usize = 32;

/// Compute a SHA-1 hex digest of the given bytes.
pub fn sha1_hex(data: &[u8]) -> String {
    let hash = Sha1::digest(data);
    format!("{hash:x}")
}

/// Generate `len` random characters from `[a-zA-Z0-9]`.
pub fn random_string(len: usize) -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// SHA-1 hex digest of [`DEFAULT_RANDOM_LENGTH`] random characters.
pub fn new_sha1_hash() -> String {
    new_sha1_hash_of_length(DEFAULT_RANDOM_LENGTH)
}

/// SHA-1 hex digest of `len` random characters.
pub fn new_sha1_hash_of_length(len: usize) -> String {
    sha1_hex(random_string(len).as_bytes())
}
