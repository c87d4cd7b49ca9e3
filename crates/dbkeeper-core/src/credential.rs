//! Credential generation.
//!
//! Generated credentials are handed back to the caller exactly once. They are
//! stored and verified by the live engine only; the metadata store records when
//! a credential changed, never the credential or anything derived from it.

use rand::rngs::OsRng;
use rand::Rng;

/// Default length of a generated credential.
pub const DEFAULT_PASSWORD_LENGTH: usize = 10;

/// Characters a generated credential is drawn from.
pub const PASSWORD_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()";

/// Generate a random credential of `length` characters using the OS random source.
#[must_use]
pub fn generate_password(length: usize) -> String {
    let mut rng = OsRng;
    (0..length)
        .map(|_| char::from(PASSWORD_ALPHABET[rng.gen_range(0..PASSWORD_ALPHABET.len())]))
        .collect()
}
