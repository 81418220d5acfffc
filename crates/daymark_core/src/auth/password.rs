//! Salted one-way password hashing.
//!
//! # Responsibility
//! - Produce and verify self-describing password hash strings.
//!
//! # Invariants
//! - Every hash carries its own random salt; equal passwords never share a
//!   stored hash.
//! - Verification is one-way; a malformed stored hash verifies as false
//!   rather than erroring, so callers cannot distinguish corruption from a
//!   wrong password.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

const SCHEME: &str = "v1";
const SALT_LEN: usize = 16;
const ROUNDS: u32 = 60_000;

/// Hashes a plaintext password with a fresh random salt.
///
/// Format: `v1$<salt b64>$<digest b64>`.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let digest = stretch(password.as_bytes(), &salt);
    format!("{SCHEME}${}${}", BASE64.encode(salt), BASE64.encode(digest))
}

/// Verifies a plaintext password against a stored hash string.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(salt_b64), Some(digest_b64), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != SCHEME {
        return false;
    }
    let (Ok(salt), Ok(expected)) = (
        BASE64.decode(salt_b64.as_bytes()),
        BASE64.decode(digest_b64.as_bytes()),
    ) else {
        return false;
    };

    let actual = stretch(password.as_bytes(), &salt);
    constant_time_eq(&actual, &expected)
}

/// Iterated salted SHA-256 key stretching.
fn stretch(password: &[u8], salt: &[u8]) -> [u8; 32] {
    let mut digest = [0u8; 32];
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password);
    digest.copy_from_slice(&hasher.finalize());

    for _ in 1..ROUNDS {
        let mut hasher = Sha256::new();
        hasher.update(digest);
        hasher.update(salt);
        digest.copy_from_slice(&hasher.finalize());
    }
    digest
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
