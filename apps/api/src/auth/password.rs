//! PBKDF2-HMAC-SHA256 password hashing.
//!
//! Stored format: `<salt_hex>:<hash_hex>` with a 32-byte random salt.

use rand::RngCore;
use sha2::Sha256;

pub const PBKDF2_ROUNDS: u32 = 100_000;
const SALT_LEN: usize = 32;
const HASH_LEN: usize = 32;

pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt_hex = hex::encode(salt);
    let digest = derive(password, salt_hex.as_bytes());
    format!("{salt_hex}:{}", hex::encode(digest))
}

/// Returns false for wrong passwords and for malformed stored values.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, hash_hex)) = stored.split_once(':') else {
        return false;
    };
    let Ok(expected) = hex::decode(hash_hex) else {
        return false;
    };
    if expected.len() != HASH_LEN || salt_hex.is_empty() {
        return false;
    }
    let actual = derive(password, salt_hex.as_bytes());
    constant_time_eq(&actual, &expected)
}

fn derive(password: &str, salt: &[u8]) -> [u8; HASH_LEN] {
    let mut out = [0u8; HASH_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ROUNDS, &mut out);
    out
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
