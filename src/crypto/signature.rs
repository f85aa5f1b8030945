//! SHA-1 callback signatures
//!
//! WeChat signs callbacks with `sha1(sort(parts).concat())` rendered as
//! lowercase hex.

use sha1::{Digest, Sha1};
use subtle::ConstantTimeEq;

fn sha1_sorted(parts: &mut [&str]) -> String {
    parts.sort_unstable();
    let mut hasher = Sha1::new();
    for part in parts.iter() {
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Case-insensitive hex comparison in constant time
fn signature_eq(computed: &str, expected: &str) -> bool {
    let expected = expected.to_ascii_lowercase();
    computed.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Plain-mode signature over `token`, `timestamp` and `nonce`
pub fn signature(token: &str, timestamp: &str, nonce: &str) -> String {
    sha1_sorted(&mut [token, timestamp, nonce])
}

/// Safe-mode signature, which additionally covers the encrypted body
pub fn msg_signature(token: &str, timestamp: &str, nonce: &str, encrypt: &str) -> String {
    sha1_sorted(&mut [token, timestamp, nonce, encrypt])
}

/// Verify the `signature` query parameter of a callback
pub fn check_signature(token: &str, timestamp: &str, nonce: &str, expected: &str) -> bool {
    signature_eq(&signature(token, timestamp, nonce), expected)
}

/// Verify the `msg_signature` query parameter of a safe-mode callback
pub fn check_msg_signature(
    token: &str,
    timestamp: &str,
    nonce: &str,
    encrypt: &str,
    expected: &str,
) -> bool {
    signature_eq(&msg_signature(token, timestamp, nonce, encrypt), expected)
}
