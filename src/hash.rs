//! Key hashing (spec component C1).
//!
//! The hash is the sole on-disk identity for a key: the original key text
//! is never written to the sorted table, only its hash. Collisions between
//! distinct keys share a disk slot and the last write wins; with an 8-hex
//! character (32-bit) hash, collisions become likely around ~65k live keys.

use sha1::{Digest, Sha1};

/// Number of hex characters kept from the SHA-1 digest.
pub const HASH_LEN: usize = 8;

/// Computes the 8-hex-character key hash used for all on-disk ordering and
/// equality.
pub fn hash(key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    let digest = hasher.finalize();
    let full = hex_encode(&digest);
    full[..HASH_LEN].to_string()
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
