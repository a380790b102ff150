//! SHA-256 hashing utilities.
//!
//! Cache keys are fixed-length SHA-256 digests rendered as lowercase hex, which
//! keeps them filesystem-safe for on-disk storage drivers.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of data as lowercase hex
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
