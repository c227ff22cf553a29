//! # Hashing Utilities
//!
//! SHA-256 is the only hash the protocol needs: authorization digests are
//! SHA-256 so that off-chain signers in any language can reproduce them
//! with a standard library.

use sha2::{Digest, Sha256};

/// Length of every digest produced by this module.
pub const DIGEST_LENGTH: usize = 32;

/// Compute the SHA-256 hash of the input data.
pub fn sha256(data: &[u8]) -> [u8; DIGEST_LENGTH] {
    sha256_parts(&[data])
}

/// Compute SHA-256 over the concatenation of `parts` without allocating
/// the concatenated buffer.
pub fn sha256_parts(parts: &[&[u8]]) -> [u8; DIGEST_LENGTH] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}
