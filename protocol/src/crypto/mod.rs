//! # Cryptographic Primitives for PEGCOIN
//!
//! Boring, well-audited cryptography only:
//!
//! - **Ed25519** for every signature.
//! - **SHA-256** for authorization digests.
//!
//! Everything here is a thin, type-safe wrapper around audited
//! implementations. The interesting part is [`signatures`], which fixes the
//! byte layout that oracle and clients sign.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::sha256;
pub use keys::{Address, KeyError, Keypair};
pub use signatures::{
    authorization_digest, recover_signer, sign_authorization, verify, Digest, VerificationError,
};
