//! # Authorization Signatures
//!
//! Every supply-changing request in PEGCOIN is authorized by a signature
//! over a canonical `(purpose, recipient, amount)` tuple. This module owns
//! that encoding, the 96-byte envelope that carries a signature on the wire,
//! and signer recovery.
//!
//! ## Digest layout
//!
//! ```text
//! digest = SHA-256(
//!     "PEGCOIN-AUTH-V1"                 15 bytes, ASCII domain tag
//!  || len(purpose) as u64 big-endian    8 bytes
//!  || purpose                           UTF-8 bytes
//!  || recipient                         32 bytes
//!  || amount as u64 big-endian          8 bytes
//! )
//! ```
//!
//! Signers in other languages must reproduce this byte-for-byte. Any
//! mismatch does not produce an error, just a different digest, and the
//! signature silently stops authenticating.
//!
//! ## Envelope
//!
//! ```text
//! envelope = signer_public_key (32) || ed25519_signature(digest) (64)
//! ```
//!
//! Ed25519 has no public-key recovery, so the signer travels with the
//! signature. "Recovering" the signer means parsing the embedded key and
//! checking the signature against it. A valid signature from the *wrong*
//! key is not an error here: [`verify`] returns whoever signed, and the
//! caller decides whether that identity is trusted.

use ed25519_dalek::Signature;
use thiserror::Error;

use super::hash::{sha256_parts, DIGEST_LENGTH};
use super::keys::{Address, Keypair};
use crate::config::{AUTH_DOMAIN_TAG, ENVELOPE_LENGTH, VERIFYING_KEY_LENGTH};

/// A 32-byte authorization digest.
pub type Digest = [u8; DIGEST_LENGTH];

/// Errors during signer recovery.
///
/// Deliberately one bucket: we don't tell attackers which part was wrong.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("malformed signature: {0}")]
    MalformedSignature(&'static str),
}

/// Builds the canonical digest for an authorization tuple.
pub fn authorization_digest(purpose: &str, recipient: &Address, amount: u64) -> Digest {
    let purpose_len = (purpose.len() as u64).to_be_bytes();
    let amount_be = amount.to_be_bytes();
    sha256_parts(&[
        AUTH_DOMAIN_TAG,
        &purpose_len,
        purpose.as_bytes(),
        recipient.as_bytes(),
        &amount_be,
    ])
}

/// Signs an authorization tuple and returns the 96-byte envelope.
///
/// Used by the oracle to approve mints and by holders and administrators
/// to sign their own requests.
pub fn sign_authorization(
    keypair: &Keypair,
    purpose: &str,
    recipient: &Address,
    amount: u64,
) -> Vec<u8> {
    let digest = authorization_digest(purpose, recipient, amount);
    let mut envelope = Vec::with_capacity(ENVELOPE_LENGTH);
    envelope.extend_from_slice(keypair.address().as_bytes());
    envelope.extend_from_slice(&keypair.sign(&digest));
    envelope
}

/// Recovers the signer of an authorization tuple.
///
/// Returns the signer's address on success. Fails with
/// [`VerificationError::MalformedSignature`] when the envelope has the wrong
/// length, carries an invalid key, or the signature does not verify.
pub fn verify(
    purpose: &str,
    recipient: &Address,
    amount: u64,
    signature: &[u8],
) -> Result<Address, VerificationError> {
    let digest = authorization_digest(purpose, recipient, amount);
    recover_signer(&digest, signature)
}

/// Recovers the signer of a precomputed digest.
pub fn recover_signer(digest: &Digest, envelope: &[u8]) -> Result<Address, VerificationError> {
    if envelope.len() != ENVELOPE_LENGTH {
        return Err(VerificationError::MalformedSignature(
            "envelope must be 96 bytes",
        ));
    }
    let (key_bytes, sig_bytes) = envelope.split_at(VERIFYING_KEY_LENGTH);

    let signer = Address::try_from_public_key(key_bytes)
        .map_err(|_| VerificationError::MalformedSignature("invalid signer key"))?;
    let verifying_key = signer
        .to_verifying_key()
        .map_err(|_| VerificationError::MalformedSignature("invalid signer key"))?;
    let signature = Signature::from_slice(sig_bytes)
        .map_err(|_| VerificationError::MalformedSignature("invalid signature bytes"))?;

    verifying_key
        .verify_strict(digest, &signature)
        .map_err(|_| VerificationError::MalformedSignature("signature does not verify"))?;

    Ok(signer)
}
