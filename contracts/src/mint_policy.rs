//! # Mint Authorization Policy
//!
//! A mint is admissible when both hold:
//!
//! 1. The envelope recovers to the trusted oracle over `("mint", to, amount)`.
//! 2. The observed price is within the band: `price * 100 <= peg * 101`.
//!
//! The signature is checked first. A forged approval is rejected as a
//! signature problem even when the price would also have failed.

use pegcoin_protocol::config::{PEG_BAND_PERCENT, PEG_TARGET, PURPOSE_MINT};
use pegcoin_protocol::crypto::{authorization_digest, recover_signer, Address, Digest};
use pegcoin_protocol::math::exceeds_by_percent;
use tracing::debug;

use crate::error::StablecoinError;

/// An admitted mint. The digest is handed back so the replay guard can
/// consume it once the mint has applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintApproval {
    pub signer: Address,
    pub digest: Digest,
}

/// Stateless apart from the oracle it trusts.
#[derive(Debug, Clone, Copy)]
pub struct MintPolicy<'a> {
    oracle: &'a Address,
}

impl<'a> MintPolicy<'a> {
    pub fn new(oracle: &'a Address) -> Self {
        Self { oracle }
    }

    /// Decides whether `amount` may be minted to `to`.
    pub fn authorize(
        &self,
        to: &Address,
        amount: u64,
        signature: &[u8],
        current_price: u64,
    ) -> Result<MintApproval, StablecoinError> {
        let digest = authorization_digest(PURPOSE_MINT, to, amount);
        let signer = recover_signer(&digest, signature)?;
        if signer != *self.oracle {
            debug!(signer = %signer, "mint approval not signed by oracle");
            return Err(StablecoinError::InvalidSignature);
        }

        if price_outside_band(current_price) {
            debug!(current_price, "mint price above band");
            return Err(StablecoinError::PegUnstable {
                observed_price: current_price,
            });
        }

        Ok(MintApproval { signer, digest })
    }
}

/// `true` when `price` is more than [`PEG_BAND_PERCENT`] above the peg.
/// There is no lower bound: minting below peg is always in band.
pub fn price_outside_band(price: u64) -> bool {
    exceeds_by_percent(price, PEG_TARGET, PEG_BAND_PERCENT)
}
