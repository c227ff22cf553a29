//! Error taxonomy for the stablecoin ledger.
//!
//! Every rejection is terminal and synchronous. A call that returns any of
//! these has left balances, supply, the pause flag and the event log exactly
//! as they were.

use pegcoin_protocol::crypto::VerificationError;
use pegcoin_protocol::math::MathError;
use thiserror::Error;

use crate::ledger::LedgerError;

/// Errors surfaced by every [`Stablecoin`](crate::stablecoin::Stablecoin)
/// entry point.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StablecoinError {
    /// The mint signature was produced by someone other than the oracle.
    #[error("invalid signature: signer is not the trusted oracle")]
    InvalidSignature,

    /// The signature envelope could not be parsed or did not verify.
    #[error("malformed signature: {0}")]
    MalformedSignature(&'static str),

    /// Crediting would push total supply above the cap.
    #[error("supply cap exceeded: supply {supply} + {requested} > cap {cap}")]
    SupplyCapExceeded {
        /// Total supply before the attempted credit.
        supply: u64,
        /// Amount the caller tried to credit.
        requested: u64,
        /// The configured cap.
        cap: u64,
    },

    /// The observed price is more than 1% above the peg.
    #[error("peg unstable: observed price {observed_price} exceeds the mint band")]
    PegUnstable {
        /// Price reported by the feed, 18 decimals.
        observed_price: u64,
    },

    /// The account does not hold enough to cover the debit.
    #[error("insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance {
        /// Current balance of the account.
        available: u64,
        /// Amount the caller tried to debit.
        requested: u64,
    },

    /// Redemptions are closed at this volatility reading.
    #[error("volatility too high: observed {observed}, limit {limit}")]
    VolatilityTooHigh {
        /// Volatility reported by the feed, 0-100.
        observed: u8,
        /// Readings at or above this are rejected.
        limit: u8,
    },

    /// The ledger is paused.
    #[error("contract paused")]
    ContractPaused,

    /// A privileged operation was attempted by an unprivileged caller.
    #[error("unauthorized: caller is not privileged")]
    Unauthorized,

    /// A mint signature that was already consumed was presented again.
    #[error("signature replayed: this mint approval was already used")]
    SignatureReplayed,

    /// A rebase computation did not fit in the integer types.
    #[error("arithmetic overflow")]
    ArithmeticOverflow,
}

impl StablecoinError {
    /// Short stable label for metrics and API payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidSignature => "invalid_signature",
            Self::MalformedSignature(_) => "malformed_signature",
            Self::SupplyCapExceeded { .. } => "supply_cap_exceeded",
            Self::PegUnstable { .. } => "peg_unstable",
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::VolatilityTooHigh { .. } => "volatility_too_high",
            Self::ContractPaused => "contract_paused",
            Self::Unauthorized => "unauthorized",
            Self::SignatureReplayed => "signature_replayed",
            Self::ArithmeticOverflow => "arithmetic_overflow",
        }
    }
}

impl From<LedgerError> for StablecoinError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::SupplyCapExceeded {
                supply,
                requested,
                cap,
            } => Self::SupplyCapExceeded {
                supply,
                requested,
                cap,
            },
            LedgerError::InsufficientBalance {
                available,
                requested,
            } => Self::InsufficientBalance {
                available,
                requested,
            },
        }
    }
}

impl From<VerificationError> for StablecoinError {
    fn from(err: VerificationError) -> Self {
        match err {
            VerificationError::MalformedSignature(reason) => Self::MalformedSignature(reason),
        }
    }
}

impl From<MathError> for StablecoinError {
    fn from(_: MathError) -> Self {
        Self::ArithmeticOverflow
    }
}
