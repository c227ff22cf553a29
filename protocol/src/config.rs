//! # Protocol Configuration & Constants
//!
//! Every magic number in PEGCOIN lives here. If you're hardcoding a constant
//! somewhere else, you're doing it wrong.
//!
//! Prices are fixed-point integers with [`PRICE_DECIMALS`] decimals. Token
//! amounts are plain `u64` in the smallest denomination. Nothing in the
//! protocol ever touches a float.

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// The full version string.
pub const PROTOCOL_VERSION: &str = "0.1.0";

/// Token ticker shown by tooling. Display only.
pub const TOKEN_SYMBOL: &str = "PEG";

// ---------------------------------------------------------------------------
// Peg Parameters
// ---------------------------------------------------------------------------

/// Number of decimals in a fixed-point price. 18, same as every EVM feed.
pub const PRICE_DECIMALS: u32 = 18;

/// One whole unit of price: `10^18`.
pub const PRICE_SCALE: u64 = 1_000_000_000_000_000_000;

/// The peg target. Exactly 1.0 and never mutated.
pub const PEG_TARGET: u64 = PRICE_SCALE;

/// Width of the band above the peg inside which minting is allowed.
/// A mint is denied when `price * 100 > peg * (100 + PEG_BAND_PERCENT)`.
pub const PEG_BAND_PERCENT: u64 = 1;

/// Upper end of the volatility scale reported by the feed.
pub const VOLATILITY_SCALE: u8 = 100;

/// Redemptions are denied at or above this volatility reading.
pub const MAX_REDEEM_VOLATILITY: u8 = 50;

// ---------------------------------------------------------------------------
// Stabilization Advisor
// ---------------------------------------------------------------------------

/// Deviation from peg (in percent) beyond which the advisor recommends
/// a supply adjustment.
pub const STABILIZATION_DEVIATION_PERCENT: u64 = 2;

/// Volatility strictly above which the advisor recommends a supply
/// adjustment regardless of the deviation.
pub const STABILIZATION_VOLATILITY: u8 = 50;

// ---------------------------------------------------------------------------
// Supply
// ---------------------------------------------------------------------------

/// Default supply cap used by tooling when none is configured:
/// one billion tokens with 6 decimals.
pub const DEFAULT_SUPPLY_CAP: u64 = 1_000_000_000 * 1_000_000;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Public (verifying) key length in bytes. Also the address length.
pub const VERIFYING_KEY_LENGTH: usize = 32;

/// Ed25519 signature length. Always 64 bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Authorization envelope length: signer public key followed by the
/// signature over the authorization digest.
pub const ENVELOPE_LENGTH: usize = VERIFYING_KEY_LENGTH + SIGNATURE_LENGTH;

/// Domain separation tag prepended to every authorization digest.
/// Bump the version suffix on any change to the digest layout.
pub const AUTH_DOMAIN_TAG: &[u8] = b"PEGCOIN-AUTH-V1";

// ---------------------------------------------------------------------------
// Authorization Purposes
// ---------------------------------------------------------------------------

/// Oracle approval of a mint to a recipient.
pub const PURPOSE_MINT: &str = "mint";

/// Holder request to redeem their own balance.
pub const PURPOSE_REDEEM: &str = "redeem";

/// Prefix for holder bridge requests; the full purpose is
/// `bridge:<target chain id>` so the chain is covered by the signature.
pub const PURPOSE_BRIDGE_PREFIX: &str = "bridge";

/// Administrator request to rebase supply. The amount is the observed price.
pub const PURPOSE_ADJUST_PEG: &str = "adjust-peg";

/// Administrator request to pause the ledger.
pub const PURPOSE_PAUSE: &str = "pause";

/// Administrator request to unpause the ledger.
pub const PURPOSE_UNPAUSE: &str = "unpause";

/// Builds the bridge purpose string for a target chain.
pub fn bridge_purpose(target_chain: u64) -> String {
    format!("{}:{}", PURPOSE_BRIDGE_PREFIX, target_chain)
}

/// Builds the purpose a caller signs for one request: the base purpose, a
/// caller-chosen nonce and, for requests that carry one, the volatility
/// reading. Two requests with different nonces never share a digest.
pub fn request_purpose(base: &str, nonce: u64, volatility: Option<u8>) -> String {
    match volatility {
        Some(volatility) => format!("{};nonce={};volatility={}", base, nonce, volatility),
        None => format!("{};nonce={}", base, nonce),
    }
}

// ---------------------------------------------------------------------------
// Network Parameters
// ---------------------------------------------------------------------------

/// Default HTTP API port.
pub const DEFAULT_API_PORT: u16 = 9841;

/// Default metrics (Prometheus) port.
pub const DEFAULT_METRICS_PORT: u16 = 9842;
