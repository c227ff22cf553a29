//! Redemption policy.
//!
//! No signature is involved: a holder redeeming their own balance is
//! authorized by ownership. The only gates are balance and volatility, in
//! that order.

use pegcoin_protocol::config::MAX_REDEEM_VOLATILITY;
use pegcoin_protocol::crypto::Address;
use tracing::debug;

use crate::error::StablecoinError;
use crate::ledger::SupplyLedger;

#[derive(Debug, Clone, Copy)]
pub struct RedemptionPolicy {
    volatility_limit: u8,
}

impl Default for RedemptionPolicy {
    fn default() -> Self {
        Self {
            volatility_limit: MAX_REDEEM_VOLATILITY,
        }
    }
}

impl RedemptionPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Readings at or above this are rejected.
    pub fn volatility_limit(&self) -> u8 {
        self.volatility_limit
    }

    /// Admits the redeem or returns the first failing check.
    pub fn authorize(
        &self,
        ledger: &SupplyLedger,
        from: &Address,
        amount: u64,
        current_volatility: u8,
    ) -> Result<(), StablecoinError> {
        let available = ledger.balance_of(from);
        if available < amount {
            return Err(StablecoinError::InsufficientBalance {
                available,
                requested: amount,
            });
        }

        if current_volatility >= self.volatility_limit {
            debug!(current_volatility, "redeem blocked by volatility");
            return Err(StablecoinError::VolatilityTooHigh {
                observed: current_volatility,
                limit: self.volatility_limit,
            });
        }

        Ok(())
    }
}
