//! # Peg Rebase Engine
//!
//! Moves supply toward the peg through the treasury account:
//!
//! ```text
//! price > peg:  burn  (price - peg) * supply / peg  from treasury
//! price < peg:  mint  (peg - price) * supply / peg  to   treasury
//! price = peg:  nothing
//! ```
//!
//! The delta is computed once from the pre-rebase supply and truncated.
//! Applying it goes through the ledger, so the cap and treasury balance
//! are enforced there: a mint over the cap fails with `SupplyCapExceeded`
//! and a burn larger than the treasury fails with `InsufficientBalance`.

use pegcoin_protocol::config::PEG_TARGET;
use pegcoin_protocol::crypto::Address;
use pegcoin_protocol::math::{mul_div, MathError};
use serde::{Deserialize, Serialize};

use crate::error::StablecoinError;
use crate::ledger::SupplyLedger;

/// Supply change applied by a rebase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "direction", content = "amount", rename_all = "snake_case")]
pub enum SupplyDelta {
    None,
    Mint(u64),
    Burn(u64),
}

impl SupplyDelta {
    /// Absolute amount moved, zero for [`SupplyDelta::None`].
    pub fn amount(&self) -> u64 {
        match self {
            Self::None => 0,
            Self::Mint(amount) | Self::Burn(amount) => *amount,
        }
    }

    pub fn is_none(&self) -> bool {
        self.amount() == 0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RebaseEngine {
    treasury: Address,
}

impl RebaseEngine {
    pub fn new(treasury: Address) -> Self {
        Self { treasury }
    }

    /// The delta a rebase at `observed_price` would apply to a ledger with
    /// `supply` outstanding. Pure.
    pub fn compute_delta(observed_price: u64, supply: u64) -> Result<SupplyDelta, MathError> {
        let delta = if observed_price > PEG_TARGET {
            let amount = mul_div(observed_price - PEG_TARGET, supply, PEG_TARGET)?;
            SupplyDelta::Burn(amount)
        } else if observed_price < PEG_TARGET {
            let amount = mul_div(PEG_TARGET - observed_price, supply, PEG_TARGET)?;
            SupplyDelta::Mint(amount)
        } else {
            SupplyDelta::None
        };

        // A zero-amount burn or mint (tiny deviation, tiny supply) is no
        // change at all.
        Ok(if delta.amount() == 0 {
            SupplyDelta::None
        } else {
            delta
        })
    }

    /// Computes and applies the delta. Leaves the ledger untouched on error.
    pub fn rebase(
        &self,
        ledger: &mut SupplyLedger,
        observed_price: u64,
    ) -> Result<SupplyDelta, StablecoinError> {
        let delta = Self::compute_delta(observed_price, ledger.total_supply())?;
        match delta {
            SupplyDelta::None => {}
            SupplyDelta::Mint(amount) => {
                ledger.credit(self.treasury, amount)?;
            }
            SupplyDelta::Burn(amount) => {
                ledger.debit(self.treasury, amount)?;
            }
        }
        Ok(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREASURY: Address = Address::from_bytes([0xEE; 32]);

    fn pct(p: u64) -> u64 {
        PEG_TARGET / 100 * p
    }

    #[test]
    fn at_peg_is_a_no_op() {
        assert_eq!(
            RebaseEngine::compute_delta(PEG_TARGET, 1_000_000).unwrap(),
            SupplyDelta::None
        );
    }

    #[test]
    fn below_peg_mints_proportionally() {
        // 0.98 with supply 1000 -> mint 20.
        assert_eq!(
            RebaseEngine::compute_delta(pct(98), 1_000).unwrap(),
            SupplyDelta::Mint(20)
        );
    }

    #[test]
    fn above_peg_burns_proportionally() {
        // 1.05 with supply 1000 -> burn 50.
        assert_eq!(
            RebaseEngine::compute_delta(pct(105), 1_000).unwrap(),
            SupplyDelta::Burn(50)
        );
    }

    #[test]
    fn truncates_and_collapses_zero() {
        // 0.999 * 999 -> 0.999, truncates to 0.
        assert_eq!(
            RebaseEngine::compute_delta(PEG_TARGET - PEG_TARGET / 1_000, 999).unwrap(),
            SupplyDelta::None
        );
        assert_eq!(
            RebaseEngine::compute_delta(pct(97), 0).unwrap(),
            SupplyDelta::None
        );
    }

    #[test]
    fn overflow_is_reported() {
        // Price u64::MAX is ~18x the peg; times a supply of u64::MAX the
        // quotient no longer fits.
        assert_eq!(
            RebaseEngine::compute_delta(u64::MAX, u64::MAX),
            Err(MathError::Overflow)
        );
    }

    #[test]
    fn rebase_mints_into_treasury() {
        let mut ledger = SupplyLedger::new(10_000);
        ledger.credit(TREASURY, 1_000).unwrap();
        let delta = RebaseEngine::new(TREASURY).rebase(&mut ledger, pct(90)).unwrap();
        assert_eq!(delta, SupplyDelta::Mint(100));
        assert_eq!(ledger.total_supply(), 1_100);
        assert_eq!(ledger.balance_of(&TREASURY), 1_100);
    }

    #[test]
    fn rebase_burn_needs_treasury_balance() {
        let holder = Address::from_bytes([1u8; 32]);
        let mut ledger = SupplyLedger::new(10_000);
        ledger.credit(holder, 1_000).unwrap();
        ledger.credit(TREASURY, 10).unwrap();

        let err = RebaseEngine::new(TREASURY)
            .rebase(&mut ledger, pct(110))
            .unwrap_err();
        assert_eq!(
            err,
            StablecoinError::InsufficientBalance {
                available: 10,
                requested: 101
            }
        );
        assert_eq!(ledger.total_supply(), 1_010);
    }

    #[test]
    fn rebase_mint_respects_cap() {
        let mut ledger = SupplyLedger::new(1_050);
        ledger.credit(TREASURY, 1_000).unwrap();
        let err = RebaseEngine::new(TREASURY)
            .rebase(&mut ledger, pct(90))
            .unwrap_err();
        assert!(matches!(err, StablecoinError::SupplyCapExceeded { .. }));
        assert_eq!(ledger.total_supply(), 1_000);
    }

    #[test]
    fn delta_serializes_adjacently_tagged() {
        let json = serde_json::to_value(SupplyDelta::Burn(3)).unwrap();
        assert_eq!(json, serde_json::json!({"direction": "burn", "amount": 3}));
    }
}
