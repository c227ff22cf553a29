//! Stabilization advisor.
//!
//! Read-only. Looks at a price and volatility reading and says whether an
//! operator should rebase now, and by how much. It never touches the ledger;
//! acting on the advice is a separate, privileged `adjust_peg` call.

use pegcoin_protocol::config::{
    PEG_TARGET, STABILIZATION_DEVIATION_PERCENT, STABILIZATION_VOLATILITY,
};
use pegcoin_protocol::math::{deviates_by_more_than, MathError};
use serde::{Deserialize, Serialize};

use crate::rebase::{RebaseEngine, SupplyDelta};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilizationAction {
    Mint,
    Burn,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: StabilizationAction,
    /// Amount a rebase at this price would move; 0 for `Hold`.
    pub amount: u64,
}

impl Recommendation {
    pub const HOLD: Self = Self {
        action: StabilizationAction::Hold,
        amount: 0,
    };
}

/// Advises when volatility is above the threshold or the price is more
/// than the configured percentage off peg.
pub fn recommend(
    observed_price: u64,
    observed_volatility: u8,
    supply: u64,
) -> Result<Recommendation, MathError> {
    let triggered = observed_volatility > STABILIZATION_VOLATILITY
        || deviates_by_more_than(observed_price, PEG_TARGET, STABILIZATION_DEVIATION_PERCENT);
    if !triggered {
        return Ok(Recommendation::HOLD);
    }

    Ok(match RebaseEngine::compute_delta(observed_price, supply)? {
        SupplyDelta::None => Recommendation::HOLD,
        SupplyDelta::Mint(amount) => Recommendation {
            action: StabilizationAction::Mint,
            amount,
        },
        SupplyDelta::Burn(amount) => Recommendation {
            action: StabilizationAction::Burn,
            amount,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pct(p: u64) -> u64 {
        PEG_TARGET / 100 * p
    }

    #[test]
    fn holds_inside_the_band() {
        assert_eq!(recommend(pct(101), 10, 1_000).unwrap(), Recommendation::HOLD);
        assert_eq!(recommend(pct(98), 50, 1_000).unwrap(), Recommendation::HOLD);
    }

    #[test]
    fn large_deviation_triggers() {
        assert_eq!(
            recommend(pct(95), 0, 1_000).unwrap(),
            Recommendation {
                action: StabilizationAction::Mint,
                amount: 50
            }
        );
        assert_eq!(
            recommend(pct(103), 0, 1_000).unwrap(),
            Recommendation {
                action: StabilizationAction::Burn,
                amount: 30
            }
        );
    }

    #[test]
    fn high_volatility_triggers_small_deviation() {
        assert_eq!(
            recommend(pct(99), 51, 1_000).unwrap(),
            Recommendation {
                action: StabilizationAction::Mint,
                amount: 10
            }
        );
    }

    #[test]
    fn volatile_but_at_peg_holds() {
        assert_eq!(recommend(PEG_TARGET, 90, 1_000).unwrap(), Recommendation::HOLD);
    }
}
