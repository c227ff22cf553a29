//! Bridge burn recorder.
//!
//! Burns local balance and hands back the intent. Relaying it to the target
//! chain is someone else's job; nothing here verifies that it happens.

use pegcoin_protocol::crypto::Address;
use serde::{Deserialize, Serialize};

use crate::error::StablecoinError;
use crate::ledger::SupplyLedger;

/// Destination chain identifier, opaque to the ledger.
pub type ChainId = u64;

/// A recorded burn waiting to be relayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeIntent {
    pub from: Address,
    pub amount: u64,
    pub target_chain: ChainId,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BridgeRecorder;

impl BridgeRecorder {
    pub fn new() -> Self {
        Self
    }

    /// Debits `amount` from `from`. Fails with `InsufficientBalance` and no
    /// change if the balance is short.
    pub fn initiate(
        &self,
        ledger: &mut SupplyLedger,
        from: Address,
        amount: u64,
        target_chain: ChainId,
    ) -> Result<BridgeIntent, StablecoinError> {
        ledger.debit(from, amount)?;
        Ok(BridgeIntent {
            from,
            amount,
            target_chain,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burns_and_records_intent() {
        let holder = Address::from_bytes([3u8; 32]);
        let mut ledger = SupplyLedger::new(1_000);
        ledger.credit(holder, 300).unwrap();

        let intent = BridgeRecorder::new()
            .initiate(&mut ledger, holder, 120, 56)
            .unwrap();
        assert_eq!(intent.amount, 120);
        assert_eq!(intent.target_chain, 56);
        assert_eq!(ledger.balance_of(&holder), 180);
        assert_eq!(ledger.total_supply(), 180);
    }

    #[test]
    fn short_balance_changes_nothing() {
        let holder = Address::from_bytes([3u8; 32]);
        let mut ledger = SupplyLedger::new(1_000);
        ledger.credit(holder, 10).unwrap();

        assert!(matches!(
            BridgeRecorder::new().initiate(&mut ledger, holder, 11, 1),
            Err(StablecoinError::InsufficientBalance { .. })
        ));
        assert_eq!(ledger.balance_of(&holder), 10);
    }
}
