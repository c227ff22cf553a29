//! Append-only event log.
//!
//! Every successful mutating call appends exactly one record. Nothing in the
//! ledger reads the log back to make a decision; it exists for auditors and
//! for relayers watching [`LedgerEvent::Bridged`].

use pegcoin_protocol::crypto::Address;
use serde::{Deserialize, Serialize};

use crate::bridge::ChainId;
use crate::rebase::SupplyDelta;

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Oracle-approved issuance.
    Minted { to: Address, amount: u64 },

    /// Holder burned their own balance.
    Redeemed { from: Address, amount: u64 },

    /// A rebase ran. `delta` is what was applied to the treasury, possibly
    /// [`SupplyDelta::None`].
    PegAdjusted {
        observed_price: u64,
        volatility: u8,
        delta: SupplyDelta,
    },

    /// Holder burned balance to be relayed to another chain.
    Bridged {
        from: Address,
        amount: u64,
        target_chain: ChainId,
    },

    Paused { by: Address },

    Unpaused { by: Address },
}

impl LedgerEvent {
    /// Short label used in logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Minted { .. } => "minted",
            Self::Redeemed { .. } => "redeemed",
            Self::PegAdjusted { .. } => "peg_adjusted",
            Self::Bridged { .. } => "bridged",
            Self::Paused { .. } => "paused",
            Self::Unpaused { .. } => "unpaused",
        }
    }
}

/// A sequenced, immutable log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log, starting at 0.
    pub sequence: u64,
    pub event: LedgerEvent,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `event` with the next sequence number and returns the record.
    pub fn append(&mut self, event: LedgerEvent) -> EventRecord {
        let record = EventRecord {
            sequence: self.records.len() as u64,
            event,
        };
        self.records.push(record.clone());
        record
    }

    /// All records, oldest first.
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records with `sequence >= from`.
    pub fn since(&self, from: u64) -> &[EventRecord] {
        let start = usize::try_from(from)
            .unwrap_or(usize::MAX)
            .min(self.records.len());
        &self.records[start..]
    }

    pub fn last(&self) -> Option<&EventRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holder() -> Address {
        Address::from_bytes([7u8; 32])
    }

    #[test]
    fn sequences_are_contiguous() {
        let mut log = EventLog::new();
        let a = log.append(LedgerEvent::Minted {
            to: holder(),
            amount: 10,
        });
        let b = log.append(LedgerEvent::Redeemed {
            from: holder(),
            amount: 4,
        });
        assert_eq!(a.sequence, 0);
        assert_eq!(b.sequence, 1);
        assert_eq!(log.len(), 2);
        assert_eq!(log.last(), Some(&b));
    }

    #[test]
    fn since_filters_by_sequence() {
        let mut log = EventLog::new();
        for _ in 0..5 {
            log.append(LedgerEvent::Paused { by: holder() });
        }
        assert_eq!(log.since(0).len(), 5);
        assert_eq!(log.since(3).len(), 2);
        assert_eq!(log.since(3)[0].sequence, 3);
        assert!(log.since(5).is_empty());
        assert!(log.since(u64::MAX).is_empty());
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = LedgerEvent::Bridged {
            from: holder(),
            amount: 9,
            target_chain: 137,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "bridged");
        assert_eq!(json["target_chain"], 137);
        assert_eq!(json["from"], holder().to_hex());

        let back: LedgerEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn peg_adjusted_carries_delta() {
        let event = LedgerEvent::PegAdjusted {
            observed_price: 1,
            volatility: 20,
            delta: SupplyDelta::Mint(5),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["delta"]["direction"], "mint");
        assert_eq!(json["delta"]["amount"], 5);
        assert_eq!(event.name(), "peg_adjusted");
    }
}
